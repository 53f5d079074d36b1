//! Movement repository: the engine that writes stock movements.
//!
//! Every mutation runs in one database transaction:
//! 1. Lock the movement header (`SELECT ... FOR UPDATE`)
//! 2. Plan the change with the core services
//! 3. Write items, apply stock deltas through the register
//! 4. Recompute the total from surviving items
//! 5. Update counterparty rollups (creation only)
//! 6. Commit
//!
//! Any error drops the transaction, which rolls everything back.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use stockledger_core::movement::{
    CounterpartyKind, CreateMovementInput, Family, ItemState, ItemUpdate, LineInput,
    MovementError, MovementHeader, MovementService, MovementStatus, ProductSnapshot,
    ResolvedLine, StockPolicy, WorkflowService, generate_reference, normalize_reference,
};
use stockledger_shared::LedgerConfig;
use stockledger_shared::types::{PageRequest, PageResponse};
use tracing::info;
use uuid::Uuid;

use super::aggregate;
use super::rollup;
use super::stock::{StockRegister, db_err};
use crate::entities::{
    movement_items, movements, products, sale_payments,
    sea_orm_active_enums::{MovementFamily, MovementStatus as DbStatus},
};

/// A movement header with its surviving line items.
#[derive(Debug, Clone)]
pub struct MovementWithItems {
    /// Header.
    pub movement: movements::Model,
    /// Items that are not soft-deleted, oldest first.
    pub items: Vec<movement_items::Model>,
}

/// Filter options for listing movements.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    /// Filter by family.
    pub family: Option<Family>,
    /// Filter by status.
    pub status: Option<MovementStatus>,
    /// Filter by customer or supplier.
    pub counterparty_id: Option<Uuid>,
    /// Filter by date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end.
    pub date_to: Option<NaiveDate>,
}

/// Input for recording a sale payment.
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    /// Amount received.
    pub amount: Decimal,
    /// Cash, transfer, card...
    pub payment_method: String,
    /// External reference.
    pub reference: Option<String>,
    /// Free-form note.
    pub note: Option<String>,
}

/// A recorded payment and the header it settled.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    /// Updated sale header.
    pub movement: movements::Model,
    /// Stored payment.
    pub payment: sale_payments::Model,
}

/// Movement repository for all stock-moving writes and their reads.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    db: DatabaseConnection,
    policy: StockPolicy,
}

impl MovementRepository {
    /// Creates a new movement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, policy: StockPolicy) -> Self {
        Self { db, policy }
    }

    /// Creates a repository with the stock policy from configuration.
    #[must_use]
    pub fn from_config(db: DatabaseConnection, config: &LedgerConfig) -> Self {
        Self::new(db, StockPolicy::from(config))
    }

    /// The stock policy in force.
    #[must_use]
    pub const fn policy(&self) -> StockPolicy {
        self.policy
    }

    /// Creates a movement with its items.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A product or the counterparty does not exist
    /// - A line fails validation
    /// - A guarded decrease would drive stock below zero
    /// - The reference is already used within the family
    /// - Database operation fails
    pub async fn create_movement(
        &self,
        input: CreateMovementInput,
    ) -> Result<MovementWithItems, MovementError> {
        let family = input.family;
        MovementService::validate_counterparty(family, input.counterparty_id)?;

        let movement_id = Uuid::new_v4();
        let reference = normalize_reference(input.reference_no.as_deref())
            .unwrap_or_else(|| generate_reference(family, input.transaction_date, movement_id));

        let txn = self.db.begin().await.map_err(db_err)?;

        let counterparty = match (family.counterparty(), input.counterparty_id) {
            (Some(kind), Some(id)) => {
                rollup::ensure_exists(&txn, kind, id).await?;
                Some((kind, id))
            }
            _ => None,
        };

        Self::ensure_reference_free(&txn, family, &reference).await?;

        let product_ids: Vec<Uuid> = input.lines.iter().map(|l| l.product_id).collect();
        let snapshots = Self::load_snapshots(&txn, &product_ids).await?;
        let plan = MovementService::plan_create(&input, &self.policy, |id| {
            snapshots.get(&id).cloned()
        })?;
        let settlement =
            WorkflowService::creation_settlement(family, input.status, plan.total);

        let now: DateTimeWithTimeZone = Utc::now().into();
        let (customer_id, supplier_id) = match counterparty {
            Some((CounterpartyKind::Customer, id)) => (Some(id), None),
            Some((CounterpartyKind::Supplier, id)) => (None, Some(id)),
            None => (None, None),
        };

        let header = movements::ActiveModel {
            id: Set(movement_id),
            family: Set(family.into()),
            reference_no: Set(reference.clone()),
            status: Set(settlement.status.into()),
            transaction_date: Set(input.transaction_date),
            note: Set(input.note.clone()),
            total: Set(plan.total),
            paid: Set(settlement.paid),
            balance: Set(settlement.balance),
            customer_id: Set(customer_id),
            supplier_id: Set(supplier_id),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let header = header.insert(&txn).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                MovementError::DuplicateReference(reference.clone())
            } else {
                db_err(e)
            }
        })?;

        let mut items = Vec::with_capacity(plan.lines.len());
        for line in &plan.lines {
            items.push(Self::insert_item(&txn, movement_id, line).await?);
        }

        StockRegister::apply_all(&txn, family, &self.policy, &plan.deltas).await?;
        let header = aggregate::recompute_total(&txn, header).await?;

        if let Some((kind, id)) = counterparty {
            rollup::record_order(&txn, kind, id, header.total).await?;
        }

        txn.commit().await.map_err(db_err)?;

        info!(
            movement_id = %movement_id,
            %family,
            reference = %header.reference_no,
            total = %header.total,
            items = items.len(),
            "movement created"
        );

        Ok(MovementWithItems {
            movement: header,
            items,
        })
    }

    /// Adds an item to a draft movement.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound`, `TransactionLocked`, `ProductNotFound`,
    /// `InsufficientStock`, a validation error, or `Database`.
    pub async fn add_item(
        &self,
        movement_id: Uuid,
        line: LineInput,
    ) -> Result<MovementWithItems, MovementError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let header = Self::lock_movement(&txn, movement_id).await?;
        let state = to_header(&header);

        let snapshots = Self::load_snapshots(&txn, &[line.product_id]).await?;
        let (resolved, delta) =
            MovementService::plan_add_item(&state, &self.policy, &line, |id| {
                snapshots.get(&id).cloned()
            })?;

        Self::insert_item(&txn, movement_id, &resolved).await?;
        StockRegister::apply_delta(&txn, state.family, &self.policy, delta).await?;
        let header = aggregate::recompute_total(&txn, header).await?;
        let items = Self::surviving_items(&txn, movement_id).await?;

        txn.commit().await.map_err(db_err)?;

        info!(
            movement_id = %movement_id,
            family = %state.family,
            reference = %header.reference_no,
            total = %header.total,
            "movement item added"
        );

        Ok(MovementWithItems {
            movement: header,
            items,
        })
    }

    /// Updates quantity and values of an item. Only the quantity
    /// difference reaches stock.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound`, `TransactionNotFound`, `TransactionLocked`,
    /// `InsufficientStock`, a validation error, or `Database`.
    pub async fn update_item(
        &self,
        item_id: Uuid,
        update: ItemUpdate,
    ) -> Result<movement_items::Model, MovementError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let movement_id = Self::item_movement_id(&txn, item_id).await?;
        let header = Self::lock_movement(&txn, movement_id).await?;
        let state = to_header(&header);

        // Re-read under the header lock.
        let item = Self::find_item(&txn, item_id).await?;
        let snapshots = Self::load_snapshots(&txn, &[item.product_id]).await?;
        let revision = MovementService::plan_item_update(
            &state,
            &self.policy,
            &to_item_state(&item),
            &update,
            |id| snapshots.get(&id).cloned(),
        )?;

        if let Some(delta) = revision.stock_delta {
            StockRegister::apply_delta(&txn, state.family, &self.policy, delta).await?;
        }

        let mut active: movement_items::ActiveModel = item.into();
        active.quantity = Set(revision.quantity);
        active.unit_value = Set(revision.unit_value);
        active.tax = Set(revision.tax);
        active.discount = Set(revision.discount);
        active.subtotal = Set(revision.subtotal);
        active.updated_at = Set(Utc::now().into());
        let item = active.update(&txn).await.map_err(db_err)?;

        let header = aggregate::recompute_total(&txn, header).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            movement_id = %movement_id,
            item_id = %item_id,
            family = %state.family,
            reference = %header.reference_no,
            total = %header.total,
            "movement item updated"
        );

        Ok(item)
    }

    /// Soft-deletes an item and reverses its stock effect.
    ///
    /// Deleting an item that is already deleted is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound`, `TransactionNotFound`, `TransactionLocked`,
    /// `InsufficientStock` (stock-in reversal), or `Database`.
    pub async fn delete_item(&self, item_id: Uuid) -> Result<(), MovementError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let item = Self::find_item(&txn, item_id).await?;
        if item.deleted_at.is_some() {
            return Ok(());
        }

        let header = Self::lock_movement(&txn, item.movement_id).await?;
        let state = to_header(&header);

        // Re-read under the header lock: a concurrent delete may have won.
        let item = Self::find_item(&txn, item_id).await?;
        let Some(delta) = MovementService::plan_item_delete(&state, &to_item_state(&item))? else {
            return Ok(());
        };

        let mut active: movement_items::ActiveModel = item.into();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.update(&txn).await.map_err(db_err)?;

        StockRegister::apply_delta(&txn, state.family, &self.policy, delta).await?;
        let header = aggregate::recompute_total(&txn, header).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            movement_id = %header.id,
            item_id = %item_id,
            family = %state.family,
            reference = %header.reference_no,
            total = %header.total,
            "movement item deleted"
        );

        Ok(())
    }

    /// Soft-deletes a movement and reverses every surviving item.
    ///
    /// The header keeps its total as the historical value and counterparty
    /// rollups are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` (including an already-deleted movement),
    /// `TransactionLocked` for a completed reject, `InsufficientStock` for a
    /// guarded stock-in reversal, or `Database`.
    pub async fn delete_movement(&self, movement_id: Uuid) -> Result<(), MovementError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let header = Self::lock_movement(&txn, movement_id).await?;
        let state = to_header(&header);

        let items: Vec<ItemState> = movement_items::Entity::find()
            .filter(movement_items::Column::MovementId.eq(movement_id))
            .all(&txn)
            .await
            .map_err(db_err)?
            .iter()
            .map(to_item_state)
            .collect();

        let deltas = MovementService::plan_delete(&state, &items)?;
        StockRegister::apply_all(&txn, state.family, &self.policy, &deltas).await?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        movement_items::Entity::update_many()
            .col_expr(movement_items::Column::DeletedAt, Expr::value(now))
            .col_expr(movement_items::Column::UpdatedAt, Expr::value(now))
            .filter(movement_items::Column::MovementId.eq(movement_id))
            .filter(movement_items::Column::DeletedAt.is_null())
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let reference = header.reference_no.clone();
        let mut active: movements::ActiveModel = header.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            movement_id = %movement_id,
            family = %state.family,
            reference = %reference,
            reversed = deltas.len(),
            "movement deleted"
        );

        Ok(())
    }

    /// Moves a draft movement to completed or cancelled.
    ///
    /// Completing a sale settles it in full. No stock moves.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound`, `InvalidTransition`, or `Database`.
    pub async fn transition_status(
        &self,
        movement_id: Uuid,
        to: MovementStatus,
    ) -> Result<movements::Model, MovementError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let header = Self::lock_movement(&txn, movement_id).await?;
        let state = to_header(&header);

        let settlement = WorkflowService::transition(&state, to)?;

        let mut active: movements::ActiveModel = header.into();
        active.status = Set(settlement.status.into());
        active.paid = Set(settlement.paid);
        active.balance = Set(settlement.balance);
        active.updated_at = Set(Utc::now().into());
        let header = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            movement_id = %movement_id,
            family = %state.family,
            reference = %header.reference_no,
            from = %state.family.status_label(state.status),
            to = %state.family.status_label(to),
            "movement status changed"
        );

        Ok(header)
    }

    /// Records a payment against a sale.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound`, `PaymentsNotSupported`,
    /// `TransactionLocked`, `InvalidAmount`, `Overpayment`, or `Database`.
    pub async fn record_payment(
        &self,
        movement_id: Uuid,
        input: RecordPaymentInput,
    ) -> Result<PaymentReceipt, MovementError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let header = Self::lock_movement(&txn, movement_id).await?;
        let state = to_header(&header);

        let settlement = WorkflowService::apply_payment(&state, input.amount)?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let payment = sale_payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            movement_id: Set(movement_id),
            amount: Set(input.amount),
            payment_method: Set(input.payment_method),
            reference: Set(input.reference),
            note: Set(input.note),
            paid_at: Set(now),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let mut active: movements::ActiveModel = header.into();
        active.paid = Set(settlement.paid);
        active.balance = Set(settlement.balance);
        active.updated_at = Set(now);
        let header = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            movement_id = %movement_id,
            family = %state.family,
            reference = %header.reference_no,
            amount = %payment.amount,
            balance = %header.balance,
            "payment recorded"
        );

        Ok(PaymentReceipt {
            movement: header,
            payment,
        })
    }

    /// Gets a live movement with its surviving items.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` or `Database`.
    pub async fn get_movement(&self, movement_id: Uuid) -> Result<MovementWithItems, MovementError> {
        let movement = movements::Entity::find_by_id(movement_id)
            .filter(movements::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(MovementError::TransactionNotFound(movement_id))?;

        let items = Self::surviving_items(&self.db, movement_id).await?;
        Ok(MovementWithItems { movement, items })
    }

    /// Gets a live movement by its reference within a family, or `None` if
    /// no live movement carries it.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    pub async fn get_by_reference(
        &self,
        family: Family,
        reference_no: &str,
    ) -> Result<Option<MovementWithItems>, MovementError> {
        let Some(movement) = movements::Entity::find()
            .filter(movements::Column::Family.eq(MovementFamily::from(family)))
            .filter(movements::Column::ReferenceNo.eq(reference_no.trim()))
            .filter(movements::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let items = Self::surviving_items(&self.db, movement.id).await?;
        Ok(Some(MovementWithItems { movement, items }))
    }

    /// Lists live movements, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    pub async fn list_movements(
        &self,
        filter: MovementFilter,
        page: PageRequest,
    ) -> Result<PageResponse<movements::Model>, MovementError> {
        let page = page.clamped();
        let mut query =
            movements::Entity::find().filter(movements::Column::DeletedAt.is_null());

        if let Some(family) = filter.family {
            query = query.filter(movements::Column::Family.eq(MovementFamily::from(family)));
        }

        if let Some(status) = filter.status {
            query = query.filter(movements::Column::Status.eq(DbStatus::from(status)));
        }

        if let Some(counterparty_id) = filter.counterparty_id {
            query = query.filter(
                Condition::any()
                    .add(movements::Column::CustomerId.eq(counterparty_id))
                    .add(movements::Column::SupplierId.eq(counterparty_id)),
            );
        }

        if let Some(date_from) = filter.date_from {
            query = query.filter(movements::Column::TransactionDate.gte(date_from));
        }

        if let Some(date_to) = filter.date_to {
            query = query.filter(movements::Column::TransactionDate.lte(date_to));
        }

        let query = query
            .order_by_desc(movements::Column::TransactionDate)
            .order_by_desc(movements::Column::CreatedAt);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let data = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Lists payments of a sale, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` or `Database`.
    pub async fn list_payments(
        &self,
        movement_id: Uuid,
    ) -> Result<Vec<sale_payments::Model>, MovementError> {
        let exists = movements::Entity::find_by_id(movement_id)
            .filter(movements::Column::DeletedAt.is_null())
            .count(&self.db)
            .await
            .map_err(db_err)?;
        if exists == 0 {
            return Err(MovementError::TransactionNotFound(movement_id));
        }

        sale_payments::Entity::find()
            .filter(sale_payments::Column::MovementId.eq(movement_id))
            .order_by_asc(sale_payments::Column::PaidAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Checks a movement's stored total against its surviving items.
    ///
    /// # Errors
    ///
    /// Returns `ConsistencyViolation` on mismatch, `TransactionNotFound`,
    /// or `Database`.
    pub async fn verify_movement(&self, movement_id: Uuid) -> Result<Decimal, MovementError> {
        let movement = movements::Entity::find_by_id(movement_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(MovementError::TransactionNotFound(movement_id))?;
        if movement.deleted_at.is_some() {
            // Deleted headers keep their historical total.
            return Ok(movement.total);
        }
        aggregate::verify_total(&self.db, &movement).await
    }

    /// Locks a live movement header for the rest of the transaction.
    async fn lock_movement(
        txn: &DatabaseTransaction,
        movement_id: Uuid,
    ) -> Result<movements::Model, MovementError> {
        movements::Entity::find_by_id(movement_id)
            .filter(movements::Column::DeletedAt.is_null())
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or(MovementError::TransactionNotFound(movement_id))
    }

    async fn find_item(
        txn: &DatabaseTransaction,
        item_id: Uuid,
    ) -> Result<movement_items::Model, MovementError> {
        movement_items::Entity::find_by_id(item_id)
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or(MovementError::ItemNotFound(item_id))
    }

    async fn item_movement_id(
        txn: &DatabaseTransaction,
        item_id: Uuid,
    ) -> Result<Uuid, MovementError> {
        movement_items::Entity::find_by_id(item_id)
            .select_only()
            .column(movement_items::Column::MovementId)
            .into_tuple()
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or(MovementError::ItemNotFound(item_id))
    }

    async fn surviving_items<C>(
        conn: &C,
        movement_id: Uuid,
    ) -> Result<Vec<movement_items::Model>, MovementError>
    where
        C: sea_orm::ConnectionTrait,
    {
        movement_items::Entity::find()
            .filter(movement_items::Column::MovementId.eq(movement_id))
            .filter(movement_items::Column::DeletedAt.is_null())
            .order_by_asc(movement_items::Column::CreatedAt)
            .order_by_asc(movement_items::Column::Id)
            .all(conn)
            .await
            .map_err(db_err)
    }

    /// Loads live products as snapshots for the planners.
    async fn load_snapshots(
        txn: &DatabaseTransaction,
        product_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, ProductSnapshot>, MovementError> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let products = products::Entity::find()
            .filter(products::Column::Id.is_in(product_ids.iter().copied()))
            .filter(products::Column::DeletedAt.is_null())
            .all(txn)
            .await
            .map_err(db_err)?;

        Ok(products
            .into_iter()
            .map(|p| {
                (
                    p.id,
                    ProductSnapshot {
                        id: p.id,
                        name: p.name,
                        stock: p.stock,
                    },
                )
            })
            .collect())
    }

    async fn ensure_reference_free(
        txn: &DatabaseTransaction,
        family: Family,
        reference: &str,
    ) -> Result<(), MovementError> {
        let taken = movements::Entity::find()
            .filter(movements::Column::Family.eq(MovementFamily::from(family)))
            .filter(movements::Column::ReferenceNo.eq(reference))
            .count(txn)
            .await
            .map_err(db_err)?;

        if taken > 0 {
            return Err(MovementError::DuplicateReference(reference.to_string()));
        }
        Ok(())
    }

    async fn insert_item(
        txn: &DatabaseTransaction,
        movement_id: Uuid,
        line: &ResolvedLine,
    ) -> Result<movement_items::Model, MovementError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        movement_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            movement_id: Set(movement_id),
            product_id: Set(line.product_id),
            product_name: Set(line.product_name.clone()),
            quantity: Set(line.quantity),
            unit_value: Set(line.unit_value),
            tax: Set(line.tax),
            discount: Set(line.discount),
            subtotal: Set(line.subtotal),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await
        .map_err(db_err)
    }
}

fn to_header(model: &movements::Model) -> MovementHeader {
    MovementHeader {
        id: model.id,
        family: model.family.into(),
        status: model.status.into(),
        total: model.total,
        paid: model.paid,
    }
}

fn to_item_state(model: &movement_items::Model) -> ItemState {
    ItemState {
        id: model.id,
        product_id: model.product_id,
        quantity: model.quantity,
        unit_value: model.unit_value,
        tax: model.tax,
        discount: model.discount,
        deleted: model.deleted_at.is_some(),
    }
}
