//! In-memory ledger used by the scenario and property tests.
//!
//! Drives the services exactly as the database engine does: plan, apply
//! guarded deltas all-or-nothing, then recompute the total from surviving
//! items.

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::MovementError;
use super::family::Family;
use super::line::{LineInput, ProductSnapshot};
use super::service::MovementService;
use super::status::MovementStatus;
use super::stock::{StockDelta, StockPolicy, check_sufficiency};
use super::types::{CreateMovementInput, ItemState, ItemUpdate, MovementHeader, Settlement};
use super::workflow::WorkflowService;

struct StoredItem {
    state: ItemState,
    subtotal: Decimal,
}

struct StoredMovement {
    header: MovementHeader,
    items: Vec<StoredItem>,
}

pub(crate) struct InMemoryLedger {
    policy: StockPolicy,
    products: HashMap<Uuid, ProductSnapshot>,
    movements: HashMap<Uuid, StoredMovement>,
}

impl InMemoryLedger {
    pub(crate) fn new(policy: StockPolicy) -> Self {
        Self {
            policy,
            products: HashMap::new(),
            movements: HashMap::new(),
        }
    }

    pub(crate) fn add_product(&mut self, stock: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.products.insert(
            id,
            ProductSnapshot {
                id,
                name: format!("Product {}", &id.simple().to_string()[..6]),
                stock,
            },
        );
        id
    }

    pub(crate) fn stock(&self, product_id: Uuid) -> i32 {
        self.products[&product_id].stock
    }

    pub(crate) fn total(&self, movement_id: Uuid) -> Decimal {
        self.movements[&movement_id].header.total
    }

    pub(crate) fn header(&self, movement_id: Uuid) -> MovementHeader {
        self.movements[&movement_id].header
    }

    pub(crate) fn item_ids(&self, movement_id: Uuid) -> Vec<Uuid> {
        self.movements[&movement_id]
            .items
            .iter()
            .map(|i| i.state.id)
            .collect()
    }

    pub(crate) fn create(
        &mut self,
        family: Family,
        lines: Vec<LineInput>,
    ) -> Result<Uuid, MovementError> {
        let input = CreateMovementInput {
            family,
            reference_no: None,
            status: MovementStatus::Draft,
            transaction_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
            note: None,
            counterparty_id: None,
            lines,
        };
        let plan = MovementService::plan_create(&input, &self.policy, |id| {
            self.products.get(&id).cloned()
        })?;
        self.apply(family, &plan.deltas)?;

        let id = Uuid::new_v4();
        let items = plan
            .lines
            .into_iter()
            .map(|line| StoredItem {
                state: ItemState {
                    id: Uuid::new_v4(),
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_value: line.unit_value,
                    tax: line.tax,
                    discount: line.discount,
                    deleted: false,
                },
                subtotal: line.subtotal,
            })
            .collect();
        self.movements.insert(
            id,
            StoredMovement {
                header: MovementHeader {
                    id,
                    family,
                    status: MovementStatus::Draft,
                    total: plan.total,
                    paid: Decimal::ZERO,
                },
                items,
            },
        );
        Ok(id)
    }

    pub(crate) fn add_item(
        &mut self,
        movement_id: Uuid,
        line: &LineInput,
    ) -> Result<Uuid, MovementError> {
        let header = self.movement(movement_id)?.header;
        let (resolved, delta) =
            MovementService::plan_add_item(&header, &self.policy, line, |id| {
                self.products.get(&id).cloned()
            })?;
        self.apply(header.family, &[delta])?;

        let item_id = Uuid::new_v4();
        let movement = self.movement_mut(movement_id)?;
        movement.items.push(StoredItem {
            state: ItemState {
                id: item_id,
                product_id: resolved.product_id,
                quantity: resolved.quantity,
                unit_value: resolved.unit_value,
                tax: resolved.tax,
                discount: resolved.discount,
                deleted: false,
            },
            subtotal: resolved.subtotal,
        });
        self.recompute(movement_id)?;
        Ok(item_id)
    }

    pub(crate) fn update_item(
        &mut self,
        movement_id: Uuid,
        item_id: Uuid,
        update: &ItemUpdate,
    ) -> Result<(), MovementError> {
        let movement = self.movement(movement_id)?;
        let header = movement.header;
        let item = Self::find_item(movement, item_id)?.state.clone();

        let revision =
            MovementService::plan_item_update(&header, &self.policy, &item, update, |id| {
                self.products.get(&id).cloned()
            })?;
        if let Some(delta) = revision.stock_delta {
            self.apply(header.family, &[delta])?;
        }

        let movement = self.movement_mut(movement_id)?;
        if let Some(stored) = movement.items.iter_mut().find(|i| i.state.id == item_id) {
            stored.state.quantity = revision.quantity;
            stored.state.unit_value = revision.unit_value;
            stored.state.tax = revision.tax;
            stored.state.discount = revision.discount;
            stored.subtotal = revision.subtotal;
        }
        self.recompute(movement_id)
    }

    pub(crate) fn delete_item(
        &mut self,
        movement_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), MovementError> {
        let movement = self.movement(movement_id)?;
        let header = movement.header;
        let item = Self::find_item(movement, item_id)?.state.clone();

        let Some(delta) = MovementService::plan_item_delete(&header, &item)? else {
            return Ok(());
        };
        self.apply(header.family, &[delta])?;

        let movement = self.movement_mut(movement_id)?;
        if let Some(stored) = movement.items.iter_mut().find(|i| i.state.id == item_id) {
            stored.state.deleted = true;
        }
        self.recompute(movement_id)
    }

    pub(crate) fn delete_movement(&mut self, movement_id: Uuid) -> Result<(), MovementError> {
        let movement = self.movement(movement_id)?;
        let header = movement.header;
        let items: Vec<ItemState> = movement.items.iter().map(|i| i.state.clone()).collect();

        let deltas = MovementService::plan_delete(&header, &items)?;
        self.apply(header.family, &deltas)?;
        self.movements.remove(&movement_id);
        Ok(())
    }

    pub(crate) fn transition(
        &mut self,
        movement_id: Uuid,
        to: MovementStatus,
    ) -> Result<Settlement, MovementError> {
        let movement = self.movement_mut(movement_id)?;
        let settlement = WorkflowService::transition(&movement.header, to)?;
        movement.header.status = settlement.status;
        movement.header.paid = settlement.paid;
        Ok(settlement)
    }

    /// Checks the stored total against surviving subtotals.
    pub(crate) fn verify(&self, movement_id: Uuid) -> Result<Decimal, MovementError> {
        let movement = self.movement(movement_id)?;
        MovementService::verify_total(
            movement_id,
            movement.header.total,
            movement
                .items
                .iter()
                .filter(|i| !i.state.deleted)
                .map(|i| i.subtotal),
        )
    }

    /// Every guarded delta is checked before any is applied.
    fn apply(&mut self, family: Family, deltas: &[StockDelta]) -> Result<(), MovementError> {
        for delta in deltas {
            let product = self
                .products
                .get(&delta.product_id)
                .ok_or(MovementError::ProductNotFound(delta.product_id))?;
            if self.policy.guards(family, delta) {
                check_sufficiency(product.stock, delta)?;
            }
        }
        for delta in deltas {
            if let Some(product) = self.products.get_mut(&delta.product_id) {
                product.stock += delta.delta;
            }
        }
        Ok(())
    }

    fn recompute(&mut self, movement_id: Uuid) -> Result<(), MovementError> {
        let movement = self.movement_mut(movement_id)?;
        movement.header.total = MovementService::sum_subtotals(
            movement
                .items
                .iter()
                .filter(|i| !i.state.deleted)
                .map(|i| i.subtotal),
        )?;
        Ok(())
    }

    fn movement(&self, id: Uuid) -> Result<&StoredMovement, MovementError> {
        self.movements
            .get(&id)
            .ok_or(MovementError::TransactionNotFound(id))
    }

    fn movement_mut(&mut self, id: Uuid) -> Result<&mut StoredMovement, MovementError> {
        self.movements
            .get_mut(&id)
            .ok_or(MovementError::TransactionNotFound(id))
    }

    fn find_item(movement: &StoredMovement, item_id: Uuid) -> Result<&StoredItem, MovementError> {
        movement
            .items
            .iter()
            .find(|i| i.state.id == item_id)
            .ok_or(MovementError::ItemNotFound(item_id))
    }
}
