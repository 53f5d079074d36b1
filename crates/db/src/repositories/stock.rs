//! Product stock register.
//!
//! The only code that writes `products.stock`. Every change is a single
//! server-side `stock = stock + delta`; a guarded decrease carries its
//! sufficiency condition in the same statement, so it is re-evaluated
//! after the row lock is taken.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use stockledger_core::movement::{Family, MovementError, StockDelta, StockPolicy};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entities::products;

/// Maps a store failure into the movement error taxonomy.
pub(crate) fn db_err(err: DbErr) -> MovementError {
    MovementError::Database(err.to_string())
}

/// Owner of the per-product stock counters.
pub struct StockRegister;

impl StockRegister {
    /// Reads current stock of a live product.
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` if the product is missing or deleted.
    pub async fn read<C>(conn: &C, product_id: Uuid) -> Result<i32, MovementError>
    where
        C: ConnectionTrait,
    {
        products::Entity::find_by_id(product_id)
            .filter(products::Column::DeletedAt.is_null())
            .one(conn)
            .await
            .map_err(db_err)?
            .map(|p| p.stock)
            .ok_or(MovementError::ProductNotFound(product_id))
    }

    /// Applies one signed delta and returns the new stock.
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` if the product is missing or deleted, and
    /// `InsufficientStock` if the delta is guarded for `family` and would
    /// drive stock below zero.
    pub async fn apply_delta<C>(
        conn: &C,
        family: Family,
        policy: &StockPolicy,
        delta: StockDelta,
    ) -> Result<i32, MovementError>
    where
        C: ConnectionTrait,
    {
        let guarded = policy.guards(family, &delta);
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();

        let mut update = products::Entity::update_many()
            .col_expr(
                products::Column::Stock,
                Expr::col(products::Column::Stock).add(delta.delta),
            )
            .col_expr(products::Column::UpdatedAt, Expr::value(now))
            .filter(products::Column::Id.eq(delta.product_id))
            .filter(products::Column::DeletedAt.is_null());

        if guarded {
            update = update.filter(products::Column::Stock.gte(delta.requested()));
        }

        let updated = update.exec_with_returning(conn).await.map_err(db_err)?;

        if let Some(product) = updated.first() {
            debug!(
                product_id = %delta.product_id,
                delta = delta.delta,
                stock = product.stock,
                %family,
                "stock delta applied"
            );
            return Ok(product.stock);
        }

        // Nothing matched: the product is gone, or the guard refused it.
        let available = Self::read(conn, delta.product_id).await?;
        warn!(
            product_id = %delta.product_id,
            available,
            requested = delta.requested(),
            %family,
            "insufficient stock"
        );
        Err(MovementError::InsufficientStock {
            product_id: delta.product_id,
            available,
            requested: delta.requested(),
        })
    }

    /// Applies deltas in the given order, stopping at the first failure.
    ///
    /// Callers pass deltas from `merge_deltas`, which orders them by product
    /// id. The surrounding database transaction rolls back on error.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Self::apply_delta`].
    pub async fn apply_all<C>(
        conn: &C,
        family: Family,
        policy: &StockPolicy,
        deltas: &[StockDelta],
    ) -> Result<(), MovementError>
    where
        C: ConnectionTrait,
    {
        for delta in deltas {
            Self::apply_delta(conn, family, policy, *delta).await?;
        }
        Ok(())
    }
}
