//! Movement total recomputation.
//!
//! One implementation for every family: the total is always a fresh
//! `SUM(subtotal)` over surviving items, never an increment.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};
use stockledger_core::movement::{MovementError, MovementService, WorkflowService};
use uuid::Uuid;

use super::stock::db_err;
use crate::entities::{movement_items, movements};

/// Sums surviving subtotals of a movement.
///
/// # Errors
///
/// Returns `Database` if the query fails.
pub async fn surviving_total<C>(conn: &C, movement_id: Uuid) -> Result<Decimal, MovementError>
where
    C: ConnectionTrait,
{
    let total: Option<Option<Decimal>> = movement_items::Entity::find()
        .select_only()
        .column_as(movement_items::Column::Subtotal.sum(), "total")
        .filter(movement_items::Column::MovementId.eq(movement_id))
        .filter(movement_items::Column::DeletedAt.is_null())
        .into_tuple()
        .one(conn)
        .await
        .map_err(db_err)?;

    Ok(total.flatten().unwrap_or(Decimal::ZERO))
}

/// Recomputes and stores `total` (and `balance = total - paid`).
///
/// # Errors
///
/// Returns `Database` if a query fails, or `ConsistencyViolation` if the
/// stored header disagrees with its items after the write.
pub async fn recompute_total<C>(
    conn: &C,
    movement: movements::Model,
) -> Result<movements::Model, MovementError>
where
    C: ConnectionTrait,
{
    let movement_id = movement.id;
    let total = surviving_total(conn, movement_id).await?;
    let balance = WorkflowService::balance_for(total, movement.paid);

    let mut active: movements::ActiveModel = movement.into();
    active.total = Set(total);
    active.balance = Set(balance);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(conn).await.map_err(db_err)?;

    verify_total(conn, &updated).await?;
    Ok(updated)
}

/// Checks a header's total against its surviving items.
///
/// # Errors
///
/// Returns `ConsistencyViolation` on mismatch.
pub async fn verify_total<C>(conn: &C, movement: &movements::Model) -> Result<Decimal, MovementError>
where
    C: ConnectionTrait,
{
    let subtotals: Vec<Decimal> = movement_items::Entity::find()
        .select_only()
        .column(movement_items::Column::Subtotal)
        .filter(movement_items::Column::MovementId.eq(movement.id))
        .filter(movement_items::Column::DeletedAt.is_null())
        .into_tuple()
        .all(conn)
        .await
        .map_err(db_err)?;

    MovementService::verify_total(movement.id, movement.total, subtotals)
}
