//! Counterparty rollups: order count, spend and last order time.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use stockledger_core::movement::{CounterpartyKind, MovementError};
use uuid::Uuid;

use super::stock::db_err;
use crate::entities::{customers, suppliers};

/// Fails unless the counterparty exists and is live.
///
/// # Errors
///
/// Returns `CounterpartyNotFound` if it does not.
pub async fn ensure_exists<C>(
    conn: &C,
    kind: CounterpartyKind,
    counterparty_id: Uuid,
) -> Result<(), MovementError>
where
    C: ConnectionTrait,
{
    let found = match kind {
        CounterpartyKind::Customer => customers::Entity::find_by_id(counterparty_id)
            .filter(customers::Column::DeletedAt.is_null())
            .count(conn)
            .await,
        CounterpartyKind::Supplier => suppliers::Entity::find_by_id(counterparty_id)
            .filter(suppliers::Column::DeletedAt.is_null())
            .count(conn)
            .await,
    }
    .map_err(db_err)?;

    if found == 0 {
        return Err(MovementError::CounterpartyNotFound(counterparty_id));
    }
    Ok(())
}

/// Records one new movement against a counterparty.
///
/// Only creation calls this; edits and deletes leave rollups alone.
///
/// # Errors
///
/// Returns `CounterpartyNotFound` if no live row was updated.
pub async fn record_order<C>(
    conn: &C,
    kind: CounterpartyKind,
    counterparty_id: Uuid,
    total: Decimal,
) -> Result<(), MovementError>
where
    C: ConnectionTrait,
{
    let now: DateTimeWithTimeZone = Utc::now().into();

    let result = match kind {
        CounterpartyKind::Customer => {
            customers::Entity::update_many()
                .col_expr(
                    customers::Column::TotalOrders,
                    Expr::col(customers::Column::TotalOrders).add(1),
                )
                .col_expr(
                    customers::Column::TotalSpent,
                    Expr::col(customers::Column::TotalSpent).add(total),
                )
                .col_expr(customers::Column::LastOrderAt, Expr::value(now))
                .col_expr(customers::Column::UpdatedAt, Expr::value(now))
                .filter(customers::Column::Id.eq(counterparty_id))
                .filter(customers::Column::DeletedAt.is_null())
                .exec(conn)
                .await
        }
        CounterpartyKind::Supplier => {
            suppliers::Entity::update_many()
                .col_expr(
                    suppliers::Column::TotalPurchases,
                    Expr::col(suppliers::Column::TotalPurchases).add(1),
                )
                .col_expr(
                    suppliers::Column::TotalSpent,
                    Expr::col(suppliers::Column::TotalSpent).add(total),
                )
                .col_expr(suppliers::Column::LastOrderAt, Expr::value(now))
                .col_expr(suppliers::Column::UpdatedAt, Expr::value(now))
                .filter(suppliers::Column::Id.eq(counterparty_id))
                .filter(suppliers::Column::DeletedAt.is_null())
                .exec(conn)
                .await
        }
    }
    .map_err(db_err)?;

    if result.rows_affected == 0 {
        return Err(MovementError::CounterpartyNotFound(counterparty_id));
    }
    Ok(())
}
