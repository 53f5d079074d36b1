//! Summary repository for per-family reporting queries.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};
use stockledger_core::movement::{
    DailyMovement, Family, MovementError, MovementRow, MovementSummary, SummaryService,
};
use uuid::Uuid;

use super::stock::db_err;
use crate::entities::{
    movement_items, movements,
    sea_orm_active_enums::{MovementFamily, MovementStatus},
};

/// Summary repository.
#[derive(Debug, Clone)]
pub struct SummaryRepository {
    db: DatabaseConnection,
}

impl SummaryRepository {
    /// Creates a new summary repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Summarizes live movements of a family dated within `[from, to]`.
    ///
    /// # Errors
    ///
    /// Returns `Database` if a query fails.
    pub async fn summary(
        &self,
        family: Family,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<MovementSummary, MovementError> {
        let rows = self.load_rows(family, from, to).await?;
        Ok(SummaryService::summarize(family, &rows))
    }

    /// Per-day count and value of live movements of a family.
    ///
    /// # Errors
    ///
    /// Returns `Database` if a query fails.
    pub async fn daily(
        &self,
        family: Family,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyMovement>, MovementError> {
        let rows = self.load_rows(family, from, to).await?;
        Ok(SummaryService::daily(&rows))
    }

    async fn load_rows(
        &self,
        family: Family,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MovementRow>, MovementError> {
        let headers: Vec<(Uuid, MovementStatus, NaiveDate, Decimal)> = movements::Entity::find()
            .select_only()
            .column(movements::Column::Id)
            .column(movements::Column::Status)
            .column(movements::Column::TransactionDate)
            .column(movements::Column::Total)
            .filter(movements::Column::Family.eq(MovementFamily::from(family)))
            .filter(movements::Column::TransactionDate.gte(from))
            .filter(movements::Column::TransactionDate.lte(to))
            .filter(movements::Column::DeletedAt.is_null())
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        if headers.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = headers.iter().map(|(id, ..)| *id).collect();
        let counts: HashMap<Uuid, i64> = movement_items::Entity::find()
            .select_only()
            .column(movement_items::Column::MovementId)
            .column_as(movement_items::Column::Id.count(), "item_count")
            .filter(movement_items::Column::MovementId.is_in(ids))
            .filter(movement_items::Column::DeletedAt.is_null())
            .group_by(movement_items::Column::MovementId)
            .into_tuple::<(Uuid, i64)>()
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .collect();

        Ok(headers
            .into_iter()
            .map(|(id, status, transaction_date, total)| MovementRow {
                status: status.into(),
                transaction_date,
                total,
                item_count: counts.get(&id).copied().unwrap_or(0),
            })
            .collect())
    }
}
