//! Per-family summaries and product activity.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::family::Family;
use super::status::MovementStatus;

/// One live movement as fed to the summary service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementRow {
    /// Current status.
    pub status: MovementStatus,
    /// Business date.
    pub transaction_date: NaiveDate,
    /// Stored total.
    pub total: Decimal,
    /// Surviving line items.
    pub item_count: i64,
}

/// Totals for one family over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementSummary {
    /// Family summarized.
    pub family: Family,
    /// Number of movements.
    pub count: i64,
    /// Movements still in draft.
    pub draft_count: i64,
    /// Completed movements.
    pub completed_count: i64,
    /// Cancelled movements.
    pub cancelled_count: i64,
    /// Sum of all totals.
    pub total_value: Decimal,
    /// Sum of completed totals.
    pub completed_value: Decimal,
    /// `total_value / count`, zero when empty.
    pub average_value: Decimal,
    /// Surviving items on completed movements.
    pub completed_item_count: i64,
}

/// Movement count and value for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMovement {
    /// The day.
    pub date: NaiveDate,
    /// Movements dated that day.
    pub count: i64,
    /// Sum of their totals.
    pub total_value: Decimal,
}

/// Quantity moved per family for one product, over surviving items of
/// live movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductActivity {
    /// The product.
    pub product_id: Uuid,
    /// Units received.
    pub stocked_in: i64,
    /// Units sold.
    pub sold: i64,
    /// Units written off.
    pub rejected: i64,
}

impl ProductActivity {
    /// Net stock effect of all recorded activity.
    #[must_use]
    pub fn net(&self) -> i64 {
        self.stocked_in - self.sold - self.rejected
    }
}

/// Service for computing summaries.
pub struct SummaryService;

impl SummaryService {
    /// Summarizes the movements of one family.
    #[must_use]
    pub fn summarize(family: Family, rows: &[MovementRow]) -> MovementSummary {
        let mut summary = MovementSummary {
            family,
            count: 0,
            draft_count: 0,
            completed_count: 0,
            cancelled_count: 0,
            total_value: Decimal::ZERO,
            completed_value: Decimal::ZERO,
            average_value: Decimal::ZERO,
            completed_item_count: 0,
        };

        for row in rows {
            summary.count += 1;
            summary.total_value += row.total;
            match row.status {
                MovementStatus::Draft => summary.draft_count += 1,
                MovementStatus::Cancelled => summary.cancelled_count += 1,
                MovementStatus::Completed => {
                    summary.completed_count += 1;
                    summary.completed_value += row.total;
                    summary.completed_item_count += row.item_count;
                }
            }
        }

        summary.average_value = Self::average(summary.total_value, summary.count);
        summary
    }

    /// Groups movements by business date, oldest first.
    #[must_use]
    pub fn daily(rows: &[MovementRow]) -> Vec<DailyMovement> {
        let mut days: BTreeMap<NaiveDate, (i64, Decimal)> = BTreeMap::new();
        for row in rows {
            let entry = days
                .entry(row.transaction_date)
                .or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += row.total;
        }

        days.into_iter()
            .map(|(date, (count, total_value))| DailyMovement {
                date,
                count,
                total_value,
            })
            .collect()
    }

    /// Folds per-family quantities into a product activity record.
    #[must_use]
    pub fn product_activity<I>(product_id: Uuid, quantities: I) -> ProductActivity
    where
        I: IntoIterator<Item = (Family, i64)>,
    {
        let mut activity = ProductActivity {
            product_id,
            stocked_in: 0,
            sold: 0,
            rejected: 0,
        };
        for (family, quantity) in quantities {
            match family {
                Family::StockIn => activity.stocked_in += quantity,
                Family::Sale => activity.sold += quantity,
                Family::Reject => activity.rejected += quantity,
            }
        }
        activity
    }

    fn average(total: Decimal, count: i64) -> Decimal {
        total
            .checked_div(Decimal::from(count))
            .map_or(Decimal::ZERO, |avg| avg.round_dp(4))
    }
}
