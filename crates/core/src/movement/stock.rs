//! Stock deltas and the sufficiency policy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stockledger_shared::LedgerConfig;
use uuid::Uuid;

use super::error::MovementError;
use super::family::Family;

/// Signed change to one product's stock counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDelta {
    /// The product whose counter moves.
    pub product_id: Uuid,
    /// Positive adds stock, negative removes it.
    pub delta: i32,
}

impl StockDelta {
    /// Creates a delta.
    #[must_use]
    pub const fn new(product_id: Uuid, delta: i32) -> Self {
        Self { product_id, delta }
    }

    /// The delta that undoes this one.
    ///
    /// # Errors
    ///
    /// Returns `StockOverflow` for `i32::MIN`, which has no positive
    /// counterpart.
    pub fn reversed(self) -> Result<Self, MovementError> {
        let delta = self
            .delta
            .checked_neg()
            .ok_or(MovementError::StockOverflow(self.product_id))?;
        Ok(Self::new(self.product_id, delta))
    }

    /// Returns true if the delta removes stock.
    #[must_use]
    pub const fn is_decrease(&self) -> bool {
        self.delta < 0
    }

    /// Quantity removed by this delta, zero for increases.
    #[must_use]
    pub fn requested(&self) -> i64 {
        if self.delta < 0 { -i64::from(self.delta) } else { 0 }
    }
}

/// Combines deltas per product, drops the ones that cancel out, and
/// returns them ordered by product id.
///
/// Writers always touch product rows in the same order, so two units of
/// work over overlapping products cannot deadlock each other.
///
/// # Errors
///
/// Returns `StockOverflow` if a product's combined change falls outside
/// `-i32::MAX..=i32::MAX`.
pub fn merge_deltas<I>(deltas: I) -> Result<Vec<StockDelta>, MovementError>
where
    I: IntoIterator<Item = StockDelta>,
{
    let mut merged: BTreeMap<Uuid, i64> = BTreeMap::new();
    for d in deltas {
        *merged.entry(d.product_id).or_insert(0) += i64::from(d.delta);
    }

    merged
        .into_iter()
        .filter(|(_, delta)| *delta != 0)
        .map(|(product_id, delta)| {
            i32::try_from(delta)
                .ok()
                .filter(|d| *d != i32::MIN)
                .map(|d| StockDelta::new(product_id, d))
                .ok_or(MovementError::StockOverflow(product_id))
        })
        .collect()
}

/// Decides which decreases must be refused when stock would go negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockPolicy {
    /// Guard sale lines.
    pub enforce_on_sale: bool,
    /// Guard stock-in reversals.
    pub enforce_on_stock_in_reversal: bool,
}

impl StockPolicy {
    /// Every decrease is guarded.
    pub const STRICT: Self = Self {
        enforce_on_sale: true,
        enforce_on_stock_in_reversal: true,
    };

    /// Returns true if `delta` applied on behalf of `family` must not drive
    /// stock below zero. Increases are never guarded.
    #[must_use]
    pub fn guards(&self, family: Family, delta: &StockDelta) -> bool {
        if !delta.is_decrease() {
            return false;
        }
        match family {
            Family::Reject => true,
            Family::Sale => self.enforce_on_sale,
            Family::StockIn => self.enforce_on_stock_in_reversal,
        }
    }
}

impl Default for StockPolicy {
    fn default() -> Self {
        Self::STRICT
    }
}

impl From<&LedgerConfig> for StockPolicy {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            enforce_on_sale: config.enforce_stock_on_sale,
            enforce_on_stock_in_reversal: config.enforce_stock_on_stock_in_reversal,
        }
    }
}

/// Checks that `available` can absorb `delta`.
///
/// # Errors
///
/// Returns `InsufficientStock` if the result would be negative.
pub fn check_sufficiency(available: i32, delta: &StockDelta) -> Result<(), MovementError> {
    if i64::from(available) + i64::from(delta.delta) < 0 {
        return Err(MovementError::InsufficientStock {
            product_id: delta.product_id,
            available,
            requested: delta.requested(),
        });
    }
    Ok(())
}
