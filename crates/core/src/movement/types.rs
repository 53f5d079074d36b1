//! Domain types exchanged between the movement services and storage.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::family::Family;
use super::line::{LineInput, ResolvedLine};
use super::stock::StockDelta;
use super::status::MovementStatus;

/// Input for creating a movement of any family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMovementInput {
    /// Stock-in, sale, or reject.
    pub family: Family,
    /// Human-readable reference. Generated when absent.
    pub reference_no: Option<String>,
    /// Initial status, draft unless the caller finalizes immediately.
    #[serde(default = "default_status")]
    pub status: MovementStatus,
    /// Business date of the movement.
    pub transaction_date: NaiveDate,
    /// Free-form note.
    pub note: Option<String>,
    /// Customer (sales) or supplier (stock-ins).
    pub counterparty_id: Option<Uuid>,
    /// Line items.
    pub lines: Vec<LineInput>,
}

fn default_status() -> MovementStatus {
    MovementStatus::Draft
}

/// Header fields the services need to decide on a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementHeader {
    /// Movement ID.
    pub id: Uuid,
    /// Family.
    pub family: Family,
    /// Current status.
    pub status: MovementStatus,
    /// Current total.
    pub total: Decimal,
    /// Amount paid so far.
    pub paid: Decimal,
}

/// A persisted line item as seen by the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemState {
    /// Item ID.
    pub id: Uuid,
    /// Product moved.
    pub product_id: Uuid,
    /// Quantity currently applied to stock.
    pub quantity: i32,
    /// Unit price or cost.
    pub unit_value: Decimal,
    /// Line tax.
    pub tax: Decimal,
    /// Line discount.
    pub discount: Decimal,
    /// Soft-deleted items no longer count.
    pub deleted: bool,
}

/// New values for an existing item. Tax and discount keep their current
/// value when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    /// New quantity.
    pub quantity: i32,
    /// New unit price or cost.
    pub unit_value: Decimal,
    /// New tax.
    pub tax: Option<Decimal>,
    /// New discount.
    pub discount: Option<Decimal>,
}

/// Outcome of planning an item update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRevision {
    /// Quantity to store.
    pub quantity: i32,
    /// Unit value to store.
    pub unit_value: Decimal,
    /// Tax to store.
    pub tax: Decimal,
    /// Discount to store.
    pub discount: Decimal,
    /// Subtotal to store.
    pub subtotal: Decimal,
    /// Stock change for the quantity difference; `None` when unchanged.
    pub stock_delta: Option<StockDelta>,
}

/// Outcome of planning a movement creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementPlan {
    /// Lines to persist, in input order.
    pub lines: Vec<ResolvedLine>,
    /// Stock changes merged per product, ordered by product id.
    pub deltas: Vec<StockDelta>,
    /// Sum of line subtotals.
    pub total: Decimal,
}

/// Paid and balance figures to store on a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Status to store.
    pub status: MovementStatus,
    /// Amount paid.
    pub paid: Decimal,
    /// `total - paid`.
    pub balance: Decimal,
}
