//! Inventory movement ledger.
//!
//! This module keeps per-product stock, line-item subtotals and movement
//! totals consistent across the three movement families:
//! - Families and their per-family rules
//! - Statuses and transitions, with sale settlement and payments
//! - Line resolution and subtotal derivation
//! - Stock deltas and the sufficiency policy
//! - Planning of every item mutation
//! - Reference numbers and summaries

pub mod error;
pub mod family;
pub mod line;
pub mod reference;
pub mod service;
pub mod status;
pub mod stock;
pub mod summary;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod fixture;
#[cfg(test)]
mod service_props;
#[cfg(test)]
mod tests;

pub use error::MovementError;
pub use family::{CounterpartyKind, Family};
pub use line::{
    LineInput, MONEY_LIMIT, MONEY_SCALE, ProductSnapshot, ResolvedLine, ensure_money,
    line_subtotal, validate_line_values,
};
pub use reference::{generate_reference, normalize_reference};
pub use service::MovementService;
pub use status::MovementStatus;
pub use stock::{StockDelta, StockPolicy, check_sufficiency, merge_deltas};
pub use summary::{DailyMovement, MovementRow, MovementSummary, ProductActivity, SummaryService};
pub use types::{
    CreateMovementInput, ItemRevision, ItemState, ItemUpdate, MovementHeader, MovementPlan,
    Settlement,
};
pub use workflow::WorkflowService;
