//! Transaction families and their per-family rules.
//!
//! Stock-ins, sales and rejects share one engine. Everything that differs
//! between them (delta sign, subtotal formula, counterparty, settlement,
//! delete lock, status vocabulary) is answered here.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::status::MovementStatus;

/// The three kinds of stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Goods received from a supplier.
    StockIn,
    /// Goods dispatched against a customer order.
    Sale,
    /// Goods written off.
    Reject,
}

/// Which counterparty table a family's header points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterpartyKind {
    /// `customers`, used by sales.
    Customer,
    /// `suppliers`, used by stock-ins.
    Supplier,
}

impl Family {
    /// All families, in display order.
    pub const ALL: [Self; 3] = [Self::StockIn, Self::Sale, Self::Reject];

    /// Returns the string representation of the family.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StockIn => "stock_in",
            Self::Sale => "sale",
            Self::Reject => "reject",
        }
    }

    /// Parses a family name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "stock_in" | "stockin" => Some(Self::StockIn),
            "sale" | "sales" => Some(Self::Sale),
            "reject" | "rejects" => Some(Self::Reject),
            _ => None,
        }
    }

    /// Sign applied to a line quantity when it is persisted.
    #[must_use]
    pub const fn stock_sign(self) -> i32 {
        match self {
            Self::StockIn => 1,
            Self::Sale | Self::Reject => -1,
        }
    }

    /// Prefix of generated reference numbers.
    #[must_use]
    pub const fn reference_prefix(self) -> &'static str {
        match self {
            Self::StockIn => "SI",
            Self::Sale => "SALE",
            Self::Reject => "REJ",
        }
    }

    /// Counterparty carried by the header, if any.
    #[must_use]
    pub const fn counterparty(self) -> Option<CounterpartyKind> {
        match self {
            Self::StockIn => Some(CounterpartyKind::Supplier),
            Self::Sale => Some(CounterpartyKind::Customer),
            Self::Reject => None,
        }
    }

    /// Whether line subtotals include tax and discount.
    #[must_use]
    pub const fn charges_tax_and_discount(self) -> bool {
        matches!(self, Self::Sale)
    }

    /// Whether completing the movement settles it (`paid = total`).
    #[must_use]
    pub const fn settles_on_completion(self) -> bool {
        matches!(self, Self::Sale)
    }

    /// Whether payments can be recorded against the movement.
    #[must_use]
    pub const fn accepts_payments(self) -> bool {
        matches!(self, Self::Sale)
    }

    /// Whether a movement in `status` may be deleted.
    ///
    /// A completed reject is a final write-off and stays.
    #[must_use]
    pub fn allows_delete(self, status: MovementStatus) -> bool {
        !(self == Self::Reject && status == MovementStatus::Completed)
    }

    /// Status label in this family's vocabulary.
    #[must_use]
    pub fn status_label(self, status: MovementStatus) -> &'static str {
        match (self, status) {
            (Self::Reject, MovementStatus::Draft) => "pending",
            _ => status.as_str(),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
