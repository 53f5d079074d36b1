//! Movement error types.
//!
//! Every error here is raised before any durable write, or causes the
//! surrounding unit of work to roll back. None of them is retried
//! automatically.

use rust_decimal::Decimal;
use stockledger_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use super::family::Family;
use super::status::MovementStatus;

/// Errors that can occur during movement operations.
#[derive(Debug, Error)]
pub enum MovementError {
    // ========== Lookup Errors ==========
    /// Product does not exist or is deleted.
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    /// Movement does not exist or is deleted.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// Line item does not exist.
    #[error("Line item not found: {0}")]
    ItemNotFound(Uuid),

    /// Customer or supplier does not exist.
    #[error("Counterparty not found: {0}")]
    CounterpartyNotFound(Uuid),

    // ========== Stock Errors ==========
    /// Applying the line would drive stock below zero.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        /// The product whose stock is short.
        product_id: Uuid,
        /// Stock on hand when the check ran.
        available: i32,
        /// Quantity the operation tried to remove.
        requested: i64,
    },

    // ========== State Errors ==========
    /// Mutation attempted on a movement whose status forbids it.
    #[error("Transaction {movement_id} is {status} and cannot be modified")]
    TransactionLocked {
        /// The locked movement.
        movement_id: Uuid,
        /// Its current status.
        status: MovementStatus,
    },

    /// Status transition not allowed.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: MovementStatus,
        /// The attempted target status.
        to: MovementStatus,
    },

    /// Reference number already used within the family.
    #[error("Reference number already exists: {0}")]
    DuplicateReference(String),

    // ========== Validation Errors ==========
    /// Line quantity must be positive.
    #[error("Quantity must be greater than zero, got {0}")]
    InvalidQuantity(i32),

    /// A monetary field was negative.
    #[error("{field} cannot be negative")]
    InvalidAmount {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A monetary field has more decimal places than a money column keeps.
    #[error("{field} has more than 4 decimal places")]
    AmountPrecision {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A monetary value does not fit a money column.
    #[error("{field} exceeds the supported amount range")]
    AmountOverflow {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The merged stock change for one product does not fit a stock column.
    #[error("Stock change for product {0} exceeds the supported range")]
    StockOverflow(Uuid),

    /// Discount exceeds the line value.
    #[error("Line subtotal cannot be negative")]
    NegativeSubtotal,

    /// Tax or discount given for a family whose subtotal excludes them.
    #[error("Tax and discount do not apply to {0} lines")]
    ChargesNotApplicable(Family),

    /// A counterparty was given for a family that has none.
    #[error("{0} transactions do not carry a counterparty")]
    CounterpartyNotAllowed(Family),

    /// Payment recorded against a family that does not take payments.
    #[error("{0} transactions do not accept payments")]
    PaymentsNotSupported(Family),

    /// Payment larger than the outstanding balance.
    #[error("Payment {amount} exceeds outstanding balance {outstanding}")]
    Overpayment {
        /// Balance still owed.
        outstanding: Decimal,
        /// Amount offered.
        amount: Decimal,
    },

    // ========== Internal Errors ==========
    /// Stored total disagrees with the sum of surviving line items.
    #[error("Total mismatch for transaction {movement_id}: stored {stored}, recomputed {recomputed}")]
    ConsistencyViolation {
        /// The movement whose aggregate is wrong.
        movement_id: Uuid,
        /// Total held on the header.
        stored: Decimal,
        /// Sum of surviving subtotals.
        recomputed: Decimal,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MovementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::CounterpartyNotFound(_) => "COUNTERPARTY_NOT_FOUND",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::TransactionLocked { .. } => "TRANSACTION_LOCKED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::DuplicateReference(_) => "DUPLICATE_REFERENCE",
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::AmountPrecision { .. } => "AMOUNT_PRECISION",
            Self::AmountOverflow { .. } => "AMOUNT_OVERFLOW",
            Self::StockOverflow(_) => "STOCK_OVERFLOW",
            Self::NegativeSubtotal => "NEGATIVE_SUBTOTAL",
            Self::ChargesNotApplicable(_) => "CHARGES_NOT_APPLICABLE",
            Self::CounterpartyNotAllowed(_) => "COUNTERPARTY_NOT_ALLOWED",
            Self::PaymentsNotSupported(_) => "PAYMENTS_NOT_SUPPORTED",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::ConsistencyViolation { .. } => "CONSISTENCY_VIOLATION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InvalidQuantity(_)
            | Self::InvalidAmount { .. }
            | Self::AmountPrecision { .. }
            | Self::AmountOverflow { .. }
            | Self::StockOverflow(_)
            | Self::NegativeSubtotal
            | Self::ChargesNotApplicable(_)
            | Self::CounterpartyNotAllowed(_)
            | Self::PaymentsNotSupported(_) => 400,

            // 404 Not Found
            Self::ProductNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::ItemNotFound(_)
            | Self::CounterpartyNotFound(_) => 404,

            // 409 Conflict - state errors
            Self::TransactionLocked { .. }
            | Self::InvalidTransition { .. }
            | Self::DuplicateReference(_) => 409,

            // 422 Unprocessable - stock and balance rules
            Self::InsufficientStock { .. } | Self::Overpayment { .. } => 422,

            // 500 Internal Server Error
            Self::ConsistencyViolation { .. } | Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if the whole operation may be resubmitted unchanged.
    ///
    /// Only store failures qualify: the unit of work rolled back and the
    /// preconditions are re-validated on the next attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

impl From<MovementError> for AppError {
    fn from(err: MovementError) -> Self {
        let message = err.to_string();
        match err.http_status_code() {
            400 => Self::Validation(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            422 => Self::BusinessRule(message),
            _ => match err {
                MovementError::Database(_) => Self::Database(message),
                _ => Self::Internal(message),
            },
        }
    }
}
