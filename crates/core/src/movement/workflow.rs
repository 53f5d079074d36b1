//! Status transitions and sale settlement.

use rust_decimal::Decimal;

use super::error::MovementError;
use super::family::Family;
use super::line::ensure_money;
use super::status::MovementStatus;
use super::types::{MovementHeader, Settlement};

/// Stateless service for status transitions and payments.
///
/// Transitions carry no stock effect: stock moves when items are written.
pub struct WorkflowService;

impl WorkflowService {
    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Draft → Completed
    /// - Draft → Cancelled
    #[must_use]
    pub fn is_valid_transition(from: MovementStatus, to: MovementStatus) -> bool {
        matches!(
            (from, to),
            (
                MovementStatus::Draft,
                MovementStatus::Completed | MovementStatus::Cancelled
            )
        )
    }

    /// Moves a header to `to` and returns the figures to store.
    ///
    /// Completing a sale settles it in full: `paid = total`, `balance = 0`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for anything but draft to a terminal
    /// status, including a transition to the current status.
    pub fn transition(
        header: &MovementHeader,
        to: MovementStatus,
    ) -> Result<Settlement, MovementError> {
        if !Self::is_valid_transition(header.status, to) {
            return Err(MovementError::InvalidTransition {
                from: header.status,
                to,
            });
        }

        Ok(Self::settle(header.family, to, header.total, header.paid))
    }

    /// Figures for a movement written directly with `status`.
    #[must_use]
    pub fn creation_settlement(family: Family, status: MovementStatus, total: Decimal) -> Settlement {
        Self::settle(family, status, total, Decimal::ZERO)
    }

    /// Balance after the total changed under an item mutation.
    #[must_use]
    pub fn balance_for(total: Decimal, paid: Decimal) -> Decimal {
        total - paid
    }

    /// Applies a payment to a sale.
    ///
    /// # Errors
    ///
    /// - `PaymentsNotSupported` for stock-ins and rejects
    /// - `InvalidAmount` for a non-positive amount
    /// - `AmountPrecision` or `AmountOverflow` for an unstorable amount
    /// - `TransactionLocked` for a cancelled sale
    /// - `Overpayment` when the amount exceeds the outstanding balance
    pub fn apply_payment(
        header: &MovementHeader,
        amount: Decimal,
    ) -> Result<Settlement, MovementError> {
        if !header.family.accepts_payments() {
            return Err(MovementError::PaymentsNotSupported(header.family));
        }
        if amount <= Decimal::ZERO {
            return Err(MovementError::InvalidAmount { field: "amount" });
        }
        ensure_money("amount", amount)?;
        if header.status == MovementStatus::Cancelled {
            return Err(MovementError::TransactionLocked {
                movement_id: header.id,
                status: header.status,
            });
        }

        let outstanding = Self::balance_for(header.total, header.paid);
        if amount > outstanding {
            return Err(MovementError::Overpayment {
                outstanding,
                amount,
            });
        }

        let paid = header.paid + amount;
        Ok(Settlement {
            status: header.status,
            paid,
            balance: Self::balance_for(header.total, paid),
        })
    }

    fn settle(family: Family, status: MovementStatus, total: Decimal, paid: Decimal) -> Settlement {
        let paid = if status == MovementStatus::Completed && family.settles_on_completion() {
            total
        } else {
            paid
        };

        Settlement {
            status,
            paid,
            balance: Self::balance_for(total, paid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn header(family: Family, status: MovementStatus, total: Decimal, paid: Decimal) -> MovementHeader {
        MovementHeader {
            id: Uuid::new_v4(),
            family,
            status,
            total,
            paid,
        }
    }

    #[rstest]
    #[case(MovementStatus::Draft, MovementStatus::Completed, true)]
    #[case(MovementStatus::Draft, MovementStatus::Cancelled, true)]
    #[case(MovementStatus::Draft, MovementStatus::Draft, false)]
    #[case(MovementStatus::Completed, MovementStatus::Cancelled, false)]
    #[case(MovementStatus::Completed, MovementStatus::Draft, false)]
    #[case(MovementStatus::Cancelled, MovementStatus::Completed, false)]
    #[case(MovementStatus::Completed, MovementStatus::Completed, false)]
    fn test_is_valid_transition(
        #[case] from: MovementStatus,
        #[case] to: MovementStatus,
        #[case] valid: bool,
    ) {
        assert_eq!(WorkflowService::is_valid_transition(from, to), valid);
    }

    #[test]
    fn test_completing_sale_settles_in_full() {
        let sale = header(Family::Sale, MovementStatus::Draft, dec!(48), dec!(10));
        let settlement = WorkflowService::transition(&sale, MovementStatus::Completed).unwrap();
        assert_eq!(settlement.paid, dec!(48));
        assert_eq!(settlement.balance, Decimal::ZERO);
        assert_eq!(settlement.status, MovementStatus::Completed);
    }

    #[test]
    fn test_cancelling_sale_keeps_paid() {
        let sale = header(Family::Sale, MovementStatus::Draft, dec!(48), dec!(10));
        let settlement = WorkflowService::transition(&sale, MovementStatus::Cancelled).unwrap();
        assert_eq!(settlement.paid, dec!(10));
        assert_eq!(settlement.balance, dec!(38));
    }

    #[test]
    fn test_completing_stock_in_does_not_settle() {
        let receipt = header(Family::StockIn, MovementStatus::Draft, dec!(50), Decimal::ZERO);
        let settlement = WorkflowService::transition(&receipt, MovementStatus::Completed).unwrap();
        assert_eq!(settlement.paid, Decimal::ZERO);
        assert_eq!(settlement.balance, dec!(50));
    }

    #[test]
    fn test_terminal_transition_is_rejected() {
        let sale = header(Family::Sale, MovementStatus::Completed, dec!(1), dec!(1));
        let err = WorkflowService::transition(&sale, MovementStatus::Cancelled).unwrap_err();
        assert!(matches!(
            err,
            MovementError::InvalidTransition {
                from: MovementStatus::Completed,
                to: MovementStatus::Cancelled,
            }
        ));
    }

    #[test]
    fn test_creation_settlement() {
        let s = WorkflowService::creation_settlement(Family::Sale, MovementStatus::Completed, dec!(32));
        assert_eq!((s.paid, s.balance), (dec!(32), Decimal::ZERO));

        let s = WorkflowService::creation_settlement(Family::Sale, MovementStatus::Draft, dec!(32));
        assert_eq!((s.paid, s.balance), (Decimal::ZERO, dec!(32)));
    }

    #[test]
    fn test_partial_payment() {
        let sale = header(Family::Sale, MovementStatus::Draft, dec!(100), dec!(30));
        let s = WorkflowService::apply_payment(&sale, dec!(50)).unwrap();
        assert_eq!(s.paid, dec!(80));
        assert_eq!(s.balance, dec!(20));
    }

    #[test]
    fn test_exact_payment_clears_balance() {
        let sale = header(Family::Sale, MovementStatus::Draft, dec!(100), dec!(30));
        let s = WorkflowService::apply_payment(&sale, dec!(70)).unwrap();
        assert_eq!(s.balance, Decimal::ZERO);
    }

    #[test]
    fn test_overpayment_is_rejected() {
        let sale = header(Family::Sale, MovementStatus::Draft, dec!(100), dec!(30));
        let err = WorkflowService::apply_payment(&sale, dec!(70.01)).unwrap_err();
        assert!(matches!(err, MovementError::Overpayment { .. }));
    }

    #[rstest]
    #[case(Family::StockIn)]
    #[case(Family::Reject)]
    fn test_payments_only_on_sales(#[case] family: Family) {
        let movement = header(family, MovementStatus::Draft, dec!(10), Decimal::ZERO);
        assert!(matches!(
            WorkflowService::apply_payment(&movement, dec!(1)),
            Err(MovementError::PaymentsNotSupported(f)) if f == family
        ));
    }

    #[test]
    fn test_payment_on_cancelled_sale_is_locked() {
        let sale = header(Family::Sale, MovementStatus::Cancelled, dec!(10), Decimal::ZERO);
        assert!(matches!(
            WorkflowService::apply_payment(&sale, dec!(1)),
            Err(MovementError::TransactionLocked { .. })
        ));
    }

    #[test]
    fn test_zero_payment_is_invalid() {
        let sale = header(Family::Sale, MovementStatus::Draft, dec!(10), Decimal::ZERO);
        assert!(matches!(
            WorkflowService::apply_payment(&sale, Decimal::ZERO),
            Err(MovementError::InvalidAmount { field: "amount" })
        ));
    }

    #[test]
    fn test_payment_with_sub_cent_fraction_is_refused() {
        let sale = header(Family::Sale, MovementStatus::Draft, dec!(10), Decimal::ZERO);
        assert!(matches!(
            WorkflowService::apply_payment(&sale, dec!(3.33333)),
            Err(MovementError::AmountPrecision { field: "amount" })
        ));
        let settlement = WorkflowService::apply_payment(&sale, dec!(3.3333)).unwrap();
        assert_eq!(settlement.balance, dec!(6.6667));
    }
}
