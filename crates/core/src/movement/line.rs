//! Line items: caller input, resolved form, and subtotal rules.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MovementError;
use super::family::Family;
use super::stock::StockDelta;

/// A line item as supplied by the caller.
///
/// There is no subtotal field: it is always derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    /// Product being moved.
    pub product_id: Uuid,
    /// Units moved, must be positive.
    pub quantity: i32,
    /// Unit price (sales) or unit cost (stock-ins, rejects).
    pub unit_value: Decimal,
    /// Line tax, sales only.
    #[serde(default)]
    pub tax: Decimal,
    /// Line discount, sales only.
    #[serde(default)]
    pub discount: Decimal,
}

impl LineInput {
    /// Creates a line without tax or discount.
    #[must_use]
    pub fn new(product_id: Uuid, quantity: i32, unit_value: Decimal) -> Self {
        Self {
            product_id,
            quantity,
            unit_value,
            tax: Decimal::ZERO,
            discount: Decimal::ZERO,
        }
    }

    /// Sets the line tax.
    #[must_use]
    pub fn with_tax(mut self, tax: Decimal) -> Self {
        self.tax = tax;
        self
    }

    /// Sets the line discount.
    #[must_use]
    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount = discount;
        self
    }
}

/// What the engine needs to know about a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    /// Product ID.
    pub id: Uuid,
    /// Name copied onto line items.
    pub name: String,
    /// Stock on hand when the snapshot was read.
    pub stock: i32,
}

/// A validated line ready to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLine {
    /// Product being moved.
    pub product_id: Uuid,
    /// Product name at the time of writing.
    pub product_name: String,
    /// Units moved.
    pub quantity: i32,
    /// Unit price or cost.
    pub unit_value: Decimal,
    /// Line tax.
    pub tax: Decimal,
    /// Line discount.
    pub discount: Decimal,
    /// Derived subtotal.
    pub subtotal: Decimal,
}

impl ResolvedLine {
    /// Stock effect of persisting this line.
    #[must_use]
    pub fn stock_delta(&self, family: Family) -> StockDelta {
        StockDelta::new(self.product_id, family.stock_sign() * self.quantity)
    }
}

/// Decimal places kept by every stored amount.
pub const MONEY_SCALE: u32 = 4;

/// Exclusive bound on the magnitude of a stored amount: `NUMERIC(19,4)`
/// leaves 15 integer digits.
pub const MONEY_LIMIT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Checks that `value` fits a money column without rounding.
///
/// # Errors
///
/// Returns `AmountPrecision` for more than [`MONEY_SCALE`] decimal places
/// and `AmountOverflow` when the magnitude reaches [`MONEY_LIMIT`].
pub fn ensure_money(field: &'static str, value: Decimal) -> Result<(), MovementError> {
    if value.normalize().scale() > MONEY_SCALE {
        return Err(MovementError::AmountPrecision { field });
    }
    if value.abs() >= MONEY_LIMIT {
        return Err(MovementError::AmountOverflow { field });
    }
    Ok(())
}

/// Checks the numeric fields of a line for `family`.
///
/// # Errors
///
/// Returns a validation error for a non-positive quantity, a negative or
/// unstorable amount, or tax/discount on a family that does not charge
/// them.
pub fn validate_line_values(
    family: Family,
    quantity: i32,
    unit_value: Decimal,
    tax: Decimal,
    discount: Decimal,
) -> Result<(), MovementError> {
    if quantity <= 0 {
        return Err(MovementError::InvalidQuantity(quantity));
    }
    for (field, value) in [("unit_value", unit_value), ("tax", tax), ("discount", discount)] {
        if value < Decimal::ZERO {
            return Err(MovementError::InvalidAmount { field });
        }
        ensure_money(field, value)?;
    }
    if !family.charges_tax_and_discount() && !(tax.is_zero() && discount.is_zero()) {
        return Err(MovementError::ChargesNotApplicable(family));
    }
    Ok(())
}

/// Computes a line subtotal.
///
/// Sales: `quantity * unit_value + tax - discount`.
/// Stock-ins and rejects: `quantity * unit_value`.
///
/// # Errors
///
/// Returns `NegativeSubtotal` if a discount exceeds the line value, and
/// `AmountOverflow` if the subtotal does not fit a money column.
pub fn line_subtotal(
    family: Family,
    quantity: i32,
    unit_value: Decimal,
    tax: Decimal,
    discount: Decimal,
) -> Result<Decimal, MovementError> {
    let base = unit_value.checked_mul(Decimal::from(quantity));
    let subtotal = if family.charges_tax_and_discount() {
        base.and_then(|v| v.checked_add(tax))
            .and_then(|v| v.checked_sub(discount))
    } else {
        base
    }
    .ok_or(MovementError::AmountOverflow { field: "subtotal" })?;

    if subtotal < Decimal::ZERO {
        return Err(MovementError::NegativeSubtotal);
    }
    ensure_money("subtotal", subtotal)?;
    Ok(subtotal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(Family::StockIn, 10, dec!(5), dec!(0), dec!(0), dec!(50))]
    #[case(Family::Sale, 4, dec!(8), dec!(0), dec!(0), dec!(32))]
    #[case(Family::Sale, 2, dec!(10.50), dec!(1.25), dec!(3), dec!(19.25))]
    #[case(Family::Reject, 3, dec!(2.10), dec!(0), dec!(0), dec!(6.30))]
    fn test_line_subtotal(
        #[case] family: Family,
        #[case] quantity: i32,
        #[case] unit_value: Decimal,
        #[case] tax: Decimal,
        #[case] discount: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(
            line_subtotal(family, quantity, unit_value, tax, discount).unwrap(),
            expected
        );
    }

    #[test]
    fn test_discount_cannot_exceed_line_value() {
        let result = line_subtotal(Family::Sale, 1, dec!(5), dec!(0), dec!(6));
        assert!(matches!(result, Err(MovementError::NegativeSubtotal)));
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let result = validate_line_values(Family::Sale, 0, dec!(1), dec!(0), dec!(0));
        assert!(matches!(result, Err(MovementError::InvalidQuantity(0))));
    }

    #[test]
    fn test_validate_rejects_negative_unit_value() {
        let result = validate_line_values(Family::StockIn, 1, dec!(-1), dec!(0), dec!(0));
        assert!(matches!(
            result,
            Err(MovementError::InvalidAmount { field: "unit_value" })
        ));
    }

    #[test]
    fn test_validate_allows_free_items() {
        assert!(validate_line_values(Family::StockIn, 1, dec!(0), dec!(0), dec!(0)).is_ok());
    }

    #[test]
    fn test_tax_only_on_sales() {
        assert!(validate_line_values(Family::Sale, 1, dec!(1), dec!(0.1), dec!(0)).is_ok());
        assert!(matches!(
            validate_line_values(Family::Reject, 1, dec!(1), dec!(0.1), dec!(0)),
            Err(MovementError::ChargesNotApplicable(Family::Reject))
        ));
        assert!(matches!(
            validate_line_values(Family::StockIn, 1, dec!(1), dec!(0), dec!(2)),
            Err(MovementError::ChargesNotApplicable(Family::StockIn))
        ));
    }

    #[test]
    fn test_money_limit_is_fifteen_integer_digits() {
        assert_eq!(MONEY_LIMIT, dec!(1000000000000000));
    }

    #[test]
    fn test_huge_unit_value_is_an_error_not_a_panic() {
        let result = line_subtotal(Family::StockIn, 2, Decimal::MAX, dec!(0), dec!(0));
        assert!(matches!(
            result,
            Err(MovementError::AmountOverflow { field: "subtotal" })
        ));

        let result = line_subtotal(Family::Sale, 1, Decimal::MAX, Decimal::MAX, dec!(0));
        assert!(matches!(result, Err(MovementError::AmountOverflow { .. })));
    }

    #[test]
    fn test_subtotal_beyond_column_range_rejected() {
        let result = line_subtotal(Family::Sale, 1_000, dec!(1000000000000), dec!(0), dec!(0));
        assert!(matches!(
            result,
            Err(MovementError::AmountOverflow { field: "subtotal" })
        ));
    }

    #[rstest]
    #[case(dec!(0.33333), "unit_value")]
    #[case(dec!(1000000000000000), "unit_value")]
    fn test_validate_rejects_unstorable_unit_value(#[case] unit_value: Decimal, #[case] field: &str) {
        let err = validate_line_values(Family::StockIn, 3, unit_value, dec!(0), dec!(0)).unwrap_err();
        match err {
            MovementError::AmountPrecision { field: f } | MovementError::AmountOverflow { field: f } => {
                assert_eq!(f, field);
            }
            other => panic!("Expected a money error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_checks_tax_precision() {
        assert!(matches!(
            validate_line_values(Family::Sale, 1, dec!(1), dec!(0.00001), dec!(0)),
            Err(MovementError::AmountPrecision { field: "tax" })
        ));
    }

    #[test]
    fn test_trailing_zeros_do_not_count_as_precision() {
        assert!(validate_line_values(Family::StockIn, 3, dec!(0.333300), dec!(0), dec!(0)).is_ok());
        assert_eq!(
            line_subtotal(Family::StockIn, 3, dec!(0.3333), dec!(0), dec!(0)).unwrap(),
            dec!(0.9999)
        );
    }

    #[test]
    fn test_stock_delta_sign() {
        let line = ResolvedLine {
            product_id: Uuid::nil(),
            product_name: "Widget".into(),
            quantity: 4,
            unit_value: dec!(8),
            tax: Decimal::ZERO,
            discount: Decimal::ZERO,
            subtotal: dec!(32),
        };
        assert_eq!(line.stock_delta(Family::Sale).delta, -4);
        assert_eq!(line.stock_delta(Family::StockIn).delta, 4);
    }
}
