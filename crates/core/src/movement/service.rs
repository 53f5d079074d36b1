//! Movement service: plans the effects of every line-item mutation.
//!
//! Nothing here touches storage. Each planning function takes the current
//! state plus a product lookup and returns what must be written: resolved
//! lines, subtotals, and the stock deltas to hand to the stock register.
//! Sufficiency checks performed here run against a snapshot and are
//! advisory; the register re-checks under the row lock.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::MovementError;
use super::family::Family;
use super::line::{
    LineInput, ProductSnapshot, ResolvedLine, ensure_money, line_subtotal, validate_line_values,
};
use super::stock::{StockDelta, StockPolicy, check_sufficiency, merge_deltas};
use super::types::{
    CreateMovementInput, ItemRevision, ItemState, ItemUpdate, MovementHeader, MovementPlan,
};

/// Movement service for line resolution and stock planning.
///
/// This service contains pure business logic with no database dependencies.
pub struct MovementService;

impl MovementService {
    /// Plans a new movement with its lines.
    ///
    /// 1. Validates the counterparty against the family
    /// 2. Resolves each line (product exists, values valid, subtotal derived)
    /// 3. Merges per-product stock deltas
    /// 4. Pre-checks sufficiency for guarded decreases
    /// 5. Sums subtotals into the total
    ///
    /// # Errors
    ///
    /// Returns `MovementError` if any line fails validation, a product is
    /// missing, a guarded decrease exceeds the snapshot stock, or the
    /// merged stock change or total is out of range.
    pub fn plan_create<F>(
        input: &CreateMovementInput,
        policy: &StockPolicy,
        product_lookup: F,
    ) -> Result<MovementPlan, MovementError>
    where
        F: Fn(Uuid) -> Option<ProductSnapshot>,
    {
        let family = input.family;
        Self::validate_counterparty(family, input.counterparty_id)?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            lines.push(Self::resolve_line(family, line, &product_lookup)?);
        }

        let deltas = merge_deltas(lines.iter().map(|l| l.stock_delta(family)))?;
        Self::precheck(family, policy, &deltas, &product_lookup)?;

        let total = Self::sum_subtotals(lines.iter().map(|l| l.subtotal))?;

        Ok(MovementPlan {
            lines,
            deltas,
            total,
        })
    }

    /// Rejects a counterparty on families that have none.
    ///
    /// # Errors
    ///
    /// Returns `CounterpartyNotAllowed` for a reject with a counterparty.
    pub fn validate_counterparty(
        family: Family,
        counterparty_id: Option<Uuid>,
    ) -> Result<(), MovementError> {
        if family.counterparty().is_none() && counterparty_id.is_some() {
            return Err(MovementError::CounterpartyNotAllowed(family));
        }
        Ok(())
    }

    /// Resolves one line: validates values, looks up the product, and
    /// derives the subtotal.
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` or a validation error.
    pub fn resolve_line<F>(
        family: Family,
        line: &LineInput,
        product_lookup: &F,
    ) -> Result<ResolvedLine, MovementError>
    where
        F: Fn(Uuid) -> Option<ProductSnapshot>,
    {
        validate_line_values(family, line.quantity, line.unit_value, line.tax, line.discount)?;

        let product = product_lookup(line.product_id)
            .ok_or(MovementError::ProductNotFound(line.product_id))?;

        let subtotal = line_subtotal(
            family,
            line.quantity,
            line.unit_value,
            line.tax,
            line.discount,
        )?;

        Ok(ResolvedLine {
            product_id: product.id,
            product_name: product.name,
            quantity: line.quantity,
            unit_value: line.unit_value,
            tax: line.tax,
            discount: line.discount,
            subtotal,
        })
    }

    /// Plans adding a line to an existing movement.
    ///
    /// # Errors
    ///
    /// Returns `TransactionLocked` if the movement is terminal, otherwise
    /// the same errors as [`Self::resolve_line`] plus `InsufficientStock`.
    pub fn plan_add_item<F>(
        header: &MovementHeader,
        policy: &StockPolicy,
        line: &LineInput,
        product_lookup: F,
    ) -> Result<(ResolvedLine, StockDelta), MovementError>
    where
        F: Fn(Uuid) -> Option<ProductSnapshot>,
    {
        Self::ensure_items_editable(header)?;

        let resolved = Self::resolve_line(header.family, line, &product_lookup)?;
        Self::ensure_total_fits(header.total, Decimal::ZERO, resolved.subtotal)?;
        let delta = resolved.stock_delta(header.family);
        Self::precheck(header.family, policy, &[delta], &product_lookup)?;

        Ok((resolved, delta))
    }

    /// Plans an item update. Only the quantity difference reaches stock.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` for a deleted item, `TransactionLocked` if the
    /// movement is terminal, a validation error, or `InsufficientStock`.
    pub fn plan_item_update<F>(
        header: &MovementHeader,
        policy: &StockPolicy,
        item: &ItemState,
        update: &ItemUpdate,
        product_lookup: F,
    ) -> Result<ItemRevision, MovementError>
    where
        F: Fn(Uuid) -> Option<ProductSnapshot>,
    {
        if item.deleted {
            return Err(MovementError::ItemNotFound(item.id));
        }
        Self::ensure_items_editable(header)?;

        let family = header.family;
        let tax = update.tax.unwrap_or(item.tax);
        let discount = update.discount.unwrap_or(item.discount);

        validate_line_values(family, update.quantity, update.unit_value, tax, discount)?;
        let subtotal = line_subtotal(family, update.quantity, update.unit_value, tax, discount)?;
        let previous = line_subtotal(family, item.quantity, item.unit_value, item.tax, item.discount)?;
        Self::ensure_total_fits(header.total, previous, subtotal)?;

        let diff = update.quantity - item.quantity;
        let stock_delta =
            (diff != 0).then(|| StockDelta::new(item.product_id, family.stock_sign() * diff));

        if let Some(delta) = stock_delta {
            Self::precheck(family, policy, &[delta], &product_lookup)?;
        }

        Ok(ItemRevision {
            quantity: update.quantity,
            unit_value: update.unit_value,
            tax,
            discount,
            subtotal,
            stock_delta,
        })
    }

    /// Plans a soft delete of one item.
    ///
    /// Returns `None` when the item is already deleted: deleting twice
    /// must not reverse stock twice.
    ///
    /// # Errors
    ///
    /// Returns `TransactionLocked` if the movement is terminal.
    pub fn plan_item_delete(
        header: &MovementHeader,
        item: &ItemState,
    ) -> Result<Option<StockDelta>, MovementError> {
        if item.deleted {
            return Ok(None);
        }
        Self::ensure_items_editable(header)?;

        Self::applied_delta(header.family, item).reversed().map(Some)
    }

    /// Plans deleting a whole movement: every surviving item is reversed.
    ///
    /// # Errors
    ///
    /// Returns `TransactionLocked` if the family forbids deleting a
    /// movement in its current status.
    pub fn plan_delete(
        header: &MovementHeader,
        items: &[ItemState],
    ) -> Result<Vec<StockDelta>, MovementError> {
        if !header.family.allows_delete(header.status) {
            return Err(MovementError::TransactionLocked {
                movement_id: header.id,
                status: header.status,
            });
        }

        let reversals = items
            .iter()
            .filter(|item| !item.deleted)
            .map(|item| Self::applied_delta(header.family, item).reversed())
            .collect::<Result<Vec<_>, _>>()?;
        merge_deltas(reversals)
    }

    /// Refuses line-item mutations on terminal movements.
    ///
    /// # Errors
    ///
    /// Returns `TransactionLocked` if the status is completed or cancelled.
    pub fn ensure_items_editable(header: &MovementHeader) -> Result<(), MovementError> {
        if header.status.is_editable() {
            Ok(())
        } else {
            Err(MovementError::TransactionLocked {
                movement_id: header.id,
                status: header.status,
            })
        }
    }

    /// Sums line subtotals.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if the total does not fit a money column.
    pub fn sum_subtotals<I>(subtotals: I) -> Result<Decimal, MovementError>
    where
        I: IntoIterator<Item = Decimal>,
    {
        let total = subtotals
            .into_iter()
            .try_fold(Decimal::ZERO, Decimal::checked_add)
            .ok_or(MovementError::AmountOverflow { field: "total" })?;
        ensure_money("total", total)?;
        Ok(total)
    }

    /// Compares a stored total with the sum of surviving subtotals.
    ///
    /// # Errors
    ///
    /// Returns `ConsistencyViolation` when they differ, or `AmountOverflow`
    /// if the surviving subtotals cannot be summed.
    pub fn verify_total<I>(
        movement_id: Uuid,
        stored: Decimal,
        subtotals: I,
    ) -> Result<Decimal, MovementError>
    where
        I: IntoIterator<Item = Decimal>,
    {
        let recomputed = Self::sum_subtotals(subtotals)?;
        if recomputed != stored {
            return Err(MovementError::ConsistencyViolation {
                movement_id,
                stored,
                recomputed,
            });
        }
        Ok(recomputed)
    }

    /// Checks that `total` with `removed` swapped for `added` still fits a
    /// money column.
    fn ensure_total_fits(
        total: Decimal,
        removed: Decimal,
        added: Decimal,
    ) -> Result<(), MovementError> {
        let projected = total
            .checked_sub(removed)
            .and_then(|t| t.checked_add(added))
            .ok_or(MovementError::AmountOverflow { field: "total" })?;
        ensure_money("total", projected)
    }

    /// The stock delta an item applied when it was written.
    fn applied_delta(family: Family, item: &ItemState) -> StockDelta {
        StockDelta::new(item.product_id, family.stock_sign() * item.quantity)
    }

    /// Advisory sufficiency check against snapshot stock.
    fn precheck<F>(
        family: Family,
        policy: &StockPolicy,
        deltas: &[StockDelta],
        product_lookup: &F,
    ) -> Result<(), MovementError>
    where
        F: Fn(Uuid) -> Option<ProductSnapshot>,
    {
        for delta in deltas.iter().filter(|d| policy.guards(family, d)) {
            let product = product_lookup(delta.product_id)
                .ok_or(MovementError::ProductNotFound(delta.product_id))?;
            check_sufficiency(product.stock, delta)?;
        }
        Ok(())
    }
}
