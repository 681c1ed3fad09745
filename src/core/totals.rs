use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::error::{EstimateError, ValidationError};
use super::types::{Estimate, LineItem, Totals};

/// Decimal places of every monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Compute the derived amounts for a set of line items.
///
/// Rounding is half-up to cents and happens at every stage: each line
/// total is rounded, the subtotal is the sum of the rounded lines, and the
/// discount and tax amounts are rounded before they are combined. Displayed
/// line totals therefore always add up to the displayed subtotal.
///
/// Pure: the same inputs always produce the same `Totals`, including the
/// scale of every amount.
///
/// ```
/// use offerta::core::*;
/// use rust_decimal_macros::dec;
///
/// let items = vec![LineItemBuilder::new("Drywall", dec!(2), dec!(50)).build()];
/// let totals = recompute(&items, dec!(10), dec!(8.5)).unwrap();
/// assert_eq!(totals.subtotal, dec!(100.00));
/// assert_eq!(totals.discount_amount, dec!(10.00));
/// assert_eq!(totals.tax_amount, dec!(7.65));
/// assert_eq!(totals.total, dec!(97.65));
/// ```
pub fn recompute(
    line_items: &[LineItem],
    discount_percent: Decimal,
    tax_percent: Decimal,
) -> Result<Totals, EstimateError> {
    check_percentage("discount_percent", discount_percent)?;
    check_percentage("tax_percent", tax_percent)?;

    let mut line_totals = Vec::with_capacity(line_items.len());
    let mut subtotal = money(Decimal::ZERO);
    for (index, item) in line_items.iter().enumerate() {
        if item.quantity < Decimal::ZERO || item.unit_price < Decimal::ZERO {
            return Err(EstimateError::InvalidQuantityOrPrice { index });
        }
        let line_total = line_total(item.quantity, item.unit_price)?;
        subtotal = subtotal
            .checked_add(line_total)
            .ok_or_else(|| out_of_range("subtotal"))?;
        line_totals.push(line_total);
    }

    let discount_amount = percent_of(subtotal, discount_percent, "discount_amount")?;
    let taxable_amount = subtotal - discount_amount;
    let tax_amount = percent_of(taxable_amount, tax_percent, "tax_amount")?;
    let total = taxable_amount
        .checked_add(tax_amount)
        .ok_or_else(|| out_of_range("total"))?;

    Ok(Totals {
        line_totals,
        subtotal,
        discount_amount,
        taxable_amount,
        tax_amount,
        total,
    })
}

/// `round(quantity * unit_price, 2)`. Sign checks happen in `recompute`,
/// which knows the line index.
fn line_total(quantity: Decimal, unit_price: Decimal) -> Result<Decimal, EstimateError> {
    let product = quantity
        .checked_mul(unit_price)
        .ok_or_else(|| out_of_range("line total"))?;
    Ok(money(product))
}

/// Recompute and store the derived amounts of an estimate in place.
/// On error the estimate is left untouched.
pub fn calculate_totals(estimate: &mut Estimate) -> Result<(), EstimateError> {
    let totals = recompute(
        &estimate.line_items,
        estimate.discount_percent,
        estimate.tax_percent,
    )?;
    apply_totals(estimate, totals);
    Ok(())
}

pub(crate) fn apply_totals(estimate: &mut Estimate, totals: Totals) {
    for (item, line_total) in estimate.line_items.iter_mut().zip(totals.line_totals) {
        item.total = line_total;
    }
    estimate.subtotal = totals.subtotal;
    estimate.discount_amount = totals.discount_amount;
    estimate.taxable_amount = totals.taxable_amount;
    estimate.tax_amount = totals.tax_amount;
    estimate.total = totals.total;
}

/// Check every derived amount of an estimate against its inputs.
/// Returns all mismatches found (not just the first).
pub fn validate_arithmetic(estimate: &Estimate) -> Vec<ValidationError> {
    let expected = match recompute(
        &estimate.line_items,
        estimate.discount_percent,
        estimate.tax_percent,
    ) {
        Ok(totals) => totals,
        Err(e) => return vec![ValidationError::new("line_items", e.to_string())],
    };

    let mut errors = Vec::new();
    for (i, (item, want)) in estimate
        .line_items
        .iter()
        .zip(&expected.line_totals)
        .enumerate()
    {
        if item.total != *want {
            errors.push(ValidationError::new(
                format!("line_items[{i}].total"),
                format!("line total {} does not match quantity × price {}", item.total, want),
            ));
        }
    }

    let fields = [
        ("subtotal", estimate.subtotal, expected.subtotal),
        ("discount_amount", estimate.discount_amount, expected.discount_amount),
        ("taxable_amount", estimate.taxable_amount, expected.taxable_amount),
        ("tax_amount", estimate.tax_amount, expected.tax_amount),
        ("total", estimate.total, expected.total),
    ];
    for (field, stored, want) in fields {
        if stored != want {
            errors.push(ValidationError::new(
                field,
                format!("{field} {stored} does not match computed {want}"),
            ));
        }
    }

    errors
}

/// Round to cents using half-up (commercial rounding) at a fixed scale.
pub fn money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

pub(crate) fn check_percentage(field: &'static str, value: Decimal) -> Result<(), EstimateError> {
    if value < Decimal::ZERO || value > dec!(100) {
        return Err(EstimateError::InvalidPercentage { field, value });
    }
    Ok(())
}

fn percent_of(base: Decimal, percent: Decimal, field: &str) -> Result<Decimal, EstimateError> {
    let scaled = base
        .checked_mul(percent)
        .ok_or_else(|| out_of_range(field))?;
    Ok(money(scaled / dec!(100)))
}

fn out_of_range(field: &str) -> EstimateError {
    EstimateError::Validation(format!("{field} exceeds the representable amount range"))
}
