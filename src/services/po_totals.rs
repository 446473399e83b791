//! Ordered vs received value of purchase order lines.
//!
//! All sums are exact decimal arithmetic. Rounding to cents happens only in
//! [`round_for_display`], never between aggregation steps.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{errors::ServiceError, models::PurchaseOrderItem};

/// Error for sums and products that leave the range `Decimal` can hold.
pub fn amount_out_of_range() -> ServiceError {
    ServiceError::ValidationError("amount out of range".to_string())
}

fn sum(mut values: impl Iterator<Item = Result<Decimal, ServiceError>>) -> Result<Decimal, ServiceError> {
    values.try_fold(Decimal::ZERO, |total, value| {
        total.checked_add(value?).ok_or_else(amount_out_of_range)
    })
}

/// Face value of the order: `Σ qty × unit_price`. Tax is not part of the face value.
pub fn ordered_total(items: &[PurchaseOrderItem]) -> Result<Decimal, ServiceError> {
    sum(items.iter().map(|item| {
        item.qty
            .checked_mul(item.unit_price)
            .ok_or_else(amount_out_of_range)
    }))
}

/// Value received on a single line.
///
/// Tax is a flat per-line amount, added in full once the line has received anything
/// and not prorated by the received fraction. A line with nothing received is worth zero.
pub fn line_received_value(item: &PurchaseOrderItem) -> Result<Decimal, ServiceError> {
    if !item.has_receipts() {
        return Ok(Decimal::ZERO);
    }
    item.received_quantity
        .checked_mul(item.unit_price)
        .and_then(|value| value.checked_add(item.tax))
        .ok_or_else(amount_out_of_range)
}

/// Value of goods received to date: `Σ (received_quantity × unit_price + tax)` over received lines.
pub fn received_total(items: &[PurchaseOrderItem]) -> Result<Decimal, ServiceError> {
    sum(items.iter().map(line_received_value))
}

/// Rounds a monetary amount to two fractional digits for presentation.
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
