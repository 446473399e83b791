//! Receiving reconciliation.
//!
//! Receipt quantities are additive: each submitted value is added to the line's
//! running `received_quantity`. Submitting the same value twice books it twice.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    models::{PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus},
};

use super::{
    po_lifecycle::{self, PurchaseOrderAction, TransitionOutcome},
    po_totals,
};

/// Quantity received for one line in a receiving event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub item_id: Uuid,
    pub received_quantity: Decimal,
}

impl ReceiptLine {
    pub fn new(item_id: Uuid, received_quantity: Decimal) -> Self {
        Self {
            item_id,
            received_quantity,
        }
    }
}

/// Result of applying a receiving event to an order.
#[derive(Clone, Debug)]
pub struct ReceivingOutcome {
    pub order: PurchaseOrder,
    pub previous_status: PurchaseOrderStatus,
    pub received_total: Decimal,
}

/// Parses a received quantity from loosely-typed input.
///
/// Numbers and numeric strings parse as decimals; anything else (empty strings,
/// text, null, objects) counts as zero instead of failing.
pub fn parse_received_quantity(raw: &Value) -> Decimal {
    match raw {
        Value::Number(number) => parse_decimal_text(&number.to_string()),
        Value::String(text) => parse_decimal_text(text),
        _ => Decimal::ZERO,
    }
}

fn parse_decimal_text(text: &str) -> Decimal {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

/// Status after receiving, given the order's status before it.
///
/// RECEIVED when every line is covered, PARTIAL when anything has arrived,
/// otherwise the current status is kept.
pub fn derive_status(
    current: PurchaseOrderStatus,
    items: &[PurchaseOrderItem],
) -> PurchaseOrderStatus {
    if !items.is_empty() && items.iter().all(PurchaseOrderItem::is_fully_received) {
        PurchaseOrderStatus::Received
    } else if items.iter().any(PurchaseOrderItem::has_receipts) {
        PurchaseOrderStatus::Partial
    } else {
        current
    }
}

/// Applies a batch of receipt lines to a copy of `order`.
///
/// The batch is checked in full before anything is applied: an unknown item, a
/// negative quantity or an amount too large to represent rejects the whole batch
/// and `order` is left untouched.
pub fn reconcile(
    order: &PurchaseOrder,
    lines: &[ReceiptLine],
) -> Result<ReceivingOutcome, ServiceError> {
    match po_lifecycle::ensure_allowed(order, PurchaseOrderAction::Receive)? {
        TransitionOutcome::Reconcile => {}
        other => {
            return Err(ServiceError::InternalError(format!(
                "unexpected receive transition {:?}",
                other
            )))
        }
    }

    if lines.is_empty() {
        return Err(ServiceError::ValidationError(
            "A receiving event must contain at least one line".to_string(),
        ));
    }

    for line in lines {
        if !order.contains_item(line.item_id) {
            return Err(ServiceError::UnknownItem {
                order_id: order.id,
                item_id: line.item_id,
            });
        }
        if line.received_quantity < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Received quantity for item {} cannot be negative",
                line.item_id
            )));
        }
    }

    // applied to a copy; an overflowing line discards the copy with the whole batch
    let mut updated = order.clone();
    for line in lines {
        if let Some(item) = updated.items.iter_mut().find(|i| i.id == line.item_id) {
            item.received_quantity = item
                .received_quantity
                .checked_add(line.received_quantity)
                .ok_or_else(po_totals::amount_out_of_range)?;
        }
    }

    let next_status = derive_status(order.status, &updated.items);
    po_lifecycle::ensure_reconcile_edge(order.status, next_status)?;
    updated.status = next_status;

    let received_total = po_totals::received_total(&updated.items)?;

    Ok(ReceivingOutcome {
        order: updated,
        previous_status: order.status,
        received_total,
    })
}
