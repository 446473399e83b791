use crate::{
    errors::ServiceError,
    models::{PurchaseOrder, PurchaseOrderStatus},
};

/// Minimum number of characters (after trimming) required in a cancellation reason.
pub const MIN_CANCELLATION_REASON_LEN: usize = 10;

/// Whether the order may be cancelled.
///
/// This is the only cancellation predicate: both the cancel command and the
/// `allowed_actions` affordance go through it.
pub fn can_cancel(order: &PurchaseOrder) -> bool {
    matches!(
        order.status,
        PurchaseOrderStatus::Draft | PurchaseOrderStatus::Placed
    ) && !order.has_receipts()
}

/// Checks the reason and returns it trimmed.
pub fn validate_reason(reason: &str) -> Result<&str, ServiceError> {
    let trimmed = reason.trim();
    if trimmed.chars().count() < MIN_CANCELLATION_REASON_LEN {
        return Err(ServiceError::ValidationError(format!(
            "Cancellation reason must be at least {} characters",
            MIN_CANCELLATION_REASON_LEN
        )));
    }
    Ok(trimmed)
}

/// Guard first, then the reason: an ineligible order fails with `InvalidState`
/// whatever reason was supplied.
pub fn ensure_cancellable<'a>(
    order: &PurchaseOrder,
    reason: &'a str,
) -> Result<&'a str, ServiceError> {
    if !can_cancel(order) {
        let detail = if order.has_receipts() {
            "goods have already been received against it"
        } else {
            "it is not in DRAFT or PLACED status"
        };
        return Err(ServiceError::InvalidState(format!(
            "Purchase order {} ({}) cannot be cancelled: {}",
            order.po_number, order.status, detail
        )));
    }
    validate_reason(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::order_with_items;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[test]
    fn draft_and_placed_without_receipts_can_cancel() {
        let draft = order_with_items(PurchaseOrderStatus::Draft, &[(dec!(10), dec!(5), dec!(0))]);
        let placed = order_with_items(PurchaseOrderStatus::Placed, &[(dec!(10), dec!(5), dec!(0))]);
        assert!(can_cancel(&draft));
        assert!(can_cancel(&placed));
    }

    #[test]
    fn other_statuses_cannot_cancel() {
        for status in [
            PurchaseOrderStatus::Partial,
            PurchaseOrderStatus::Received,
            PurchaseOrderStatus::Cancelled,
        ] {
            let order = order_with_items(status, &[(dec!(10), dec!(5), dec!(0))]);
            assert!(!can_cancel(&order), "{status} should not be cancellable");
        }
    }

    #[test]
    fn a_single_received_line_blocks_cancellation() {
        let mut order = order_with_items(
            PurchaseOrderStatus::Placed,
            &[(dec!(10), dec!(5), dec!(0)), (dec!(4), dec!(1), dec!(0))],
        );
        order.items[1].received_quantity = dec!(3);

        assert!(!can_cancel(&order));
        assert_matches!(
            ensure_cancellable(&order, "no longer needed"),
            Err(ServiceError::InvalidState(_))
        );
        // reason validity does not matter once the guard rejects
        assert_matches!(
            ensure_cancellable(&order, "short"),
            Err(ServiceError::InvalidState(_))
        );
    }

    #[test]
    fn reason_length_boundary() {
        let order = order_with_items(PurchaseOrderStatus::Draft, &[(dec!(1), dec!(1), dec!(0))]);
        assert_matches!(
            ensure_cancellable(&order, "too short"),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            ensure_cancellable(&order, "   padded    "),
            Err(ServiceError::ValidationError(_))
        );
        assert_eq!(ensure_cancellable(&order, "ten chars!").unwrap(), "ten chars!");
        assert_eq!(
            ensure_cancellable(&order, "  no longer needed ").unwrap(),
            "no longer needed"
        );
    }
}
