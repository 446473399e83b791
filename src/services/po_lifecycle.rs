//! Purchase order state machine.
//!
//! Every permitted `(status, action)` pair is listed in [`TRANSITIONS`]; anything
//! not in the table fails with `InvalidState`. Statuses only move forward:
//!
//! ```text
//! DRAFT --approve--> PLACED --receive--> PARTIAL --receive--> RECEIVED
//!   |                  |  \_____________receive_____________/^
//!   +--cancel--> CANCELLED <--cancel--+
//! ```

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::{
    errors::ServiceError,
    models::{PurchaseOrder, PurchaseOrderStatus},
};

use super::cancellation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderAction {
    Approve,
    Receive,
    Cancel,
    Edit,
    Delete,
}

/// What an admissible action does to the order's status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Status becomes the given value.
    MoveTo(PurchaseOrderStatus),
    /// Status is derived from the receiving reconciliation.
    Reconcile,
    /// Status is unchanged (DRAFT edits).
    Stay,
    /// The order is removed.
    Remove,
}

use PurchaseOrderAction as A;
use PurchaseOrderStatus as S;
use TransitionOutcome as T;

pub const TRANSITIONS: &[(PurchaseOrderStatus, PurchaseOrderAction, TransitionOutcome)] = &[
    (S::Draft, A::Approve, T::MoveTo(S::Placed)),
    (S::Draft, A::Cancel, T::MoveTo(S::Cancelled)),
    (S::Draft, A::Edit, T::Stay),
    (S::Draft, A::Delete, T::Remove),
    (S::Placed, A::Cancel, T::MoveTo(S::Cancelled)),
    (S::Placed, A::Receive, T::Reconcile),
    (S::Partial, A::Receive, T::Reconcile),
];

/// Status edges a receiving reconciliation may produce (self-loops included).
const RECONCILE_EDGES: &[(PurchaseOrderStatus, PurchaseOrderStatus)] = &[
    (S::Placed, S::Placed),
    (S::Placed, S::Partial),
    (S::Placed, S::Received),
    (S::Partial, S::Partial),
    (S::Partial, S::Received),
];

/// Looks up the outcome of `action` in `status`.
pub fn transition(
    status: PurchaseOrderStatus,
    action: PurchaseOrderAction,
) -> Result<TransitionOutcome, ServiceError> {
    TRANSITIONS
        .iter()
        .find(|(from, act, _)| *from == status && *act == action)
        .map(|(_, _, outcome)| *outcome)
        .ok_or_else(|| {
            ServiceError::InvalidState(format!(
                "Cannot {} a purchase order in {} status",
                action, status
            ))
        })
}

/// Like [`transition`] but with the order number in the error message.
pub fn ensure_allowed(
    order: &PurchaseOrder,
    action: PurchaseOrderAction,
) -> Result<TransitionOutcome, ServiceError> {
    transition(order.status, action).map_err(|_| {
        ServiceError::InvalidState(format!(
            "Cannot {} purchase order {} in {} status",
            action, order.po_number, order.status
        ))
    })
}

/// Checks that a status produced by receiving is a legal edge from `from`.
pub fn ensure_reconcile_edge(
    from: PurchaseOrderStatus,
    to: PurchaseOrderStatus,
) -> Result<(), ServiceError> {
    if RECONCILE_EDGES.contains(&(from, to)) {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(format!(
            "Receiving cannot move a purchase order from {} to {}",
            from, to
        )))
    }
}

/// Actions listed in the transition table for a status, in table order.
pub fn actions_for_status(status: PurchaseOrderStatus) -> Vec<PurchaseOrderAction> {
    TRANSITIONS
        .iter()
        .filter(|(from, _, _)| *from == status)
        .map(|(_, action, _)| *action)
        .collect()
}

/// Actions the caller may offer for this order.
///
/// Cancel additionally goes through the cancellation guard, so a line with
/// received goods hides it even in PLACED.
pub fn allowed_actions(order: &PurchaseOrder) -> Vec<PurchaseOrderAction> {
    actions_for_status(order.status)
        .into_iter()
        .filter(|action| *action != A::Cancel || cancellation::can_cancel(order))
        .collect()
}
