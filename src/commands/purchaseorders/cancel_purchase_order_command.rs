use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{load_order, publish};
use crate::{
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    models::PurchaseOrder,
    repositories::PurchaseOrderRepository,
    services::{
        cancellation,
        po_lifecycle::{self, PurchaseOrderAction, TransitionOutcome},
    },
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelPurchaseOrderCommand {
    pub id: Uuid,
    pub reason: String,
}

#[async_trait]
impl Command for CancelPurchaseOrderCommand {
    type Result = PurchaseOrder;

    #[instrument(skip(self, repository, event_sender), fields(purchase_order_id = %self.id))]
    async fn execute(
        &self,
        repository: Arc<dyn PurchaseOrderRepository>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let current = load_order(repository.as_ref(), self.id).await?;
        let reason = cancellation::ensure_cancellable(&current, &self.reason)?.to_string();

        let next_status = match po_lifecycle::ensure_allowed(&current, PurchaseOrderAction::Cancel)? {
            TransitionOutcome::MoveTo(status) => status,
            other => {
                return Err(ServiceError::InternalError(format!(
                    "unexpected cancel transition {:?}",
                    other
                )))
            }
        };

        let mut updated = current.clone();
        updated.status = next_status;
        updated.cancellation_reason = Some(reason.clone());
        let saved = repository.save(updated, current.version).await?;

        info!(purchase_order_id = %saved.id, reason = %reason, "Purchase order cancelled");
        publish(
            &event_sender,
            Event::PurchaseOrderCancelled {
                purchase_order_id: saved.id,
                reason,
            },
        )
        .await;

        Ok(saved)
    }
}
