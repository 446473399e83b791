use async_trait::async_trait;
use chrono::Utc;
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
    services::po_lifecycle::{self, PurchaseOrderAction, TransitionOutcome},
};

/// DRAFT -> PLACED. Not idempotent: approving an order that is already placed fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovePurchaseOrderCommand {
    pub id: Uuid,
}

#[async_trait]
impl Command for ApprovePurchaseOrderCommand {
    type Result = PurchaseOrder;

    #[instrument(skip(self, repository, event_sender), fields(purchase_order_id = %self.id))]
    async fn execute(
        &self,
        repository: Arc<dyn PurchaseOrderRepository>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let current = load_order(repository.as_ref(), self.id).await?;

        let next_status = match po_lifecycle::ensure_allowed(&current, PurchaseOrderAction::Approve)? {
            TransitionOutcome::MoveTo(status) => status,
            other => {
                return Err(ServiceError::InternalError(format!(
                    "unexpected approve transition {:?}",
                    other
                )))
            }
        };

        let mut updated = current.clone();
        updated.status = next_status;
        let saved = repository.save(updated, current.version).await?;

        info!(purchase_order_id = %saved.id, status = %saved.status, "Purchase order approved");
        publish(
            &event_sender,
            Event::PurchaseOrderApproved {
                purchase_order_id: saved.id,
                approved_at: Utc::now(),
            },
        )
        .await;

        Ok(saved)
    }
}
