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
    services::receiving::{self, ReceiptLine},
};

/// Books a receiving event. Quantities are added to what each line already received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivePurchaseOrderCommand {
    pub id: Uuid,
    pub items_received: Vec<ReceiptLine>,
}

#[async_trait]
impl Command for ReceivePurchaseOrderCommand {
    type Result = PurchaseOrder;

    #[instrument(
        skip(self, repository, event_sender),
        fields(purchase_order_id = %self.id, lines = self.items_received.len())
    )]
    async fn execute(
        &self,
        repository: Arc<dyn PurchaseOrderRepository>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let current = load_order(repository.as_ref(), self.id).await?;
        let outcome = receiving::reconcile(&current, &self.items_received)?;
        let saved = repository.save(outcome.order, current.version).await?;

        info!(
            purchase_order_id = %saved.id,
            previous_status = %outcome.previous_status,
            status = %saved.status,
            received_total = %outcome.received_total,
            "Purchase order received"
        );
        publish(
            &event_sender,
            Event::PurchaseOrderReceived {
                purchase_order_id: saved.id,
                previous_status: outcome.previous_status,
                status: saved.status,
                received_total: outcome.received_total,
            },
        )
        .await;

        Ok(saved)
    }
}
