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
    repositories::PurchaseOrderRepository,
    services::po_lifecycle::{self, PurchaseOrderAction},
};

/// Hard delete of a DRAFT order together with its items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePurchaseOrderCommand {
    pub id: Uuid,
}

#[async_trait]
impl Command for DeletePurchaseOrderCommand {
    type Result = ();

    #[instrument(skip(self, repository, event_sender), fields(purchase_order_id = %self.id))]
    async fn execute(
        &self,
        repository: Arc<dyn PurchaseOrderRepository>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let current = load_order(repository.as_ref(), self.id).await?;
        po_lifecycle::ensure_allowed(&current, PurchaseOrderAction::Delete)?;

        repository.delete(current.id, current.version).await?;

        info!(purchase_order_id = %current.id, po_number = %current.po_number, "Purchase order deleted");
        publish(
            &event_sender,
            Event::PurchaseOrderDeleted {
                purchase_order_id: current.id,
            },
        )
        .await;

        Ok(())
    }
}
