use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{load_order, publish, validate_lines, PurchaseOrderLine};
use crate::{
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{PurchaseOrder, MAX_NOTES_LENGTH},
    repositories::PurchaseOrderRepository,
    services::{
        po_lifecycle::{self, PurchaseOrderAction},
        po_totals,
    },
};

/// Full replacement of a DRAFT order's editable fields. Nothing is merged:
/// omitted `expected_date`/`notes` are cleared and the item list is replaced.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePurchaseOrderCommand {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub branch_id: Uuid,
    pub expected_date: Option<NaiveDate>,
    #[validate(length(max = "MAX_NOTES_LENGTH"))]
    pub notes: Option<String>,
    pub items: Vec<PurchaseOrderLine>,
}

#[async_trait]
impl Command for UpdatePurchaseOrderCommand {
    type Result = PurchaseOrder;

    #[instrument(skip(self, repository, event_sender), fields(purchase_order_id = %self.id))]
    async fn execute(
        &self,
        repository: Arc<dyn PurchaseOrderRepository>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        validate_lines(&self.items)?;

        let current = load_order(repository.as_ref(), self.id).await?;
        po_lifecycle::ensure_allowed(&current, PurchaseOrderAction::Edit)?;

        let mut updated = current.clone();
        updated.supplier_id = self.supplier_id;
        updated.branch_id = self.branch_id;
        updated.expected_date = self.expected_date;
        updated.notes = self.notes.clone();
        updated.items = self
            .items
            .iter()
            .cloned()
            .map(PurchaseOrderLine::into_item)
            .collect();
        updated.total_amount = po_totals::ordered_total(&updated.items)?;

        let saved = repository.save(updated, current.version).await?;

        info!(
            purchase_order_id = %saved.id,
            items = saved.items.len(),
            total_amount = %saved.total_amount,
            "Purchase order updated"
        );
        publish(
            &event_sender,
            Event::PurchaseOrderUpdated {
                purchase_order_id: saved.id,
                total_amount: saved.total_amount,
            },
        )
        .await;

        Ok(saved)
    }
}
