use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{publish, validate_lines, PurchaseOrderLine};
use crate::{
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{PurchaseOrder, PurchaseOrderStatus, MAX_NOTES_LENGTH},
    repositories::PurchaseOrderRepository,
    services::po_totals,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePurchaseOrderCommand {
    pub supplier_id: Uuid,
    pub branch_id: Uuid,
    pub expected_date: Option<NaiveDate>,
    #[validate(length(max = "MAX_NOTES_LENGTH"))]
    pub notes: Option<String>,
    pub items: Vec<PurchaseOrderLine>,
    #[validate(length(min = 1, max = 8))]
    pub po_number_prefix: String,
}

#[async_trait]
impl Command for CreatePurchaseOrderCommand {
    type Result = PurchaseOrder;

    #[instrument(skip(self, repository, event_sender), fields(supplier_id = %self.supplier_id))]
    async fn execute(
        &self,
        repository: Arc<dyn PurchaseOrderRepository>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        validate_lines(&self.items)?;

        let items: Vec<_> = self
            .items
            .iter()
            .cloned()
            .map(PurchaseOrderLine::into_item)
            .collect();
        let total_amount = po_totals::ordered_total(&items)?;
        let now = Utc::now();

        let order = PurchaseOrder {
            id: Uuid::new_v4(),
            po_number: repository.next_po_number(&self.po_number_prefix).await?,
            supplier_id: self.supplier_id,
            branch_id: self.branch_id,
            status: PurchaseOrderStatus::Draft,
            ordered_at: now,
            expected_date: self.expected_date,
            total_amount,
            items,
            notes: self.notes.clone(),
            cancellation_reason: None,
            version: 0,
            updated_at: now,
        };

        let order = repository.insert(order).await?;

        info!(
            purchase_order_id = %order.id,
            po_number = %order.po_number,
            total_amount = %order.total_amount,
            "Purchase order created"
        );
        publish(
            &event_sender,
            Event::PurchaseOrderCreated {
                purchase_order_id: order.id,
                po_number: order.po_number.clone(),
                total_amount: order.total_amount,
            },
        )
        .await;

        Ok(order)
    }
}
