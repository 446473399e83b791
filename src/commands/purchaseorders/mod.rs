pub mod approve_purchase_order_command;
pub mod cancel_purchase_order_command;
pub mod create_purchase_order_command;
pub mod delete_purchase_order_command;
pub mod receive_purchase_order_command;
pub mod update_purchase_order_command;

pub use approve_purchase_order_command::ApprovePurchaseOrderCommand;
pub use cancel_purchase_order_command::CancelPurchaseOrderCommand;
pub use create_purchase_order_command::CreatePurchaseOrderCommand;
pub use delete_purchase_order_command::DeletePurchaseOrderCommand;
pub use receive_purchase_order_command::ReceivePurchaseOrderCommand;
pub use update_purchase_order_command::UpdatePurchaseOrderCommand;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::{PurchaseOrder, PurchaseOrderItem},
    repositories::PurchaseOrderRepository,
};

/// A fully priced line for a new or edited order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    pub raw_material_id: Uuid,
    pub qty: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub tax: Decimal,
}

impl PurchaseOrderLine {
    pub fn into_item(self) -> PurchaseOrderItem {
        PurchaseOrderItem::new(self.raw_material_id, self.qty, self.unit_price, self.tax)
    }
}

/// Quantities must be positive, prices and tax non-negative.
pub(crate) fn validate_lines(lines: &[PurchaseOrderLine]) -> Result<(), ServiceError> {
    if lines.is_empty() {
        return Err(ServiceError::ValidationError(
            "A purchase order needs at least one item".to_string(),
        ));
    }
    for (index, line) in lines.iter().enumerate() {
        let label = index + 1;
        if line.qty <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Item {}: quantity must be greater than zero",
                label
            )));
        }
        if line.unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Item {}: unit price cannot be negative",
                label
            )));
        }
        if line.tax < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Item {}: tax cannot be negative",
                label
            )));
        }
    }
    Ok(())
}

/// Reads the persisted order; every command starts from here, never from a caller copy.
pub(crate) async fn load_order(
    repository: &dyn PurchaseOrderRepository,
    id: Uuid,
) -> Result<PurchaseOrder, ServiceError> {
    repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {} not found", id)))
}

/// Called once the state change is persisted; a delivery failure is logged, never returned.
pub(crate) async fn publish(event_sender: &EventSender, event: Event) {
    let name = event.name();
    if let Err(e) = event_sender.send(event).await.map_err(ServiceError::EventError) {
        warn!(error = %e, event = name, "Failed to publish purchase order event");
    }
}
