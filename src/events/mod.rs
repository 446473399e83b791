use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::PurchaseOrderStatus;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Purchase order domain events, one per persisted state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PurchaseOrderCreated {
        purchase_order_id: Uuid,
        po_number: String,
        total_amount: Decimal,
    },
    PurchaseOrderUpdated {
        purchase_order_id: Uuid,
        total_amount: Decimal,
    },
    PurchaseOrderApproved {
        purchase_order_id: Uuid,
        approved_at: DateTime<Utc>,
    },
    PurchaseOrderReceived {
        purchase_order_id: Uuid,
        previous_status: PurchaseOrderStatus,
        status: PurchaseOrderStatus,
        received_total: Decimal,
    },
    PurchaseOrderCancelled {
        purchase_order_id: Uuid,
        reason: String,
    },
    PurchaseOrderDeleted {
        purchase_order_id: Uuid,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::PurchaseOrderCreated { .. } => "purchase_order.created",
            Event::PurchaseOrderUpdated { .. } => "purchase_order.updated",
            Event::PurchaseOrderApproved { .. } => "purchase_order.approved",
            Event::PurchaseOrderReceived { .. } => "purchase_order.received",
            Event::PurchaseOrderCancelled { .. } => "purchase_order.cancelled",
            Event::PurchaseOrderDeleted { .. } => "purchase_order.deleted",
        }
    }

    pub fn purchase_order_id(&self) -> Uuid {
        match self {
            Event::PurchaseOrderCreated {
                purchase_order_id, ..
            }
            | Event::PurchaseOrderUpdated {
                purchase_order_id, ..
            }
            | Event::PurchaseOrderApproved {
                purchase_order_id, ..
            }
            | Event::PurchaseOrderReceived {
                purchase_order_id, ..
            }
            | Event::PurchaseOrderCancelled {
                purchase_order_id, ..
            }
            | Event::PurchaseOrderDeleted { purchase_order_id } => *purchase_order_id,
        }
    }
}

/// Drains the event channel, logging every event until all senders are dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::PurchaseOrderReceived {
                purchase_order_id,
                previous_status,
                status,
                received_total,
            } => {
                info!(
                    event = event.name(),
                    purchase_order_id = %purchase_order_id,
                    previous_status = %previous_status,
                    status = %status,
                    received_total = %received_total,
                    "goods received"
                );
            }
            Event::PurchaseOrderCancelled {
                purchase_order_id,
                reason,
            } => {
                info!(
                    event = event.name(),
                    purchase_order_id = %purchase_order_id,
                    reason = %reason,
                    "purchase order cancelled"
                );
            }
            other => {
                info!(
                    event = other.name(),
                    purchase_order_id = %other.purchase_order_id(),
                    "purchase order event"
                );
            }
        }
    }

    warn!("Event processing loop has ended");
}
