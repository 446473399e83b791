use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use super::purchase_order_item_entity::PurchaseOrderItem;

/// Upper bound on `notes`, in characters.
pub const MAX_NOTES_LENGTH: u64 = 1000;

/// Lifecycle status of a purchase order.
///
/// Parsing is case-insensitive (`"placed"`, `"Placed"` and `"PLACED"` are equivalent);
/// the canonical wire form is uppercase.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Serialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseOrderStatus {
    Draft,
    Placed,
    Partial,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    /// No action moves an order out of a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Received | Self::Cancelled)
    }
}

impl<'de> Deserialize<'de> for PurchaseOrderStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        PurchaseOrderStatus::from_str(raw.trim()).map_err(|_| {
            serde::de::Error::custom(format!("unknown purchase order status '{}'", raw))
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub po_number: String,
    pub supplier_id: Uuid,
    pub branch_id: Uuid,
    pub status: PurchaseOrderStatus,
    pub ordered_at: DateTime<Utc>,
    pub expected_date: Option<NaiveDate>,
    pub items: Vec<PurchaseOrderItem>,
    /// Face value fixed at order time; recomputed only by DRAFT edits.
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    /// Optimistic concurrency token, bumped on every persisted change.
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl PurchaseOrder {
    pub fn item(&self, item_id: Uuid) -> Option<&PurchaseOrderItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn contains_item(&self, item_id: Uuid) -> bool {
        self.item(item_id).is_some()
    }

    /// True once any line has booked a non-zero quantity.
    pub fn has_receipts(&self) -> bool {
        self.items.iter().any(PurchaseOrderItem::has_receipts)
    }

    /// Every line has received at least its ordered quantity.
    pub fn is_fully_received(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(PurchaseOrderItem::is_fully_received)
    }

    /// Numeric suffix of `po_number` (`PO-000042` -> 42).
    pub fn sequence_number(&self) -> Option<u64> {
        self.po_number
            .rsplit_once('-')
            .and_then(|(_, digits)| digits.parse().ok())
    }
}
