use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One ordered raw material on a purchase order.
///
/// `received_quantity` may exceed `qty`; over-receipt is recorded as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub raw_material_id: Uuid,
    pub qty: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub received_quantity: Decimal,
}

impl PurchaseOrderItem {
    pub fn new(raw_material_id: Uuid, qty: Decimal, unit_price: Decimal, tax: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw_material_id,
            qty,
            unit_price,
            tax,
            received_quantity: Decimal::ZERO,
        }
    }

    pub fn has_receipts(&self) -> bool {
        self.received_quantity > Decimal::ZERO
    }

    pub fn is_fully_received(&self) -> bool {
        self.received_quantity >= self.qty
    }

    /// Quantity still outstanding, never negative.
    pub fn pending_quantity(&self) -> Decimal {
        (self.qty - self.received_quantity).max(Decimal::ZERO)
    }

    pub fn is_over_received(&self) -> bool {
        self.received_quantity > self.qty
    }
}
