//! Read-only reference entities owned by other subsystems.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawMaterial {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub unit_of_measure: String,
    /// Used to prefill `unit_price` on new lines without an explicit price.
    pub average_cost: Decimal,
}
