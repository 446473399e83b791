pub mod catalog;
pub mod purchase_order_entity;
pub mod purchase_order_item_entity;

pub use catalog::{Branch, RawMaterial, Supplier};
pub use purchase_order_entity::{PurchaseOrder, PurchaseOrderStatus, MAX_NOTES_LENGTH};
pub use purchase_order_item_entity::PurchaseOrderItem;
