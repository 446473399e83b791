pub mod catalog_repository;
pub mod purchase_order_repository;

pub use catalog_repository::{CatalogLookup, CatalogSeed, InMemoryCatalog};
pub use purchase_order_repository::{
    InMemoryPurchaseOrderRepository, PurchaseOrderFilter, PurchaseOrderRepository,
};
