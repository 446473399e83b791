use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    models::{PurchaseOrder, PurchaseOrderStatus},
};

/// Optional criteria for listing purchase orders; unset fields match everything.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PurchaseOrderFilter {
    pub status: Option<PurchaseOrderStatus>,
    pub supplier_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
}

impl PurchaseOrderFilter {
    pub fn matches(&self, order: &PurchaseOrder) -> bool {
        self.status.map_or(true, |s| order.status == s)
            && self.supplier_id.map_or(true, |id| order.supplier_id == id)
            && self.branch_id.map_or(true, |id| order.branch_id == id)
    }
}

/// Persistence for purchase orders.
///
/// `save` and `delete` take the version the caller read; implementations must reject
/// the write with `ConcurrentModification` when the stored version differs, so two
/// writers working from the same snapshot can never both succeed.
#[async_trait]
pub trait PurchaseOrderRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PurchaseOrder>, ServiceError>;

    async fn list(&self, filter: &PurchaseOrderFilter) -> Result<Vec<PurchaseOrder>, ServiceError>;

    /// Allocates the next human-readable order number.
    async fn next_po_number(&self, prefix: &str) -> Result<String, ServiceError>;

    /// Stores a new order at version 1.
    async fn insert(&self, order: PurchaseOrder) -> Result<PurchaseOrder, ServiceError>;

    /// Replaces a stored order if its version still equals `expected_version`.
    async fn save(
        &self,
        order: PurchaseOrder,
        expected_version: u64,
    ) -> Result<PurchaseOrder, ServiceError>;

    /// Removes an order (and its items) if its version still equals `expected_version`.
    async fn delete(&self, id: Uuid, expected_version: u64) -> Result<(), ServiceError>;
}

/// DashMap-backed repository; each write is a compare-and-swap under the shard lock.
#[derive(Debug, Default)]
pub struct InMemoryPurchaseOrderRepository {
    orders: DashMap<Uuid, PurchaseOrder>,
    sequence: AtomicU64,
}

impl InMemoryPurchaseOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[async_trait]
impl PurchaseOrderRepository for InMemoryPurchaseOrderRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PurchaseOrder>, ServiceError> {
        Ok(self.orders.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list(&self, filter: &PurchaseOrderFilter) -> Result<Vec<PurchaseOrder>, ServiceError> {
        let mut orders: Vec<PurchaseOrder> = self
            .orders
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| {
            a.ordered_at
                .cmp(&b.ordered_at)
                .then_with(|| a.sequence_number().cmp(&b.sequence_number()))
                .then_with(|| a.po_number.cmp(&b.po_number))
        });
        Ok(orders)
    }

    async fn next_po_number(&self, prefix: &str) -> Result<String, ServiceError> {
        let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("{}-{:06}", prefix, next))
    }

    async fn insert(&self, mut order: PurchaseOrder) -> Result<PurchaseOrder, ServiceError> {
        match self.orders.entry(order.id) {
            Entry::Occupied(_) => Err(ServiceError::InternalError(format!(
                "purchase order {} already exists",
                order.id
            ))),
            Entry::Vacant(slot) => {
                order.version = 1;
                slot.insert(order.clone());
                debug!(purchase_order_id = %order.id, "purchase order stored");
                Ok(order)
            }
        }
    }

    async fn save(
        &self,
        mut order: PurchaseOrder,
        expected_version: u64,
    ) -> Result<PurchaseOrder, ServiceError> {
        let mut stored = self.orders.get_mut(&order.id).ok_or_else(|| {
            ServiceError::NotFound(format!("Purchase order {} not found", order.id))
        })?;

        if stored.version != expected_version {
            debug!(
                purchase_order_id = %order.id,
                expected_version,
                stored_version = stored.version,
                "rejecting stale purchase order write"
            );
            return Err(ServiceError::ConcurrentModification(order.id));
        }

        order.version = expected_version + 1;
        order.updated_at = Utc::now();
        *stored = order.clone();
        Ok(order)
    }

    async fn delete(&self, id: Uuid, expected_version: u64) -> Result<(), ServiceError> {
        if self
            .orders
            .remove_if(&id, |_, order| order.version == expected_version)
            .is_some()
        {
            return Ok(());
        }

        if self.orders.contains_key(&id) {
            Err(ServiceError::ConcurrentModification(id))
        } else {
            Err(ServiceError::NotFound(format!("Purchase order {} not found", id)))
        }
    }
}
