use chrono::NaiveDate;
use futures::future::try_join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    commands::{
        purchaseorders::{
            ApprovePurchaseOrderCommand, CancelPurchaseOrderCommand, CreatePurchaseOrderCommand,
            DeletePurchaseOrderCommand, PurchaseOrderLine, ReceivePurchaseOrderCommand,
            UpdatePurchaseOrderCommand,
        },
        Command,
    },
    errors::ServiceError,
    events::EventSender,
    models::PurchaseOrder,
    reports::{self, PurchaseOrderExportRow},
    repositories::{CatalogLookup, PurchaseOrderFilter, PurchaseOrderRepository},
};

use super::{
    cancellation,
    po_lifecycle::{self, PurchaseOrderAction},
    po_totals,
    receiving::ReceiptLine,
};

/// A line as entered by the caller; `unit_price` falls back to the raw material's average cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderItemInput {
    pub raw_material_id: Uuid,
    pub qty: Decimal,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub tax: Option<Decimal>,
}

/// Header and lines of an order being created or replaced by an edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderDraft {
    pub supplier_id: Uuid,
    pub branch_id: Uuid,
    #[serde(default)]
    pub expected_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<PurchaseOrderItemInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineSummary {
    pub item_id: Uuid,
    /// Position-based label ("Item 1", "Item 2", ...).
    pub label: String,
    pub raw_material_id: Uuid,
    pub qty: Decimal,
    pub received_quantity: Decimal,
    pub pending_quantity: Decimal,
    pub over_received: bool,
    pub received_value: Decimal,
}

/// Order plus everything a caller needs to render it and gate its actions.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOrderSummary {
    pub order: PurchaseOrder,
    pub ordered_total: Decimal,
    pub received_total: Decimal,
    pub lines: Vec<LineSummary>,
    pub allowed_actions: Vec<PurchaseOrderAction>,
    pub can_cancel: bool,
}

impl PurchaseOrderSummary {
    pub fn from_order(order: PurchaseOrder) -> Result<Self, ServiceError> {
        let lines = order
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Ok(LineSummary {
                    item_id: item.id,
                    label: format!("Item {}", index + 1),
                    raw_material_id: item.raw_material_id,
                    qty: item.qty,
                    received_quantity: item.received_quantity,
                    pending_quantity: item.pending_quantity(),
                    over_received: item.is_over_received(),
                    received_value: po_totals::line_received_value(item)?,
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        Ok(Self {
            ordered_total: po_totals::ordered_total(&order.items)?,
            received_total: po_totals::received_total(&order.items)?,
            allowed_actions: po_lifecycle::allowed_actions(&order),
            can_cancel: cancellation::can_cancel(&order),
            lines,
            order,
        })
    }
}

/// Service for managing procurement processes
#[derive(Clone)]
pub struct ProcurementService {
    repository: Arc<dyn PurchaseOrderRepository>,
    catalog: Arc<dyn CatalogLookup>,
    event_sender: Arc<EventSender>,
    po_number_prefix: String,
}

impl ProcurementService {
    /// Creates a new procurement service instance
    pub fn new(
        repository: Arc<dyn PurchaseOrderRepository>,
        catalog: Arc<dyn CatalogLookup>,
        event_sender: Arc<EventSender>,
        po_number_prefix: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            catalog,
            event_sender,
            po_number_prefix: po_number_prefix.into(),
        }
    }

    /// Creates a new purchase order in DRAFT
    #[instrument(skip(self, draft), fields(supplier_id = %draft.supplier_id, items = draft.items.len()))]
    pub async fn create_purchase_order(
        &self,
        draft: PurchaseOrderDraft,
    ) -> Result<PurchaseOrder, ServiceError> {
        self.ensure_parties_exist(draft.supplier_id, draft.branch_id)
            .await?;
        let items = self.price_lines(&draft.items).await?;

        let command = CreatePurchaseOrderCommand {
            supplier_id: draft.supplier_id,
            branch_id: draft.branch_id,
            expected_date: draft.expected_date,
            notes: draft.notes,
            items,
            po_number_prefix: self.po_number_prefix.clone(),
        };
        self.run(command).await
    }

    /// Replaces the editable fields of a DRAFT purchase order
    #[instrument(skip(self, draft))]
    pub async fn update_purchase_order(
        &self,
        id: Uuid,
        draft: PurchaseOrderDraft,
    ) -> Result<PurchaseOrder, ServiceError> {
        self.ensure_parties_exist(draft.supplier_id, draft.branch_id)
            .await?;
        let items = self.price_lines(&draft.items).await?;

        let command = UpdatePurchaseOrderCommand {
            id,
            supplier_id: draft.supplier_id,
            branch_id: draft.branch_id,
            expected_date: draft.expected_date,
            notes: draft.notes,
            items,
        };
        self.run(command).await
    }

    /// Approves a purchase order
    #[instrument(skip(self))]
    pub async fn approve_purchase_order(&self, id: Uuid) -> Result<PurchaseOrder, ServiceError> {
        self.run(ApprovePurchaseOrderCommand { id }).await
    }

    /// Books received quantities against a purchase order
    #[instrument(skip(self, items_received))]
    pub async fn receive_purchase_order(
        &self,
        id: Uuid,
        items_received: Vec<ReceiptLine>,
    ) -> Result<PurchaseOrder, ServiceError> {
        self.run(ReceivePurchaseOrderCommand { id, items_received })
            .await
    }

    /// Cancels a purchase order
    #[instrument(skip(self, reason))]
    pub async fn cancel_purchase_order(
        &self,
        id: Uuid,
        reason: impl Into<String>,
    ) -> Result<PurchaseOrder, ServiceError> {
        self.run(CancelPurchaseOrderCommand {
            id,
            reason: reason.into(),
        })
        .await
    }

    /// Deletes a DRAFT purchase order
    #[instrument(skip(self))]
    pub async fn delete_purchase_order(&self, id: Uuid) -> Result<(), ServiceError> {
        self.run(DeletePurchaseOrderCommand { id }).await
    }

    /// Gets a purchase order by ID
    #[instrument(skip(self))]
    pub async fn get_purchase_order(&self, id: Uuid) -> Result<PurchaseOrder, ServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {} not found", id)))
    }

    /// Lists purchase orders matching the filter, oldest first
    #[instrument(skip(self))]
    pub async fn list_purchase_orders(
        &self,
        filter: &PurchaseOrderFilter,
    ) -> Result<Vec<PurchaseOrder>, ServiceError> {
        self.repository.list(filter).await
    }

    /// Totals, per-line progress and admissible actions for one order
    #[instrument(skip(self))]
    pub async fn purchase_order_summary(
        &self,
        id: Uuid,
    ) -> Result<PurchaseOrderSummary, ServiceError> {
        let order = self.get_purchase_order(id).await?;
        PurchaseOrderSummary::from_order(order)
    }

    /// CSV listing of the filtered orders with supplier and branch names resolved
    #[instrument(skip(self))]
    pub async fn export_purchase_orders_csv(
        &self,
        filter: &PurchaseOrderFilter,
    ) -> Result<String, ServiceError> {
        let orders = self.repository.list(filter).await?;
        let rows = try_join_all(orders.iter().map(|order| self.export_row(order))).await?;
        info!(rows = rows.len(), "Exporting purchase orders");
        Ok(reports::purchase_orders_csv(&rows))
    }

    async fn export_row(&self, order: &PurchaseOrder) -> Result<PurchaseOrderExportRow, ServiceError> {
        let supplier = self
            .catalog
            .supplier(order.supplier_id)
            .await?
            .map(|s| s.name)
            .unwrap_or_else(|| order.supplier_id.to_string());
        let branch = self
            .catalog
            .branch(order.branch_id)
            .await?
            .map(|b| b.name)
            .unwrap_or_else(|| order.branch_id.to_string());

        Ok(PurchaseOrderExportRow {
            po_number: order.po_number.clone(),
            supplier,
            branch,
            status: order.status,
            ordered_at: order.ordered_at.date_naive(),
            expected_date: order.expected_date,
            total_amount: order.total_amount,
            received_total: po_totals::received_total(&order.items)?,
        })
    }

    async fn run<C>(&self, command: C) -> Result<C::Result, ServiceError>
    where
        C: Command,
    {
        command
            .execute(self.repository.clone(), self.event_sender.clone())
            .await
    }

    async fn ensure_parties_exist(&self, supplier_id: Uuid, branch_id: Uuid) -> Result<(), ServiceError> {
        if self.catalog.supplier(supplier_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Supplier {} not found",
                supplier_id
            )));
        }
        if self.catalog.branch(branch_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Branch {} not found", branch_id)));
        }
        Ok(())
    }

    /// Resolves each input against the raw-material catalog, prefilling missing prices.
    async fn price_lines(
        &self,
        inputs: &[PurchaseOrderItemInput],
    ) -> Result<Vec<PurchaseOrderLine>, ServiceError> {
        let mut lines = Vec::with_capacity(inputs.len());
        for input in inputs {
            let material = self
                .catalog
                .raw_material(input.raw_material_id)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "Raw material {} not found",
                        input.raw_material_id
                    ))
                })?;
            lines.push(PurchaseOrderLine {
                raw_material_id: material.id,
                qty: input.qty,
                unit_price: input.unit_price.unwrap_or(material.average_cost),
                tax: input.tax.unwrap_or(Decimal::ZERO),
            });
        }
        Ok(lines)
    }
}
