use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginationParams,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    models::{PurchaseOrderStatus, MAX_NOTES_LENGTH},
    reports,
    repositories::PurchaseOrderFilter,
    services::{
        procurement::{PurchaseOrderDraft, PurchaseOrderItemInput, PurchaseOrderSummary},
        receiving::{parse_received_quantity, ReceiptLine},
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

// Request and response DTOs

/// Body of create and edit; edit replaces every field.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PurchaseOrderRequest {
    pub supplier_id: Uuid,
    pub branch_id: Uuid,
    #[serde(default)]
    pub expected_date: Option<NaiveDate>,
    #[validate(length(max = "MAX_NOTES_LENGTH"))]
    #[serde(default)]
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<PurchaseOrderItemRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseOrderItemRequest {
    pub raw_material_id: Uuid,
    pub qty: Decimal,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub tax: Option<Decimal>,
}

impl From<PurchaseOrderRequest> for PurchaseOrderDraft {
    fn from(request: PurchaseOrderRequest) -> Self {
        Self {
            supplier_id: request.supplier_id,
            branch_id: request.branch_id,
            expected_date: request.expected_date,
            notes: request.notes,
            items: request
                .items
                .into_iter()
                .map(|item| PurchaseOrderItemInput {
                    raw_material_id: item.raw_material_id,
                    qty: item.qty,
                    unit_price: item.unit_price,
                    tax: item.tax,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CancelPurchaseOrderRequest {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReceivePurchaseOrderRequest {
    pub items: Vec<ItemReceivedRequest>,
}

/// `received_quantity` is taken as sent: numbers and numeric strings both work,
/// anything else counts as zero.
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemReceivedRequest {
    pub item_id: Uuid,
    #[serde(default)]
    pub received_quantity: Value,
}

/// Query string of the list and export endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListPurchaseOrdersQuery {
    pub status: Option<PurchaseOrderStatus>,
    pub supplier_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl ListPurchaseOrdersQuery {
    fn filter(&self) -> PurchaseOrderFilter {
        PurchaseOrderFilter {
            status: self.status,
            supplier_id: self.supplier_id,
            branch_id: self.branch_id,
        }
    }

    fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Pre-formatted values for rendering; amounts rounded to two places.
#[derive(Debug, Serialize)]
pub struct DisplayFields {
    pub ordered_total: String,
    pub received_total: String,
    pub ordered_at: String,
    pub expected_date: String,
}

#[derive(Debug, Serialize)]
pub struct PurchaseOrderSummaryResponse {
    #[serde(flatten)]
    pub summary: PurchaseOrderSummary,
    pub display: DisplayFields,
}

// Handler functions

/// Create a new purchase order
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(payload): Json<PurchaseOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let po = state
        .services
        .procurement
        .create_purchase_order(payload.into())
        .await
        .map_err(map_service_error)?;

    info!("Purchase order created: {}", po.po_number);

    Ok(created_response(po))
}

/// List purchase orders, optionally filtered
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Query(query): Query<ListPurchaseOrdersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pos = state
        .services
        .procurement
        .list_purchase_orders(&query.filter())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(query.pagination().paginate(pos)))
}

/// Export the filtered purchase orders as CSV
pub async fn export_purchase_orders(
    State(state): State<AppState>,
    Query(query): Query<ListPurchaseOrdersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let csv = state
        .services
        .procurement
        .export_purchase_orders_csv(&query.filter())
        .await
        .map_err(map_service_error)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"purchase-orders.csv\"",
            ),
        ],
        csv,
    ))
}

/// Get a purchase order by ID
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let po = state
        .services
        .procurement
        .get_purchase_order(po_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(po))
}

/// Totals, line progress and the actions currently available
pub async fn get_purchase_order_summary(
    State(state): State<AppState>,
    Path(po_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .services
        .procurement
        .purchase_order_summary(po_id)
        .await
        .map_err(map_service_error)?;

    let currency = state.config.default_currency.as_str();
    let display = DisplayFields {
        ordered_total: reports::format_currency(summary.ordered_total, currency),
        received_total: reports::format_currency(summary.received_total, currency),
        ordered_at: reports::format_date(summary.order.ordered_at.date_naive()),
        expected_date: reports::format_optional_date(summary.order.expected_date),
    };

    Ok(success_response(PurchaseOrderSummaryResponse { summary, display }))
}

/// Edit a DRAFT purchase order
pub async fn update_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<Uuid>,
    Json(payload): Json<PurchaseOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let po = state
        .services
        .procurement
        .update_purchase_order(po_id, payload.into())
        .await
        .map_err(map_service_error)?;

    info!("Purchase order updated: {}", po_id);

    Ok(success_response(po))
}

/// Delete a DRAFT purchase order
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .procurement
        .delete_purchase_order(po_id)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order deleted: {}", po_id);

    Ok(no_content_response())
}

/// Approve a purchase order
pub async fn approve_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let po = state
        .services
        .procurement
        .approve_purchase_order(po_id)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order approved: {}", po_id);

    Ok(success_response(po))
}

/// Cancel a purchase order
pub async fn cancel_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<Uuid>,
    Json(payload): Json<CancelPurchaseOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let po = state
        .services
        .procurement
        .cancel_purchase_order(po_id, payload.reason)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order cancelled: {}", po_id);

    Ok(success_response(po))
}

/// Record received quantities on a purchase order
pub async fn receive_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<Uuid>,
    Json(payload): Json<ReceivePurchaseOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let items_received = payload
        .items
        .iter()
        .map(|item| {
            ReceiptLine::new(
                item.item_id,
                parse_received_quantity(&item.received_quantity),
            )
        })
        .collect();

    let po = state
        .services
        .procurement
        .receive_purchase_order(po_id, items_received)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order received: {} now {}", po_id, po.status);

    Ok(success_response(po))
}

pub fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_purchase_order).get(list_purchase_orders))
        .route("/export", get(export_purchase_orders))
        .route(
            "/:id",
            get(get_purchase_order)
                .put(update_purchase_order)
                .delete(delete_purchase_order),
        )
        .route("/:id/summary", get(get_purchase_order_summary))
        .route("/:id/approve", post(approve_purchase_order))
        .route("/:id/cancel", post(cancel_purchase_order))
        .route("/:id/receive", post(receive_purchase_order))
}
