#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use procurement_api::{
    build_router,
    config::AppConfig,
    events::{self, EventSender},
    models::{Branch, RawMaterial, Supplier},
    repositories::{InMemoryCatalog, InMemoryPurchaseOrderRepository},
    AppState,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness around the full router, backed by in-memory stores.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub supplier_id: Uuid,
    pub branch_id: Uuid,
    pub fabric_id: Uuid,
    pub thread_id: Uuid,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub fn new() -> Self {
        let catalog = InMemoryCatalog::new();
        let supplier_id = Uuid::new_v4();
        let branch_id = Uuid::new_v4();
        let fabric_id = Uuid::new_v4();
        let thread_id = Uuid::new_v4();

        catalog.add_supplier(Supplier {
            id: supplier_id,
            name: "Northern Textiles".to_string(),
            contact: Some("orders@northern.example".to_string()),
        });
        catalog.add_branch(Branch {
            id: branch_id,
            name: "Main Workshop".to_string(),
        });
        catalog.add_raw_material(RawMaterial {
            id: fabric_id,
            name: "Cotton fabric".to_string(),
            code: "FAB-001".to_string(),
            unit_of_measure: "m".to_string(),
            average_cost: dec!(5),
        });
        catalog.add_raw_material(RawMaterial {
            id: thread_id,
            name: "Polyester thread".to_string(),
            code: "THR-010".to_string(),
            unit_of_measure: "spool".to_string(),
            average_cost: dec!(2),
        });

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(
            AppConfig::default(),
            Arc::new(InMemoryPurchaseOrderRepository::new()),
            Arc::new(catalog),
            EventSender::new(event_tx),
        );

        Self {
            router: build_router(state.clone()),
            state,
            supplier_id,
            branch_id,
            fabric_id,
            thread_id,
            _event_task: event_task,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(value.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router response")
    }

    /// Creates the two-line order used throughout the lifecycle tests:
    /// 10 x 5.00 without tax and 5 x 2.00 with 1.00 flat tax.
    pub async fn create_standard_order(&self) -> Value {
        let response = self
            .request(
                Method::POST,
                "/api/v1/purchase-orders",
                Some(json!({
                    "supplier_id": self.supplier_id,
                    "branch_id": self.branch_id,
                    "expected_date": "2024-06-30",
                    "notes": "Spring collection",
                    "items": [
                        { "raw_material_id": self.fabric_id, "qty": 10, "unit_price": "5", "tax": "0" },
                        { "raw_material_id": self.thread_id, "qty": 5, "unit_price": "2", "tax": "1" }
                    ]
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response_json(response).await
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub async fn response_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

pub fn decimal_field(value: &Value) -> rust_decimal::Decimal {
    value
        .as_str()
        .expect("decimal serialized as string")
        .parse()
        .expect("decimal")
}
