//! Purchase order lifecycle API
//!
//! Drafting, approval, receiving and cancellation of supplier purchase orders,
//! with totals and CSV export for the procurement desk.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod commands;
pub mod config;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod reports;
pub mod repositories;
pub mod services;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{
    config::AppConfig,
    events::EventSender,
    repositories::{CatalogLookup, PurchaseOrderRepository},
    services::procurement::ProcurementService,
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Wires the procurement service over the given stores.
    pub fn new(
        config: AppConfig,
        repository: Arc<dyn PurchaseOrderRepository>,
        catalog: Arc<dyn CatalogLookup>,
        event_sender: EventSender,
    ) -> Self {
        let procurement = Arc::new(ProcurementService::new(
            repository,
            catalog,
            Arc::new(event_sender),
            config.po_number_prefix.clone(),
        ));

        Self {
            config: Arc::new(config),
            services: handlers::AppServices::new(procurement),
        }
    }
}

pub fn api_v1_routes() -> Router<AppState> {
    Router::new().nest(
        "/purchase-orders",
        handlers::purchase_orders::purchase_order_routes(),
    )
}

/// Full application router with request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
