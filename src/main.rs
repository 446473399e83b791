use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::{signal, sync::mpsc};
use tracing::{error, info};

use procurement_api as api;
use api::repositories::{
    CatalogLookup, CatalogSeed, InMemoryCatalog, InMemoryPurchaseOrderRepository,
    PurchaseOrderRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config().context("failed to load configuration")?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let catalog = match cfg.catalog_seed_path.as_deref() {
        Some(path) => {
            let seed = CatalogSeed::from_file(path)
                .with_context(|| format!("failed to load catalog seed from {}", path))?;
            info!(
                suppliers = seed.suppliers.len(),
                branches = seed.branches.len(),
                raw_materials = seed.raw_materials.len(),
                "Catalog seeded"
            );
            InMemoryCatalog::from_seed(seed)
        }
        None => {
            info!("No catalog seed configured; starting with an empty catalog");
            InMemoryCatalog::new()
        }
    };
    let catalog: Arc<dyn CatalogLookup> = Arc::new(catalog);
    let repository: Arc<dyn PurchaseOrderRepository> =
        Arc::new(InMemoryPurchaseOrderRepository::new());

    // Init events
    let (event_tx, event_rx) = mpsc::channel(cfg.event_channel_capacity);
    let event_sender = api::events::EventSender::new(event_tx);
    tokio::spawn(api::events::process_events(event_rx));

    let addr: SocketAddr = cfg
        .bind_address()
        .parse()
        .with_context(|| format!("invalid bind address {}", cfg.bind_address()))?;

    let app = api::build_router(api::AppState::new(cfg, repository, catalog, event_sender));

    info!("procurement-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
