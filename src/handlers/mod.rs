pub mod common;
pub mod purchase_orders;

use crate::services::procurement::ProcurementService;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub procurement: Arc<ProcurementService>,
}

impl AppServices {
    pub fn new(procurement: Arc<ProcurementService>) -> Self {
        Self { procurement }
    }
}
