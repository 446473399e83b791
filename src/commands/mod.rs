use crate::{
    errors::ServiceError, events::EventSender, repositories::PurchaseOrderRepository,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Command trait for implementing the Command Pattern
///
/// This trait allows for encapsulating all the logic needed to execute a business operation
/// into a single object that can be validated, executed, and produce events.
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully
    type Result;

    /// Execute the command with the given dependencies
    ///
    /// # Arguments
    /// * `repository` - Purchase order persistence
    /// * `event_sender` - Channel to publish domain events
    async fn execute(
        &self,
        repository: Arc<dyn PurchaseOrderRepository>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError>;
}

pub mod purchaseorders;
