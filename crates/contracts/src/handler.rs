//! EventHandler trait - Dispatcher output interface

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{ContractError, Message};

/// Handler capability
///
/// Consumes one [`Message`] and reports success or failure. Handlers are
/// selected by event type and may be invoked concurrently from several
/// workers, so implementations must be `Send + Sync`.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handler name (used for logging)
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Handle a single message
    ///
    /// `cancel` fires when the processor is shutting down.
    ///
    /// # Errors
    /// Returns handler failure (should include context). Failures are logged
    /// by the dispatcher and never propagated further.
    async fn handle(&self, cancel: &CancellationToken, message: &Message)
        -> Result<(), ContractError>;
}
