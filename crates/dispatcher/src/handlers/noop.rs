//! NoopHandler - accepts and discards

use async_trait::async_trait;
use contracts::{CancellationToken, ContractError, EventHandler, Message};

/// Handler that drops every message
#[derive(Debug, Default)]
pub struct NoopHandler;

#[async_trait]
impl EventHandler for NoopHandler {
    fn name(&self) -> &str {
        "noop"
    }

    async fn handle(&self, _: &CancellationToken, _: &Message) -> Result<(), ContractError> {
        Ok(())
    }
}
