//! LogHandler - logs each message via tracing

use async_trait::async_trait;
use contracts::{CancellationToken, ContractError, EventHandler, Message};
use tracing::info;

/// Handler that logs the envelope and payload
#[derive(Debug, Default)]
pub struct LogHandler;

impl LogHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventHandler for LogHandler {
    fn name(&self) -> &str {
        "log"
    }

    async fn handle(
        &self,
        _cancel: &CancellationToken,
        message: &Message,
    ) -> Result<(), ContractError> {
        info!(
            id = %message.id,
            event_type = %message.event_type,
            source = %message.source,
            payload = %message.payload,
            "{} handled",
            message.event_type
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_log_handler_accepts_any_payload() {
        let handler = LogHandler::new();
        let cancel = CancellationToken::new();

        for payload in [json!(null), json!(42), json!({"counter": 1, "text": "hi"})] {
            let msg = Message::new("demo.message", "test", payload);
            assert!(handler.handle(&cancel, &msg).await.is_ok());
        }
    }

    #[test]
    fn test_log_handler_name() {
        assert_eq!(LogHandler::new().name(), "log");
    }
}
