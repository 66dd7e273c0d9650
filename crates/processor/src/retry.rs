//! Retry policy and the per-message retry loop
//!
//! An attempt that returns after shutdown has begun ends the loop as
//! abandoned. Otherwise the attempt is final unless the policy opts into
//! retrying handler failures.

use std::time::Duration;

use contracts::{CancellationToken, Message, ProcessorConfig};
use dispatcher::{DispatchOutcome, Dispatcher};
use observability::{record_retry, record_retry_exhausted};
use tracing::{debug, error, warn};

/// Linear backoff policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first dispatch
    pub max_retries: u32,
    /// Delay unit; attempt `n` waits `base_delay * n`
    pub base_delay: Duration,
    /// Retry when the handler reports an error
    pub retry_handler_failures: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            retry_handler_failures: false,
        }
    }
}

impl From<&ProcessorConfig> for RetryPolicy {
    fn from(config: &ProcessorConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_delay_ms),
            retry_handler_failures: config.retry_handler_failures,
        }
    }
}

impl RetryPolicy {
    /// Backoff before `attempt` (0 for the first attempt), saturating
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    fn should_retry(&self, outcome: DispatchOutcome) -> bool {
        self.retry_handler_failures && outcome == DispatchOutcome::HandlerFailed
    }
}

/// How the retry loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    /// An attempt returned while running and needed no retry
    Completed,
    /// Shutdown began during an attempt or a backoff wait
    Abandoned,
    /// Every attempt failed with handler-failure retries enabled
    Exhausted,
}

/// Dispatch a message, retrying per `policy`
pub(crate) async fn process_with_retry(
    dispatcher: &Dispatcher,
    cancel: &CancellationToken,
    policy: RetryPolicy,
    message: &Message,
) -> RetryOutcome {
    for attempt in 0..=policy.max_retries {
        if attempt > 0 {
            tokio::select! {
                _ = cancel.cancelled() => return RetryOutcome::Abandoned,
                _ = tokio::time::sleep(policy.delay_for(attempt)) => {}
            }
            record_retry(attempt);
        }

        let outcome = dispatcher.dispatch(cancel, message).await;
        if cancel.is_cancelled() {
            debug!(event_id = %message.id, attempt, "dispatch returned during shutdown");
            return RetryOutcome::Abandoned;
        }
        if !policy.should_retry(outcome) {
            return RetryOutcome::Completed;
        }

        if attempt < policy.max_retries {
            warn!(
                event_id = %message.id,
                attempt = attempt + 1,
                max_retries = policy.max_retries,
                "dispatch failed, retrying"
            );
        }
    }

    record_retry_exhausted();
    error!(
        event_id = %message.id,
        max_retries = policy.max_retries,
        "dispatch failed after retries"
    );
    RetryOutcome::Exhausted
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use contracts::{ContractError, EventHandler};
    use dispatcher::NoopHandler;
    use serde_json::Value;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    /// Fails the first `fail_first` calls
    struct CountingHandler {
        calls: AtomicU64,
        fail_first: u64,
        cancel_on_call: Option<CancellationToken>,
    }

    impl CountingHandler {
        fn new() -> Self {
            Self {
                calls: AtomicU64::new(0),
                fail_first: 0,
                cancel_on_call: None,
            }
        }

        fn failing(fail_first: u64) -> Self {
            Self {
                fail_first,
                ..Self::new()
            }
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _: &CancellationToken, _: &Message) -> Result<(), ContractError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(token) = &self.cancel_on_call {
                token.cancel();
            }
            if call <= self.fail_first {
                return Err(ContractError::handler_failed("counting", "mock failure"));
            }
            Ok(())
        }
    }

    fn setup(handler: Arc<dyn EventHandler>) -> (Dispatcher, Message) {
        let dispatcher = Dispatcher::new();
        dispatcher.register("t", handler);
        (dispatcher, Message::new("t", "test", Value::Null))
    }

    fn retrying(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
            retry_handler_failures: true,
        }
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::ZERO);
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(3), Duration::from_millis(300));
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = RetryPolicy {
            base_delay: Duration::MAX,
            ..Default::default()
        };
        assert_eq!(policy.delay_for(2), Duration::MAX);
    }

    #[test]
    fn test_policy_from_config() {
        let config = ProcessorConfig {
            max_retries: 5,
            retry_delay_ms: 20,
            retry_handler_failures: true,
            ..Default::default()
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(20));
        assert!(policy.retry_handler_failures);
    }

    #[tokio::test]
    async fn test_completes_after_single_attempt() {
        let handler = Arc::new(CountingHandler::new());
        let (dispatcher, msg) = setup(handler.clone());

        let outcome =
            process_with_retry(&dispatcher, &CancellationToken::new(), RetryPolicy::default(), &msg)
                .await;

        assert_eq!(outcome, RetryOutcome::Completed);
        assert_eq!(handler.calls(), 1);
    }

    #[tokio::test]
    async fn test_handler_error_not_retried_by_default() {
        let handler = Arc::new(CountingHandler::failing(u64::MAX));
        let (dispatcher, msg) = setup(handler.clone());

        let outcome =
            process_with_retry(&dispatcher, &CancellationToken::new(), RetryPolicy::default(), &msg)
                .await;

        assert_eq!(outcome, RetryOutcome::Completed);
        assert_eq!(handler.calls(), 1);
    }

    #[tokio::test]
    async fn test_handler_error_retried_until_success() {
        let handler = Arc::new(CountingHandler::failing(2));
        let (dispatcher, msg) = setup(handler.clone());

        let outcome =
            process_with_retry(&dispatcher, &CancellationToken::new(), retrying(3), &msg).await;

        assert_eq!(outcome, RetryOutcome::Completed);
        assert_eq!(handler.calls(), 3);
    }

    #[tokio::test]
    async fn test_handler_error_exhausts_retries() {
        let handler = Arc::new(CountingHandler::failing(u64::MAX));
        let (dispatcher, msg) = setup(handler.clone());

        let outcome =
            process_with_retry(&dispatcher, &CancellationToken::new(), retrying(2), &msg).await;

        assert_eq!(outcome, RetryOutcome::Exhausted);
        assert_eq!(handler.calls(), 3);
    }

    #[tokio::test]
    async fn test_cancellation_during_dispatch_is_abandoned() {
        let cancel = CancellationToken::new();
        let handler = Arc::new(CountingHandler {
            cancel_on_call: Some(cancel.clone()),
            ..CountingHandler::new()
        });
        let (dispatcher, msg) = setup(handler.clone());

        let outcome = process_with_retry(&dispatcher, &cancel, RetryPolicy::default(), &msg).await;

        assert_eq!(outcome, RetryOutcome::Abandoned);
        assert_eq!(handler.calls(), 1);
    }

    #[tokio::test]
    async fn test_already_cancelled_without_retries_is_abandoned() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (dispatcher, msg) = setup(Arc::new(NoopHandler));
        let policy = RetryPolicy {
            max_retries: 0,
            ..Default::default()
        };

        let outcome = process_with_retry(&dispatcher, &cancel, policy, &msg).await;

        assert_eq!(outcome, RetryOutcome::Abandoned);
    }

    #[tokio::test]
    async fn test_cancellation_during_backoff_is_abandoned() {
        let handler = Arc::new(CountingHandler::failing(u64::MAX));
        let (dispatcher, msg) = setup(handler.clone());
        let policy = RetryPolicy {
            base_delay: Duration::from_secs(10),
            ..retrying(3)
        };
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let outcome = process_with_retry(&dispatcher, &cancel, policy, &msg).await;

        assert_eq!(outcome, RetryOutcome::Abandoned);
        assert_eq!(handler.calls(), 1);
    }
}
