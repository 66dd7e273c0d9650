//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Envelope wire format
//! - Feed -> Processor -> Dispatcher flow on the mock feed
//! - Backpressure and shutdown behaviour

#[cfg(test)]
mod support {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use contracts::{CancellationToken, ContractError, EventHandler, Message};
    use parking_lot::Mutex;

    /// Handler that remembers every message it saw
    #[derive(Default)]
    pub struct RecordingHandler {
        seen: Mutex<Vec<Message>>,
        delay: Option<Duration>,
    }

    impl RecordingHandler {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                delay: Some(delay),
            })
        }

        pub fn seen(&self) -> Vec<Message> {
            self.seen.lock().clone()
        }

        pub fn count(&self) -> usize {
            self.seen.lock().len()
        }
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        fn name(&self) -> &str {
            "recording"
        }

        async fn handle(
            &self,
            _cancel: &CancellationToken,
            message: &Message,
        ) -> Result<(), ContractError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.seen.lock().push(message.clone());
            Ok(())
        }
    }

    /// Handler that always fails
    pub struct FailingHandler;

    #[async_trait]
    impl EventHandler for FailingHandler {
        async fn handle(
            &self,
            _cancel: &CancellationToken,
            _message: &Message,
        ) -> Result<(), ContractError> {
            Err(ContractError::handler_failed("failing", "boom"))
        }
    }
}

#[cfg(test)]
mod contract_tests {
    use contracts::{Message, PipelineBlueprint};
    use serde_json::json;

    #[test]
    fn test_envelope_round_trip() {
        let message = Message::new("demo.message", "pub-1", json!({"counter": 1}));
        let decoded = Message::from_json(&message.to_json().unwrap()).unwrap();

        assert_eq!(decoded.id, message.id);
        assert_eq!(decoded.event_type, "demo.message");
        assert_eq!(decoded.source, "pub-1");
        assert_eq!(decoded.timestamp, message.timestamp);
        assert_eq!(decoded.payload, json!({"counter": 1}));
    }

    #[test]
    fn test_envelope_wire_field_names() {
        let message = Message::new("demo.message", "pub-1", json!(null));
        let value: serde_json::Value = serde_json::from_slice(&message.to_json().unwrap()).unwrap();

        assert!(value.get("type").is_some());
        assert!(value.get("event_type").is_none());
        assert!(value.get("timestamp").is_some());
    }

    #[test]
    fn test_legacy_source_spelling_accepted() {
        let raw = br#"{"id":"a","type":"demo.message","soruce":"old-pub","payload":{}}"#;
        let message = Message::from_json(raw).unwrap();
        assert_eq!(message.source, "old-pub");
    }

    #[test]
    fn test_default_blueprint_is_valid() {
        let blueprint = PipelineBlueprint::default();
        config_loader::ConfigLoader::validate(&blueprint).unwrap();
        assert_eq!(blueprint.handlers.len(), 1);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{CancellationToken, Message};
    use dispatcher::{DispatchOutcome, Dispatcher};
    use feed::{demo_messages, run_feed, MockFeed};
    use processor::{Processor, ProcessorError, ProcessorState};
    use serde_json::json;

    use crate::support::{FailingHandler, RecordingHandler};

    fn routed(event_type: &str, handler: Arc<RecordingHandler>) -> Arc<Dispatcher> {
        let dispatcher = Dispatcher::new();
        dispatcher.register(event_type, handler);
        Arc::new(dispatcher)
    }

    /// MockFeed -> Processor -> Dispatcher -> handler
    #[tokio::test]
    async fn test_e2e_mock_pipeline() {
        let handler = RecordingHandler::new();
        let processor = Processor::new(routed("demo.message", handler.clone()), 3, 10);
        let mut feed = MockFeed::new(demo_messages("e2e", 10));

        let stats = run_feed(&mut feed, &processor, &CancellationToken::new()).await;
        processor.stop().await;

        assert_eq!(stats.received, 10);
        assert_eq!(stats.submitted + stats.rejected, 10);

        let metrics = processor.metrics();
        assert_eq!(metrics.processed, stats.submitted);
        assert_eq!(metrics.dropped, stats.rejected);
        assert_eq!(handler.count() as u64, stats.submitted);

        let mut counters: Vec<u64> = handler
            .seen()
            .iter()
            .map(|m| m.payload["counter"].as_u64().unwrap())
            .collect();
        counters.sort_unstable();
        counters.dedup();
        assert_eq!(counters.len() as u64, stats.submitted);
    }

    #[tokio::test]
    async fn test_ten_messages_three_workers() {
        let handler = RecordingHandler::new();
        let processor = Processor::new(routed("t", handler.clone()), 3, 10);

        for i in 0..10 {
            processor
                .submit(Message::new("t", "test", json!({ "i": i })))
                .unwrap();
        }
        processor.stop().await;

        assert_eq!(processor.metrics().processed, 10);
        assert_eq!(processor.metrics().dropped, 0);
        assert_eq!(handler.count(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_ten_concurrent_submitters_three_workers() {
        let handler = RecordingHandler::slow(Duration::from_millis(5));
        let processor = Arc::new(Processor::new(routed("t", handler.clone()), 3, 10));

        let submitters: Vec<_> = (0..10)
            .map(|i| {
                let processor = Arc::clone(&processor);
                tokio::spawn(async move {
                    processor.submit(Message::new("t", "test", json!({ "i": i })))
                })
            })
            .collect();
        for submitter in submitters {
            submitter.await.unwrap().unwrap();
        }

        tokio::time::timeout(Duration::from_secs(2), async {
            while processor.metrics().processed < 10 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("workers did not process all messages in time");

        let metrics = processor.metrics();
        assert_eq!(metrics.processed, 10);
        assert_eq!(metrics.dropped, 0);
        assert_eq!(handler.count(), 10);
        assert_eq!(processor.state(), ProcessorState::Running);
        processor.stop().await;
    }

    #[tokio::test]
    async fn test_unrouted_type_counts_as_processed() {
        let handler = RecordingHandler::new();
        let processor = Processor::new(routed("known", handler.clone()), 1, 10);

        processor
            .submit(Message::new("unknown", "test", json!({})))
            .unwrap();
        processor.stop().await;

        assert_eq!(processor.metrics().processed, 1);
        assert_eq!(handler.count(), 0);
    }

    #[tokio::test]
    async fn test_handler_failure_does_not_stop_workers() {
        let dispatcher = Dispatcher::new();
        dispatcher.register("bad", Arc::new(FailingHandler));
        let good = RecordingHandler::new();
        dispatcher.register("good", good.clone());
        let processor = Processor::new(Arc::new(dispatcher), 1, 10);

        processor.submit(Message::new("bad", "test", json!({}))).unwrap();
        processor.submit(Message::new("good", "test", json!({}))).unwrap();
        processor.stop().await;

        assert_eq!(processor.metrics().processed, 2);
        assert_eq!(good.count(), 1);
    }

    #[tokio::test]
    async fn test_submit_after_stop_rejected() {
        let processor = Processor::new(routed("t", RecordingHandler::new()), 2, 10);
        processor.stop().await;

        let err = processor
            .submit(Message::new("t", "test", json!({})))
            .unwrap_err();
        assert_eq!(err, ProcessorError::NotAccepting);
        assert_eq!(processor.state(), ProcessorState::Stopped);
        assert_eq!(processor.metrics().processed, 0);
    }

    #[tokio::test]
    async fn test_queue_full_without_workers() {
        let processor = Processor::new(routed("t", RecordingHandler::new()), 0, 2);

        let results: Vec<_> = (0..3)
            .map(|_| processor.submit(Message::new("t", "test", json!({}))))
            .collect();

        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert_eq!(results[2], Err(ProcessorError::QueueFull));

        let metrics = processor.metrics();
        assert_eq!(metrics.dropped, 1);
        assert_eq!(metrics.queued, 2);
        processor.stop().await;
    }

    #[tokio::test]
    async fn test_backpressure_with_slow_handler() {
        let handler = RecordingHandler::slow(Duration::from_millis(20));
        let processor = Processor::new(routed("t", handler.clone()), 1, 2);

        let mut accepted = 0u64;
        let mut rejected = 0u64;
        for _ in 0..20 {
            match processor.submit(Message::new("t", "test", json!({}))) {
                Ok(()) => accepted += 1,
                Err(ProcessorError::QueueFull) => rejected += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        processor.stop().await;

        assert!(rejected > 0);
        let metrics = processor.metrics();
        assert_eq!(metrics.dropped, rejected);
        assert_eq!(metrics.processed, accepted);
        assert_eq!(handler.count() as u64, accepted);
    }

    #[tokio::test]
    async fn test_register_twice_last_wins() {
        let first = RecordingHandler::new();
        let second = RecordingHandler::new();
        let dispatcher = Dispatcher::new();
        dispatcher.register("t", first.clone());
        dispatcher.register("t", second.clone());

        let outcome = dispatcher
            .dispatch(
                &CancellationToken::new(),
                &Message::new("t", "test", json!({})),
            )
            .await;

        assert_eq!(outcome, DispatchOutcome::Delivered);
        assert_eq!(dispatcher.handler_count(), 1);
        assert_eq!(first.count(), 0);
        assert_eq!(second.count(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_mid_stream() {
        let handler = RecordingHandler::new();
        let processor = Processor::new(routed("demo.message", handler.clone()), 2, 16);
        let mut feed =
            MockFeed::new(demo_messages("e2e", 500)).with_interval(Duration::from_millis(5));
        let shutdown = CancellationToken::new();

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(60)).await;
            trigger.cancel();
        });

        let stats = run_feed(&mut feed, &processor, &shutdown).await;
        processor.stop().await;
        processor.stop().await;

        assert!(stats.received < 500);
        assert!(feed.remaining() > 0);
        assert_eq!(processor.metrics().processed, stats.submitted);
        assert_eq!(processor.state(), ProcessorState::Stopped);
    }
}
