//! Processor - bounded queue, worker pool, admission control, shutdown

use std::sync::Arc;

use async_channel::{bounded, Sender, TrySendError};
use contracts::{CancellationToken, Message, ProcessorConfig};
use dispatcher::Dispatcher;
use observability::{record_dropped, record_queue_depth};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::error::ProcessorError;
use crate::metrics::{ProcessorMetrics, ProcessorMetricsSnapshot};
use crate::retry::RetryPolicy;
use crate::worker::{run_worker, WorkerContext};

/// Lifecycle state
///
/// `Running -> Stopping -> Stopped`; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Running,
    Stopping,
    Stopped,
}

/// Bounded-queue worker pool feeding a [`Dispatcher`]
///
/// Workers are spawned on construction, so `new` must be called from
/// within a Tokio runtime.
pub struct Processor {
    tx: Sender<Message>,
    cancel: CancellationToken,
    metrics: Arc<ProcessorMetrics>,
    state: Mutex<ProcessorState>,
    /// Held across the join in `stop` so concurrent callers wait for it
    workers: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
    capacity: usize,
}

impl Processor {
    /// Create a processor with the default retry policy
    ///
    /// A capacity of 0 is raised to 1.
    pub fn new(dispatcher: Arc<Dispatcher>, workers: usize, queue_capacity: usize) -> Self {
        Self::with_policy(dispatcher, workers, queue_capacity, RetryPolicy::default())
    }

    /// Create a processor from configuration
    pub fn with_config(dispatcher: Arc<Dispatcher>, config: &ProcessorConfig) -> Self {
        Self::with_policy(
            dispatcher,
            config.workers,
            config.queue_capacity,
            RetryPolicy::from(config),
        )
    }

    /// Create a processor with an explicit retry policy
    #[instrument(name = "processor_new", skip(dispatcher, policy))]
    pub fn with_policy(
        dispatcher: Arc<Dispatcher>,
        workers: usize,
        queue_capacity: usize,
        policy: RetryPolicy,
    ) -> Self {
        let capacity = queue_capacity.max(1);
        let (tx, rx) = bounded(capacity);
        let cancel = CancellationToken::new();
        let metrics = Arc::new(ProcessorMetrics::new());

        let ctx = WorkerContext {
            rx,
            dispatcher,
            cancel: cancel.clone(),
            metrics: Arc::clone(&metrics),
            policy,
        };

        let handles = (0..workers)
            .map(|id| tokio::spawn(run_worker(id, ctx.clone())))
            .collect();

        info!(
            workers,
            queue_capacity = capacity,
            max_retries = policy.max_retries,
            retry_delay_ms = policy.base_delay.as_millis() as u64,
            retry_handler_failures = policy.retry_handler_failures,
            "processor started"
        );

        Self {
            tx,
            cancel,
            metrics,
            state: Mutex::new(ProcessorState::Running),
            workers: tokio::sync::Mutex::new(handles),
            worker_count: workers,
            capacity,
        }
    }

    /// Non-blocking admission
    ///
    /// # Errors
    /// - [`ProcessorError::NotAccepting`] once `stop` has begun
    /// - [`ProcessorError::QueueFull`] when the queue is at capacity; the
    ///   message is dropped and counted
    pub fn submit(&self, message: Message) -> Result<(), ProcessorError> {
        if self.cancel.is_cancelled() {
            return Err(ProcessorError::NotAccepting);
        }

        match self.tx.try_send(message) {
            Ok(()) => {
                record_queue_depth(self.tx.len());
                Ok(())
            }
            Err(TrySendError::Full(message)) => {
                let total_dropped = self.metrics.inc_dropped();
                record_dropped();
                warn!(
                    event_id = %message.id,
                    total_dropped,
                    "message dropped, queue full"
                );
                Err(ProcessorError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => Err(ProcessorError::NotAccepting),
        }
    }

    /// Stop accepting, drain the queue, and join every worker
    ///
    /// Idempotent; a concurrent or repeated call returns once the first
    /// call has finished joining.
    #[instrument(name = "processor_stop", skip(self))]
    pub async fn stop(&self) {
        let mut workers = self.workers.lock().await;
        if *self.state.lock() == ProcessorState::Stopped {
            return;
        }

        info!(
            processed = self.metrics.processed(),
            dropped = self.metrics.dropped(),
            queued = self.tx.len(),
            "processor stopping, draining queue"
        );
        *self.state.lock() = ProcessorState::Stopping;

        self.cancel.cancel();
        self.tx.close();

        // Handles are popped only once joined, so a stop future dropped
        // mid-join leaves the rest for the next call.
        while let Some(handle) = workers.last_mut() {
            let result = handle.await;
            workers.pop();
            if let Err(e) = result {
                error!(error = ?e, "worker task panicked");
            }
        }

        *self.state.lock() = ProcessorState::Stopped;
        record_queue_depth(self.tx.len());
        info!(
            total_processed = self.metrics.processed(),
            total_dropped = self.metrics.dropped(),
            abandoned = self.tx.len(),
            "processor stopped"
        );
    }

    /// Point-in-time metrics
    pub fn metrics(&self) -> ProcessorMetricsSnapshot {
        self.metrics.snapshot(self.tx.len())
    }

    /// Current lifecycle state
    pub fn state(&self) -> ProcessorState {
        *self.state.lock()
    }

    /// Number of worker tasks
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
