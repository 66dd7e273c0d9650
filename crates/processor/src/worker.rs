//! Worker task: pull from the shared queue, dispatch with retry

use std::sync::Arc;

use async_channel::Receiver;
use contracts::{CancellationToken, Message};
use dispatcher::Dispatcher;
use observability::{record_processed, record_queue_depth};
use tracing::{debug, info, instrument};

use crate::metrics::ProcessorMetrics;
use crate::retry::{process_with_retry, RetryPolicy};

/// Everything a worker needs, cloned once per task
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub rx: Receiver<Message>,
    pub dispatcher: Arc<Dispatcher>,
    pub cancel: CancellationToken,
    pub metrics: Arc<ProcessorMetrics>,
    pub policy: RetryPolicy,
}

/// Worker loop
///
/// Buffered items win over the cancellation signal, so a stopping
/// processor drains what was accepted before the queue closed. The loop
/// ends on cancellation with an empty queue, or on queue closure.
#[instrument(name = "processor_worker_loop", skip(ctx), fields(worker_id = id))]
pub(crate) async fn run_worker(id: usize, ctx: WorkerContext) {
    info!(worker_id = id, "worker started");

    loop {
        tokio::select! {
            biased;

            received = ctx.rx.recv() => {
                let Ok(message) = received else {
                    info!(worker_id = id, "worker queue closed");
                    break;
                };

                let outcome =
                    process_with_retry(&ctx.dispatcher, &ctx.cancel, ctx.policy, &message).await;
                let processed = ctx.metrics.inc_processed();
                record_processed();
                record_queue_depth(ctx.rx.len());

                debug!(
                    worker_id = id,
                    event_id = %message.id,
                    outcome = ?outcome,
                    processed,
                    "message processed"
                );
            }
            _ = ctx.cancel.cancelled() => {
                info!(worker_id = id, "worker stopping");
                break;
            }
        }
    }
}
