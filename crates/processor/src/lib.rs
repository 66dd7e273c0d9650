//! # Processor
//!
//! Bounded work queue serviced by a fixed worker pool.
//!
//! Responsibilities:
//! - Admission control: drop-on-full, never block the submitter
//! - Drive each dequeued `Message` through the `Dispatcher`
//! - Retry with linear backoff, preemptible by shutdown
//! - Graceful shutdown: stop accepting, drain, join workers
//! - Point-in-time metrics

pub mod error;
pub mod metrics;
pub mod processor;
pub mod retry;
mod worker;

pub use error::ProcessorError;
pub use metrics::{ProcessorMetrics, ProcessorMetricsSnapshot};
pub use processor::{Processor, ProcessorState};
pub use retry::{RetryOutcome, RetryPolicy};
