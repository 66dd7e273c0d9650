//! Pipeline statistics.

use std::time::Duration;

use feed::FeedStats;
use observability::RelayMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Feed counters (received, submitted, rejected, invalid)
    pub feed: FeedStats,

    /// Messages taken off the queue and dispatched
    pub processed: u64,

    /// Messages dropped because the queue was full
    pub dropped: u64,

    /// Messages still queued when the workers exited
    pub abandoned: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Worker pool size
    pub workers: usize,

    /// Registered handlers
    pub handlers: usize,

    /// Periodic snapshot aggregator
    pub relay_metrics: RelayMetricsAggregator,
}

impl PipelineStats {
    /// Processed messages per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.processed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Pipeline Statistics ===\n");

        println!("Overview");
        println!("   Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   Workers: {}", self.workers);
        println!("   Handlers: {}", self.handlers);
        println!("   Throughput: {:.2} msg/s", self.throughput());

        println!("\nFeed");
        println!("   Received: {}", self.feed.received);
        println!("   Submitted: {}", self.feed.submitted);
        println!("   Rejected (queue full): {}", self.feed.rejected);
        println!("   Invalid: {}", self.feed.invalid);

        println!("\nProcessor");
        println!("   Processed: {}", self.processed);
        println!("   Dropped: {}", self.dropped);
        if self.abandoned > 0 {
            println!("   Abandoned at stop: {}", self.abandoned);
        }

        println!("\n{}", self.relay_metrics.summary());
    }
}
