//! Relay metrics
//!
//! Prometheus recording helpers plus an in-memory aggregator for the
//! end-of-run summary.

use metrics::{counter, gauge, histogram};

/// Outcome label for `event_relay_dispatch_total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcomeLabel {
    Delivered,
    NoHandler,
    HandlerFailed,
}

impl DispatchOutcomeLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::NoHandler => "no_handler",
            Self::HandlerFailed => "handler_failed",
        }
    }
}

/// Record a handler registration
pub fn record_handler_registered(event_type: &str) {
    counter!(
        "event_relay_handlers_registered_total",
        "event_type" => event_type.to_string()
    )
    .increment(1);
}

/// Record one dispatch attempt and its outcome
pub fn record_dispatch(event_type: &str, outcome: DispatchOutcomeLabel) {
    counter!(
        "event_relay_dispatch_total",
        "event_type" => event_type.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Record handler latency
pub fn record_dispatch_latency_ms(event_type: &str, latency_ms: f64) {
    histogram!(
        "event_relay_dispatch_latency_ms",
        "event_type" => event_type.to_string()
    )
    .record(latency_ms);
}

/// Record a message leaving the worker loop
pub fn record_processed() {
    counter!("event_relay_processed_total").increment(1);
}

/// Record an admission drop
pub fn record_dropped() {
    counter!("event_relay_dropped_total").increment(1);
}

/// Record current queue depth
pub fn record_queue_depth(depth: usize) {
    gauge!("event_relay_queue_depth").set(depth as f64);
}

/// Record a retry attempt
pub fn record_retry(attempt: u32) {
    counter!("event_relay_retries_total").increment(1);
    gauge!("event_relay_last_retry_attempt").set(f64::from(attempt));
}

/// Record a message whose retries were exhausted
pub fn record_retry_exhausted() {
    counter!("event_relay_retries_exhausted_total").increment(1);
}

/// Record an undecodable feed frame
pub fn record_feed_invalid() {
    counter!("event_relay_feed_invalid_total").increment(1);
}

/// Aggregates periodic processor snapshots in memory
#[derive(Debug, Clone, Default)]
pub struct RelayMetricsAggregator {
    /// Snapshots observed
    pub samples: u64,

    /// Last processed total
    pub processed: u64,

    /// Last dropped total
    pub dropped: u64,

    /// Queue depth statistics
    pub queue_depth: RunningStats,
}

impl RelayMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one snapshot
    pub fn update(&mut self, processed: u64, dropped: u64, queued: usize) {
        self.samples += 1;
        self.processed = processed;
        self.dropped = dropped;
        self.queue_depth.push(queued as f64);
    }

    pub fn summary(&self) -> MetricsSummary {
        let total = self.processed + self.dropped;
        MetricsSummary {
            samples: self.samples,
            processed: self.processed,
            dropped: self.dropped,
            drop_rate: if total > 0 {
                self.dropped as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            queue_depth: StatsSummary::from(&self.queue_depth),
        }
    }
}

/// Aggregated summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub samples: u64,
    pub processed: u64,
    pub dropped: u64,
    pub drop_rate: f64,
    pub queue_depth: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Relay Metrics Summary ===")?;
        writeln!(f, "Processed: {}", self.processed)?;
        writeln!(f, "Dropped: {} ({:.2}%)", self.dropped, self.drop_rate)?;
        writeln!(f, "Queue depth: {}", self.queue_depth)?;
        writeln!(f, "Samples: {}", self.samples)
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
