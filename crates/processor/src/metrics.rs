//! Processor counters

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters shared by the submitter side and all workers
#[derive(Debug, Default)]
pub struct ProcessorMetrics {
    /// Messages that left the worker loop (routed or not)
    processed: AtomicU64,
    /// Messages rejected because the queue was full
    dropped: AtomicU64,
}

impl ProcessorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Increment processed count, returning the new total
    pub fn inc_processed(&self) -> u64 {
        self.processed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Increment dropped count, returning the new total
    pub fn inc_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Snapshot with the given queue depth
    pub fn snapshot(&self, queued: usize) -> ProcessorMetricsSnapshot {
        ProcessorMetricsSnapshot {
            processed: self.processed(),
            dropped: self.dropped(),
            queued,
        }
    }
}

/// Best-effort point-in-time view
///
/// Fields are read independently and are not mutually consistent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorMetricsSnapshot {
    pub processed: u64,
    pub dropped: u64,
    pub queued: usize,
}

impl ProcessorMetricsSnapshot {
    /// Keyed view: `processed`, `dropped`, `queued`
    pub fn as_map(&self) -> BTreeMap<&'static str, u64> {
        BTreeMap::from([
            ("processed", self.processed),
            ("dropped", self.dropped),
            ("queued", self.queued as u64),
        ])
    }
}
