//! Pipeline orchestrator - wires feed, processor and dispatcher together.
//!
//! Runs against redis pub/sub or, with `FeedMode::Mock`, against an
//! in-memory list of demo messages.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{CancellationToken, PipelineBlueprint};
use dispatcher::Dispatcher;
use feed::{demo_messages, run_feed, EventFeed, MockFeed, RedisFeed};
use observability::{record_queue_depth, RelayMetricsAggregator};
use processor::Processor;
use tracing::{info, warn};

use super::PipelineStats;

/// Where messages come from
#[derive(Debug, Clone)]
pub enum FeedMode {
    /// Subscribe to the configured redis channel
    Redis,
    /// Replay `count` demo messages with `interval` between them
    Mock { count: u64, interval: Duration },
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Effective relay configuration
    pub blueprint: PipelineBlueprint,

    /// Message source
    pub feed: FeedMode,

    /// Interval between metrics reports (None = disabled)
    pub report_interval: Option<Duration>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until the feed ends or `shutdown` fires, then drain and stop
    pub async fn run(self, shutdown: CancellationToken) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        let dispatcher = Arc::new(Dispatcher::from_config(&blueprint.handlers));
        if dispatcher.handler_count() == 0 {
            warn!("No handlers configured - every message will be unrouted");
        }

        // Connect before starting workers so a bad address fails fast
        let mut feed = self.open_feed().await?;

        let processor = Processor::with_config(dispatcher.clone(), &blueprint.processor);
        info!(
            workers = processor.worker_count(),
            queue_capacity = processor.capacity(),
            handlers = dispatcher.handler_count(),
            feed = %feed.name(),
            "Pipeline running"
        );

        let mut aggregator = RelayMetricsAggregator::new();
        let report_stop = CancellationToken::new();

        let feed_task = async {
            let stats = run_feed(feed.as_mut(), &processor, &shutdown).await;
            report_stop.cancel();
            stats
        };
        let report_task = report_metrics(
            &processor,
            self.config.report_interval,
            &report_stop,
            &mut aggregator,
        );
        let (feed_stats, ()) = tokio::join!(feed_task, report_task);

        info!("Shutting down pipeline...");
        processor.stop().await;

        let snapshot = processor.metrics();
        aggregator.update(snapshot.processed, snapshot.dropped, snapshot.queued);

        let stats = PipelineStats {
            feed: feed_stats,
            processed: snapshot.processed,
            dropped: snapshot.dropped,
            abandoned: snapshot.queued as u64,
            duration: start_time.elapsed(),
            workers: processor.worker_count(),
            handlers: dispatcher.handler_count(),
            relay_metrics: aggregator,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            throughput = format!("{:.2}", stats.throughput()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }

    async fn open_feed(&self) -> Result<Box<dyn EventFeed>> {
        let blueprint = &self.config.blueprint;

        match self.config.feed {
            FeedMode::Mock { count, interval } => {
                info!(count, "Running in MOCK mode (no redis required)");
                let messages = demo_messages(&blueprint.service.server_id, count);
                Ok(Box::new(MockFeed::new(messages).with_interval(interval)))
            }
            FeedMode::Redis => {
                info!(
                    redis_url = %blueprint.feed.redis_url,
                    channel = %blueprint.feed.channel,
                    "Connecting to redis..."
                );
                let feed = RedisFeed::connect(&blueprint.feed.redis_url, &blueprint.feed.channel)
                    .await
                    .with_context(|| {
                        format!("Failed to connect to redis at {}", blueprint.feed.redis_url)
                    })?;
                Ok(Box::new(feed))
            }
        }
    }
}

/// Sample processor metrics until `stop` fires
async fn report_metrics(
    processor: &Processor,
    interval: Option<Duration>,
    stop: &CancellationToken,
    aggregator: &mut RelayMetricsAggregator,
) {
    let Some(period) = interval else {
        stop.cancelled().await;
        return;
    };

    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = ticker.tick() => {
                let snapshot = processor.metrics();
                record_queue_depth(snapshot.queued);
                aggregator.update(snapshot.processed, snapshot.dropped, snapshot.queued);
                info!(
                    processed = snapshot.processed,
                    dropped = snapshot.dropped,
                    queued = snapshot.queued,
                    "relay metrics"
                );
            }
        }
    }
}
