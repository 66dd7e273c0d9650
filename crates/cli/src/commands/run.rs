//! `run` command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use contracts::{CancellationToken, PipelineBlueprint};
use tracing::{info, info_span, warn, Instrument};

use super::{load_blueprint, shutdown_signal};
use crate::cli::RunArgs;
use crate::pipeline::{FeedMode, Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;
    apply_overrides(&mut blueprint, args);
    config_loader::ConfigLoader::validate(&blueprint)
        .context("Invalid configuration after CLI overrides")?;

    info!(
        server_id = %blueprint.service.server_id,
        channel = %blueprint.feed.channel,
        workers = blueprint.processor.workers,
        queue_capacity = blueprint.processor.queue_capacity,
        handlers = blueprint.handlers.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let server_id = blueprint.service.server_id.clone();
    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        feed: match args.mock {
            Some(count) => FeedMode::Mock {
                count,
                interval: Duration::from_millis(args.mock_interval_ms),
            },
            None => FeedMode::Redis,
        },
        report_interval: (args.report_interval > 0)
            .then(|| Duration::from_secs(args.report_interval)),
    });

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("shutdown signal received");
        signal_token.cancel();
    });

    let span = info_span!("subscriber", server_id = %server_id);
    let stats = pipeline
        .run(shutdown)
        .instrument(span)
        .await
        .context("Pipeline execution failed")?;

    info!(
        received = stats.feed.received,
        processed = stats.processed,
        dropped = stats.dropped,
        duration_secs = stats.duration.as_secs_f64(),
        throughput = format!("{:.2}", stats.throughput()),
        "Pipeline completed"
    );
    stats.print_summary();

    Ok(())
}

/// Apply CLI flags on top of file and environment values
fn apply_overrides(blueprint: &mut PipelineBlueprint, args: &RunArgs) {
    if let Some(ref url) = args.redis_url {
        info!(redis_url = %url, "Overriding redis url from CLI");
        blueprint.feed.redis_url = url.clone();
    }
    if let Some(ref channel) = args.channel {
        info!(channel = %channel, "Overriding channel from CLI");
        blueprint.feed.channel = channel.clone();
    }
    if let Some(workers) = args.workers {
        blueprint.processor.workers = workers;
    }
    if let Some(capacity) = args.queue_capacity {
        blueprint.processor.queue_capacity = capacity;
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &PipelineBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Service:");
    println!("  Server ID: {}", blueprint.service.server_id);
    println!("\nFeed:");
    println!("  Redis: {}", blueprint.feed.redis_url);
    println!("  Channel: {}", blueprint.feed.channel);
    println!("\nProcessor:");
    println!("  Workers: {}", blueprint.processor.workers);
    println!("  Queue capacity: {}", blueprint.processor.queue_capacity);
    println!(
        "  Retries: {} (base delay {}ms)",
        blueprint.processor.max_retries, blueprint.processor.retry_delay_ms
    );
    println!(
        "  Retry handler failures: {}",
        blueprint.processor.retry_handler_failures
    );
    println!("\nHandlers ({}):", blueprint.handlers.len());
    for handler in &blueprint.handlers {
        println!("  - {} -> {:?}", handler.event_type, handler.kind);
    }
    println!();
}
