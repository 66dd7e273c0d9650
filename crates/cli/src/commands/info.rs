//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::PipelineBlueprint;
use dispatcher::Dispatcher;
use tracing::info;

use super::load_blueprint;
use crate::cli::InfoArgs;

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let blueprint = load_blueprint(args.config.as_deref())?;
    info!(
        config = ?args.config,
        "Showing effective configuration"
    );

    if args.json {
        let json = config_loader::ConfigLoader::to_json(&blueprint)
            .context("Failed to serialize configuration")?;
        println!("{}", json);
    } else {
        print_info(&blueprint);
    }

    Ok(())
}

fn print_info(blueprint: &PipelineBlueprint) {
    let dispatcher = Dispatcher::from_config(&blueprint.handlers);

    println!("\n=== Event Relay ===\n");
    println!("Version: {:?}", blueprint.version);
    println!("Server ID: {}", blueprint.service.server_id);
    println!("\nFeed:");
    println!("  Redis URL: {}", blueprint.feed.redis_url);
    println!("  Channel: {}", blueprint.feed.channel);
    println!("\nProcessor:");
    println!("  Workers: {}", blueprint.processor.workers);
    println!("  Queue capacity: {}", blueprint.processor.queue_capacity);
    println!("  Max retries: {}", blueprint.processor.max_retries);
    println!("  Retry delay: {}ms", blueprint.processor.retry_delay_ms);
    println!(
        "  Retry handler failures: {}",
        blueprint.processor.retry_handler_failures
    );
    println!("\nRouted event types ({}):", dispatcher.handler_count());
    for event_type in dispatcher.event_types() {
        println!("  - {}", event_type);
    }
    println!();
}
