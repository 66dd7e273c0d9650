//! `publish` command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use config_loader::EnvOverrides;
use feed::{demo_message, RedisPublisher};
use tracing::{error, info, warn};

use super::{load_blueprint, shutdown_signal};
use crate::cli::PublishArgs;

/// Source label when neither `--source` nor `SERVER_ID` is set
const DEFAULT_PUBLISHER_SOURCE: &str = "publisher";

/// Execute the `publish` command
pub async fn run_publish(args: &PublishArgs) -> Result<()> {
    let blueprint = load_blueprint(args.config.as_deref())?;
    let redis_url = args
        .redis_url
        .clone()
        .unwrap_or_else(|| blueprint.feed.redis_url.clone());
    let channel = args
        .channel
        .clone()
        .unwrap_or_else(|| blueprint.feed.channel.clone());
    let source = publisher_source(
        args.source.as_deref(),
        &EnvOverrides::from_process_env(),
    );

    let publisher = RedisPublisher::connect(&redis_url)
        .await
        .with_context(|| format!("Failed to connect to redis at {redis_url}"))?;

    info!(channel = %channel, source = %source, count = args.count, "Publishing demo messages");

    let interval = Duration::from_millis(args.interval_ms);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    for counter in 1..=args.count {
        let message = demo_message(&source, counter);
        match publisher.publish(&channel, &message).await {
            Ok(receivers) => info!(
                event_id = %message.id,
                event_type = %message.event_type,
                receivers,
                "message published"
            ),
            Err(e) => error!(event_id = %message.id, error = %e, "failed to publish message"),
        }

        if counter < args.count {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut shutdown => {
                    warn!(published = counter, "shutdown signal received, stopping publisher");
                    break;
                }
            }
        }
    }

    Ok(())
}

/// `--source`, then `SERVER_ID`, then the fixed publisher label
fn publisher_source(cli_source: Option<&str>, env: &EnvOverrides) -> String {
    cli_source
        .map(str::to_string)
        .or_else(|| env.server_id.clone())
        .unwrap_or_else(|| DEFAULT_PUBLISHER_SOURCE.to_string())
}
