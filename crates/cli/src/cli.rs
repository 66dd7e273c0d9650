//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Event Relay - consume broadcast events and route them to handlers
#[derive(Parser, Debug)]
#[command(
    name = "event-relay",
    author,
    version,
    about = "Redis pub/sub event relay with bounded worker pool",
    long_about = "Subscribes to a Redis broadcast channel, decodes event envelopes, \n\
                  queues them with drop-on-full backpressure and routes each one \n\
                  to the handler registered for its type."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "EVENT_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "json",
        global = true,
        env = "EVENT_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Subscribe to the channel and process events
    Run(RunArgs),

    /// Publish demo events to the channel
    Publish(PublishArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display the effective configuration
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "EVENT_RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override redis URL
    #[arg(long)]
    pub redis_url: Option<String>,

    /// Override broadcast channel
    #[arg(long)]
    pub channel: Option<String>,

    /// Override worker count
    #[arg(long)]
    pub workers: Option<usize>,

    /// Override queue capacity
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Feed N demo messages from memory instead of subscribing to redis
    #[arg(long, value_name = "N")]
    pub mock: Option<u64>,

    /// Delay between mock messages in milliseconds
    #[arg(long, default_value = "0")]
    pub mock_interval_ms: u64,

    /// Interval between metrics reports in seconds (0 = disabled)
    #[arg(long, default_value = "10", env = "EVENT_RELAY_REPORT_INTERVAL")]
    pub report_interval: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "EVENT_RELAY_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `publish` command
#[derive(Parser, Debug, Clone)]
pub struct PublishArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "EVENT_RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override redis URL
    #[arg(long)]
    pub redis_url: Option<String>,

    /// Override broadcast channel
    #[arg(long)]
    pub channel: Option<String>,

    /// Number of messages to publish
    #[arg(long, default_value = "5")]
    pub count: u64,

    /// Delay between messages in milliseconds
    #[arg(long, default_value = "2000")]
    pub interval_ms: u64,

    /// Source label; defaults to `SERVER_ID`, then "publisher"
    #[arg(long)]
    pub source: Option<String>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "relay.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; defaults apply when omitted
    #[arg(short, long, env = "EVENT_RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    #[default]
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    Compact,
}
