//! PipelineBlueprint - Config Loader output
//!
//! Describes a complete relay deployment: service identity, feed
//! subscription, processor sizing and handler routing.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete relay configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PipelineBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Service identity
    #[serde(default)]
    #[validate(nested)]
    pub service: ServiceConfig,

    /// Feed subscription
    #[serde(default)]
    #[validate(nested)]
    pub feed: FeedConfig,

    /// Worker pool sizing and retry policy
    #[serde(default)]
    #[validate(nested)]
    pub processor: ProcessorConfig,

    /// Event type -> handler routing
    #[serde(default = "default_handlers")]
    #[validate(nested)]
    pub handlers: Vec<HandlerConfig>,
}

impl Default for PipelineBlueprint {
    fn default() -> Self {
        Self {
            version: ConfigVersion::default(),
            service: ServiceConfig::default(),
            feed: FeedConfig::default(),
            processor: ProcessorConfig::default(),
            handlers: default_handlers(),
        }
    }
}

/// Service identity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServiceConfig {
    /// Server identifier attached to every log line
    #[serde(default = "default_server_id")]
    #[validate(length(min = 1))]
    pub server_id: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server_id: default_server_id(),
        }
    }
}

/// Feed subscription settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedConfig {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    #[validate(length(min = 1))]
    pub redis_url: String,

    /// Broadcast channel name
    #[serde(default = "default_channel")]
    #[validate(length(min = 1))]
    pub channel: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            channel: default_channel(),
        }
    }
}

/// Processor sizing and retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProcessorConfig {
    /// Number of worker tasks (fixed for the processor lifetime)
    #[serde(default = "default_workers")]
    #[validate(range(max = 1024))]
    pub workers: usize,

    /// Bounded queue capacity
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1))]
    pub queue_capacity: usize,

    /// Retry attempts after the first dispatch
    #[serde(default = "default_max_retries")]
    #[validate(range(max = 100))]
    pub max_retries: u32,

    /// Base backoff delay in milliseconds (linear: base * attempt)
    #[serde(default = "default_retry_delay_ms")]
    #[validate(range(max = 60_000))]
    pub retry_delay_ms: u64,

    /// Also retry attempts whose handler reported an error
    ///
    /// Off by default: only a dispatch interrupted by shutdown is ever
    /// reconsidered, and that ends the loop.
    #[serde(default)]
    pub retry_handler_failures: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_handler_failures: false,
        }
    }
}

/// Routing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct HandlerConfig {
    /// Event type matched exactly against `Message::event_type`
    #[validate(length(min = 1))]
    pub event_type: String,

    /// Built-in handler implementation
    #[serde(default)]
    pub kind: HandlerKind,
}

/// Built-in handler implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    /// Log the message at info level
    #[default]
    Log,
    /// Accept and discard
    Noop,
}

/// Event type emitted by the demo publisher
pub const DEMO_EVENT_TYPE: &str = "demo.message";

/// Convert a `host:port` address into a redis URL
///
/// Values that already carry a scheme are returned unchanged.
pub fn redis_url_from_addr(addr: &str) -> String {
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("redis://{addr}")
    }
}

fn default_server_id() -> String {
    "unknown-server".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_channel() -> String {
    "broadcast.events".to_string()
}

fn default_workers() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    100
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

fn default_handlers() -> Vec<HandlerConfig> {
    vec![HandlerConfig {
        event_type: DEMO_EVENT_TYPE.to_string(),
        kind: HandlerKind::Log,
    }]
}
