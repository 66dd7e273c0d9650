//! Environment overrides
//!
//! Empty variables count as unset and leave the configured value alone.

use contracts::{redis_url_from_addr, PipelineBlueprint};
use tracing::info;

/// Redis address as `host:port`
pub const ENV_REDIS_ADDR: &str = "REDIS_ADDR";
/// Broadcast channel
pub const ENV_CHANNEL_NAME: &str = "CHANNEL_NAME";
/// Server identifier
pub const ENV_SERVER_ID: &str = "SERVER_ID";

/// Override values gathered from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub redis_addr: Option<String>,
    pub channel: Option<String>,
    pub server_id: Option<String>,
}

impl EnvOverrides {
    /// Collect from the current process environment
    pub fn from_process_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Collect through an arbitrary lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            redis_addr: non_empty(ENV_REDIS_ADDR),
            channel: non_empty(ENV_CHANNEL_NAME),
            server_id: non_empty(ENV_SERVER_ID),
        }
    }
}

/// Apply overrides onto a blueprint
pub fn apply_env_overrides(blueprint: &mut PipelineBlueprint, overrides: &EnvOverrides) {
    if let Some(addr) = &overrides.redis_addr {
        let url = redis_url_from_addr(addr);
        info!(redis_url = %url, "Overriding redis url from {}", ENV_REDIS_ADDR);
        blueprint.feed.redis_url = url;
    }
    if let Some(channel) = &overrides.channel {
        info!(channel = %channel, "Overriding channel from {}", ENV_CHANNEL_NAME);
        blueprint.feed.channel = channel.clone();
    }
    if let Some(server_id) = &overrides.server_id {
        info!(server_id = %server_id, "Overriding server id from {}", ENV_SERVER_ID);
        blueprint.service.server_id = server_id.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_overrides_applied() {
        let overrides = EnvOverrides::from_lookup(lookup(&[
            ("REDIS_ADDR", "cache:6380"),
            ("CHANNEL_NAME", "events.alt"),
            ("SERVER_ID", "relay-7"),
        ]));
        let mut bp = PipelineBlueprint::default();
        apply_env_overrides(&mut bp, &overrides);

        assert_eq!(bp.feed.redis_url, "redis://cache:6380");
        assert_eq!(bp.feed.channel, "events.alt");
        assert_eq!(bp.service.server_id, "relay-7");
    }

    #[test]
    fn test_empty_values_fall_back() {
        let overrides =
            EnvOverrides::from_lookup(lookup(&[("REDIS_ADDR", ""), ("SERVER_ID", "")]));
        assert_eq!(overrides, EnvOverrides::default());

        let mut bp = PipelineBlueprint::default();
        apply_env_overrides(&mut bp, &overrides);
        assert_eq!(bp.feed.redis_url, "redis://localhost:6379");
        assert_eq!(bp.service.server_id, "unknown-server");
    }

    #[test]
    fn test_missing_values_fall_back() {
        let overrides = EnvOverrides::from_lookup(|_| None);
        let mut bp = PipelineBlueprint::default();
        apply_env_overrides(&mut bp, &overrides);
        assert_eq!(bp.feed.channel, "broadcast.events");
    }

    #[test]
    fn test_full_url_kept() {
        let overrides = EnvOverrides::from_lookup(lookup(&[("REDIS_ADDR", "rediss://secure:6379")]));
        let mut bp = PipelineBlueprint::default();
        apply_env_overrides(&mut bp, &overrides);
        assert_eq!(bp.feed.redis_url, "rediss://secure:6379");
    }
}
