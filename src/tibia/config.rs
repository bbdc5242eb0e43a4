// src/tibia/config.rs
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_USER_AGENT: &str = concat!("tibia_extract/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Tibia.com caches its community section for five minutes.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Settings shared by the transport and the client facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub user_agent: String,
    pub timeout: Duration,
    /// How long the site keeps serving a cached page; drives `TibiaResponse::time_left`.
    pub cache_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl ClientConfig {
    /// Reads `TIBIA_USER_AGENT`, `TIBIA_TIMEOUT_SECS` and `TIBIA_CACHE_TTL_SECS`,
    /// keeping the default for anything unset or unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ClientConfig::default();
        if let Some(agent) = lookup("TIBIA_USER_AGENT").filter(|a| !a.trim().is_empty()) {
            config.user_agent = agent;
        }
        if let Some(secs) = seconds(&lookup, "TIBIA_TIMEOUT_SECS") {
            config.timeout = secs;
        }
        if let Some(secs) = seconds(&lookup, "TIBIA_CACHE_TTL_SECS") {
            config.cache_ttl = secs;
        }
        config
    }
}

fn seconds(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert!(config.user_agent.starts_with("tibia_extract/"));
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("TIBIA_USER_AGENT", "my-bot/1.0"),
            ("TIBIA_TIMEOUT_SECS", "five"),
            ("TIBIA_CACHE_TTL_SECS", "60"),
        ]));
        assert_eq!(config.user_agent, "my-bot/1.0");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }
}
