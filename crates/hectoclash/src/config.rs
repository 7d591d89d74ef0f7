//! Server configuration, from code or from `HECTOCLASH_*` environment
//! variables.

use std::str::FromStr;
use std::time::Duration;

use hectoclash_room::HubConfig;
use serde::{Deserialize, Serialize};

pub const ENV_ADDR: &str = "HECTOCLASH_ADDR";
pub const ENV_OUTBOUND_CAPACITY: &str = "HECTOCLASH_OUTBOUND_CAPACITY";
pub const ENV_INTAKE_CAPACITY: &str = "HECTOCLASH_INTAKE_CAPACITY";
pub const ENV_DELIVERY_TIMEOUT_MS: &str = "HECTOCLASH_DELIVERY_TIMEOUT_MS";
pub const ENV_AUTO_OPEN_GAMES: &str = "HECTOCLASH_AUTO_OPEN_GAMES";

/// Top-level server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub addr: String,

    /// Whether the default store opens a game for any room id on first
    /// join. When off, unknown rooms are rejected with "room not found".
    pub auto_open_games: bool,

    pub hub: HubConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            auto_open_games: true,
            hub: HubConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    pub fn with_auto_open_games(mut self, enabled: bool) -> Self {
        self.auto_open_games = enabled;
        self
    }

    pub fn with_hub(mut self, hub: HubConfig) -> Self {
        self.hub = hub;
        self
    }

    /// Reads settings from the process environment. Unset variables keep
    /// their defaults; unparsable ones are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let hub = defaults.hub.clone();

        let delivery_ms = parse_or(
            ENV_DELIVERY_TIMEOUT_MS,
            lookup(ENV_DELIVERY_TIMEOUT_MS),
            hub.delivery_timeout.as_millis() as u64,
        );

        Self {
            addr: lookup(ENV_ADDR)
                .filter(|addr| !addr.trim().is_empty())
                .unwrap_or(defaults.addr),
            auto_open_games: parse_or(
                ENV_AUTO_OPEN_GAMES,
                lookup(ENV_AUTO_OPEN_GAMES),
                defaults.auto_open_games,
            ),
            hub: HubConfig {
                outbound_capacity: parse_or(
                    ENV_OUTBOUND_CAPACITY,
                    lookup(ENV_OUTBOUND_CAPACITY),
                    hub.outbound_capacity,
                ),
                intake_capacity: parse_or(
                    ENV_INTAKE_CAPACITY,
                    lookup(ENV_INTAKE_CAPACITY),
                    hub.intake_capacity,
                ),
                delivery_timeout: Duration::from_millis(delivery_ms),
            },
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "ignoring invalid setting");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> ServerConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr, "0.0.0.0:8080");
        assert!(config.auto_open_games);
        assert_eq!(config.hub.outbound_capacity, 10);
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = from_pairs(&[]);
        assert_eq!(config.addr, "0.0.0.0:8080");
        assert_eq!(config.hub.intake_capacity, 32);
        assert_eq!(config.hub.delivery_timeout, Duration::from_millis(50));
    }

    #[test]
    fn test_environment_overrides() {
        let config = from_pairs(&[
            (ENV_ADDR, "127.0.0.1:9000"),
            (ENV_OUTBOUND_CAPACITY, "32"),
            (ENV_INTAKE_CAPACITY, " 8 "),
            (ENV_DELIVERY_TIMEOUT_MS, "250"),
            (ENV_AUTO_OPEN_GAMES, "false"),
        ]);
        assert_eq!(config.addr, "127.0.0.1:9000");
        assert_eq!(config.hub.outbound_capacity, 32);
        assert_eq!(config.hub.intake_capacity, 8);
        assert_eq!(config.hub.delivery_timeout, Duration::from_millis(250));
        assert!(!config.auto_open_games);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = from_pairs(&[
            (ENV_OUTBOUND_CAPACITY, "lots"),
            (ENV_DELIVERY_TIMEOUT_MS, "-5"),
            (ENV_AUTO_OPEN_GAMES, "maybe"),
            (ENV_ADDR, "  "),
        ]);
        assert_eq!(config.hub.outbound_capacity, 10);
        assert_eq!(config.hub.delivery_timeout, Duration::from_millis(50));
        assert!(config.auto_open_games);
        assert_eq!(config.addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_builder_setters() {
        let config = ServerConfig::default()
            .with_addr("127.0.0.1:0")
            .with_auto_open_games(false)
            .with_hub(HubConfig {
                outbound_capacity: 1,
                ..HubConfig::default()
            });
        assert_eq!(config.addr, "127.0.0.1:0");
        assert!(!config.auto_open_games);
        assert_eq!(config.hub.outbound_capacity, 1);
    }
}
