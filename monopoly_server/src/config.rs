//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated
//! configuration. Grounded on `pp_server/src/config.rs`'s
//! `from_env`/`validate` split.

use std::net::SocketAddr;

use monopoly_core::orchestrator::{DEFAULT_MAX_TURNS, MAX_SPEED, MIN_SPEED};

/// Complete server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address.
    pub bind: SocketAddr,
    /// Default simulation speed multiplier for newly started games.
    pub default_speed: f64,
    /// Default turn cap for newly started games.
    pub default_max_turns: u64,
    /// Per-decision agent timeout, in seconds.
    pub agent_timeout_secs: u64,
    /// Maximum number of page entries `GetHistory` returns per call.
    pub history_page_size: usize,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// * `bind_override` - optional bind address override (from CLI args).
    ///
    /// Returns an error if a value is present but fails to parse or falls
    /// outside its valid range.
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let bind = bind_override
            .or_else(|| std::env::var("SERVER_BIND").ok().and_then(|s| s.parse().ok()))
            .unwrap_or_else(|| "127.0.0.1:6969".parse().expect("default bind address is valid"));

        let default_speed = parse_env_or("DEFAULT_SPEED", 1.0)?;
        let default_max_turns = parse_env_or("DEFAULT_MAX_TURNS", DEFAULT_MAX_TURNS)?;
        let agent_timeout_secs = parse_env_or("AGENT_TIMEOUT_SECS", 30)?;
        let history_page_size = parse_env_or("HISTORY_PAGE_SIZE", 200)?;

        Ok(Self { bind, default_speed, default_max_turns, agent_timeout_secs, history_page_size })
    }

    /// Validates configuration after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.default_speed) {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_SPEED".to_string(),
                reason: format!("must be within [{MIN_SPEED}, {MAX_SPEED}]"),
            });
        }
        if self.default_max_turns == 0 {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_MAX_TURNS".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.agent_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "AGENT_TIMEOUT_SECS".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.history_page_size == 0 {
            return Err(ConfigError::Invalid {
                var: "HISTORY_PAGE_SIZE".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("could not parse {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:6969".parse().unwrap(),
            default_speed: 1.0,
            default_max_turns: 1000,
            agent_timeout_secs: 30,
            history_page_size: 200,
        }
    }

    #[test]
    fn default_config_validates() {
        config().validate().unwrap();
    }

    #[test]
    fn speed_out_of_range_is_rejected() {
        let mut cfg = config();
        cfg.default_speed = 20.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn zero_max_turns_is_rejected() {
        let mut cfg = config();
        cfg.default_max_turns = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn zero_agent_timeout_is_rejected() {
        let mut cfg = config();
        cfg.agent_timeout_secs = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid { .. })));
    }
}
