//! # Application Configuration
//!
//! Settings for the sample application, read from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `ECHO_ADDR` | `127.0.0.1:7007` | Address the echo server binds to |
//! | `TICK_INTERVAL_MS` | `1000` | Heartbeat period of the ticker |
//! | `SERVICE_BUFFER_SIZE` | `32` | Request queue capacity of each service actor |

use service_framework::config::DEFAULT_BUFFER_SIZE;
use service_framework::ServiceConfig;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub echo_addr: SocketAddr,
    pub tick_interval: Duration,
    pub buffer_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            echo_addr: SocketAddr::from(([127, 0, 0, 1], 7007)),
            tick_interval: Duration::from_millis(1000),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, falling back to
    /// the defaults for missing keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            echo_addr: parse(&lookup, "ECHO_ADDR", defaults.echo_addr)?,
            tick_interval: Duration::from_millis(parse(
                &lookup,
                "TICK_INTERVAL_MS",
                defaults.tick_interval.as_millis() as u64,
            )?),
            buffer_size: parse(&lookup, "SERVICE_BUFFER_SIZE", defaults.buffer_size)?,
        })
    }

    /// Per-service actor configuration.
    pub fn service(&self, name: &str) -> ServiceConfig {
        ServiceConfig {
            name: name.to_string(),
            buffer_size: self.buffer_size,
        }
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ECHO_ADDR", "0.0.0.0:9000"),
            ("TICK_INTERVAL_MS", "250"),
            ("SERVICE_BUFFER_SIZE", "4"),
        ]))
        .unwrap();
        assert_eq!(config.echo_addr.port(), 9000);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.service("echo").buffer_size, 4);
    }

    #[test]
    fn test_invalid_value() {
        let err = AppConfig::from_lookup(lookup(&[("TICK_INTERVAL_MS", "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "TICK_INTERVAL_MS",
                value: "soon".to_string()
            }
        );
    }
}
