//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::timeout::TimeoutConfig;

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Request timeout enforced on every route.
    pub timeout: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Simulated workload served on `/`.
    pub demo: DemoConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Upper bound (exclusive) of the random work on `/`, rounded down to whole seconds.
    #[serde(with = "humantime_serde")]
    pub max_work: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            max_work: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.timeout.duration, Duration::from_secs(30));
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.demo.max_work, Duration::from_secs(5));
    }

    #[test]
    fn test_full_config() {
        let config: AppConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [timeout]
            duration = "1m 30s"

            [observability]
            log_level = "debug"

            [demo]
            max_work = "2s"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.timeout.duration, Duration::from_secs(90));
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.demo.max_work, Duration::from_secs(2));
    }
}
