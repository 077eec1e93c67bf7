//! Configuration for the voice metrics service.
//!
//! Values are read once at startup: defaults, then the JSON config file,
//! then environment overrides, then CLI flags. Nothing changes at runtime.

use crate::core::{RetentionPolicy, DEFAULT_MAX_EVENTS, DEFAULT_TIME_WINDOW_SECS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default simulator target.
pub const DEFAULT_TARGET_URL: &str = "http://localhost:8080/ingest";

/// Upper bound accepted for the retention time window (one year).
const MAX_TIME_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

/// Main configuration for the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address to bind the HTTP server to
    pub host: String,

    /// Port to bind the HTTP server to (0 for random)
    pub port: u16,

    /// Retention time window
    #[serde(with = "duration_serde")]
    pub time_window: Duration,

    /// Retention count bound
    pub max_events: usize,

    /// Event simulator settings
    pub simulator: SimulatorSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            time_window: Duration::from_secs(DEFAULT_TIME_WINDOW_SECS),
            max_events: DEFAULT_MAX_EVENTS,
            simulator: SimulatorSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, then apply environment overrides.
    ///
    /// Ranges are not checked here; call [`validate`](Self::validate) once
    /// every override has been applied.
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(Self::load_file()?, |key| std::env::var(key).ok())
    }

    /// Layer environment overrides from `lookup` over a file configuration.
    pub fn resolve<F>(mut file: Config, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        file.apply_env(lookup)?;
        Ok(file)
    }

    /// Load just the config file, or defaults if it does not exist.
    pub fn load_file() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voice-metrics")
            .join("config.json")
    }

    /// Apply `PORT` and `TARGET_URL` overrides from a variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "PORT",
                value: port.clone(),
            })?;
        }

        if let Some(url) = lookup("TARGET_URL") {
            if url.trim().is_empty() {
                return Err(ConfigError::InvalidEnv {
                    key: "TARGET_URL",
                    value: url,
                });
            }
            self.simulator.target_url = url.trim().to_string();
        }

        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secs = self.time_window.as_secs();
        if secs == 0 || secs > MAX_TIME_WINDOW_SECS {
            return Err(ConfigError::Invalid(format!(
                "time_window must be between 1 and {MAX_TIME_WINDOW_SECS} seconds, got {secs}"
            )));
        }
        if self.max_events == 0 {
            return Err(ConfigError::Invalid(
                "max_events must be at least 1".to_string(),
            ));
        }
        if self.simulator.interval.is_zero() {
            return Err(ConfigError::Invalid(
                "simulator.interval must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// Retention policy described by this configuration.
    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy::new(self.time_window.as_secs(), self.max_events)
    }
}

/// Settings for the built-in event producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorSettings {
    /// Ingest endpoint to post generated events to
    pub target_url: String,

    /// Delay between generated events
    #[serde(with = "duration_serde")]
    pub interval: Duration,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            interval: Duration::from_secs(60),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {key}: '{value}'")]
    InvalidEnv { key: &'static str, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Serde support for Duration as whole seconds.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.time_window, Duration::from_secs(300));
        assert_eq!(config.max_events, 30);
        assert_eq!(config.simulator.target_url, "http://localhost:8080/ingest");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"port": 9090, "time_window": 60}"#).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.time_window, Duration::from_secs(60));
        assert_eq!(config.max_events, DEFAULT_MAX_EVENTS);
        assert_eq!(config.simulator, SimulatorSettings::default());
    }

    #[test]
    fn test_json_roundtrip_uses_seconds() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["time_window"], 300);
        assert_eq!(json["simulator"]["interval"], 60);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[("PORT", "3000"), ("TARGET_URL", "http://svc:3000/ingest")]))
            .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.simulator.target_url, "http://svc:3000/ingest");
    }

    #[test]
    fn test_invalid_port_env() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "PORT", .. }));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_validate_ranges() {
        let config = Config {
            max_events: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            time_window: Duration::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_file_value_fixed_by_later_override() {
        let file: Config = serde_json::from_str(r#"{"max_events": 0, "time_window": 0}"#).unwrap();

        let mut config = Config::resolve(file, env(&[("PORT", "3000")])).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.validate().is_err());

        // CLI flags land after resolution
        config.max_events = 10;
        config.time_window = Duration::from_secs(60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retention_policy() {
        let policy = Config::default().retention_policy();
        assert_eq!(policy, RetentionPolicy::default());
    }
}
