use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Tuning for a canary run, read from the optional YAML file.
/// Every field has a default, so an absent file yields a complete configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CanaryConfig {
    /// Name of the board component on the target device.
    pub board: String,

    /// GPIO pin exercised by the probe.
    pub pin: String,

    /// Database that receives the result documents.
    pub database: String,

    /// Collection inside `database` that receives one document per run.
    pub collection: String,

    /// Total connection attempts before the run is declared failed.
    pub connect_attempts: u32,

    /// Fixed delay between connection attempts, in milliseconds.
    pub retry_delay_ms: u64,

    /// Timeout applied by the transport to each request.
    pub request_timeout_seconds: u64,
}

impl Default for CanaryConfig {
    fn default() -> Self {
        Self {
            board: "board".to_string(),
            pin: "32".to_string(),
            database: "esp32_canary".to_string(),
            collection: "hourly_results".to_string(),
            connect_attempts: 5,
            retry_delay_ms: 500,
            request_timeout_seconds: 5,
        }
    }
}

impl CanaryConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to a map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connect_attempts == 0 {
            return Err(ConfigError::Invalid(
                "connect_attempts must be at least 1".to_string(),
            ));
        }
        if self.pin.trim().is_empty() {
            return Err(ConfigError::Invalid("pin must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
