//! Dashboard configuration structures.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::monitor::{DEFAULT_HISTORY_LEN, DEFAULT_INTERVAL, MonitorSettings};
use crate::probe::{DEFAULT_TIMEOUT, ProbeMode};
use crate::render::TableOptions;

use super::validation::ConfigError;

// =============================================================================
// Constants
// =============================================================================

/// Default capacity of the monitor → aggregator channel.
///
/// One slot keeps the handoff close to a rendezvous: a monitor blocks while
/// the aggregator is still busy with an earlier report.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1;

/// Minimum allowed probe interval.
pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Maximum allowed probe timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum rolling window length.
pub const MAX_HISTORY_LEN: usize = 100;

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_history() -> usize {
    DEFAULT_HISTORY_LEN
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

fn default_color() -> bool {
    true
}

// =============================================================================
// Monitor Configuration
// =============================================================================

/// Tunables for probing and display.
///
/// Every field has a default, so an empty YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Pause between probes of one host (default: 1s).
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Echo timeout (default: 1s).
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Rolling window length (default: 10).
    #[serde(default = "default_history")]
    pub history: usize,

    /// Probe strategy selection (default: auto).
    #[serde(default)]
    pub probe: ProbeMode,

    /// Monitor → aggregator channel capacity (default: 1).
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Colorize the table (default: true).
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            history: DEFAULT_HISTORY_LEN,
            probe: ProbeMode::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            color: true,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty file deserializes to unit, not to an empty mapping.
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval < MIN_INTERVAL {
            return Err(ConfigError::ValidationError(format!(
                "interval must be at least {:?}, got {:?}",
                MIN_INTERVAL, self.interval
            )));
        }

        if self.timeout.is_zero() || self.timeout > MAX_TIMEOUT {
            return Err(ConfigError::ValidationError(format!(
                "timeout must be between 1ms and {:?}, got {:?}",
                MAX_TIMEOUT, self.timeout
            )));
        }

        if self.history == 0 || self.history > MAX_HISTORY_LEN {
            return Err(ConfigError::ValidationError(format!(
                "history must be between 1 and {}, got {}",
                MAX_HISTORY_LEN, self.history
            )));
        }

        if self.channel_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "channel_capacity must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Settings for each host monitor loop.
    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            interval: self.interval,
            history_len: self.history,
        }
    }

    /// Options for the table renderer.
    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            color: self.color,
            history_len: self.history,
        }
    }
}
