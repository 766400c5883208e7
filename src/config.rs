//! Configuration module for pingboard.
//!
//! Provides YAML-based loading and validation of the dashboard tunables:
//! - Probe interval and timeout
//! - Rolling history length
//! - Probe strategy selection
//! - Channel capacity and color output
//!
//! Hosts are never part of the file; they always come from the command line.

mod app;
mod validation;

pub use app::{
    DEFAULT_CHANNEL_CAPACITY, MAX_HISTORY_LEN, MAX_TIMEOUT, MIN_INTERVAL, MonitorConfig,
};
pub use validation::{ConfigError, parse_duration};
