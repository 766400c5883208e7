//! Monitor Layer
//!
//! One probing loop per host, each in its own Tokio task, sending
//! [`HostReport`] snapshots to the aggregator over a bounded MPSC channel.
//!
//! - [`HostHistory`]: bounded rolling latency window with moving averages
//! - [`HostMonitor`]: the per-host probe/update/emit/sleep loop
//! - [`MonitorRegistry`]: spawns monitors and shuts them down

mod history;
mod registry;
mod task;

use thiserror::Error;

pub use history::{DEFAULT_HISTORY_LEN, HostHistory, UNAVAILABLE_CEILING_MS, moving_average};
pub use registry::MonitorRegistry;
pub use task::{DEFAULT_INTERVAL, HostMonitor, HostReport, MonitorSettings, build_report};

/// Errors surfaced by monitor lifecycle management.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Native ICMP was forced but the socket could not be opened.
    #[error("native ICMP probe unavailable: {0}")]
    NativeUnavailable(String),

    /// A monitor or aggregator task panicked or was cancelled abnormally.
    #[error("task join error: {0}")]
    Join(String),
}
