//! pingboard - live terminal latency dashboard
//!
//! Probes a set of hosts once per interval, keeps a short rolling history per
//! host and redraws a table with status, trend, packet loss, jitter and a
//! colored latency sparkline after every result.
//!
//! # Architecture
//!
//! - **Probe**: one ICMP echo per call, native socket or system `ping`
//! - **Monitor**: one Tokio task per host feeding a bounded MPSC channel
//! - **Aggregator**: single consumer owning all per-host state
//! - **Render**: full-screen table redraw
//!
//! # Example
//!
//! ```rust,no_run
//! use pingboard::{Dashboard, MonitorConfig, TerminalRenderer, select_prober};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitorConfig::default();
//! let prober = select_prober(config.probe, config.timeout)?;
//! let dashboard = Dashboard::new(vec!["1.1.1.1".into()], prober, &config);
//!
//! let cancel = CancellationToken::new();
//! dashboard
//!     .run(TerminalRenderer::stdout(config.table_options()), cancel)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod dashboard;
pub mod monitor;
pub mod probe;
pub mod render;
pub mod resolve;

pub use aggregator::{Aggregator, DashboardRow, HostState, LatencyClass, Trend};
pub use config::{ConfigError, MonitorConfig};
pub use dashboard::Dashboard;
pub use monitor::{HostHistory, HostMonitor, HostReport, MonitorError, MonitorRegistry};
pub use probe::{
    Measurement, NativeProber, ProbeError, ProbeMode, ProbeOutcome, ProbeReport, Prober,
    SystemProber, select_prober,
};
pub use render::{Render, TableOptions, TerminalRenderer};
