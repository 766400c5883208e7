//! Probe Layer
//!
//! One latency/reachability measurement per call, behind the [`Prober`]
//! trait. Two strategies exist:
//!
//! - [`NativeProber`]: ICMP echo over a `surge-ping` socket
//! - [`SystemProber`]: the platform `ping` executable, output parsed as text
//!
//! The strategy is chosen once at startup by [`select_prober`].

mod native;
pub mod parse;
mod system;
mod traits;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::monitor::MonitorError;

pub use native::NativeProber;
pub use system::SystemProber;
pub use traits::{
    DEFAULT_TIMEOUT, Measurement, ProbeError, ProbeOutcome, ProbeReport, Prober,
};

/// How the probe strategy is chosen.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProbeMode {
    /// Native ICMP when the socket can be opened, otherwise the system ping.
    #[default]
    Auto,
    /// Native ICMP only; fail at startup if unavailable.
    Native,
    /// Always use the system ping executable.
    System,
}

/// Pick the probe strategy for this process.
///
/// # Errors
/// Returns `MonitorError::NativeUnavailable` only in [`ProbeMode::Native`]
/// when the ICMP socket cannot be opened.
pub fn select_prober(mode: ProbeMode, timeout: Duration) -> Result<Arc<dyn Prober>, MonitorError> {
    match mode {
        ProbeMode::Native => {
            let prober = NativeProber::new(timeout)
                .map_err(|e| MonitorError::NativeUnavailable(e.to_string()))?;
            tracing::info!(probe = "native", "Using native ICMP probe");
            Ok(Arc::new(prober))
        }
        ProbeMode::System => {
            tracing::info!(probe = "system", "Using system ping probe");
            Ok(Arc::new(SystemProber::new(timeout)))
        }
        ProbeMode::Auto => match NativeProber::new(timeout) {
            Ok(prober) => {
                tracing::info!(probe = "native", "Using native ICMP probe");
                Ok(Arc::new(prober))
            }
            Err(e) => {
                tracing::info!(
                    probe = "system",
                    error = %e,
                    "Native ICMP unavailable, falling back to system ping"
                );
                Ok(Arc::new(SystemProber::new(timeout)))
            }
        },
    }
}
