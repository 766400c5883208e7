//! Core probe traits and types.

use std::time::Duration;

use thiserror::Error;

/// Default probe timeout (1 second).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Errors that can occur during a single measurement.
///
/// These never escape [`Prober::probe`]: every variant is folded into
/// [`ProbeOutcome::Unavailable`] at that boundary.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe could not be set up (unresolvable host, socket creation failed).
    #[error("probe construction failed: {0}")]
    Construction(String),

    /// No echo reply arrived before the timeout, or every packet was lost.
    #[error("timed out or all packets lost")]
    TimeoutOrLoss,

    /// Spawning the external ping process or parsing its output failed.
    #[error("probe i/o failure: {0}")]
    Io(String),
}

/// Result of one measurement attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeOutcome {
    /// Host answered; round-trip time in milliseconds.
    Reachable { latency_ms: f64 },
    /// Host did not answer, or the probe could not be performed.
    Unavailable,
}

impl ProbeOutcome {
    /// Returns the measured latency, if any.
    pub fn latency_ms(&self) -> Option<f64> {
        match self {
            Self::Reachable { latency_ms } => Some(*latency_ms),
            Self::Unavailable => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

/// A successful measurement as reported by a probe backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Round-trip time in milliseconds.
    pub rtt_ms: f64,
    /// Packet loss percentage (0-100).
    pub packet_loss_percent: f64,
    /// Standard deviation of round-trip times, when the backend reports one.
    pub jitter_ms: Option<f64>,
}

impl Measurement {
    /// Measurement from a single successful echo.
    pub fn single(rtt_ms: f64) -> Self {
        Self {
            rtt_ms: rtt_ms.max(0.0),
            packet_loss_percent: 0.0,
            jitter_ms: None,
        }
    }
}

/// Everything one probe call yields, after error normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeReport {
    pub outcome: ProbeOutcome,
    pub packet_loss_percent: f64,
    pub jitter_ms: Option<f64>,
}

impl ProbeReport {
    /// Report for a probe that got no answer.
    pub fn unavailable() -> Self {
        Self {
            outcome: ProbeOutcome::Unavailable,
            packet_loss_percent: 100.0,
            jitter_ms: None,
        }
    }
}

impl From<Measurement> for ProbeReport {
    fn from(m: Measurement) -> Self {
        Self {
            outcome: ProbeOutcome::Reachable {
                latency_ms: m.rtt_ms,
            },
            packet_loss_percent: m.packet_loss_percent,
            jitter_ms: m.jitter_ms,
        }
    }
}

/// A latency/reachability measurement strategy.
///
/// Strategies are selected once at startup and shared by every host monitor,
/// so implementations must be cheap to call concurrently.
///
/// # Error Handling Philosophy
///
/// Backends report *why* a measurement failed through [`ProbeError`], which is
/// useful for logs. Callers above the probe layer only ever see a
/// [`ProbeReport`]: the provided [`Prober::probe`] method maps every error to
/// an `Unavailable` outcome with 100 % loss.
#[async_trait::async_trait]
pub trait Prober: Send + Sync + 'static {
    /// Short strategy name used in logs ("native", "system").
    fn name(&self) -> &'static str;

    /// Timeout applied to each echo.
    fn timeout(&self) -> Duration;

    /// Send exactly one echo to `host` and measure it.
    async fn measure(&self, host: &str) -> Result<Measurement, ProbeError>;

    /// Perform one probe, normalizing failures into `Unavailable`.
    async fn probe(&self, host: &str) -> ProbeReport {
        match self.measure(host).await {
            Ok(m) => {
                tracing::debug!(host = %host, probe = self.name(), rtt_ms = m.rtt_ms, "Probe succeeded");
                m.into()
            }
            Err(e) => {
                tracing::debug!(host = %host, probe = self.name(), error = %e, "Probe failed");
                ProbeReport::unavailable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProber(Result<Measurement, ()>);

    #[async_trait::async_trait]
    impl Prober for FixedProber {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn timeout(&self) -> Duration {
            DEFAULT_TIMEOUT
        }

        async fn measure(&self, _host: &str) -> Result<Measurement, ProbeError> {
            self.0.map_err(|_| ProbeError::TimeoutOrLoss)
        }
    }

    #[tokio::test]
    async fn test_probe_success_maps_to_reachable() {
        let prober = FixedProber(Ok(Measurement::single(12.5)));
        let report = prober.probe("10.0.0.1").await;
        assert_eq!(report.outcome, ProbeOutcome::Reachable { latency_ms: 12.5 });
        assert_eq!(report.packet_loss_percent, 0.0);
        assert_eq!(report.jitter_ms, None);
    }

    #[tokio::test]
    async fn test_probe_error_maps_to_unavailable() {
        let prober = FixedProber(Err(()));
        let report = prober.probe("10.0.0.1").await;
        assert!(report.outcome.is_unavailable());
        assert_eq!(report.packet_loss_percent, 100.0);
    }

    #[test]
    fn test_single_measurement_clamps_negative() {
        assert_eq!(Measurement::single(-3.0).rtt_ms, 0.0);
    }

    #[test]
    fn test_probe_error_display() {
        let err = ProbeError::Construction("no such host".into());
        assert!(err.to_string().contains("no such host"));
        assert_eq!(ProbeError::TimeoutOrLoss.to_string(), "timed out or all packets lost");
    }
}
