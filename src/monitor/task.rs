//! Per-host probing loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::monitor::history::{DEFAULT_HISTORY_LEN, HostHistory};
use crate::probe::{ProbeOutcome, ProbeReport, Prober};
use crate::resolve;

/// Default pause between probes (1 second).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Snapshot sent from a host monitor to the aggregator after every probe.
///
/// Owned by value; the monitor keeps its own history and never shares it.
#[derive(Debug, Clone, PartialEq)]
pub struct HostReport {
    /// Host identity as given on the command line.
    pub host: String,
    /// Reverse-DNS name, or `host` when none was found.
    pub display_name: String,
    pub outcome: ProbeOutcome,
    /// Retained latency samples, oldest first.
    pub latencies: Vec<f64>,
    /// Moving averages, one per sample, oldest first.
    pub averages: Vec<i64>,
    pub packet_loss_percent: f64,
    pub jitter_ms: Option<f64>,
}

/// Loop tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Pause after each emitted report.
    pub interval: Duration,
    /// Rolling window length.
    pub history_len: usize,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            history_len: DEFAULT_HISTORY_LEN,
        }
    }
}

/// Probing loop for a single host.
///
/// `Init` resolves the display name once, then the loop cycles through
/// probing, updating the rolling history, emitting a [`HostReport`] and
/// sleeping until cancelled or until the aggregator goes away.
pub struct HostMonitor {
    host: String,
    prober: Arc<dyn Prober>,
    settings: MonitorSettings,
}

impl HostMonitor {
    pub fn new(host: impl Into<String>, prober: Arc<dyn Prober>, settings: MonitorSettings) -> Self {
        Self {
            host: host.into(),
            prober,
            settings,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Run until `cancel` fires or the receiving side is closed.
    pub async fn run(self, tx: mpsc::Sender<HostReport>, cancel: CancellationToken) {
        let display_name = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            name = resolve::display_name(&self.host) => name,
        };
        tracing::info!(host = %self.host, display_name = %display_name, probe = self.prober.name(), "Monitor started");

        let mut history = HostHistory::new(self.settings.history_len);

        loop {
            let probe = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                report = self.prober.probe(&self.host) => report,
            };

            let report = build_report(&self.host, &display_name, &mut history, probe);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                sent = tx.send(report) => {
                    if sent.is_err() {
                        tracing::debug!(host = %self.host, "Aggregator closed, stopping monitor");
                        break;
                    }
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }

        tracing::info!(host = %self.host, "Monitor stopped");
    }
}

impl std::fmt::Debug for HostMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostMonitor")
            .field("host", &self.host)
            .field("probe", &self.prober.name())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Fold one probe result into `history` and snapshot it.
pub fn build_report(
    host: &str,
    display_name: &str,
    history: &mut HostHistory,
    probe: ProbeReport,
) -> HostReport {
    history.record(&probe.outcome);
    HostReport {
        host: host.to_string(),
        display_name: display_name.to_string(),
        outcome: probe.outcome,
        latencies: history.latencies(),
        averages: history.averages(),
        packet_loss_percent: probe.packet_loss_percent,
        jitter_ms: probe.jitter_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::history::UNAVAILABLE_CEILING_MS;
    use crate::probe::{Measurement, ProbeError};

    struct ConstProber(f64);

    #[async_trait::async_trait]
    impl Prober for ConstProber {
        fn name(&self) -> &'static str {
            "const"
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(10)
        }

        async fn measure(&self, _host: &str) -> Result<Measurement, ProbeError> {
            Ok(Measurement::single(self.0))
        }
    }

    fn fast_settings() -> MonitorSettings {
        MonitorSettings {
            interval: Duration::from_millis(5),
            history_len: 3,
        }
    }

    #[test]
    fn test_build_report_snapshots_history() {
        let mut history = HostHistory::new(10);
        let first = build_report(
            "10.0.0.1",
            "ten",
            &mut history,
            ProbeReport::from(Measurement::single(40.0)),
        );
        assert_eq!(first.latencies, vec![40.0]);
        assert_eq!(first.averages, vec![40]);

        let second = build_report("10.0.0.1", "ten", &mut history, ProbeReport::unavailable());
        assert_eq!(second.outcome, ProbeOutcome::Unavailable);
        assert_eq!(second.latencies, vec![40.0, UNAVAILABLE_CEILING_MS]);
        assert_eq!(second.packet_loss_percent, 100.0);
        // earlier snapshot is unaffected
        assert_eq!(first.latencies.len(), 1);
    }

    #[tokio::test]
    async fn test_monitor_emits_bounded_reports() {
        let (tx, mut rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let monitor = HostMonitor::new("monitor.test", Arc::new(ConstProber(7.0)), fast_settings());
        let handle = tokio::spawn(monitor.run(tx, cancel.clone()));

        let mut last = None;
        for _ in 0..5 {
            last = rx.recv().await;
        }
        let last = last.unwrap();
        assert_eq!(last.host, "monitor.test");
        assert_eq!(last.display_name, "monitor.test");
        assert_eq!(last.latencies, vec![7.0, 7.0, 7.0]);
        assert_eq!(last.averages, vec![7, 7, 7]);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_monitor_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let monitor = HostMonitor::new("monitor.drop", Arc::new(ConstProber(1.0)), fast_settings());
        tokio::time::timeout(Duration::from_secs(2), monitor.run(tx, CancellationToken::new()))
            .await
            .unwrap();
    }
}
