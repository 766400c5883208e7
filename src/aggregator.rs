//! Aggregator: the single consumer of host reports.
//!
//! Owns the latest [`HostState`] of every host and the renderer. Each incoming
//! [`HostReport`] is upserted, then the whole table is rebuilt in input order
//! and rendered once. No other task touches this state.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::monitor::HostReport;
use crate::probe::ProbeOutcome;
use crate::render::Render;

/// Average change (ms) that must be exceeded before a trend is shown.
const TREND_THRESHOLD_MS: i64 = 1;

/// Upper bound (exclusive) of the low latency class.
const LOW_LATENCY_MS: f64 = 50.0;

/// Upper bound (exclusive) of the mid latency class.
const MID_LATENCY_MS: f64 = 100.0;

/// Direction of the moving average between the last two samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trend {
    Up,
    Down,
    #[default]
    Steady,
}

impl Trend {
    /// Compare the last two averages; `Steady` with fewer than two.
    pub fn from_averages(averages: &[i64]) -> Self {
        match averages {
            [.., prev, last] => {
                let diff = last - prev;
                if diff > TREND_THRESHOLD_MS {
                    Self::Up
                } else if diff < -TREND_THRESHOLD_MS {
                    Self::Down
                } else {
                    Self::Steady
                }
            }
            _ => Self::Steady,
        }
    }
}

/// Color class of one sparkline sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyClass {
    /// Below 50 ms.
    Low,
    /// 50 to 99 ms.
    Mid,
    /// 100 ms and above, including unavailable samples.
    High,
}

impl LatencyClass {
    pub fn classify(latency_ms: f64) -> Self {
        if latency_ms >= MID_LATENCY_MS {
            Self::High
        } else if latency_ms >= LOW_LATENCY_MS {
            Self::Mid
        } else {
            Self::Low
        }
    }
}

/// Latest known state of one host.
#[derive(Debug, Clone, PartialEq)]
pub struct HostState {
    pub display_name: String,
    pub last_outcome: ProbeOutcome,
    pub latencies: Vec<f64>,
    pub averages: Vec<i64>,
    pub packet_loss_percent: f64,
    pub jitter_ms: Option<f64>,
}

impl From<HostReport> for HostState {
    fn from(r: HostReport) -> Self {
        Self {
            display_name: r.display_name,
            last_outcome: r.outcome,
            latencies: r.latencies,
            averages: r.averages,
            packet_loss_percent: r.packet_loss_percent,
            jitter_ms: r.jitter_ms,
        }
    }
}

/// One table row, fully derived and ready for formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRow {
    /// 1-based position of the host in the input list.
    pub row_index: usize,
    pub host: String,
    pub display_name: String,
    pub status: ProbeOutcome,
    /// Latest moving average in whole milliseconds.
    pub average_ms: Option<i64>,
    pub trend: Trend,
    pub packet_loss_percent: f64,
    pub jitter_ms: Option<f64>,
    pub sparkline: Vec<LatencyClass>,
}

impl DashboardRow {
    fn build(row_index: usize, host: &str, state: &HostState) -> Self {
        Self {
            row_index,
            host: host.to_string(),
            display_name: state.display_name.clone(),
            status: state.last_outcome,
            average_ms: state.averages.last().copied(),
            trend: Trend::from_averages(&state.averages),
            packet_loss_percent: state.packet_loss_percent,
            jitter_ms: state.jitter_ms,
            sparkline: state
                .latencies
                .iter()
                .map(|&ms| LatencyClass::classify(ms))
                .collect(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.status.is_unavailable()
    }
}

/// Single-consumer aggregator over all host reports.
pub struct Aggregator<R> {
    hosts: Vec<String>,
    states: HashMap<String, HostState>,
    renderer: R,
    renders: u64,
}

impl<R: Render> Aggregator<R> {
    /// `hosts` fixes the row order for the lifetime of the aggregator.
    pub fn new(hosts: Vec<String>, renderer: R) -> Self {
        let states = HashMap::with_capacity(hosts.len());
        Self {
            hosts,
            states,
            renderer,
            renders: 0,
        }
    }

    /// Upsert the state for the reporting host.
    ///
    /// Returns false (and changes nothing) for hosts outside the input list.
    pub fn apply(&mut self, report: HostReport) -> bool {
        if !self.hosts.iter().any(|h| *h == report.host) {
            tracing::warn!(host = %report.host, "Report for unknown host ignored");
            return false;
        }
        self.states.insert(report.host.clone(), report.into());
        true
    }

    /// Rows for every host that has reported, in input order.
    pub fn rows(&self) -> Vec<DashboardRow> {
        self.hosts
            .iter()
            .enumerate()
            .filter_map(|(i, host)| {
                self.states
                    .get(host)
                    .map(|state| DashboardRow::build(i + 1, host, state))
            })
            .collect()
    }

    /// Render the current snapshot. Failures are logged, never propagated.
    pub fn render(&mut self) {
        let rows = self.rows();
        if let Err(e) = self.renderer.render(&rows) {
            tracing::warn!(error = %e, rows = rows.len(), "Render failed");
        }
        self.renders += 1;
    }

    /// Apply one report and render exactly once.
    pub fn handle(&mut self, report: HostReport) {
        if self.apply(report) {
            self.render();
        }
    }

    /// Drain `rx` until cancelled or every sender is gone; returns the renderer.
    pub async fn run(mut self, mut rx: mpsc::Receiver<HostReport>, cancel: CancellationToken) -> R {
        tracing::info!(hosts = self.hosts.len(), "Aggregator started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                report = rx.recv() => match report {
                    Some(report) => self.handle(report),
                    None => {
                        tracing::debug!("All monitors closed");
                        break;
                    }
                },
            }
        }

        tracing::info!(renders = self.renders, "Aggregator stopped");
        self.renderer
    }
}

impl<R> std::fmt::Debug for Aggregator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("hosts", &self.hosts)
            .field("reporting", &self.states.len())
            .field("renders", &self.renders)
            .finish_non_exhaustive()
    }
}
