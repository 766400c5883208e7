//! Bounded rolling latency history for one host.

use std::collections::VecDeque;

use crate::probe::ProbeOutcome;

/// Default number of samples kept per host.
pub const DEFAULT_HISTORY_LEN: usize = 10;

/// Latency recorded for an unavailable sample.
///
/// Applied only when folding outcomes into the rolling window; the outcome
/// itself stays `Unavailable`.
pub const UNAVAILABLE_CEILING_MS: f64 = 10_000.0;

/// Last N latency samples and the moving average after each one.
///
/// Both sequences are FIFO-evicted at `capacity` and always have equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct HostHistory {
    capacity: usize,
    latencies: VecDeque<f64>,
    averages: VecDeque<i64>,
}

impl HostHistory {
    /// Create an empty history. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            latencies: VecDeque::with_capacity(capacity + 1),
            averages: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Fold one outcome into the window and return the new moving average.
    pub fn record(&mut self, outcome: &ProbeOutcome) -> i64 {
        let sample = outcome.latency_ms().unwrap_or(UNAVAILABLE_CEILING_MS);
        self.latencies.push_back(sample);
        while self.latencies.len() > self.capacity {
            self.latencies.pop_front();
        }

        let avg = moving_average(self.latencies.iter().copied());
        self.averages.push_back(avg);
        while self.averages.len() > self.capacity {
            self.averages.pop_front();
        }
        avg
    }

    pub fn latencies(&self) -> Vec<f64> {
        self.latencies.iter().copied().collect()
    }

    pub fn averages(&self) -> Vec<i64> {
        self.averages.iter().copied().collect()
    }
}

impl Default for HostHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

/// Integer mean of the window: the sum is truncated first, then divided.
pub fn moving_average(samples: impl IntoIterator<Item = f64>) -> i64 {
    let (sum, count) = samples
        .into_iter()
        .fold((0.0_f64, 0_i64), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return 0;
    }
    (sum.trunc() as i64) / count
}
