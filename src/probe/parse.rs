//! Parsing of human-readable `ping` output.
//!
//! Best-effort only: the format differs between platforms and locales. The
//! patterns below cover iputils (Linux), BSD/macOS and Windows in English.

use std::sync::OnceLock;

use regex::Regex;

use crate::probe::{Measurement, ProbeError};

/// Phrases meaning the echo got no answer.
const TIMEOUT_MARKERS: &[&str] = &[
    "request timed out",
    "request timeout",
    "destination host unreachable",
    "100% packet loss",
    "100.0% packet loss",
    "100% loss",
    " 0 received",
    " 0 packets received",
];

fn summary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // rtt min/avg/max/mdev = 0.041/0.041/0.041/0.000 ms
    // round-trip min/avg/max/stddev = 14.093/14.093/14.093/0.000 ms
    RE.get_or_init(|| {
        Regex::new(
            r"min/avg/max(?:/(?:mdev|stddev))?\s*=\s*([\d.]+)/([\d.]+)/([\d.]+)(?:/([\d.]+))?\s*ms",
        )
        .expect("failed to compile ping summary regex")
    })
}

fn windows_average_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Minimum = 12ms, Maximum = 12ms, Average = 12ms
    RE.get_or_init(|| {
        Regex::new(r"Average\s*=\s*([\d.]+)\s*ms").expect("failed to compile average regex")
    })
}

fn loss_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([\d.]+)%\s*(?:packet\s+)?loss").expect("failed to compile loss regex")
    })
}

fn received_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+)\s+(?:packets\s+)?received").expect("failed to compile received regex")
    })
}

/// Returns true when the output reports the echo as lost.
pub fn is_timeout(output: &str) -> bool {
    let lower = output.to_ascii_lowercase();
    TIMEOUT_MARKERS.iter().any(|m| lower.contains(m))
}

/// Packet loss percentage, if the output states one.
pub fn packet_loss(output: &str) -> Option<f64> {
    loss_regex()
        .captures(output)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .map(|loss| loss.clamp(0.0, 100.0))
}

/// Number of replies, if the output states one.
pub fn received_count(output: &str) -> Option<u32> {
    received_regex()
        .captures(output)
        .and_then(|caps| caps[1].parse::<u32>().ok())
}

/// Parse the output of a single-echo `ping` run.
///
/// Jitter is only reported when more than one reply was received; the
/// deviation printed for a single reply is always zero and carries nothing.
///
/// # Errors
/// - `ProbeError::TimeoutOrLoss` when the output contains a timeout marker.
/// - `ProbeError::Io` when neither a marker nor an average latency is found.
pub fn parse_ping_output(output: &str) -> Result<Measurement, ProbeError> {
    if is_timeout(output) {
        return Err(ProbeError::TimeoutOrLoss);
    }

    let packet_loss_percent = packet_loss(output).unwrap_or(0.0);

    if let Some(caps) = summary_regex().captures(output) {
        let avg = caps[2]
            .parse::<f64>()
            .map_err(|e| ProbeError::Io(format!("invalid average '{}': {e}", &caps[2])))?;
        let jitter_ms = caps
            .get(4)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|_| received_count(output).is_some_and(|n| n > 1));
        return Ok(Measurement {
            rtt_ms: avg,
            packet_loss_percent,
            jitter_ms,
        });
    }

    if let Some(caps) = windows_average_regex().captures(output) {
        let avg = caps[1]
            .parse::<f64>()
            .map_err(|e| ProbeError::Io(format!("invalid average '{}': {e}", &caps[1])))?;
        return Ok(Measurement {
            rtt_ms: avg,
            packet_loss_percent,
            jitter_ms: None,
        });
    }

    Err(ProbeError::Io("no latency found in ping output".to_string()))
}
