//! Fallback probe that shells out to the platform `ping` utility.
//!
//! Used where ICMP sockets are not available to the process. Output parsing
//! lives in [`super::parse`] and is best-effort.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::probe::parse::parse_ping_output;
use crate::probe::{Measurement, ProbeError, Prober};

/// Extra time granted to the child process on top of the echo timeout.
const PROCESS_GRACE: Duration = Duration::from_millis(500);

/// Probe implemented with the external `ping` executable.
#[derive(Debug, Clone)]
pub struct SystemProber {
    program: String,
    timeout: Duration,
}

impl SystemProber {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "ping".to_string(),
            timeout,
        }
    }

    /// Use a different executable (e.g. an absolute path).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments for one echo with the configured wait.
    pub fn args(&self, host: &str) -> Vec<String> {
        ping_args(host, self.timeout)
    }
}

#[cfg(target_os = "windows")]
fn ping_args(host: &str, timeout: Duration) -> Vec<String> {
    let wait_ms = timeout.as_millis().max(1);
    vec![
        "-n".into(),
        "1".into(),
        "-w".into(),
        wait_ms.to_string(),
        host.into(),
    ]
}

#[cfg(any(
    target_os = "macos",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd"
))]
fn ping_args(host: &str, timeout: Duration) -> Vec<String> {
    // BSD ping takes the reply wait in milliseconds.
    let wait_ms = timeout.as_millis().max(1);
    vec![
        "-c".into(),
        "1".into(),
        "-W".into(),
        wait_ms.to_string(),
        host.into(),
    ]
}

#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd"
)))]
fn ping_args(host: &str, timeout: Duration) -> Vec<String> {
    // iputils takes whole seconds.
    let wait_secs = timeout.as_secs().max(1);
    vec![
        "-c".into(),
        "1".into(),
        "-W".into(),
        wait_secs.to_string(),
        host.into(),
    ]
}

#[async_trait::async_trait]
impl Prober for SystemProber {
    fn name(&self) -> &'static str {
        "system"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn measure(&self, host: &str) -> Result<Measurement, ProbeError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(host))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = match timeout(self.timeout + PROCESS_GRACE, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ProbeError::Io(format!("failed to run {}: {e}", self.program)));
            }
            Err(_) => return Err(ProbeError::TimeoutOrLoss),
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_ping_output(&stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_single_echo() {
        let prober = SystemProber::new(Duration::from_secs(1));
        let args = prober.args("10.0.0.1");
        assert_eq!(args.last().map(String::as_str), Some("10.0.0.1"));
        assert!(args.iter().any(|a| a == "1"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_args() {
        let prober = SystemProber::new(Duration::from_millis(300));
        assert_eq!(prober.args("h"), vec!["-c", "1", "-W", "1", "h"]);
    }

    #[tokio::test]
    async fn test_missing_program_is_io_error() {
        let prober = SystemProber::new(Duration::from_secs(1))
            .with_program("/nonexistent/pingboard-test-ping");
        let result = prober.measure("127.0.0.1").await;
        assert!(matches!(result, Err(ProbeError::Io(_))));
    }

    #[tokio::test]
    async fn test_missing_program_probes_unavailable() {
        let prober = SystemProber::new(Duration::from_secs(1))
            .with_program("/nonexistent/pingboard-test-ping");
        let report = prober.probe("127.0.0.1").await;
        assert!(report.outcome.is_unavailable());
        assert_eq!(report.packet_loss_percent, 100.0);
    }
}
