//! Monitor registry for managing host monitor lifecycle.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::monitor::{HostMonitor, HostReport, MonitorError};

/// Default timeout for graceful shutdown (5 seconds).
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Registry for the per-host monitor tasks.
///
/// Every monitor gets a child of the registry's cancellation token, so
/// cancelling the parent stops them all.
pub struct MonitorRegistry {
    cancel: CancellationToken,
    jobs: Vec<(String, JoinHandle<()>)>,
}

impl MonitorRegistry {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            jobs: Vec::new(),
        }
    }

    /// Spawn a monitor task reporting into `tx`.
    pub fn spawn(&mut self, monitor: HostMonitor, tx: mpsc::Sender<HostReport>) {
        let host = monitor.host().to_string();
        tracing::debug!(
            host = %host,
            index = self.jobs.len(),
            interval = ?monitor.settings().interval,
            "Monitor registered"
        );

        let handle = tokio::spawn(monitor.run(tx, self.cancel.child_token()));
        self.jobs.push((host, handle));
    }

    /// Gracefully shutdown with the default timeout.
    pub async fn shutdown(self) -> Result<(), MonitorError> {
        self.shutdown_with_timeout(DEFAULT_SHUTDOWN_TIMEOUT).await
    }

    /// Cancel all monitors and wait for them.
    ///
    /// Monitors still running after `timeout` are aborted.
    ///
    /// # Errors
    /// Returns `MonitorError::Join` if a monitor task panicked.
    pub async fn shutdown_with_timeout(self, timeout: Duration) -> Result<(), MonitorError> {
        let job_count = self.jobs.len();
        self.cancel.cancel();

        let deadline = tokio::time::Instant::now() + timeout;
        let mut first_err = None;
        let mut timed_out = 0usize;

        for (host, mut handle) in self.jobs {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(host = %host, error = %e, "Monitor task failed");
                    first_err.get_or_insert(MonitorError::Join(format!("{host}: {e}")));
                }
                Err(_) => {
                    handle.abort();
                    timed_out += 1;
                }
            }
        }

        if timed_out > 0 {
            tracing::warn!(job_count, timed_out, "Monitor shutdown timed out, aborted stragglers");
        } else {
            tracing::info!(job_count, "Monitor shutdown complete");
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for MonitorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorRegistry")
            .field("job_count", &self.jobs.len())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
