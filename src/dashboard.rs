//! Engine wiring: monitors, channel and aggregator.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::aggregator::Aggregator;
use crate::config::MonitorConfig;
use crate::monitor::{HostMonitor, MonitorError, MonitorRegistry, MonitorSettings};
use crate::probe::Prober;
use crate::render::Render;

/// A configured set of hosts ready to be monitored.
pub struct Dashboard {
    hosts: Vec<String>,
    prober: Arc<dyn Prober>,
    settings: MonitorSettings,
    channel_capacity: usize,
}

impl Dashboard {
    /// Duplicate hosts are dropped, keeping the first occurrence.
    pub fn new(hosts: Vec<String>, prober: Arc<dyn Prober>, config: &MonitorConfig) -> Self {
        Self {
            hosts: unique_hosts(hosts),
            prober,
            settings: config.monitor_settings(),
            channel_capacity: config.channel_capacity.max(1),
        }
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Run until `cancel` fires, then stop every task and hand back the renderer.
    ///
    /// # Errors
    /// Returns `MonitorError::Join` if a monitor or the aggregator panicked.
    pub async fn run<R: Render + 'static>(
        self,
        renderer: R,
        cancel: CancellationToken,
    ) -> Result<R, MonitorError> {
        let (tx, rx) = mpsc::channel(self.channel_capacity);

        let mut registry = MonitorRegistry::new(cancel.child_token());
        for host in &self.hosts {
            registry.spawn(
                HostMonitor::new(host.clone(), Arc::clone(&self.prober), self.settings),
                tx.clone(),
            );
        }
        // Only monitors hold senders from here on.
        drop(tx);

        tracing::info!(
            hosts = self.hosts.len(),
            probe = self.prober.name(),
            interval = ?self.settings.interval,
            "Dashboard started"
        );

        let aggregator = Aggregator::new(self.hosts.clone(), renderer);
        let aggregator = tokio::spawn(aggregator.run(rx, cancel.clone()));

        cancel.cancelled().await;
        tracing::info!("Shutting down monitors...");

        let monitors = registry.shutdown().await;
        let renderer = aggregator
            .await
            .map_err(|e| MonitorError::Join(format!("aggregator: {e}")))?;
        monitors?;

        tracing::info!("Dashboard stopped");
        Ok(renderer)
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("hosts", &self.hosts)
            .field("probe", &self.prober.name())
            .field("settings", &self.settings)
            .field("channel_capacity", &self.channel_capacity)
            .finish()
    }
}

/// Drop repeated hosts, preserving first-seen order.
///
/// Hosts are kept byte-for-byte as given: a blank or malformed argument is
/// still monitored and shows up as an unavailable row.
pub fn unique_hosts(hosts: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for host in hosts {
        if seen.insert(host.clone()) {
            unique.push(host);
        } else {
            tracing::warn!(host = %host, "Duplicate host ignored");
        }
    }
    unique
}
