//! pingboard binary entry point.
//!
//! Parses the host list and tunables, selects the probe strategy and runs the
//! dashboard until Ctrl+C or SIGTERM.

use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use pingboard::{
    Dashboard, MonitorConfig, ProbeMode, TerminalRenderer, config::parse_duration, select_prober,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// pingboard - live latency dashboard for multiple hosts
#[derive(Parser, Debug)]
#[command(name = "pingboard", version, about, long_about = None)]
struct Cli {
    /// Hosts to monitor (hostnames or IP addresses)
    hosts: Vec<String>,

    /// Path to a YAML file with dashboard tunables
    #[arg(short, long, env = "PINGBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Pause between probes of one host (e.g. 1s, 500ms)
    #[arg(short, long, env = "PINGBOARD_INTERVAL", value_parser = parse_duration)]
    interval: Option<Duration>,

    /// Echo timeout (e.g. 1s)
    #[arg(short, long, env = "PINGBOARD_TIMEOUT", value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Number of samples kept per host
    #[arg(long)]
    history: Option<usize>,

    /// Probe strategy: auto, native or system
    #[arg(long, env = "PINGBOARD_PROBE")]
    probe: Option<ProbeMode>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    /// Build the effective configuration (CLI > ENV > config file > defaults).
    fn load_config(&self) -> Result<MonitorConfig, pingboard::ConfigError> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                MonitorConfig::load(path)?
            }
            None => MonitorConfig::default(),
        };

        if let Some(interval) = self.interval {
            config.interval = interval;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(history) = self.history {
            config.history = history;
        }
        if let Some(probe) = self.probe {
            config.probe = probe;
        }
        if self.no_color {
            config.color = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the table on stdout.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("PINGBOARD_LOG")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if cli.hosts.is_empty() {
        println!("{}", Cli::command().render_usage());
        return Ok(());
    }

    let config = cli.load_config()?;
    tracing::info!(
        "Interval: {:?}, timeout: {:?}, history: {}, probe: {}",
        config.interval,
        config.timeout,
        config.history,
        config.probe,
    );

    let prober = select_prober(config.probe, config.timeout)?;
    let dashboard = Dashboard::new(cli.hosts, prober, &config);
    let renderer = TerminalRenderer::stdout(config.table_options());

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    dashboard.run(renderer, cancel).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Cancel `token` on Ctrl+C or SIGTERM.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }

    token.cancel();
}
