//! Dashboard Integration Tests
//!
//! Drives the full engine (monitors, channel, aggregator, renderer) with a
//! scripted prober, so no network access or ICMP privileges are needed.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pingboard::render::format_table;
use pingboard::{
    Dashboard, DashboardRow, LatencyClass, Measurement, MonitorConfig, ProbeError, Prober,
    Render, SystemProber, TableOptions, Trend,
};
use tokio_util::sync::CancellationToken;

// =============================================================================
// Test Helpers
// =============================================================================

/// One scripted probe step: optional delay, then a result.
#[derive(Clone)]
struct Step {
    delay: Duration,
    result: Option<f64>,
}

fn ok(ms: f64) -> Step {
    Step {
        delay: Duration::ZERO,
        result: Some(ms),
    }
}

fn lost() -> Step {
    Step {
        delay: Duration::ZERO,
        result: None,
    }
}

fn delayed(step: Step, delay: Duration) -> Step {
    Step { delay, ..step }
}

/// Prober replaying a fixed script per host, then hanging forever.
struct ScriptedProber {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
}

impl ScriptedProber {
    fn new(scripts: &[(&str, Vec<Step>)]) -> Arc<Self> {
        let scripts = scripts
            .iter()
            .map(|(host, steps)| (host.to_string(), steps.iter().cloned().collect()))
            .collect();
        Arc::new(Self {
            scripts: Mutex::new(scripts),
        })
    }
}

#[async_trait::async_trait]
impl Prober for ScriptedProber {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn measure(&self, host: &str) -> Result<Measurement, ProbeError> {
        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(host)
            .and_then(VecDeque::pop_front);

        let Some(step) = step else {
            std::future::pending::<()>().await;
            unreachable!();
        };

        tokio::time::sleep(step.delay).await;
        step.result
            .map(Measurement::single)
            .ok_or(ProbeError::TimeoutOrLoss)
    }
}

/// Renderer recording every frame it is asked to draw.
#[derive(Clone, Default)]
struct Capture {
    frames: Arc<Mutex<Vec<Vec<DashboardRow>>>>,
}

impl Capture {
    fn frames(&self) -> Vec<Vec<DashboardRow>> {
        self.frames.lock().unwrap().clone()
    }

    async fn wait_for_frames(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.frames.lock().unwrap().len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for frames");
    }
}

impl Render for Capture {
    fn render(&mut self, rows: &[DashboardRow]) -> std::io::Result<()> {
        self.frames.lock().unwrap().push(rows.to_vec());
        Ok(())
    }
}

fn fast_config() -> MonitorConfig {
    MonitorConfig {
        interval: Duration::from_millis(10),
        ..MonitorConfig::default()
    }
}

fn plain() -> TableOptions {
    TableOptions {
        color: false,
        history_len: 10,
    }
}

/// Run a dashboard until `frames` renders have happened, then stop it.
async fn run_until(
    hosts: &[&str],
    prober: Arc<ScriptedProber>,
    frames: usize,
) -> Vec<Vec<DashboardRow>> {
    let hosts = hosts.iter().map(|h| h.to_string()).collect();
    let dashboard = Dashboard::new(hosts, prober, &fast_config());
    let capture = Capture::default();
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(dashboard.run(capture.clone(), cancel.clone()));
    capture.wait_for_frames(frames).await;
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("dashboard did not stop")
        .expect("dashboard task panicked")
        .expect("dashboard returned an error");

    capture.frames()
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_first_probe_renders_single_low_glyph() {
    let prober = ScriptedProber::new(&[("gateway.test", vec![ok(40.0)])]);
    let frames = run_until(&["gateway.test"], prober, 1).await;

    let row = &frames[0][0];
    assert_eq!(row.row_index, 1);
    assert_eq!(row.average_ms, Some(40));
    assert_eq!(row.trend, Trend::Steady);
    assert_eq!(row.sparkline, vec![LatencyClass::Low]);
    assert_eq!(row.packet_loss_percent, 0.0);

    let table = format_table(&frames[0], &plain());
    assert!(table.contains("| 40 ms "));
    assert!(table.contains("| 0.00 % "));
}

#[tokio::test]
async fn test_second_probe_moves_average_and_trend_up() {
    let prober = ScriptedProber::new(&[("gateway.test", vec![ok(40.0), ok(120.0)])]);
    let frames = run_until(&["gateway.test"], prober, 2).await;

    let row = &frames[1][0];
    assert_eq!(row.average_ms, Some(80));
    assert_eq!(row.trend, Trend::Up);
    assert_eq!(row.sparkline, vec![LatencyClass::Low, LatencyClass::High]);

    let table = format_table(&frames[1], &plain());
    assert!(table.contains("| 80 ms "));
    assert!(table.contains("↑"));
}

#[tokio::test]
async fn test_failed_probe_renders_unavailable() {
    let prober = ScriptedProber::new(&[("down.test", vec![lost()])]);
    let frames = run_until(&["down.test"], prober, 1).await;

    let row = &frames[0][0];
    assert!(row.is_unavailable());
    assert_eq!(row.packet_loss_percent, 100.0);
    assert_eq!(row.sparkline, vec![LatencyClass::High]);

    let table = format_table(&frames[0], &plain());
    assert!(table.contains("| unavailable "));
    assert!(table.contains("| 100.00 % "));

    let colored = format_table(&frames[0], &TableOptions::default());
    assert!(colored.contains("\u{1b}[31munavailable\u{1b}[39m"));
}

#[tokio::test]
async fn test_rows_keep_input_order_regardless_of_arrival() {
    let prober = ScriptedProber::new(&[
        (
            "slow.test",
            vec![delayed(ok(10.0), Duration::from_millis(150))],
        ),
        ("fast.test", vec![ok(20.0)]),
    ]);
    let frames = run_until(&["slow.test", "fast.test"], prober, 2).await;

    // Hosts that have not reported are omitted, not shown as blank rows.
    assert_eq!(frames[0].len(), 1);
    assert_eq!(frames[0][0].host, "fast.test");
    assert_eq!(frames[0][0].row_index, 2);

    let last = frames.last().unwrap();
    let order: Vec<&str> = last.iter().map(|r| r.host.as_str()).collect();
    assert_eq!(order, vec!["slow.test", "fast.test"]);
    assert_eq!(last[0].row_index, 1);
}

#[tokio::test]
async fn test_history_is_bounded_across_many_probes() {
    let steps = (1..=15).map(|i| ok(i as f64)).collect();
    let prober = ScriptedProber::new(&[("busy.test", steps)]);
    let frames = run_until(&["busy.test"], prober, 15).await;

    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame[0].sparkline.len(), (i + 1).min(10));
    }
    // last window is samples 6..=15, mean 10.5 -> 105 / 10 = 10
    assert_eq!(frames[14][0].average_ms, Some(10));
}

#[tokio::test]
async fn test_duplicate_hosts_render_once() {
    let prober = ScriptedProber::new(&[("dup.test", vec![ok(5.0)])]);
    let frames = run_until(&["dup.test", "dup.test"], prober, 1).await;
    assert_eq!(frames[0].len(), 1);
}

#[tokio::test]
async fn test_blank_host_renders_persistent_unavailable_row() {
    // A ping that cannot run behaves like an unresolvable host: every probe fails.
    let prober = Arc::new(
        SystemProber::new(Duration::from_secs(1)).with_program("/nonexistent/pingboard-ping"),
    );
    let dashboard = Dashboard::new(vec!["  ".to_string()], prober, &fast_config());
    assert_eq!(dashboard.hosts(), ["  "]);

    let capture = Capture::default();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(dashboard.run(capture.clone(), cancel.clone()));
    capture.wait_for_frames(3).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("dashboard did not stop")
        .unwrap()
        .unwrap();

    for frame in capture.frames() {
        assert_eq!(frame.len(), 1);
        assert_eq!(frame[0].host, "  ");
        assert_eq!(frame[0].display_name, "  ");
        assert!(frame[0].is_unavailable());
    }

    let colored = format_table(&capture.frames()[0], &TableOptions::default());
    assert!(colored.contains("\u{1b}[31munavailable\u{1b}[39m"));
}

#[tokio::test]
async fn test_cancel_stops_blocked_monitors() {
    // Script is empty, so every probe hangs until cancelled.
    let prober = ScriptedProber::new(&[]);
    let dashboard = Dashboard::new(
        vec!["a.test".to_string(), "b.test".to_string()],
        prober,
        &fast_config(),
    );
    let capture = Capture::default();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(dashboard.run(capture.clone(), cancel.clone()));

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("dashboard did not stop")
        .unwrap()
        .unwrap();
    assert!(capture.frames().is_empty());
}

#[test]
fn test_no_hosts_prints_usage() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_pingboard"))
        .env_remove("PINGBOARD_CONFIG")
        .output()
        .expect("failed to run pingboard");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "unexpected stdout: {stdout}");
}
