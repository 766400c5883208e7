//! Plain-text table formatting with optional ANSI colors.
//!
//! Formatting is a pure function of the rows and options, so an unchanged
//! snapshot always produces the same output.

use owo_colors::OwoColorize;

use crate::aggregator::{DashboardRow, LatencyClass, Trend};
use crate::monitor::DEFAULT_HISTORY_LEN;
use crate::probe::ProbeOutcome;

/// Glyph drawn for every sparkline sample.
pub const SPARK_GLYPH: char = '▄';

pub const TREND_UP: &str = "↑";
pub const TREND_DOWN: &str = "↓";

/// Status text for an unavailable host.
pub const UNAVAILABLE_TEXT: &str = "unavailable";

/// Formatting options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    /// Emit ANSI color codes.
    pub color: bool,
    /// History length shown in the sparkline header.
    pub history_len: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            color: true,
            history_len: DEFAULT_HISTORY_LEN,
        }
    }
}

/// A cell's visible text and the (possibly colored) text actually printed.
#[derive(Debug, Clone, PartialEq)]
struct Cell {
    plain: String,
    styled: String,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        let plain = text.into();
        Self {
            styled: plain.clone(),
            plain,
        }
    }

    fn failure(text: impl Into<String>, color: bool) -> Self {
        let plain = text.into();
        let styled = if color {
            plain.red().to_string()
        } else {
            plain.clone()
        };
        Self { plain, styled }
    }

    fn width(&self) -> usize {
        self.plain.chars().count()
    }
}

pub fn header_labels(history_len: usize) -> Vec<String> {
    vec![
        "#".to_string(),
        "Host".to_string(),
        "Hostname".to_string(),
        "Ping Response".to_string(),
        "Average Latency".to_string(),
        "Latency Change".to_string(),
        "Packet Loss %".to_string(),
        "Jitter".to_string(),
        format!("Last {history_len} Responses (Sparkline)"),
    ]
}

pub fn status_text(status: &ProbeOutcome) -> String {
    match status {
        ProbeOutcome::Reachable { latency_ms } => format!("{} ms", latency_ms.trunc() as i64),
        ProbeOutcome::Unavailable => UNAVAILABLE_TEXT.to_string(),
    }
}

pub fn average_text(average_ms: Option<i64>) -> String {
    average_ms.map_or_else(|| "-".to_string(), |avg| format!("{avg} ms"))
}

pub fn loss_text(loss_percent: f64) -> String {
    format!("{loss_percent:.2} %")
}

pub fn jitter_text(jitter_ms: Option<f64>) -> String {
    jitter_ms.map_or_else(|| "-".to_string(), |j| format!("{j:.2} ms"))
}

pub fn trend_text(trend: Trend) -> &'static str {
    match trend {
        Trend::Up => TREND_UP,
        Trend::Down => TREND_DOWN,
        Trend::Steady => "",
    }
}

fn trend_cell(trend: Trend, color: bool) -> Cell {
    let plain = trend_text(trend).to_string();
    let styled = match (trend, color) {
        (Trend::Up, true) => plain.red().to_string(),
        (Trend::Down, true) => plain.green().to_string(),
        _ => plain.clone(),
    };
    Cell { plain, styled }
}

fn sparkline_cell(samples: &[LatencyClass], color: bool) -> Cell {
    let plain: String = samples.iter().map(|_| SPARK_GLYPH).collect();
    if !color {
        return Cell::plain(plain);
    }
    let styled = samples
        .iter()
        .map(|class| match class {
            LatencyClass::Low => SPARK_GLYPH.green().to_string(),
            LatencyClass::Mid => SPARK_GLYPH.yellow().to_string(),
            LatencyClass::High => SPARK_GLYPH.red().to_string(),
        })
        .collect();
    Cell { plain, styled }
}

fn row_cells(row: &DashboardRow, color: bool) -> Vec<Cell> {
    // Unavailable rows are red throughout, except trend and sparkline which
    // carry their own colors.
    let text = |s: String| {
        if row.is_unavailable() {
            Cell::failure(s, color)
        } else {
            Cell::plain(s)
        }
    };

    vec![
        text(row.row_index.to_string()),
        text(row.host.clone()),
        text(row.display_name.clone()),
        text(status_text(&row.status)),
        text(average_text(row.average_ms)),
        trend_cell(row.trend, color),
        text(loss_text(row.packet_loss_percent)),
        text(jitter_text(row.jitter_ms)),
        sparkline_cell(&row.sparkline, color),
    ]
}

fn separator(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for w in widths {
        line.push_str(&"-".repeat(w + 2));
        line.push('+');
    }
    line
}

fn line(cells: &[Cell], widths: &[usize]) -> String {
    let mut out = String::from("|");
    for (cell, w) in cells.iter().zip(widths) {
        out.push(' ');
        out.push_str(&cell.styled);
        out.push_str(&" ".repeat(w - cell.width()));
        out.push_str(" |");
    }
    out
}

/// Format the full table, header included, one line per row.
pub fn format_table(rows: &[DashboardRow], options: &TableOptions) -> String {
    let header: Vec<Cell> = header_labels(options.history_len)
        .into_iter()
        .map(Cell::plain)
        .collect();
    let body: Vec<Vec<Cell>> = rows.iter().map(|r| row_cells(r, options.color)).collect();

    let mut widths: Vec<usize> = header.iter().map(Cell::width).collect();
    for cells in &body {
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(cell.width());
        }
    }

    let sep = separator(&widths);
    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&line(&header, &widths));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for cells in &body {
        out.push_str(&line(cells, &widths));
        out.push('\n');
    }
    if !body.is_empty() {
        out.push_str(&sep);
        out.push('\n');
    }
    out
}
