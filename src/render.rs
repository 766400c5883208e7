//! Render Layer
//!
//! Turns the aggregator's ordered rows into a full-screen table redraw.
//!
//! - [`Render`]: sink for row snapshots, implemented by the terminal renderer
//!   and by test captures
//! - [`TerminalRenderer`]: clears the screen and prints the table
//! - [`format_table`]: pure formatting, usable without a terminal

mod table;

use std::io::{self, Write};

pub use table::{
    SPARK_GLYPH, TREND_DOWN, TREND_UP, TableOptions, UNAVAILABLE_TEXT, average_text,
    format_table, header_labels, jitter_text, loss_text, status_text, trend_text,
};

use crate::aggregator::DashboardRow;

/// Move the cursor home and clear the screen.
pub const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

/// A sink for dashboard snapshots.
///
/// Called once per aggregated report, always with every reporting host in
/// input order. Implementations must not retry or keep state that changes
/// what a later call draws for the same rows.
pub trait Render: Send {
    fn render(&mut self, rows: &[DashboardRow]) -> io::Result<()>;
}

/// Renderer that redraws the whole table on a terminal-like writer.
pub struct TerminalRenderer<W> {
    out: W,
    options: TableOptions,
}

impl TerminalRenderer<io::Stdout> {
    /// Renderer writing to standard output.
    pub fn stdout(options: TableOptions) -> Self {
        Self::new(io::stdout(), options)
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W, options: TableOptions) -> Self {
        Self { out, options }
    }
}

impl<W: Write + Send> Render for TerminalRenderer<W> {
    fn render(&mut self, rows: &[DashboardRow]) -> io::Result<()> {
        let table = format_table(rows, &self.options);
        // Single write per frame keeps partially drawn tables off screen.
        let mut frame = String::with_capacity(CLEAR_SCREEN.len() + table.len());
        frame.push_str(CLEAR_SCREEN);
        frame.push_str(&table);
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }
}

impl<W> std::fmt::Debug for TerminalRenderer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalRenderer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
