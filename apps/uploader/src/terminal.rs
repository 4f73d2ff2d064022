//! Terminal front-end: draws the controller's page state as text.

use std::io::Write;

use resumedrop_controller::page::render_entry;
use resumedrop_controller::{PageState, RenderOptions, Severity, render_metadata};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";

/// Whether the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && std::env::var("TERM")
            .map(|t| t != "dumb")
            .unwrap_or(false)
}

/// Incrementally prints the log panel and alerts.
///
/// The log is append-only between uploads, so only entries past the last
/// printed index are written. A shorter log means it was cleared.
pub struct TerminalRenderer {
    opts: RenderOptions,
    color: bool,
    printed: usize,
}

impl TerminalRenderer {
    pub fn new(opts: RenderOptions, color: bool) -> Self {
        Self {
            opts,
            color,
            printed: 0,
        }
    }

    /// Writes pending alerts to `err` and new log entries to `out`.
    ///
    /// Alerts are removed from the page once written. Log lines are skipped
    /// while the panel is hidden.
    pub fn flush(
        &mut self,
        page: &mut PageState,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> std::io::Result<()> {
        for alert in page.alerts.drain() {
            writeln!(err, "{}", self.paint(&format!("! {}", alert.message), RED))?;
        }

        let entries = page.log.entries();
        if entries.len() < self.printed {
            self.printed = 0;
        }
        if !page.panel_visible {
            return Ok(());
        }

        for entry in &entries[self.printed..] {
            let line = render_entry(entry, self.opts);
            let line = match entry.severity {
                Severity::Info => line,
                Severity::Success => self.paint(&line, GREEN),
                Severity::Error => self.paint(&line, RED),
            };
            writeln!(out, "{line}")?;
        }
        self.printed = entries.len();
        out.flush()
    }

    /// Writes the metadata region, if anything was extracted.
    pub fn print_metadata(&self, page: &PageState, out: &mut impl Write) -> std::io::Result<()> {
        let mut lines = render_metadata(page).into_iter();
        let Some(heading) = lines.next() else {
            return Ok(());
        };

        writeln!(out)?;
        writeln!(out, "{}", self.paint(&heading, BOLD))?;
        for line in lines {
            writeln!(out, "  {line}")?;
        }
        out.flush()
    }

    fn paint(&self, text: &str, style: &str) -> String {
        if self.color {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}
