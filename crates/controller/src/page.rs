//! View model of the upload surface and its text rendering.
//!
//! Rendering is a pure function of [`PageState`]; front-ends redraw from it
//! after every applied event.

use resumedrop_protocol::ResultMetadata;

use crate::alert::AlertQueue;
use crate::log::{ActivityLog, LogEntry};

/// Heading shown above the metadata lines.
pub const METADATA_HEADING: &str = "Extracted metadata";

/// Metadata region content after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataView {
    pub heading: String,
    /// `key: value` lines in decoding order.
    pub lines: Vec<String>,
}

impl From<&ResultMetadata> for MetadataView {
    fn from(meta: &ResultMetadata) -> Self {
        Self {
            heading: METADATA_HEADING.to_string(),
            lines: meta.lines(),
        }
    }
}

/// Everything visible on the upload surface.
#[derive(Debug, Clone, Default)]
pub struct PageState {
    /// Whether the progress/log panel is shown.
    pub panel_visible: bool,
    pub log: ActivityLog,
    /// Persistent metadata region; `None` until the first success.
    pub metadata: Option<MetadataView>,
    pub alerts: AlertQueue,
}

/// Panel rendering options.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub show_timestamps: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_timestamps: true,
        }
    }
}

/// Formats one log entry as a single line.
pub fn render_entry(entry: &LogEntry, opts: RenderOptions) -> String {
    if opts.show_timestamps {
        format!(
            "[{}] {:<5} {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.severity.label(),
            entry.message
        )
    } else {
        format!("{:<5} {}", entry.severity.label(), entry.message)
    }
}

/// Lines of the progress panel; empty while the panel is hidden.
pub fn render_panel(page: &PageState, opts: RenderOptions) -> Vec<String> {
    if !page.panel_visible {
        return Vec::new();
    }
    page.log
        .entries()
        .iter()
        .map(|entry| render_entry(entry, opts))
        .collect()
}

/// Lines of the metadata region: heading, then one line per field.
pub fn render_metadata(page: &PageState) -> Vec<String> {
    match &page.metadata {
        Some(view) => std::iter::once(view.heading.clone())
            .chain(view.lines.iter().cloned())
            .collect(),
        None => Vec::new(),
    }
}
