//! Boundary to the embedding host.
//!
//! The pipeline knows nothing about quick panels or viewports; it hands
//! the host labeled, pickable items and progress ticks through this trait
//! and lets the host decide how to render them.

use crate::types::MatchRecord;
use std::path::{Path, PathBuf};

/// One pickable result: a display label plus the jump target.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayItem {
    pub label: String,
    pub target: MatchRecord,
}

impl DisplayItem {
    pub fn from_record(record: &MatchRecord) -> Self {
        Self {
            label: display_label(record),
            target: record.clone(),
        }
    }
}

/// Callbacks through which a search session reports to the host.
///
/// Implementations must be cheap and non-blocking; they run on the
/// session's polling loop.
pub trait SearchHost: Send + Sync {
    /// Called roughly every 100ms while the search process runs.
    fn progress(&self, indicator: &str);

    /// Ordered pickable results plus a human-readable summary.
    fn publish(&self, items: Vec<DisplayItem>, summary: &str);

    /// Terminal failure of the current session, reported once.
    fn error(&self, message: &str);

    /// The session ended without results because the user dismissed it.
    /// Hosts restore their pre-search cursor and viewport here.
    fn cancelled(&self) {}
}

/// `filename:line:column` label for a pickable item.
pub fn display_label(record: &MatchRecord) -> String {
    format!(
        "{}:{}:{}",
        record.filename, record.line_number, record.column
    )
}

/// Bouncing progress indicator, one frame per poll tick.
pub fn progress_indicator(tick: usize) -> String {
    const WIDTH: usize = 7;
    let phase = tick % (2 * WIDTH);
    let pos = if phase <= WIDTH { phase } else { 2 * WIDTH - phase };
    format!("[{}={}]", " ".repeat(pos), " ".repeat(WIDTH - pos))
}

/// Default search-path resolution for hosts that do not force a path:
/// the project root when one is open, otherwise the directory of the
/// current file; a folder hint is appended to either.
pub fn resolve_search_path(
    project_root: Option<&Path>,
    current_file: Option<&Path>,
    folder: Option<&str>,
) -> Option<PathBuf> {
    let base = match project_root {
        Some(root) => root.to_path_buf(),
        None => current_file?.parent()?.to_path_buf(),
    };
    match folder {
        Some(folder) if !folder.is_empty() => Some(base.join(folder)),
        _ => Some(base),
    }
}
