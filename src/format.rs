use std::fmt::Write;
use std::path::Path;

use crate::outline::SyncOutcome;
use crate::types::Title;

/// One title per line, 1-indexed line numbers right-aligned, indented by level:
/// `[ 12]   - Setup`
pub fn title_list(titles: &[Title]) -> String {
    let last = titles.last().map_or(1, |t| t.line + 1);
    let width = (last.ilog10() + 1) as usize;
    let mut out = String::new();
    for title in titles {
        let indent = "  ".repeat(title.level.saturating_sub(1));
        let _ = writeln!(out, "[{:>width$}] {indent}{}", title.line + 1, title.label);
    }
    out
}

/// `path:line:col`, 1-indexed.
pub fn location(path: &Path, line: usize, col: usize) -> String {
    format!("{}:{}:{}", path.display(), line + 1, col + 1)
}

/// One-line summary of a sync.
pub fn sync_summary(path: &Path, outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::NoBlock => format!("# {} (no outline block)", path.display()),
        SyncOutcome::Unchanged => format!("# {} (outline up to date)", path.display()),
        SyncOutcome::Rewritten { .. } => format!("# {} (outline updated)", path.display()),
        SyncOutcome::Skipped => format!("# {} (outline left alone: markers do not round-trip)", path.display()),
    }
}
