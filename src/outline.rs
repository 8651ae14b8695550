//! Outline block: locating it in the document and keeping it in sync with the
//! scanned titles.
//!
//! The block is only ever rewritten in place. A document without a recognizable
//! header gets no outline; the user opts in by writing the header once.

use regex::Regex;
use serde::Serialize;

use crate::config::Config;
use crate::error::TocError;
use crate::host::Editor;
use crate::scan::{self, pattern};
use crate::types::{Span, Title};

/// First outline block in `text`, recomputed on every call.
pub fn locate(text: &str, cfg: &Config) -> Result<Option<Span>, TocError> {
    let Some(pattern) = pattern::block_pattern(cfg) else {
        return Ok(None);
    };
    let re = Regex::new(&pattern).map_err(|e| TocError::Pattern {
        message: e.to_string(),
        pattern,
    })?;
    Ok(re.find(text).map(|m| Span::new(m.start(), m.end())))
}

/// Canonical block text for `titles`. Byte-identical input gives byte-identical output.
///
/// ```text
/// <toc_start>
/// <toc_line><toc_title>
/// <toc_line>
/// <toc_line><label>        one per title within the depth limit
/// <toc_end>
/// ```
#[must_use]
pub fn render(titles: &[Title], cfg: &Config) -> String {
    let front = format!("\n{}", cfg.toc_line);
    let mut out = format!("{}{front}{}{front}", cfg.toc_start, cfg.toc_title);
    for title in titles.iter().filter(|t| cfg.includes_level(t.level)) {
        out.push_str(&front);
        out.push_str(&title.label);
    }
    out.push('\n');
    out.push_str(&cfg.toc_end);
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// No outline header in the document.
    NoBlock,
    /// Block already matches the titles; nothing written.
    Unchanged,
    /// Block replaced.
    Rewritten { span: Span },
    /// The rendered block would not be located again under these settings;
    /// nothing written.
    Skipped,
}

/// Bring the outline block in line with the document's titles. Writes only on mismatch.
pub fn sync(editor: &mut dyn Editor, cfg: &Config) -> Result<SyncOutcome, TocError> {
    let Some(span) = locate(editor.text(), cfg)? else {
        tracing::debug!("no outline block");
        return Ok(SyncOutcome::NoBlock);
    };
    let titles = scan::scan(editor.text(), &*editor, cfg)?;
    let canonical = render(&titles, cfg);
    if editor.text()[span.start..span.end] == canonical {
        tracing::debug!(?span, "outline block up to date");
        return Ok(SyncOutcome::Unchanged);
    }
    if locate(&canonical, cfg)? != Some(Span::new(0, canonical.len())) {
        tracing::warn!(?span, "rendered outline block does not round-trip, leaving it alone");
        return Ok(SyncOutcome::Skipped);
    }
    tracing::debug!(?span, entries = titles.len(), "rewriting outline block");
    editor.replace(span, &canonical);
    Ok(SyncOutcome::Rewritten { span })
}
