//! Capabilities the core needs from whatever editor hosts it.
//!
//! The core reads the document, asks for scope classification, replaces one span
//! and moves the selection. Everything else about the buffer belongs to the host.

pub mod buffer;
pub mod scope;

use crate::types::{Selection, Span};

pub use buffer::{LineIndex, TextBuffer};
pub use scope::SyntaxScopes;

/// "Is the position at `offset` inside a comment or plain source?"
/// False for string and character literal content.
pub trait ScopeClassifier {
    fn is_comment_or_source(&self, offset: usize) -> bool;
}

/// Every position counts as source.
pub struct AllSource;

impl ScopeClassifier for AllSource {
    fn is_comment_or_source(&self, _offset: usize) -> bool {
        true
    }
}

/// Buffer, selection and view control of a single open document.
pub trait Editor: ScopeClassifier {
    fn text(&self) -> &str;

    /// 0-based (line, column) of a byte offset.
    fn rowcol(&self, offset: usize) -> (usize, usize);

    /// Span of `line` without its terminator. Lines past the end clamp to the last line.
    fn line_span(&self, line: usize) -> Span;

    fn replace(&mut self, span: Span, text: &str);

    fn selections(&self) -> &[Selection];

    fn clear_selection(&mut self);

    fn add_selection(&mut self, selection: Selection);

    fn show_at_center(&mut self, offset: usize);
}

/// Modal list presentation. `None` means the user cancelled.
pub trait QuickPanel {
    fn show(&mut self, items: &[String]) -> Option<usize>;
}

/// A panel that never picks anything. Used when only the sync side effect is wanted.
pub struct Dismiss;

impl QuickPanel for Dismiss {
    fn show(&mut self, _items: &[String]) -> Option<usize> {
        None
    }
}

/// A panel that always picks the same entry.
pub struct Preselected(pub Option<usize>);

impl QuickPanel for Preselected {
    fn show(&mut self, _items: &[String]) -> Option<usize> {
        self.0
    }
}
