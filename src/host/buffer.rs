use crate::host::scope::SyntaxScopes;
use crate::host::{Editor, ScopeClassifier};
use crate::types::{Lang, Selection, Span};

/// Byte offsets of line starts, found with memchr. Line `n` starts at `starts[n]`.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut starts = Vec::with_capacity(text.len() / 40 + 1);
        starts.push(0);
        starts.extend(memchr::memchr_iter(b'\n', text.as_bytes()).map(|i| i + 1));
        Self {
            starts,
            len: text.len(),
        }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Start offset of `line`; past the end returns the text length.
    #[must_use]
    pub fn line_start(&self, line: usize) -> usize {
        self.starts.get(line).copied().unwrap_or(self.len)
    }

    #[must_use]
    pub fn rowcol(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line, offset - self.starts[line])
    }

    /// Offset of (line, column), clamped to the line's content.
    #[must_use]
    pub fn offset(&self, text: &str, line: usize, col: usize) -> usize {
        let span = self.line_span(text, line);
        (span.start + col).min(span.end)
    }

    /// Span of `line` excluding `\n` / `\r\n`. Clamps to the last line.
    #[must_use]
    pub fn line_span(&self, text: &str, line: usize) -> Span {
        let line = line.min(self.starts.len() - 1);
        let start = self.starts[line];
        let mut end = self
            .starts
            .get(line + 1)
            .map_or(self.len, |next| next - 1);
        if end > start && text.as_bytes().get(end - 1) == Some(&b'\r') {
            end -= 1;
        }
        Span::new(start, end)
    }
}

/// In-memory document implementing the host capabilities, used by the CLI and
/// the stdio server.
pub struct TextBuffer {
    text: String,
    lines: LineIndex,
    lang: Option<Lang>,
    scopes: Option<SyntaxScopes>,
    selections: Vec<Selection>,
    centered: Option<usize>,
    edits: usize,
}

impl TextBuffer {
    /// `syntax_scopes = false` treats every position as source.
    #[must_use]
    pub fn new(text: impl Into<String>, lang: Option<Lang>, syntax_scopes: bool) -> Self {
        let text = text.into();
        let lines = LineIndex::new(&text);
        let lang = lang.filter(|_| syntax_scopes);
        let scopes = lang.map(|l| SyntaxScopes::parse(l, &text));
        Self {
            text,
            lines,
            lang,
            scopes,
            selections: vec![Selection::cursor(0)],
            centered: None,
            edits: 0,
        }
    }

    /// Place a single caret at (line, column), both 0-based.
    pub fn set_cursor(&mut self, line: usize, col: usize) {
        self.set_cursors(&[(line, col)]);
    }

    /// Replace the selection set with one caret per (line, column).
    pub fn set_cursors(&mut self, positions: &[(usize, usize)]) {
        self.selections = positions
            .iter()
            .map(|&(line, col)| Selection::cursor(self.lines.offset(&self.text, line, col)))
            .collect();
    }

    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }

    /// Offset last scrolled to the center of the view.
    #[must_use]
    pub fn centered(&self) -> Option<usize> {
        self.centered
    }

    /// Number of `replace` calls applied.
    #[must_use]
    pub fn edits(&self) -> usize {
        self.edits
    }

    /// 0-based (line, column) of the primary caret.
    #[must_use]
    pub fn cursor(&self) -> Option<(usize, usize)> {
        self.selections.first().map(|s| self.lines.rowcol(s.head))
    }
}

impl ScopeClassifier for TextBuffer {
    fn is_comment_or_source(&self, offset: usize) -> bool {
        self.scopes
            .as_ref()
            .map_or(true, |s| s.is_comment_or_source(offset))
    }
}

impl Editor for TextBuffer {
    fn text(&self) -> &str {
        &self.text
    }

    fn rowcol(&self, offset: usize) -> (usize, usize) {
        self.lines.rowcol(offset)
    }

    fn line_span(&self, line: usize) -> Span {
        self.lines.line_span(&self.text, line)
    }

    fn replace(&mut self, span: Span, text: &str) {
        let valid = span.start <= span.end
            && span.end <= self.text.len()
            && self.text.is_char_boundary(span.start)
            && self.text.is_char_boundary(span.end);
        if !valid {
            tracing::warn!(?span, len = self.text.len(), "ignoring replace outside the buffer");
            return;
        }
        self.text.replace_range(span.start..span.end, text);
        self.lines = LineIndex::new(&self.text);
        self.scopes = self.lang.map(|l| SyntaxScopes::parse(l, &self.text));
        let len = self.text.len();
        for sel in &mut self.selections {
            sel.anchor = sel.anchor.min(len);
            sel.head = sel.head.min(len);
        }
        self.edits += 1;
    }

    fn selections(&self) -> &[Selection] {
        &self.selections
    }

    fn clear_selection(&mut self) {
        self.selections.clear();
    }

    fn add_selection(&mut self, selection: Selection) {
        self.selections.push(selection);
    }

    fn show_at_center(&mut self, offset: usize) {
        self.centered = Some(offset);
    }
}
