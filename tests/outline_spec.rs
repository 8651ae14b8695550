use std::fs;

use tableofcomments::config::{Config, TomlSettings};
use tableofcomments::host::{Editor, Preselected, ScopeClassifier, TextBuffer};
use tableofcomments::types::{detect_lang, Selection, Span};
use tableofcomments::{
    navigate, outline, scan, Args, CommandTable, Context, Direction, SyncOutcome,
    TableOfComments, Title,
};

const RUST_DOC: &str = r#"/* TABLE OF CONTENTS */

/* > Parsing */
fn parse() {
    let banner = "
/* > Not a title */
";
}

/* >> Tokens */
struct Token;

/* > Output */
fn render() {}
"#;

/// Host whose only job is to count buffer mutations.
struct CountingEditor {
    inner: TextBuffer,
    replaces: usize,
}

impl ScopeClassifier for CountingEditor {
    fn is_comment_or_source(&self, offset: usize) -> bool {
        self.inner.is_comment_or_source(offset)
    }
}

impl Editor for CountingEditor {
    fn text(&self) -> &str {
        self.inner.text()
    }

    fn rowcol(&self, offset: usize) -> (usize, usize) {
        self.inner.rowcol(offset)
    }

    fn line_span(&self, line: usize) -> Span {
        self.inner.line_span(line)
    }

    fn replace(&mut self, span: Span, text: &str) {
        self.replaces += 1;
        self.inner.replace(span, text);
    }

    fn selections(&self) -> &[Selection] {
        self.inner.selections()
    }

    fn clear_selection(&mut self) {
        self.inner.clear_selection();
    }

    fn add_selection(&mut self, selection: Selection) {
        self.inner.add_selection(selection);
    }

    fn show_at_center(&mut self, offset: usize) {
        self.inner.show_at_center(offset);
    }
}

fn defaults() -> TomlSettings {
    TomlSettings::defaults()
}

fn rust_buffer(text: &str) -> TextBuffer {
    TextBuffer::new(text, detect_lang(std::path::Path::new("lib.rs")), true)
}

fn outline_mode(editor: &mut dyn Editor, settings: &TomlSettings, pick: Option<usize>) -> tableofcomments::Outcome {
    let mut panel = Preselected(pick);
    let mut ctx = Context {
        editor,
        panel: &mut panel,
        settings,
    };
    CommandTable::with_builtins()
        .run(TableOfComments::NAME, &mut ctx, &Args::outline())
        .unwrap()
}

#[test]
fn basic_scan_scenario() {
    let settings = TomlSettings::parse("level_char = \"#\"\ncomment_chars = \"/\"").unwrap();
    let cfg = Config::resolve(&settings);
    let buf = TextBuffer::new("// # Alpha\ncode\n// ## Beta", None, true);
    let titles = scan::scan(buf.text(), &buf, &cfg).unwrap();
    assert_eq!(
        titles,
        vec![
            Title { label: "Alpha".into(), line: 0, level: 1 },
            Title { label: "Beta".into(), line: 2, level: 2 },
        ]
    );
}

#[test]
fn depth_filter_scenario() {
    let settings = TomlSettings::parse(
        "level_char = \"#\"\ncomment_chars = \"/\"\ntoc_title = \"Contents\"\ntoc_start = \"/*\"\ntoc_line = \" * \"\ntoc_end = \" */\"\ntoc_level = 1",
    )
    .unwrap();
    let cfg = Config::resolve(&settings);
    let mut buf = TextBuffer::new("/* Contents */\n// # Alpha\ncode\n// ## Beta\n", None, true);

    assert!(matches!(outline::sync(&mut buf, &cfg).unwrap(), SyncOutcome::Rewritten { .. }));
    let block = outline::locate(buf.text(), &cfg).unwrap().unwrap();
    let block_text = &buf.text()[block.start..block.end];
    assert!(block_text.contains("Alpha"));
    assert!(!block_text.contains("Beta"));
}

#[test]
fn string_literals_are_not_titles() {
    let cfg = Config::resolve(&defaults());
    let buf = rust_buffer(RUST_DOC);
    let labels: Vec<String> = scan::scan(buf.text(), &buf, &cfg)
        .unwrap()
        .into_iter()
        .map(|t| t.label)
        .collect();
    assert_eq!(labels, vec!["Parsing", "- Tokens", "Output"]);
}

#[test]
fn second_outline_run_changes_nothing() {
    let settings = defaults();
    let mut editor = CountingEditor {
        inner: rust_buffer(RUST_DOC),
        replaces: 0,
    };

    let first = outline_mode(&mut editor, &settings, None);
    assert!(matches!(first.sync, Some(SyncOutcome::Rewritten { .. })));
    assert_eq!(editor.replaces, 1);
    let after_first = editor.text().to_string();

    let second = outline_mode(&mut editor, &settings, None);
    assert_eq!(second.sync, Some(SyncOutcome::Unchanged));
    assert_eq!(editor.replaces, 1);
    assert_eq!(editor.text(), after_first);
    assert_eq!(first.listed, second.listed);
}

#[test]
fn scan_never_reports_lines_inside_the_block() {
    let settings = defaults();
    let cfg = Config::resolve(&settings);
    let mut buf = rust_buffer(RUST_DOC);
    outline::sync(&mut buf, &cfg).unwrap();

    let block = outline::locate(buf.text(), &cfg).unwrap().unwrap();
    let (first, _) = buf.rowcol(block.start);
    let (last, _) = buf.rowcol(block.end);
    let titles = scan::scan(buf.text(), &buf, &cfg).unwrap();

    assert!(!titles.is_empty());
    for t in &titles {
        assert!(t.line < first || t.line > last, "{t:?} inside block {first}..={last}");
    }
    assert!(titles.windows(2).all(|w| w[0].line <= w[1].line));
}

#[test]
fn traversal_stops_at_both_ends() {
    let cfg = Config::resolve(&defaults());
    let buf = rust_buffer(RUST_DOC);
    let titles = scan::scan(buf.text(), &buf, &cfg).unwrap();
    let first = titles.first().unwrap().line;
    let last = titles.last().unwrap().line;

    assert_eq!(navigate::next_title(&titles, last, Direction::Down), None);
    assert_eq!(navigate::next_title(&titles, first, Direction::Up), None);
    assert_eq!(navigate::next_title(&titles, 0, Direction::Up), None);
}

#[test]
fn picking_from_the_list_lands_on_the_title() {
    let settings = defaults();
    let mut buf = rust_buffer(RUST_DOC);
    let out = outline_mode(&mut buf, &settings, Some(2));
    let jumped = out.jumped.unwrap();
    assert_eq!(jumped.label, "Output");

    let (line, col) = buf.cursor().unwrap();
    assert_eq!(line, jumped.line);
    assert_eq!(col, "/* > Output */".len());
    assert_eq!(buf.centered(), Some(buf.line_span(line).end));
}

#[test]
fn file_round_trip_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lib.rs");
    fs::write(&path, RUST_DOC).unwrap();
    let cfg = Config::resolve(&defaults());

    for _ in 0..2 {
        let text = fs::read_to_string(&path).unwrap();
        let mut buf = TextBuffer::new(text, detect_lang(&path), cfg.syntax_scopes);
        if let SyncOutcome::Rewritten { .. } = outline::sync(&mut buf, &cfg).unwrap() {
            fs::write(&path, buf.into_text()).unwrap();
        }
    }

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(
        "/*\n * TABLE OF CONTENTS\n * \n * Parsing\n * - Tokens\n * Output\n */\n"
    ));
    assert_eq!(text.matches("TABLE OF CONTENTS").count(), 1);
}

const PY_DOC: &str = r#"# TABLE OF CONTENTS

# > Intro
BANNER = """
# > Not a title
"""

# >> Setup
def setup():
    pass
"#;

#[test]
fn hash_comment_outline_is_idempotent() {
    let settings = defaults().layer(
        TomlSettings::parse("comment_chars = \"#\"\ntoc_start = \"#\"\ntoc_line = \"# \"\ntoc_end = \"#\"").unwrap(),
    );
    let mut editor = CountingEditor {
        inner: TextBuffer::new(PY_DOC, detect_lang(std::path::Path::new("app.py")), true),
        replaces: 0,
    };

    let runs: Vec<_> = (0..3).map(|_| outline_mode(&mut editor, &settings, None)).collect();

    assert!(matches!(runs[0].sync, Some(SyncOutcome::Rewritten { .. })));
    assert_eq!(runs[1].sync, Some(SyncOutcome::Unchanged));
    assert_eq!(runs[2].sync, Some(SyncOutcome::Unchanged));
    assert_eq!(editor.replaces, 1);
    assert!(editor.text().starts_with("#\n# TABLE OF CONTENTS\n# \n# Intro\n# - Setup\n#\n\n# > Intro\n"));
    assert_eq!(scan::labels(&runs[2].listed), vec!["Intro", "- Setup"]);
}
