//! Title scanner: finds comment title lines and turns them into outline entries.

pub mod clean;
pub mod pattern;

use grep_searcher::sinks::UTF8;
use grep_searcher::SearcherBuilder;

use crate::config::Config;
use crate::error::TocError;
use crate::host::{LineIndex, ScopeClassifier};
use crate::outline;
use crate::types::Title;

/// Scan `text` for titles in document order.
///
/// A matching line is dropped when its start is not comment-or-source scope,
/// when it starts strictly inside the current outline block, or when its
/// cleaned label is empty or equal to the outline title.
pub fn scan<S: ScopeClassifier + ?Sized>(
    text: &str,
    scopes: &S,
    cfg: &Config,
) -> Result<Vec<Title>, TocError> {
    let Some(matcher) = pattern::title_matcher(cfg)? else {
        return Ok(Vec::new());
    };
    let block = outline::locate(text, cfg)?;
    let lines = LineIndex::new(text);
    let steps = clean::label_rewrites(cfg);
    let mut titles = Vec::new();

    let mut searcher = SearcherBuilder::new().line_number(true).build();
    searcher
        .search_slice(
            &matcher,
            text.as_bytes(),
            UTF8(|lnum, line| {
                let line_no = lnum.saturating_sub(1) as usize;
                let start = lines.line_start(line_no);

                if !scopes.is_comment_or_source(start) {
                    tracing::debug!(line = line_no, "skipping title outside comment/source scope");
                    return Ok(true);
                }
                if block.is_some_and(|b| b.strictly_contains(start)) {
                    return Ok(true);
                }
                if !line.contains(cfg.level_char.as_str()) {
                    return Ok(true);
                }

                let label = clean::clean_label(line, &steps);
                if label.is_empty() || label == cfg.toc_title {
                    return Ok(true);
                }
                titles.push(Title {
                    label,
                    line: line_no,
                    level: clean::level_of(line, &cfg.level_char, &cfg.comment_chars),
                });
                Ok(true)
            }),
        )
        .map_err(|e| TocError::Pattern {
            pattern: pattern::title_pattern(&cfg.level_char, &cfg.comment_chars),
            message: e.to_string(),
        })?;

    tracing::debug!(count = titles.len(), "scanned titles");
    Ok(titles)
}

/// Display labels only, in document order.
#[must_use]
pub fn labels(titles: &[Title]) -> Vec<String> {
    titles.iter().map(|t| t.label.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TomlSettings;
    use crate::host::AllSource;

    fn line_cfg(level: &str, comments: &str) -> Config {
        let mut cfg = Config::resolve(&TomlSettings::empty());
        cfg.level_char = level.into();
        cfg.comment_chars = comments.into();
        cfg
    }

    fn title(label: &str, line: usize, level: usize) -> Title {
        Title {
            label: label.into(),
            line,
            level,
        }
    }

    #[test]
    fn basic_scan() {
        let text = "// # Alpha\ncode\n// ## Beta\n";
        let titles = scan(text, &AllSource, &line_cfg("#", "/")).unwrap();
        assert_eq!(titles, vec![title("Alpha", 0, 1), title("Beta", 2, 2)]);
    }

    #[test]
    fn crlf_lines_are_recognized() {
        let text = "// # Alpha\r\ncode\r\n// ## Beta\r\n";
        let titles = scan(text, &AllSource, &line_cfg("#", "/")).unwrap();
        assert_eq!(titles, vec![title("Alpha", 0, 1), title("Beta", 2, 2)]);
    }

    #[test]
    fn no_level_char_means_no_titles() {
        let cfg = Config::resolve(&TomlSettings::empty());
        assert!(scan("// # Alpha\n", &AllSource, &cfg).unwrap().is_empty());
    }

    struct RejectLines(Vec<usize>);

    impl ScopeClassifier for RejectLines {
        fn is_comment_or_source(&self, offset: usize) -> bool {
            !self.0.contains(&offset)
        }
    }

    #[test]
    fn out_of_scope_lines_are_dropped() {
        let text = "// # Alpha\n// # Quoted\n";
        // Line 1 starts at offset 11.
        let titles = scan(text, &RejectLines(vec![11]), &line_cfg("#", "/")).unwrap();
        assert_eq!(titles, vec![title("Alpha", 0, 1)]);
    }

    #[test]
    fn outline_block_lines_are_excluded() {
        let cfg = Config::resolve(&TomlSettings::parse("level_char = \">\"\ncomment_chars = \"/*\"\ntoc_title = \"TABLE OF CONTENTS\"\ntoc_start = \"/*\"\ntoc_line = \" * \"\ntoc_end = \" */\"\ntoc_char = \">\"").unwrap());
        let text = "/*\n * TABLE OF CONTENTS\n * \n * Intro\n * > Body\n */\n/* > Intro */\n/* >> Body */\n";
        let titles = scan(text, &AllSource, &cfg).unwrap();
        assert_eq!(titles, vec![title("Intro", 6, 1), title("> Body", 7, 2)]);
    }

    #[test]
    fn title_label_is_rejected() {
        let mut cfg = line_cfg(">", "/*");
        cfg.toc_title = "Contents".into();
        let titles = scan("/* > Contents */\n/* > Real */\n", &AllSource, &cfg).unwrap();
        assert_eq!(titles, vec![title("Real", 1, 1)]);
    }

    #[test]
    fn empty_labels_are_rejected() {
        let titles = scan("/* > */\n/* > A */\n", &AllSource, &line_cfg(">", "/*")).unwrap();
        assert_eq!(titles, vec![title("A", 1, 1)]);
    }

    #[test]
    fn labels_never_carry_markers_or_wrappers() {
        let text = "/** >Top*/\n  // >> mid: a/b */\n/* >>>deep */\n";
        let mut cfg = line_cfg(">", "/*");
        cfg.toc_char = "-".into();
        let titles = scan(text, &AllSource, &cfg).unwrap();
        assert_eq!(titles.len(), 3);
        for t in &titles {
            assert!(!t.label.contains('>'), "{t:?}");
            assert!(!t.label.contains('/') && !t.label.contains('*'), "{t:?}");
            assert!(!t.label.is_empty());
        }
        assert!(titles.windows(2).all(|w| w[0].line <= w[1].line));
    }
}
