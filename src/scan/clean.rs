//! Turns a raw title line into its display label.
//!
//! Cleaning is an ordered list of literal rewrites applied in sequence:
//! 1. remove `/*` and `*/`
//! 2. remove each comment-wrapper character
//! 3. level marker + space → space
//! 4. remaining level markers → outline bullet character
//!
//! and finally the result is trimmed. Wrappers are always stripped before
//! level markers are touched.

use crate::config::Config;

/// One literal `from → to` rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub from: String,
    pub to: String,
}

impl Rewrite {
    fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    fn apply(&self, line: &str) -> String {
        if self.from.is_empty() {
            return line.to_string();
        }
        line.replace(&self.from, &self.to)
    }
}

/// The rewrite sequence for `cfg`, in application order.
#[must_use]
pub fn label_rewrites(cfg: &Config) -> Vec<Rewrite> {
    let mut steps = vec![Rewrite::new("/*", ""), Rewrite::new("*/", "")];
    steps.extend(cfg.comment_chars.chars().map(|c| Rewrite::new(c, "")));
    steps.push(Rewrite::new(format!("{} ", cfg.level_char), " "));
    steps.push(Rewrite::new(cfg.level_char.as_str(), cfg.toc_char.as_str()));
    steps
}

/// Apply `steps` to `line` and trim.
#[must_use]
pub fn clean_label(line: &str, steps: &[Rewrite]) -> String {
    steps
        .iter()
        .fold(line.to_string(), |acc, step| step.apply(&acc))
        .trim()
        .to_string()
}

/// Nesting depth: how many level markers repeat right after the leading
/// whitespace / wrapper characters. Wrapper characters equal to the level
/// marker are not skipped.
#[must_use]
pub fn level_of(line: &str, level_char: &str, comment_chars: &str) -> usize {
    if level_char.is_empty() {
        return 0;
    }
    let rest = line.trim_start_matches(|c: char| {
        (c.is_whitespace() || comment_chars.contains(c)) && !level_char.starts_with(c)
    });
    let mut rest = rest;
    let mut level = 0;
    while let Some(tail) = rest.strip_prefix(level_char) {
        level += 1;
        rest = tail;
    }
    level
}
