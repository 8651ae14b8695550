//! Builds the matching rules from configured characters. Every configured
//! character is escaped before it reaches a pattern.

use grep_regex::{RegexMatcher, RegexMatcherBuilder};

use crate::config::Config;
use crate::error::TocError;

/// Punctuation allowed in a title besides word characters and whitespace.
const TITLE_PUNCT: &str = r#"-.,;:'"|{}<>?/\\*@#~!$%^=()\[\]"#;

/// `(?:\s|c1|c2|...)` for the configured comment-wrapper characters.
fn wrapper_class(comment_chars: &str) -> String {
    let mut alts = vec![r"\s".to_string()];
    alts.extend(comment_chars.chars().map(|c| regex_syntax::escape(&c.to_string())));
    format!("(?:{})", alts.join("|"))
}

/// Full-line title pattern: optional leading whitespace / wrapper characters, one
/// or more level markers, at least one allowed title character, optional trailing
/// whitespace / wrapper characters.
#[must_use]
pub fn title_pattern(level_char: &str, comment_chars: &str) -> String {
    let wrap = wrapper_class(comment_chars);
    let level = regex_syntax::escape(level_char);
    format!(r"^{wrap}*?(?:{level})+\s*?(?:\w|\s|[{TITLE_PUNCT}])+{wrap}*?$")
}

/// Line-oriented matcher for title lines. `None` when no level character is
/// configured, which disables title recognition.
pub fn title_matcher(cfg: &Config) -> Result<Option<RegexMatcher>, TocError> {
    if cfg.level_char.is_empty() {
        return Ok(None);
    }
    let pattern = title_pattern(&cfg.level_char, &cfg.comment_chars);
    RegexMatcherBuilder::new()
        .line_terminator(Some(b'\n'))
        .crlf(true)
        .build(&pattern)
        .map(Some)
        .map_err(|e| TocError::Pattern {
            pattern,
            message: e.to_string(),
        })
}

/// Outline block pattern, in one of two shapes:
///
/// - multi-line: the opening token, whitespace / `*` / line-prefix filler, the
///   literal title, then whole lines carrying the line prefix, up to the first
///   line that is exactly `toc_end`;
/// - one line: the title followed by the closing token on the same line. The
///   token may be left off when it equals the line prefix (line comments).
///
/// `None` when the title, the opening or closing token, or the line prefix is
/// empty. Without them a rendered block could not be told apart from code.
#[must_use]
pub fn block_pattern(cfg: &Config) -> Option<String> {
    let open = cfg.toc_start.trim();
    let close = cfg.toc_end.trim();
    let prefix = cfg.toc_line.trim();
    if cfg.toc_title.is_empty() || open.is_empty() || close.is_empty() || cfg.toc_line.is_empty() {
        return None;
    }

    let mut filler = vec![r"\s".to_string(), r"\*".to_string()];
    // Whitespace-only prefixes are matched verbatim as indentation.
    let body = if prefix.is_empty() {
        regex_syntax::escape(&cfg.toc_line)
    } else {
        filler.push(regex_syntax::escape(prefix));
        format!(r"[ \t]*{}", regex_syntax::escape(prefix))
    };
    let close_token = if close == prefix {
        format!("(?:{})?", regex_syntax::escape(close))
    } else {
        regex_syntax::escape(close)
    };

    Some(format!(
        r"(?mR){open}(?:{filler})*{title}(?:[ \t]*(?:\n{body}[^\n]*)*?\n{end}$|[ \t]*{close_token}[ \t]*$)",
        open = regex_syntax::escape(open),
        filler = filler.join("|"),
        title = regex_syntax::escape(&cfg.toc_title),
        end = regex_syntax::escape(&cfg.toc_end),
    ))
}
