use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True when `offset` lies strictly between the endpoints.
    #[must_use]
    pub fn strictly_contains(&self, offset: usize) -> bool {
        offset > self.start && offset < self.end
    }
}

/// A recognized comment title. `line` is 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub label: String,
    pub line: usize,
    pub level: usize,
}

/// A selection range. `head` is the caret end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    #[must_use]
    pub fn cursor(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(format!("unknown direction: {other}. Use: up, down")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// Languages with a grammar for scope classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    Rust,
    TypeScript,
    Tsx,
    JavaScript,
    Python,
    Go,
    Java,
    C,
    Cpp,
    Ruby,
    Scala,
}

/// Detect language by extension, then by name.
pub fn detect_lang(path: &Path) -> Option<Lang> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ts" | "mts" | "cts") => Some(Lang::TypeScript),
        Some("tsx") => Some(Lang::Tsx),
        Some("js" | "jsx" | "mjs" | "cjs") => Some(Lang::JavaScript),
        Some("py" | "pyi") => Some(Lang::Python),
        Some("rs") => Some(Lang::Rust),
        Some("go") => Some(Lang::Go),
        Some("java") => Some(Lang::Java),
        Some("c" | "h") => Some(Lang::C),
        Some("cpp" | "hpp" | "cc" | "cxx") => Some(Lang::Cpp),
        Some("rb") => Some(Lang::Ruby),
        Some("scala" | "sc") => Some(Lang::Scala),
        None => match path.file_name().and_then(|n| n.to_str()) {
            Some("Vagrantfile" | "Rakefile" | "Gemfile") => Some(Lang::Ruby),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strictly_contains_excludes_endpoints() {
        let span = Span::new(10, 20);
        assert!(!span.strictly_contains(10));
        assert!(span.strictly_contains(11));
        assert!(span.strictly_contains(19));
        assert!(!span.strictly_contains(20));
    }

    #[test]
    fn direction_parses_only_up_and_down() {
        assert_eq!("up".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!("down".parse::<Direction>(), Ok(Direction::Down));
        assert!("left".parse::<Direction>().is_err());
    }

    #[test]
    fn detects_by_extension_and_name() {
        assert_eq!(detect_lang(Path::new("a/b.rs")), Some(Lang::Rust));
        assert_eq!(detect_lang(Path::new("x.tsx")), Some(Lang::Tsx));
        assert_eq!(detect_lang(Path::new("Rakefile")), Some(Lang::Ruby));
        assert_eq!(detect_lang(Path::new("notes.txt")), None);
        assert_eq!(detect_lang(Path::new("README")), None);
    }
}
