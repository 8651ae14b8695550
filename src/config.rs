//! Settings lookup with typed, silent fallbacks.
//!
//! The store is a plain key → value table. Nothing here raises for a missing or
//! malformed key: absence degrades to "feature disabled" (empty string, no value,
//! unlimited depth). `Config` is resolved once per command invocation and never
//! cached across invocations.

use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::error::TocError;

pub const LEVEL_CHAR: &str = "level_char";
pub const COMMENT_CHARS: &str = "comment_chars";
pub const TOC_TITLE: &str = "toc_title";
pub const TOC_START: &str = "toc_start";
pub const TOC_LINE: &str = "toc_line";
pub const TOC_END: &str = "toc_end";
pub const TOC_CHAR: &str = "toc_char";
pub const TOC_LEVEL: &str = "toc_level";
pub const SYNTAX_SCOPES: &str = "syntax_scopes";

/// Depth used when `toc_level = true` is given instead of a number.
pub const DEPTH_FALLBACK: i64 = 500;

/// Project-local settings file, looked up from the document's directory upwards.
pub const LOCAL_SETTINGS_FILE: &str = ".tableofcomments.toml";

const DEFAULTS: &str = include_str!("defaults.toml");

/// Key → value settings source.
pub trait SettingsStore {
    fn get(&self, name: &str) -> Option<&Value>;
}

/// Layered TOML settings. Later layers override earlier ones key by key.
#[derive(Debug, Clone, Default)]
pub struct TomlSettings {
    table: Table,
}

impl TomlSettings {
    /// Empty store; every lookup falls back.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in defaults shipped with the crate.
    pub fn defaults() -> Self {
        // The embedded file is covered by a test; a parse failure there is a build defect.
        Self::parse(DEFAULTS).unwrap_or_default()
    }

    #[must_use]
    pub fn from_table(table: Table) -> Self {
        Self { table }
    }

    pub fn parse(src: &str) -> Result<Self, toml::de::Error> {
        Ok(Self {
            table: src.parse::<Table>()?,
        })
    }

    pub fn load(path: &Path) -> Result<Self, TocError> {
        let src = fs::read_to_string(path).map_err(|e| TocError::io(path, e))?;
        Self::parse(&src).map_err(|e| TocError::Config {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Overlay `other` on top of `self`.
    #[must_use]
    pub fn layer(mut self, other: Self) -> Self {
        for (k, v) in other.table {
            self.table.insert(k, v);
        }
        self
    }

    /// Apply one `key=value` override. The value is read as a TOML literal when it
    /// parses as one (`3`, `true`, `"x"`), otherwise taken verbatim as a string.
    pub fn set(&mut self, assignment: &str) -> Result<(), TocError> {
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| TocError::InvalidArgument {
                message: format!("expected key=value, got `{assignment}`"),
            })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(TocError::InvalidArgument {
                message: format!("empty key in `{assignment}`"),
            });
        }
        let value = format!("v = {raw}")
            .parse::<Table>()
            .ok()
            .and_then(|mut t| t.remove("v"))
            .unwrap_or_else(|| Value::String(raw.to_string()));
        self.table.insert(key.to_string(), value);
        Ok(())
    }
}

impl SettingsStore for TomlSettings {
    fn get(&self, name: &str) -> Option<&Value> {
        self.table.get(name)
    }
}

/// Walk up from `dir` to the nearest `.tableofcomments.toml`.
pub fn find_local_settings(dir: &Path) -> Option<PathBuf> {
    let mut dir = dir;
    loop {
        let candidate = dir.join(LOCAL_SETTINGS_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Type requested from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Str,
    Bool,
    Int,
}

/// Result of a typed lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Str(String),
    Bool(bool),
    Int(i64),
    Null,
}

/// Typed lookup. Falsy values (`""`, `0`, `false`) count as absent.
/// Absent strings resolve to `""`, absent bools and ints to `Null`.
/// An int requested from an unparsable value is `Null`, i.e. "no limit".
pub fn get(store: &dyn SettingsStore, name: &str, expect: Expect) -> Resolved {
    let value = store.get(name).filter(|v| is_truthy(v));
    match (expect, value) {
        (Expect::Str, None) => Resolved::Str(String::new()),
        (Expect::Str, Some(Value::String(s))) => Resolved::Str(s.clone()),
        (Expect::Str, Some(other)) => Resolved::Str(other.to_string()),

        (Expect::Bool, None) | (Expect::Int, None) => Resolved::Null,
        (Expect::Bool, Some(v)) => Resolved::Bool(matches!(v, Value::Boolean(true) | Value::Integer(1))),

        (Expect::Int, Some(Value::Integer(i))) => Resolved::Int(*i),
        (Expect::Int, Some(Value::Float(f))) => Resolved::Int(f.trunc() as i64),
        (Expect::Int, Some(Value::Boolean(_))) => Resolved::Int(DEPTH_FALLBACK),
        (Expect::Int, Some(Value::String(s))) => {
            s.trim().parse::<i64>().map_or(Resolved::Null, Resolved::Int)
        }
        (Expect::Int, Some(_)) => Resolved::Null,
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::String(s) => !s.is_empty(),
        Value::Integer(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::Boolean(b) => *b,
        Value::Array(a) => !a.is_empty(),
        Value::Table(t) => !t.is_empty(),
        Value::Datetime(_) => true,
    }
}

fn get_str(store: &dyn SettingsStore, name: &str) -> String {
    match get(store, name, Expect::Str) {
        Resolved::Str(s) => s,
        _ => String::new(),
    }
}

/// Settings resolved for one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub level_char: String,
    pub comment_chars: String,
    pub toc_title: String,
    pub toc_start: String,
    pub toc_line: String,
    pub toc_end: String,
    pub toc_char: String,
    /// Deepest level listed in the outline; `None` is unlimited.
    pub toc_level: Option<usize>,
    pub syntax_scopes: bool,
}

impl Config {
    pub fn resolve(store: &dyn SettingsStore) -> Self {
        let toc_level = match get(store, TOC_LEVEL, Expect::Int) {
            // A negative limit is below every level: nothing is listed.
            Resolved::Int(n) => Some(usize::try_from(n).unwrap_or(0)),
            _ => None,
        };
        // Absent means enabled; only an explicit `false` turns syntax scopes off.
        let syntax_scopes = store.get(SYNTAX_SCOPES).map_or(true, |_| {
            get(store, SYNTAX_SCOPES, Expect::Bool) == Resolved::Bool(true)
        });
        Self {
            level_char: get_str(store, LEVEL_CHAR),
            comment_chars: get_str(store, COMMENT_CHARS),
            toc_title: get_str(store, TOC_TITLE),
            toc_start: get_str(store, TOC_START),
            toc_line: get_str(store, TOC_LINE),
            toc_end: get_str(store, TOC_END),
            toc_char: get_str(store, TOC_CHAR),
            toc_level,
            syntax_scopes,
        }
    }

    /// Whether a title at `level` belongs in the outline block.
    #[must_use]
    pub fn includes_level(&self, level: usize) -> bool {
        self.toc_level.map_or(true, |max| level <= max)
    }
}
