//! Comment / string scope classification from a tree-sitter parse.
//!
//! A position is comment-or-source unless the innermost node covering it sits
//! inside a string or character literal. Walking outwards, the first comment or
//! literal ancestor decides.

use tree_sitter::{Language, Parser, Tree};

use crate::host::ScopeClassifier;
use crate::types::Lang;

pub fn grammar(lang: Lang) -> Language {
    match lang {
        Lang::Rust => tree_sitter_rust::LANGUAGE.into(),
        Lang::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Lang::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        Lang::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Lang::Python => tree_sitter_python::LANGUAGE.into(),
        Lang::Go => tree_sitter_go::LANGUAGE.into(),
        Lang::Java => tree_sitter_java::LANGUAGE.into(),
        Lang::C => tree_sitter_c::LANGUAGE.into(),
        Lang::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        Lang::Ruby => tree_sitter_ruby::LANGUAGE.into(),
        Lang::Scala => tree_sitter_scala::LANGUAGE.into(),
    }
}

/// Node kinds that hold literal text across grammars: `string_literal`,
/// `raw_string_literal`, `template_string`, `interpreted_string_literal`,
/// `char_literal`, `heredoc_body`, ...
fn is_literal_kind(kind: &str) -> bool {
    kind.contains("string") || kind.contains("char_literal") || kind.starts_with("heredoc")
}

pub struct SyntaxScopes {
    tree: Option<Tree>,
}

impl SyntaxScopes {
    /// Parse `text`. A grammar or parse failure leaves every position classified as source.
    pub fn parse(lang: Lang, text: &str) -> Self {
        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&grammar(lang)) {
            tracing::warn!(?lang, error = %e, "grammar unavailable, treating text as source");
            return Self { tree: None };
        }
        let tree = parser.parse(text, None);
        if tree.is_none() {
            tracing::warn!(?lang, "parse failed, treating text as source");
        }
        Self { tree }
    }
}

impl ScopeClassifier for SyntaxScopes {
    fn is_comment_or_source(&self, offset: usize) -> bool {
        let Some(tree) = &self.tree else {
            return true;
        };
        let Some(mut node) = tree.root_node().descendant_for_byte_range(offset, offset) else {
            return true;
        };
        loop {
            let kind = node.kind();
            if kind.contains("comment") {
                return true;
            }
            // Anonymous tokens carry keyword text as their kind (`string` in TS types).
            if node.is_named() && is_literal_kind(kind) {
                return false;
            }
            match node.parent() {
                Some(parent) => node = parent,
                None => return true,
            }
        }
    }
}
