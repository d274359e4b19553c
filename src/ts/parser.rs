use crate::ts::errors::TreeSitterError;
use crate::ts::lang::LanguageSpec;
use ast_grep_language::{LanguageExt, SupportLang};
use tree_sitter::{Parser, Tree};

/// Tree-sitter parser configured for a single language.
///
/// A scoped resource: rewriting builders construct one on demand for
/// `rewrite_with_tree` and release it when the call returns, or hold one
/// the caller supplied up front.
pub struct SourceParser {
    parser: Parser,
    language: SupportLang,
}

impl SourceParser {
    pub fn new(language: impl Into<LanguageSpec>) -> Result<Self, TreeSitterError> {
        let language = language.into().resolve()?;
        let mut parser = Parser::new();
        parser
            .set_language(&language.get_ts_language())
            .map_err(|_| TreeSitterError::LanguageSet)?;
        Ok(Self { parser, language })
    }

    pub fn language(&self) -> SupportLang {
        self.language
    }

    /// Parse source into a fresh tree. A tree containing ERROR nodes is not
    /// an error here; callers inspect the tree.
    pub fn parse(&mut self, source: &str) -> Result<Tree, TreeSitterError> {
        self.parser
            .parse(source, None)
            .ok_or(TreeSitterError::ParseFailed)
    }
}
