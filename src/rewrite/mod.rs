//! Rewriting builders: the thin edit façade, structural transforms,
//! syntax-aware insertion, query-driven bulk edits, and refactor recipes.
//!
//! Every builder owns one immutable source, borrows nodes from one
//! caller-owned tree, and lowers its accumulated operations into an
//! [`crate::buffer::EditBuffer`] at `rewrite()` time.

pub mod errors;
pub mod inserter;
pub mod query_rewriter;
pub mod refactor;
pub mod rewriter;
pub mod transformer;

pub use errors::RewriteError;
pub use inserter::{InsertContext, Inserter};
pub use query_rewriter::QueryRewriter;
pub use refactor::{Refactor, SymbolKind};
pub use rewriter::{Rewriter, Span};
pub use transformer::{Anchor, Transformer};

use crate::ts::{LanguageSpec, SourceParser};
use tree_sitter::Tree;

/// Re-parse `source` with the builder's parser, constructing one from its
/// language when no parser was supplied.
pub(crate) fn reparse(
    source: &str,
    parser: &mut Option<SourceParser>,
    language: Option<&LanguageSpec>,
) -> Result<Tree, RewriteError> {
    let parser = match parser {
        Some(p) => p,
        None => {
            let language = language.ok_or(RewriteError::MissingParser)?;
            parser.insert(SourceParser::new(language.clone())?)
        }
    };
    Ok(parser.parse(source)?)
}
