//! Tree-sitter plumbing: language handles, parsing, and query execution.
//!
//! The parser, tree, node, and query primitives themselves come from the
//! external tree-sitter crate; this module only normalizes language inputs
//! and adapts query results into ordered named captures.

pub mod errors;
pub mod lang;
pub mod parser;
pub mod query;

pub use errors::TreeSitterError;
pub use lang::LanguageSpec;
pub use parser::SourceParser;
pub use query::{run_query, QueryCapture, QueryMatch};
