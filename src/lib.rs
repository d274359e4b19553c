//! Grafter: syntax-aware source rewriting built on tree-sitter.
//!
//! Given a source string and its concrete syntax tree, grafter applies a
//! composable set of edits (replacements, insertions, removals, node
//! moves, copies, swaps, reorderings, query-driven bulk edits, and
//! indentation-respecting insertions) and produces a new source string,
//! optionally re-parsed into a fresh tree.
//!
//! # Architecture
//!
//! Every operation compiles down to a single primitive: [`Edit`], a
//! byte-range replacement against the original source. An [`EditBuffer`]
//! applies a batch of edits in descending offset order so no edit ever
//! invalidates another's positions. Intelligence lives in span
//! acquisition (tree-sitter nodes, queries, and the indentation
//! analyzer), not in the application logic.
//!
//! Builders are chainable and deferred: operations accumulate, and a
//! terminal `rewrite()` (or `rewrite_with_tree()`) materializes them in one
//! deterministic pass.
//!
//! # Example
//!
//! ```
//! use grafter::{Rewriter, SourceParser};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = "fn main() {}";
//! let mut parser = SourceParser::new("rust")?;
//! let tree = parser.parse(source)?;
//!
//! let name = tree
//!     .root_node()
//!     .named_child(0)
//!     .and_then(|f| f.child_by_field_name("name"))
//!     .expect("function name");
//!
//! let mut rewriter = Rewriter::new(source, &tree);
//! rewriter.replace(name, "entry")?;
//! assert_eq!(rewriter.rewrite()?, "fn entry() {}");
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod indent;
pub mod rewrite;
pub mod ts;

// Re-exports
pub use buffer::{BufferError, Edit, EditBuffer, EditPreview};
pub use indent::{IndentStyle, IndentationAnalyzer, IndentationDescriptor};
pub use rewrite::{
    Anchor, InsertContext, Inserter, QueryRewriter, Refactor, RewriteError, Rewriter, Span,
    SymbolKind, Transformer,
};
pub use ts::{LanguageSpec, QueryCapture, QueryMatch, SourceParser, TreeSitterError};
