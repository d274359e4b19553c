use crate::buffer::{Edit, EditBuffer};
use crate::rewrite::errors::RewriteError;
use crate::ts::{LanguageSpec, SourceParser};
use tree_sitter::{Node, Tree};

/// A rewrite target: the byte range of a node, or an explicit half-open
/// byte range. Equal bounds denote a pure insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start_byte: usize,
    pub end_byte: usize,
}

impl From<Node<'_>> for Span {
    fn from(node: Node<'_>) -> Self {
        Span {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
        }
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span {
            start_byte: range.start,
            end_byte: range.end,
        }
    }
}

/// Thin builder over [`EditBuffer`]: replace, remove, insert, and wrap at a
/// node or byte range, then `rewrite()` into a fresh string.
pub struct Rewriter<'tree> {
    source: String,
    tree: &'tree Tree,
    buffer: EditBuffer,
    language: Option<LanguageSpec>,
    parser: Option<SourceParser>,
}

impl<'tree> Rewriter<'tree> {
    pub fn new(source: impl Into<String>, tree: &'tree Tree) -> Self {
        Self {
            source: source.into(),
            tree,
            buffer: EditBuffer::new(),
            language: None,
            parser: None,
        }
    }

    /// Set the language used to construct a parser for `rewrite_with_tree`.
    pub fn with_language(mut self, language: impl Into<LanguageSpec>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Supply the parser used by `rewrite_with_tree`.
    pub fn with_parser(mut self, parser: SourceParser) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &'tree Tree {
        self.tree
    }

    fn check_span(&self, span: Span) -> Result<Span, RewriteError> {
        if span.start_byte > span.end_byte || span.end_byte > self.source.len() {
            return Err(RewriteError::SpanOutOfBounds {
                start_byte: span.start_byte,
                end_byte: span.end_byte,
                source_len: self.source.len(),
            });
        }
        Ok(span)
    }

    /// Replace the target with `text`.
    pub fn replace(
        &mut self,
        target: impl Into<Span>,
        text: impl Into<String>,
    ) -> Result<&mut Self, RewriteError> {
        let span = self.check_span(target.into())?;
        self.buffer.add(span.start_byte, span.end_byte, text);
        Ok(self)
    }

    /// Remove the target.
    pub fn remove(&mut self, target: impl Into<Span>) -> Result<&mut Self, RewriteError> {
        let span = self.check_span(target.into())?;
        self.buffer.add(span.start_byte, span.end_byte, "");
        Ok(self)
    }

    /// Insert `text` immediately before the target.
    pub fn insert_before(
        &mut self,
        target: impl Into<Span>,
        text: impl Into<String>,
    ) -> Result<&mut Self, RewriteError> {
        let span = self.check_span(target.into())?;
        self.buffer.add(span.start_byte, span.start_byte, text);
        Ok(self)
    }

    /// Insert `text` immediately after the target.
    pub fn insert_after(
        &mut self,
        target: impl Into<Span>,
        text: impl Into<String>,
    ) -> Result<&mut Self, RewriteError> {
        let span = self.check_span(target.into())?;
        self.buffer.add(span.end_byte, span.end_byte, text);
        Ok(self)
    }

    /// Surround the target with `before` and `after`.
    ///
    /// The opening insertion is added first so that it precedes the closing
    /// one in the output even when the target range is empty.
    pub fn wrap(
        &mut self,
        target: impl Into<Span>,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Result<&mut Self, RewriteError> {
        let span = self.check_span(target.into())?;
        self.buffer.add(span.start_byte, span.start_byte, before);
        self.buffer.add(span.end_byte, span.end_byte, after);
        Ok(self)
    }

    /// The accumulated edits, in the order they were added.
    pub fn edits(&self) -> &[Edit] {
        self.buffer.edits()
    }

    /// Apply all accumulated edits and return the new source.
    pub fn rewrite(&self) -> Result<String, RewriteError> {
        Ok(self.buffer.apply(&self.source)?)
    }

    /// Apply all accumulated edits, re-parse the result, and return both.
    pub fn rewrite_with_tree(&mut self) -> Result<(String, Tree), RewriteError> {
        let source = self.rewrite()?;
        let tree = super::reparse(&source, &mut self.parser, self.language.as_ref())?;
        Ok((source, tree))
    }
}
