use crate::indent::IndentationAnalyzer;
use crate::rewrite::errors::RewriteError;
use crate::ts::{LanguageSpec, SourceParser};
use tree_sitter::{Node, Tree};

/// Where an insertion point sits relative to its target node. The context
/// decides default surrounding newlines and which side a sibling separator
/// goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertContext {
    InsideStart,
    InsideEnd,
    Before,
    After,
}

#[derive(Debug, Clone)]
struct InsertionPoint {
    offset: usize,
    context: InsertContext,
    level: usize,
}

#[derive(Debug, Clone)]
struct PendingInsertion {
    offset: usize,
    text: String,
    newline_before: bool,
    newline_after: bool,
}

/// Syntax-aware insertion at container boundaries, with indentation
/// adjustment.
///
/// One insertion point is active at a time; each primitive queues an
/// insertion at that point. The container locator is delimiter-based
/// (first named child, then `{` / `}` within the node's text), which is
/// correct for brace-delimited languages and degrades to the node
/// boundaries otherwise; for non-brace grammars use `before`/`after` with
/// `insert_sibling`.
pub struct Inserter<'tree> {
    source: String,
    tree: &'tree Tree,
    analyzer: IndentationAnalyzer,
    point: Option<InsertionPoint>,
    pending: Vec<PendingInsertion>,
    language: Option<LanguageSpec>,
    parser: Option<SourceParser>,
}

impl<'tree> Inserter<'tree> {
    pub fn new(source: impl Into<String>, tree: &'tree Tree) -> Self {
        let source = source.into();
        let analyzer = IndentationAnalyzer::new(&source);
        Self {
            source,
            tree,
            analyzer,
            point: None,
            pending: Vec::new(),
            language: None,
            parser: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<LanguageSpec>) -> Self {
        self.language = Some(language.into());
        self
    }

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

    pub fn analyzer(&self) -> &IndentationAnalyzer {
        &self.analyzer
    }

    fn text(&self, node: Node<'tree>) -> &str {
        &self.source[node.byte_range()]
    }

    /// Place the insertion point just inside the opening of `node`.
    pub fn at_start_of(&mut self, node: Node<'tree>) -> &mut Self {
        let level = self.analyzer.level_at_byte(node.start_byte()) + 1;
        let offset = match node.named_child(0) {
            Some(first) => first.start_byte(),
            None => match self.text(node).find('{') {
                Some(i) => node.start_byte() + i + 1,
                None => node.start_byte() + 1,
            },
        };
        self.point = Some(InsertionPoint {
            offset,
            context: InsertContext::InsideStart,
            level,
        });
        self
    }

    /// Place the insertion point just inside the closing of `node`.
    pub fn at_end_of(&mut self, node: Node<'tree>) -> &mut Self {
        let level = self.analyzer.level_at_byte(node.start_byte()) + 1;
        let offset = match self.text(node).rfind('}') {
            Some(i) => node.start_byte() + i,
            None => node.end_byte(),
        };
        self.point = Some(InsertionPoint {
            offset,
            context: InsertContext::InsideEnd,
            level,
        });
        self
    }

    /// Place the insertion point immediately before `node`.
    pub fn before(&mut self, node: Node<'tree>) -> &mut Self {
        self.point = Some(InsertionPoint {
            offset: node.start_byte(),
            context: InsertContext::Before,
            level: self.analyzer.level_at_byte(node.start_byte()),
        });
        self
    }

    /// Place the insertion point immediately after `node`.
    pub fn after(&mut self, node: Node<'tree>) -> &mut Self {
        self.point = Some(InsertionPoint {
            offset: node.end_byte(),
            context: InsertContext::After,
            level: self.analyzer.level_at_byte(node.start_byte()),
        });
        self
    }

    /// Clear the insertion point so a new one may be chosen.
    pub fn reset_position(&mut self) -> &mut Self {
        self.point = None;
        self
    }

    fn current_point(&self) -> Result<InsertionPoint, RewriteError> {
        self.point.clone().ok_or(RewriteError::MissingInsertionPoint)
    }

    fn default_newline_before(&self, point: &InsertionPoint) -> bool {
        match point.context {
            InsertContext::InsideStart => true,
            // Skip the extra newline when the insertion point is already at
            // the start of a blank-prefix line, e.g. right before a closing
            // brace on its own line.
            InsertContext::InsideEnd => {
                let line_start = self.source[..point.offset]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                !self.source[line_start..point.offset]
                    .chars()
                    .all(char::is_whitespace)
            }
            InsertContext::Before | InsertContext::After => false,
        }
    }

    /// Queue `content` as a statement at the insertion point: stripped,
    /// re-indented to the point's target level, and followed by a newline.
    pub fn insert_statement(&mut self, content: &str) -> Result<&mut Self, RewriteError> {
        self.insert_statement_with(content, None, true)
    }

    /// Like `insert_statement` with explicit newline policy. A
    /// `newline_before` of `None` picks the context default.
    pub fn insert_statement_with(
        &mut self,
        content: &str,
        newline_before: Option<bool>,
        newline_after: bool,
    ) -> Result<&mut Self, RewriteError> {
        let point = self.current_point()?;
        let indented = self
            .analyzer
            .adjust_indentation(content.trim(), point.level, None);
        let newline_before = newline_before.unwrap_or_else(|| self.default_newline_before(&point));
        self.pending.push(PendingInsertion {
            offset: point.offset,
            text: indented,
            newline_before,
            newline_after,
        });
        Ok(self)
    }

    /// Queue `content` verbatim at the insertion point: no re-indentation,
    /// no surrounding newlines.
    pub fn insert_raw(&mut self, content: &str) -> Result<&mut Self, RewriteError> {
        let point = self.current_point()?;
        self.pending.push(PendingInsertion {
            offset: point.offset,
            text: content.to_string(),
            newline_before: false,
            newline_after: false,
        });
        Ok(self)
    }

    /// Queue `content` as a sibling separated by a blank line.
    pub fn insert_sibling(&mut self, content: &str) -> Result<&mut Self, RewriteError> {
        self.insert_sibling_with(content, "\n\n")
    }

    /// Queue `content` as a sibling with an explicit separator on the side
    /// the context calls for.
    pub fn insert_sibling_with(
        &mut self,
        content: &str,
        separator: &str,
    ) -> Result<&mut Self, RewriteError> {
        let point = self.current_point()?;
        let indented = self
            .analyzer
            .adjust_indentation(content.trim(), point.level, None);
        let text = match point.context {
            InsertContext::Before | InsertContext::InsideStart => format!("{indented}{separator}"),
            InsertContext::After | InsertContext::InsideEnd => format!("{separator}{indented}"),
        };
        self.pending.push(PendingInsertion {
            offset: point.offset,
            text,
            newline_before: false,
            newline_after: false,
        });
        Ok(self)
    }

    /// Queue a brace-delimited block: `header` plus `open` on one line, the
    /// body re-indented one level deeper, and `close` on its own line at
    /// the point's level.
    pub fn insert_block(&mut self, header: &str, body: &str) -> Result<&mut Self, RewriteError> {
        self.insert_block_with(header, body, " {", "}")
    }

    pub fn insert_block_with(
        &mut self,
        header: &str,
        body: &str,
        open: &str,
        close: &str,
    ) -> Result<&mut Self, RewriteError> {
        let point = self.current_point()?;
        let indent = self.analyzer.indent_string_for_level(point.level as isize);
        let body_indented = self
            .analyzer
            .adjust_indentation(body.trim(), point.level + 1, None);
        let text = format!("{indent}{header}{open}\n{body_indented}\n{indent}{close}");
        let newline_before = self.default_newline_before(&point);
        self.pending.push(PendingInsertion {
            offset: point.offset,
            text,
            newline_before,
            newline_after: true,
        });
        Ok(self)
    }

    /// Apply all queued insertions in descending offset order by plain
    /// string splice. Insertions are at pure offsets and never overlap by
    /// construction, so the edit buffer is not involved.
    pub fn rewrite(&self) -> String {
        let mut order: Vec<usize> = (0..self.pending.len()).collect();
        order.sort_by_key(|&i| self.pending[i].offset);

        let mut out = self.source.clone();
        for &i in order.iter().rev() {
            let insertion = &self.pending[i];
            let mut text =
                String::with_capacity(insertion.text.len() + 2);
            if insertion.newline_before {
                text.push('\n');
            }
            text.push_str(&insertion.text);
            if insertion.newline_after {
                text.push('\n');
            }
            out.insert_str(insertion.offset, &text);
        }
        out
    }

    /// Apply queued insertions, re-parse, and return the new source with
    /// its tree.
    pub fn rewrite_with_tree(&mut self) -> Result<(String, Tree), RewriteError> {
        let source = self.rewrite();
        let tree = super::reparse(&source, &mut self.parser, self.language.as_ref())?;
        Ok((source, tree))
    }
}
