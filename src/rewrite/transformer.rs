use crate::buffer::{Edit, EditBuffer};
use crate::rewrite::errors::RewriteError;
use crate::ts::{LanguageSpec, SourceParser};
use tracing::debug;
use tree_sitter::{Node, Tree};

/// Placement of a moved or copied node relative to a target node.
#[derive(Debug, Clone, Copy)]
pub enum Anchor<'tree> {
    Before(Node<'tree>),
    After(Node<'tree>),
}

type TextTransform = Box<dyn Fn(&str) -> String>;

enum TransformOp<'tree> {
    Swap {
        a: Node<'tree>,
        b: Node<'tree>,
    },
    Move {
        node: Node<'tree>,
        anchor: Anchor<'tree>,
        separator: String,
    },
    Copy {
        node: Node<'tree>,
        anchor: Anchor<'tree>,
        separator: String,
    },
    Reorder {
        children: Vec<Node<'tree>>,
        order: Vec<usize>,
    },
    Extract {
        node: Node<'tree>,
        to: Node<'tree>,
        reference: String,
        wrapper: Option<TextTransform>,
    },
    Duplicate {
        node: Node<'tree>,
        separator: String,
        transformer: Option<TextTransform>,
    },
}

/// Structural operations (swap, move, copy, reorder, extract, duplicate)
/// compiled to the minimal set of independent byte edits at `rewrite()`.
pub struct Transformer<'tree> {
    source: String,
    tree: &'tree Tree,
    ops: Vec<TransformOp<'tree>>,
    language: Option<LanguageSpec>,
    parser: Option<SourceParser>,
}

impl<'tree> Transformer<'tree> {
    pub fn new(source: impl Into<String>, tree: &'tree Tree) -> Self {
        Self {
            source: source.into(),
            tree,
            ops: Vec::new(),
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

    fn text(&self, node: Node<'tree>) -> &str {
        &self.source[node.byte_range()]
    }

    /// Exchange the texts of two nodes. The nodes' byte ranges must be
    /// disjoint.
    pub fn swap(
        &mut self,
        a: Node<'tree>,
        b: Node<'tree>,
    ) -> Result<&mut Self, RewriteError> {
        let disjoint = a.end_byte() <= b.start_byte() || b.end_byte() <= a.start_byte();
        if !disjoint {
            return Err(RewriteError::OverlappingSwap {
                a_start: a.start_byte(),
                a_end: a.end_byte(),
                b_start: b.start_byte(),
                b_end: b.end_byte(),
            });
        }
        self.ops.push(TransformOp::Swap { a, b });
        Ok(self)
    }

    /// Move `node` before or after the anchor target, separated by a
    /// newline.
    pub fn move_node(&mut self, node: Node<'tree>, anchor: Anchor<'tree>) -> &mut Self {
        self.move_node_with(node, anchor, "\n")
    }

    pub fn move_node_with(
        &mut self,
        node: Node<'tree>,
        anchor: Anchor<'tree>,
        separator: &str,
    ) -> &mut Self {
        self.ops.push(TransformOp::Move {
            node,
            anchor,
            separator: separator.to_string(),
        });
        self
    }

    /// Copy `node` before or after the anchor target, leaving the original
    /// in place.
    pub fn copy_node(&mut self, node: Node<'tree>, anchor: Anchor<'tree>) -> &mut Self {
        self.copy_node_with(node, anchor, "\n")
    }

    pub fn copy_node_with(
        &mut self,
        node: Node<'tree>,
        anchor: Anchor<'tree>,
        separator: &str,
    ) -> &mut Self {
        self.ops.push(TransformOp::Copy {
            node,
            anchor,
            separator: separator.to_string(),
        });
        self
    }

    /// Rearrange the named children of `parent` so that position `i`
    /// receives the text of child `order[i]`. `order` must be a permutation
    /// of the child indices.
    pub fn reorder_children(
        &mut self,
        parent: Node<'tree>,
        order: &[usize],
    ) -> Result<&mut Self, RewriteError> {
        let mut cursor = parent.walk();
        let children: Vec<Node<'tree>> = parent.named_children(&mut cursor).collect();

        let mut seen = vec![false; children.len()];
        let valid = order.len() == children.len()
            && order.iter().all(|&i| {
                if i >= children.len() || seen[i] {
                    false
                } else {
                    seen[i] = true;
                    true
                }
            });
        if !valid {
            return Err(RewriteError::InvalidReorder {
                child_count: children.len(),
            });
        }

        self.ops.push(TransformOp::Reorder {
            children,
            order: order.to_vec(),
        });
        Ok(self)
    }

    /// Replace `node` with `reference` and append the node's text (wrapped,
    /// if a wrapper was given) after the `to` node.
    pub fn extract(
        &mut self,
        node: Node<'tree>,
        to: Node<'tree>,
        reference: &str,
    ) -> &mut Self {
        self.ops.push(TransformOp::Extract {
            node,
            to,
            reference: reference.to_string(),
            wrapper: None,
        });
        self
    }

    pub fn extract_with(
        &mut self,
        node: Node<'tree>,
        to: Node<'tree>,
        reference: &str,
        wrapper: impl Fn(&str) -> String + 'static,
    ) -> &mut Self {
        self.ops.push(TransformOp::Extract {
            node,
            to,
            reference: reference.to_string(),
            wrapper: Some(Box::new(wrapper)),
        });
        self
    }

    /// Insert a copy of `node` (optionally transformed) right after it,
    /// separated by a newline.
    pub fn duplicate(&mut self, node: Node<'tree>) -> &mut Self {
        self.ops.push(TransformOp::Duplicate {
            node,
            separator: "\n".to_string(),
            transformer: None,
        });
        self
    }

    pub fn duplicate_with(
        &mut self,
        node: Node<'tree>,
        separator: &str,
        transformer: impl Fn(&str) -> String + 'static,
    ) -> &mut Self {
        self.ops.push(TransformOp::Duplicate {
            node,
            separator: separator.to_string(),
            transformer: Some(Box::new(transformer)),
        });
        self
    }

    fn lower(&self) -> EditBuffer {
        let mut buffer = EditBuffer::new();
        for op in &self.ops {
            match op {
                TransformOp::Swap { a, b } => {
                    buffer.add(a.start_byte(), a.end_byte(), self.text(*b));
                    buffer.add(b.start_byte(), b.end_byte(), self.text(*a));
                }
                TransformOp::Move {
                    node,
                    anchor,
                    separator,
                } => {
                    buffer.add(node.start_byte(), node.end_byte(), "");
                    self.add_anchored(&mut buffer, *node, *anchor, separator);
                }
                TransformOp::Copy {
                    node,
                    anchor,
                    separator,
                } => {
                    self.add_anchored(&mut buffer, *node, *anchor, separator);
                }
                TransformOp::Reorder { children, order } => {
                    for (i, &from) in order.iter().enumerate() {
                        let current = self.text(children[i]);
                        let incoming = self.text(children[from]);
                        if current != incoming {
                            buffer.add(children[i].start_byte(), children[i].end_byte(), incoming);
                        }
                    }
                }
                TransformOp::Extract {
                    node,
                    to,
                    reference,
                    wrapper,
                } => {
                    buffer.add(node.start_byte(), node.end_byte(), reference.clone());
                    let body = self.text(*node);
                    let extracted = match wrapper {
                        Some(wrap) => wrap(body),
                        None => body.to_string(),
                    };
                    buffer.add(to.end_byte(), to.end_byte(), format!("\n\n{extracted}"));
                }
                TransformOp::Duplicate {
                    node,
                    separator,
                    transformer,
                } => {
                    let body = self.text(*node);
                    let copy = match transformer {
                        Some(transform) => transform(body),
                        None => body.to_string(),
                    };
                    buffer.add(
                        node.end_byte(),
                        node.end_byte(),
                        format!("{separator}{copy}"),
                    );
                }
            }
        }
        debug!(
            op_count = self.ops.len(),
            edit_count = buffer.len(),
            "lowered structural operations"
        );
        buffer
    }

    fn add_anchored(
        &self,
        buffer: &mut EditBuffer,
        node: Node<'tree>,
        anchor: Anchor<'tree>,
        separator: &str,
    ) {
        match anchor {
            Anchor::Before(target) => buffer.add(
                target.start_byte(),
                target.start_byte(),
                format!("{}{}", self.text(node), separator),
            ),
            Anchor::After(target) => buffer.add(
                target.end_byte(),
                target.end_byte(),
                format!("{}{}", separator, self.text(node)),
            ),
        }
    }

    /// The edits this builder's operations lower to.
    pub fn edits(&self) -> Vec<Edit> {
        self.lower().into_edits()
    }

    /// Lower all operations and apply them, returning the new source.
    pub fn rewrite(&self) -> Result<String, RewriteError> {
        Ok(self.lower().apply(&self.source)?)
    }

    /// Lower, apply, re-parse, and return the new source with its tree.
    pub fn rewrite_with_tree(&mut self) -> Result<(String, Tree), RewriteError> {
        let source = self.rewrite()?;
        let tree = super::reparse(&source, &mut self.parser, self.language.as_ref())?;
        Ok((source, tree))
    }
}
