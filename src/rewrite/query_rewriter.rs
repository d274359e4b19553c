use crate::buffer::{Edit, EditBuffer, EditPreview};
use crate::rewrite::errors::RewriteError;
use crate::ts::{run_query, LanguageSpec, QueryMatch, SourceParser};
use tracing::debug;
use tree_sitter::{Node, Tree};

type ContentFn = Box<dyn Fn(Node<'_>, &str) -> String>;
type WrapFn = Box<dyn Fn(Node<'_>, &str) -> (String, String)>;
type Predicate = Box<dyn Fn(&QueryMatch<'_>, &str) -> bool>;

enum OpContent {
    Static(String),
    Dynamic(ContentFn),
}

impl OpContent {
    fn render(&self, node: Node<'_>, source: &str) -> String {
        match self {
            OpContent::Static(text) => text.clone(),
            OpContent::Dynamic(f) => f(node, source),
        }
    }
}

enum WrapContent {
    Static { before: String, after: String },
    Dynamic(WrapFn),
}

enum QueryOpKind {
    Replace(OpContent),
    Remove,
    InsertBefore(OpContent),
    InsertAfter(OpContent),
    Wrap(WrapContent),
}

struct QueryOp {
    capture: String,
    kind: QueryOpKind,
}

/// Query-driven bulk edits: run a tree-sitter pattern, filter its matches,
/// and apply per-capture operations compiled into one edit pass.
///
/// Pipeline: `query(pattern)` → `filter(predicate)`* → operations → a
/// terminal `rewrite()` / `rewrite_with_tree()`. `matches()` and
/// `preview_edits()` inspect without mutating. With no query set, the
/// builder is the identity rewrite.
pub struct QueryRewriter<'tree> {
    source: String,
    tree: &'tree Tree,
    language: LanguageSpec,
    pattern: Option<String>,
    predicates: Vec<Predicate>,
    ops: Vec<QueryOp>,
    parser: Option<SourceParser>,
}

impl<'tree> QueryRewriter<'tree> {
    pub fn new(
        source: impl Into<String>,
        tree: &'tree Tree,
        language: impl Into<LanguageSpec>,
    ) -> Self {
        Self {
            source: source.into(),
            tree,
            language: language.into(),
            pattern: None,
            predicates: Vec::new(),
            ops: Vec::new(),
            parser: None,
        }
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

    /// Set the tree-sitter S-expression pattern driving this rewrite.
    pub fn query(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Keep only matches for which `predicate` returns true. Multiple
    /// filters apply conjunctively.
    pub fn filter(
        &mut self,
        predicate: impl Fn(&QueryMatch<'_>, &str) -> bool + 'static,
    ) -> &mut Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    fn normalize(capture: &str) -> String {
        capture.trim_start_matches('@').to_string()
    }

    fn push_op(&mut self, capture: &str, kind: QueryOpKind) -> &mut Self {
        self.ops.push(QueryOp {
            capture: Self::normalize(capture),
            kind,
        });
        self
    }

    /// Replace every node captured as `capture` with `text`.
    pub fn replace(&mut self, capture: &str, text: impl Into<String>) -> &mut Self {
        self.push_op(capture, QueryOpKind::Replace(OpContent::Static(text.into())))
    }

    /// Replace every node captured as `capture` with the function's output.
    pub fn replace_with(
        &mut self,
        capture: &str,
        f: impl Fn(Node<'_>, &str) -> String + 'static,
    ) -> &mut Self {
        self.push_op(
            capture,
            QueryOpKind::Replace(OpContent::Dynamic(Box::new(f))),
        )
    }

    /// Remove every node captured as `capture`.
    pub fn remove(&mut self, capture: &str) -> &mut Self {
        self.push_op(capture, QueryOpKind::Remove)
    }

    pub fn insert_before(&mut self, capture: &str, text: impl Into<String>) -> &mut Self {
        self.push_op(
            capture,
            QueryOpKind::InsertBefore(OpContent::Static(text.into())),
        )
    }

    pub fn insert_before_with(
        &mut self,
        capture: &str,
        f: impl Fn(Node<'_>, &str) -> String + 'static,
    ) -> &mut Self {
        self.push_op(
            capture,
            QueryOpKind::InsertBefore(OpContent::Dynamic(Box::new(f))),
        )
    }

    pub fn insert_after(&mut self, capture: &str, text: impl Into<String>) -> &mut Self {
        self.push_op(
            capture,
            QueryOpKind::InsertAfter(OpContent::Static(text.into())),
        )
    }

    pub fn insert_after_with(
        &mut self,
        capture: &str,
        f: impl Fn(Node<'_>, &str) -> String + 'static,
    ) -> &mut Self {
        self.push_op(
            capture,
            QueryOpKind::InsertAfter(OpContent::Dynamic(Box::new(f))),
        )
    }

    /// Surround every captured node with `before` and `after`. The opening
    /// insertion is emitted first, which keeps it ahead of the closing one
    /// under the edit buffer's ordering guarantee.
    pub fn wrap(
        &mut self,
        capture: &str,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> &mut Self {
        self.push_op(
            capture,
            QueryOpKind::Wrap(WrapContent::Static {
                before: before.into(),
                after: after.into(),
            }),
        )
    }

    pub fn wrap_with(
        &mut self,
        capture: &str,
        f: impl Fn(Node<'_>, &str) -> (String, String) + 'static,
    ) -> &mut Self {
        self.push_op(capture, QueryOpKind::Wrap(WrapContent::Dynamic(Box::new(f))))
    }

    /// All matches surviving the filters, in match order.
    pub fn matches(&self) -> Result<Vec<QueryMatch<'tree>>, RewriteError> {
        let Some(pattern) = &self.pattern else {
            return Ok(Vec::new());
        };
        let all = run_query(&self.language, pattern, self.tree.root_node(), &self.source)?;
        Ok(all
            .into_iter()
            .filter(|m| self.predicates.iter().all(|p| p(m, &self.source)))
            .collect())
    }

    fn lower(&self) -> Result<EditBuffer, RewriteError> {
        let matches = self.matches()?;
        let mut buffer = EditBuffer::new();
        for m in &matches {
            for op in &self.ops {
                for capture in m.captures.iter().filter(|c| c.name == op.capture) {
                    let node = capture.node;
                    match &op.kind {
                        QueryOpKind::Replace(content) => {
                            buffer.add(
                                node.start_byte(),
                                node.end_byte(),
                                content.render(node, &self.source),
                            );
                        }
                        QueryOpKind::Remove => {
                            buffer.add(node.start_byte(), node.end_byte(), "");
                        }
                        QueryOpKind::InsertBefore(content) => {
                            buffer.add(
                                node.start_byte(),
                                node.start_byte(),
                                content.render(node, &self.source),
                            );
                        }
                        QueryOpKind::InsertAfter(content) => {
                            buffer.add(
                                node.end_byte(),
                                node.end_byte(),
                                content.render(node, &self.source),
                            );
                        }
                        QueryOpKind::Wrap(wrap) => {
                            let (before, after) = match wrap {
                                WrapContent::Static { before, after } => {
                                    (before.clone(), after.clone())
                                }
                                WrapContent::Dynamic(f) => f(node, &self.source),
                            };
                            buffer.add(node.start_byte(), node.start_byte(), before);
                            buffer.add(node.end_byte(), node.end_byte(), after);
                        }
                    }
                }
            }
        }
        debug!(
            match_count = matches.len(),
            edit_count = buffer.len(),
            "lowered query operations"
        );
        Ok(buffer)
    }

    /// The edits this rewrite lowers to, in emission order.
    pub fn edits(&self) -> Result<Vec<Edit>, RewriteError> {
        Ok(self.lower()?.into_edits())
    }

    /// Per-edit previews pairing each replacement with the original text it
    /// covers.
    pub fn preview_edits(&self) -> Result<Vec<EditPreview>, RewriteError> {
        Ok(self
            .edits()?
            .into_iter()
            .map(|e| EditPreview {
                original: self.source[e.start_byte..e.end_byte].to_string(),
                start_byte: e.start_byte,
                end_byte: e.end_byte,
                replacement: e.replacement,
            })
            .collect())
    }

    /// Lower all operations over all surviving matches and apply them in a
    /// single pass.
    pub fn rewrite(&self) -> Result<String, RewriteError> {
        Ok(self.lower()?.apply(&self.source)?)
    }

    /// Rewrite, re-parse with the supplied parser or one built from the
    /// builder's language, and return the new source with its tree.
    pub fn rewrite_with_tree(&mut self) -> Result<(String, Tree), RewriteError> {
        let source = self.rewrite()?;
        let tree = super::reparse(&source, &mut self.parser, Some(&self.language))?;
        Ok((source, tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::SourceParser;

    fn parse(source: &str) -> Tree {
        SourceParser::new("rust").unwrap().parse(source).unwrap()
    }

    #[test]
    fn no_query_is_identity() {
        let source = "fn main() {}";
        let tree = parse(source);
        let rewriter = QueryRewriter::new(source, &tree, "rust");
        assert_eq!(rewriter.rewrite().unwrap(), source);
        assert!(rewriter.matches().unwrap().is_empty());
    }

    #[test]
    fn remove_strips_every_captured_node() {
        let source = "// A\nfn main() {\n    // B\n    let x = 1;\n}\n";
        let tree = parse(source);

        let mut rewriter = QueryRewriter::new(source, &tree, "rust");
        rewriter.query("(line_comment) @c").remove("@c");
        let result = rewriter.rewrite().unwrap();

        assert!(!result.contains("A"));
        assert!(!result.contains("B"));
        assert!(result.contains("fn main()"));
        assert!(result.contains("let x = 1;"));
    }

    #[test]
    fn capture_names_accept_leading_at_sign() {
        let source = "fn f() {}";
        let tree = parse(source);

        let mut with_at = QueryRewriter::new(source, &tree, "rust");
        with_at
            .query("(function_item name: (identifier) @name)")
            .replace("@name", "g");
        let mut without_at = QueryRewriter::new(source, &tree, "rust");
        without_at
            .query("(function_item name: (identifier) @name)")
            .replace("name", "g");

        assert_eq!(with_at.rewrite().unwrap(), without_at.rewrite().unwrap());
        assert_eq!(with_at.rewrite().unwrap(), "fn g() {}");
    }

    #[test]
    fn wrap_surrounds_captured_nodes_in_order() {
        let source = "fn f() {}";
        let tree = parse(source);

        let mut rewriter = QueryRewriter::new(source, &tree, "rust");
        rewriter
            .query("(function_item name: (identifier) @name)")
            .wrap("@name", "/*", "*/");
        assert_eq!(rewriter.rewrite().unwrap(), "fn /*f*/() {}");
    }

    #[test]
    fn dynamic_replace_sees_node_text() {
        let source = "fn alpha() {}\nfn beta() {}";
        let tree = parse(source);

        let mut rewriter = QueryRewriter::new(source, &tree, "rust");
        rewriter
            .query("(function_item name: (identifier) @name)")
            .replace_with("name", |node, src| src[node.byte_range()].to_uppercase());
        assert_eq!(rewriter.rewrite().unwrap(), "fn ALPHA() {}\nfn BETA() {}");
    }

    #[test]
    fn filters_apply_conjunctively() {
        let source = "fn alpha() {}\nfn beta() {}\nfn gamma() {}";
        let tree = parse(source);

        let mut rewriter = QueryRewriter::new(source, &tree, "rust");
        rewriter
            .query("(function_item name: (identifier) @name)")
            .filter(|m, src| m.capture_text("name", src) != Some("alpha"))
            .filter(|m, src| m.capture_text("name", src) != Some("gamma"))
            .remove("name");
        assert_eq!(
            rewriter.rewrite().unwrap(),
            "fn alpha() {}\nfn () {}\nfn gamma() {}"
        );
    }

    #[test]
    fn insert_before_and_after_around_capture() {
        let source = "fn f() {}";
        let tree = parse(source);

        let mut rewriter = QueryRewriter::new(source, &tree, "rust");
        rewriter
            .query("(function_item) @item")
            .insert_before("item", "#[inline]\n")
            .insert_after_with("item", |_, _| "\n// end".to_string());
        assert_eq!(rewriter.rewrite().unwrap(), "#[inline]\nfn f() {}\n// end");
    }

    #[test]
    fn preview_edits_reports_without_mutating() {
        let source = "fn f() {}";
        let tree = parse(source);

        let mut rewriter = QueryRewriter::new(source, &tree, "rust");
        rewriter
            .query("(function_item name: (identifier) @name)")
            .replace("name", "g");

        let previews = rewriter.preview_edits().unwrap();
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].original, "f");
        assert_eq!(previews[0].replacement, "g");
        assert_eq!(previews[0].start_byte, 3);
        assert_eq!(previews[0].end_byte, 4);

        // The builder's own source is untouched.
        assert_eq!(rewriter.source(), source);
    }

    #[test]
    fn malformed_query_surfaces_as_error() {
        let source = "fn f() {}";
        let tree = parse(source);

        let mut rewriter = QueryRewriter::new(source, &tree, "rust");
        rewriter.query("(function_item").remove("item");
        assert!(rewriter.rewrite().is_err());
    }

    #[test]
    fn rewrite_with_tree_uses_builder_language() {
        let source = "fn f() {}";
        let tree = parse(source);

        let mut rewriter = QueryRewriter::new(source, &tree, "rust");
        rewriter
            .query("(function_item name: (identifier) @name)")
            .replace("name", "g");
        let (new_source, new_tree) = rewriter.rewrite_with_tree().unwrap();
        assert_eq!(new_source, "fn g() {}");
        assert!(!new_tree.root_node().has_error());
    }
}
