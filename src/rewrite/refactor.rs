use crate::indent::IndentationAnalyzer;
use crate::rewrite::errors::RewriteError;
use crate::rewrite::query_rewriter::QueryRewriter;
use crate::rewrite::transformer::Transformer;
use crate::ts::{run_query, LanguageSpec};
use tracing::debug;
use tree_sitter::{Node, Tree};

/// What a symbol rename should target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Function definitions and direct call sites
    Function,
    /// Type identifiers
    Type,
    /// Variable identifiers
    Variable,
    /// Any identifier-like node
    Identifier,
}

/// Parent kinds that bind a name rather than use it; identifier nodes under
/// these are left alone by `inline_variable`.
const DECLARATION_KINDS: &[&str] = &["let_declaration", "parameter", "function_item"];

/// High-level refactoring recipes composed from [`QueryRewriter`] and
/// [`Transformer`]. Each recipe runs one self-contained rewrite and returns
/// the new source.
pub struct Refactor<'tree> {
    source: String,
    tree: &'tree Tree,
    language: LanguageSpec,
}

impl<'tree> Refactor<'tree> {
    pub fn new(
        source: impl Into<String>,
        tree: &'tree Tree,
        language: impl Into<LanguageSpec>,
    ) -> Self {
        Self {
            source: source.into(),
            tree,
            language: language.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn query_rewriter(&self) -> QueryRewriter<'tree> {
        QueryRewriter::new(self.source.clone(), self.tree, self.language.clone())
    }

    /// Rename a symbol everywhere its kind's pattern binds it: matches whose
    /// captures include the old name are rewritten to the new one.
    pub fn rename_symbol(
        &self,
        from: &str,
        to: &str,
        kind: SymbolKind,
    ) -> Result<String, RewriteError> {
        let pattern = match kind {
            SymbolKind::Function => {
                "[(function_item name: (identifier) @name) \
                 (call_expression function: (identifier) @name)]"
            }
            SymbolKind::Type => "(type_identifier) @name",
            SymbolKind::Variable => "(identifier) @name",
            SymbolKind::Identifier => {
                "[(identifier) @name (field_identifier) @name (type_identifier) @name]"
            }
        };
        debug!(from, to, ?kind, "renaming symbol");
        self.rename_with_pattern(pattern, from, to)
    }

    /// Rename a struct field at its declaration and at every access. Field
    /// names are `field_identifier` nodes in declarations, field
    /// expressions, and initializers alike, so one pattern covers all
    /// three.
    pub fn rename_field(&self, from: &str, to: &str) -> Result<String, RewriteError> {
        self.rename_with_pattern("(field_identifier) @name", from, to)
    }

    fn rename_with_pattern(
        &self,
        pattern: &str,
        from: &str,
        to: &str,
    ) -> Result<String, RewriteError> {
        let from = from.to_string();
        let mut rewriter = self.query_rewriter();
        rewriter
            .query(pattern)
            .filter(move |m, src| {
                m.captures
                    .iter()
                    .any(|c| &src[c.node.byte_range()] == from.as_str())
            })
            .replace("name", to);
        rewriter.rewrite()
    }

    /// Insert `attribute` on its own line before every `@item` capture of
    /// `query_pattern`.
    pub fn add_attribute(
        &self,
        query_pattern: &str,
        attribute: &str,
    ) -> Result<String, RewriteError> {
        let mut rewriter = self.query_rewriter();
        rewriter
            .query(query_pattern)
            .insert_before("item", format!("{attribute}\n"));
        rewriter.rewrite()
    }

    /// Remove every node captured as `@item` by `query_pattern`.
    pub fn remove_matching(&self, query_pattern: &str) -> Result<String, RewriteError> {
        self.remove_matching_capture(query_pattern, "item")
    }

    /// Remove every node bound to the given capture name.
    pub fn remove_matching_capture(
        &self,
        query_pattern: &str,
        capture: &str,
    ) -> Result<String, RewriteError> {
        let mut rewriter = self.query_rewriter();
        rewriter.query(query_pattern).remove(capture);
        rewriter.rewrite()
    }

    /// Extract `node` into a new function: the node is replaced by a call
    /// to `name`, and the definition is appended after `insert_after` (or
    /// after the function enclosing `node`).
    ///
    /// `parameters` are `name: Type` strings; the call site uses the part
    /// before each `:`.
    pub fn extract_function(
        &self,
        node: Node<'tree>,
        name: &str,
        parameters: &[&str],
        insert_after: Option<Node<'tree>>,
    ) -> Result<String, RewriteError> {
        let target = match insert_after {
            Some(t) => t,
            None => enclosing_function(node).ok_or_else(|| RewriteError::TargetNotFound {
                what: format!("enclosing function for extraction of `{name}`"),
            })?,
        };

        let arg_names: Vec<&str> = parameters
            .iter()
            .map(|p| p.split(':').next().unwrap_or("").trim())
            .collect();
        let reference = format!("{name}({})", arg_names.join(", "));

        let analyzer = IndentationAnalyzer::new(&self.source);
        let name = name.to_string();
        let signature = parameters.join(", ");

        let mut transformer = Transformer::new(self.source.clone(), self.tree);
        transformer.extract_with(node, target, &reference, move |body| {
            let body = analyzer.adjust_indentation(body.trim(), 1, None);
            format!("fn {name}({signature}) {{\n{body}\n}}")
        });
        transformer.rewrite()
    }

    /// Replace every use of the variable `name` with the text of its `let`
    /// initializer. Identifier nodes whose parent binds rather than uses
    /// the name are left alone.
    pub fn inline_variable(&self, name: &str) -> Result<String, RewriteError> {
        self.inline_variable_impl(name, None)
    }

    /// `inline_variable` restricted to uses (and declarations) inside
    /// `scope`.
    pub fn inline_variable_in(
        &self,
        name: &str,
        scope: Node<'tree>,
    ) -> Result<String, RewriteError> {
        self.inline_variable_impl(name, Some(scope))
    }

    fn inline_variable_impl(
        &self,
        name: &str,
        scope: Option<Node<'tree>>,
    ) -> Result<String, RewriteError> {
        let bounds = scope
            .map(|s| (s.start_byte(), s.end_byte()))
            .unwrap_or((0, self.source.len()));

        let declarations = run_query(
            &self.language,
            "(let_declaration pattern: (identifier) @name value: (_) @value)",
            self.tree.root_node(),
            &self.source,
        )?;
        let value = declarations
            .iter()
            .filter(|m| {
                m.capture("name").is_some_and(|n| {
                    n.start_byte() >= bounds.0 && n.end_byte() <= bounds.1
                })
            })
            .find(|m| m.capture_text("name", &self.source) == Some(name))
            .and_then(|m| m.capture_text("value", &self.source))
            .ok_or_else(|| RewriteError::TargetNotFound {
                what: format!("let binding for `{name}`"),
            })?
            .to_string();

        let name = name.to_string();
        let mut rewriter = self.query_rewriter();
        rewriter
            .query("(identifier) @id")
            .filter(move |m, src| {
                m.captures.iter().any(|c| {
                    let node = c.node;
                    &src[node.byte_range()] == name.as_str()
                        && node.start_byte() >= bounds.0
                        && node.end_byte() <= bounds.1
                        && node
                            .parent()
                            .is_none_or(|p| !DECLARATION_KINDS.contains(&p.kind()))
                })
            })
            .replace("id", value);
        rewriter.rewrite()
    }
}

fn enclosing_function<'tree>(node: Node<'tree>) -> Option<Node<'tree>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if n.kind() == "function_item" {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::SourceParser;

    fn parse(source: &str) -> Tree {
        SourceParser::new("rust").unwrap().parse(source).unwrap()
    }

    #[test]
    fn rename_function_touches_definition_and_calls() {
        let source =
            "fn main() {\n    old();\n    old();\n    other();\n}\n\nfn old() {}\nfn other() {}";
        let tree = parse(source);
        let refactor = Refactor::new(source, &tree, "rust");

        let result = refactor.rename_symbol("old", "new", SymbolKind::Function).unwrap();
        assert_eq!(result.matches("old").count(), 0);
        assert_eq!(result.matches("new").count(), 3);
        assert_eq!(result.matches("other").count(), 2);
    }

    #[test]
    fn rename_type_touches_every_type_identifier() {
        let source = "struct Foo;\nfn f(x: Foo) -> Foo { x }";
        let tree = parse(source);
        let refactor = Refactor::new(source, &tree, "rust");

        let result = refactor.rename_symbol("Foo", "Bar", SymbolKind::Type).unwrap();
        assert_eq!(result, "struct Bar;\nfn f(x: Bar) -> Bar { x }");
    }

    #[test]
    fn rename_field_covers_declaration_and_accesses() {
        let source = "struct P { x: f64 }\nfn f(p: P) -> f64 { p.x }";
        let tree = parse(source);
        let refactor = Refactor::new(source, &tree, "rust");

        let result = refactor.rename_field("x", "horizontal").unwrap();
        assert!(result.contains("struct P { horizontal: f64 }"));
        assert!(result.contains("p.horizontal"));
    }

    #[test]
    fn add_attribute_before_each_item() {
        let source = "fn a() {}\nfn b() {}";
        let tree = parse(source);
        let refactor = Refactor::new(source, &tree, "rust");

        let result = refactor
            .add_attribute("(function_item) @item", "#[inline]")
            .unwrap();
        assert_eq!(result, "#[inline]\nfn a() {}\n#[inline]\nfn b() {}");
    }

    #[test]
    fn remove_matching_drops_captured_nodes() {
        let source = "// note\nfn a() {}\n// other\nfn b() {}\n";
        let tree = parse(source);
        let refactor = Refactor::new(source, &tree, "rust");

        let result = refactor.remove_matching("(line_comment) @item").unwrap();
        assert!(!result.contains("note"));
        assert!(!result.contains("other"));
        assert!(result.contains("fn a() {}"));
    }

    #[test]
    fn remove_matching_accepts_at_prefixed_capture() {
        let source = "// gone\nfn a() {}\n";
        let tree = parse(source);
        let refactor = Refactor::new(source, &tree, "rust");

        let result = refactor
            .remove_matching_capture("(line_comment) @c", "@c")
            .unwrap();
        assert!(!result.contains("gone"));
    }

    #[test]
    fn extract_function_builds_call_and_definition() {
        let source = "fn main() {\n    compute();\n}";
        let tree = parse(source);
        let call = tree
            .root_node()
            .named_child(0)
            .unwrap()
            .child_by_field_name("body")
            .unwrap()
            .named_child(0)
            .unwrap();

        let refactor = Refactor::new(source, &tree, "rust");
        let result = refactor
            .extract_function(call, "step", &["count: usize"], None)
            .unwrap();

        assert!(result.contains("step(count)"));
        assert!(result.contains("fn step(count: usize) {\n    compute();\n}"));
    }

    #[test]
    fn extract_function_without_enclosing_function_fails() {
        let source = "const X: i32 = 1;";
        let tree = parse(source);
        let item = tree.root_node().named_child(0).unwrap();

        let refactor = Refactor::new(source, &tree, "rust");
        assert!(matches!(
            refactor.extract_function(item, "f", &[], None),
            Err(RewriteError::TargetNotFound { .. })
        ));
    }

    #[test]
    fn inline_variable_substitutes_uses_only() {
        let source = "fn main() {\n    let x = 1 + 2;\n    print(x);\n    let y = x * 3;\n}";
        let tree = parse(source);
        let refactor = Refactor::new(source, &tree, "rust");

        let result = refactor.inline_variable("x").unwrap();
        // The declaration's own identifier sits under the let_declaration
        // and stays put; the uses are substituted.
        assert!(result.contains("let x = 1 + 2;"));
        assert!(result.contains("print(1 + 2);"));
        assert!(result.contains("let y = 1 + 2 * 3;"));
    }

    #[test]
    fn inline_variable_without_binding_fails() {
        let source = "fn main() {}";
        let tree = parse(source);
        let refactor = Refactor::new(source, &tree, "rust");
        assert!(matches!(
            refactor.inline_variable("ghost"),
            Err(RewriteError::TargetNotFound { .. })
        ));
    }
}
