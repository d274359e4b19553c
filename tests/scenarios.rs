//! End-to-end rewriting scenarios across components.

use grafter::{
    IndentStyle, IndentationDescriptor, Inserter, QueryRewriter, Refactor, SourceParser,
    SymbolKind, Transformer,
};
use tree_sitter::{Node, Tree};

fn parse(source: &str) -> Tree {
    SourceParser::new("rust")
        .unwrap()
        .parse(source)
        .unwrap()
}

#[test]
fn function_rename_end_to_end() {
    let source =
        "fn main() {\n    old();\n    old();\n    other();\n}\n\nfn old() {}\nfn other() {}";
    let tree = parse(source);

    let refactor = Refactor::new(source, &tree, "rust");
    let result = refactor
        .rename_symbol("old", "new", SymbolKind::Function)
        .unwrap();

    assert_eq!(result.matches("old").count(), 0);
    assert_eq!(result.matches("new").count(), 3);
    assert_eq!(result.matches("other").count(), 2);
}

#[test]
fn comment_removal_end_to_end() {
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
fn wrap_ordering_end_to_end() {
    let source = "fn f() {}";
    let tree = parse(source);

    let mut rewriter = QueryRewriter::new(source, &tree, "rust");
    rewriter
        .query("(function_item name: (identifier) @name)")
        .wrap("@name", "/*", "*/");
    let result = rewriter.rewrite().unwrap();

    assert!(result.contains("/*f*/"));
    assert_eq!(result, "fn /*f*/() {}");
}

#[test]
fn swap_parameters_end_to_end() {
    let source = "fn add(a: i32, b: i32) -> i32 { a + b }";
    let tree = parse(source);
    let params = tree
        .root_node()
        .named_child(0)
        .unwrap()
        .child_by_field_name("parameters")
        .unwrap();
    let mut cursor = params.walk();
    let parameters: Vec<Node> = params.named_children(&mut cursor).collect();

    let mut transformer = Transformer::new(source, &tree);
    transformer.swap(parameters[0], parameters[1]).unwrap();
    let result = transformer.rewrite().unwrap();

    assert!(result.contains("fn add(b: i32, a: i32)"));
}

#[test]
fn indentation_aware_insert_end_to_end() {
    let source = "fn f() {\n    let x = 1;\n}\n";
    let tree = parse(source);
    let body = tree
        .root_node()
        .named_child(0)
        .unwrap()
        .child_by_field_name("body")
        .unwrap();

    let mut inserter = Inserter::new(source, &tree);
    inserter
        .at_end_of(body)
        .insert_statement("let y = 2;")
        .unwrap();
    let result = inserter.rewrite();

    assert!(result.contains("    let y = 2;\n}"));
    assert_eq!(result, "fn f() {\n    let x = 1;\n    let y = 2;\n}\n");
}

#[test]
fn tab_indentation_detection_end_to_end() {
    let source = "fn main() {\n\tif x {\n\t\ty();\n\t}\n}\n";
    let descriptor = IndentationDescriptor::detect(source);

    assert_eq!(descriptor.style, IndentStyle::Tabs);
    assert_eq!(descriptor.size, 1);
    assert_eq!(descriptor.unit, "\t");
}

#[test]
fn query_rewrite_then_reparse_then_transform() {
    // Chain two builders across a re-parse: rename a call target, then
    // move the renamed helper above main.
    let source = "fn main() {\n    helper();\n}\n\nfn helper() {}";
    let tree = parse(source);

    let mut rewriter = QueryRewriter::new(source, &tree, "rust");
    rewriter
        .query(
            "[(function_item name: (identifier) @name) \
             (call_expression function: (identifier) @name)]",
        )
        .filter(|m, src| m.capture_text("name", src) == Some("helper"))
        .replace("name", "setup");
    let (renamed, renamed_tree) = rewriter.rewrite_with_tree().unwrap();
    assert!(renamed.contains("fn setup() {}"));

    let root = renamed_tree.root_node();
    let main_fn = root.named_child(0).unwrap();
    let setup_fn = root.named_child(1).unwrap();

    let mut transformer = Transformer::new(renamed.clone(), &renamed_tree);
    transformer.move_node_with(setup_fn, grafter::Anchor::Before(main_fn), "\n\n");
    let result = transformer.rewrite().unwrap();

    assert!(result.starts_with("fn setup() {}\n\nfn main()"));
    assert_eq!(result.matches("fn setup()").count(), 1);
}

#[test]
fn refactor_pipeline_attribute_then_cleanup() {
    let source = "fn alpha() {}\n// stale note\nfn beta() {}\n";
    let tree = parse(source);

    let refactor = Refactor::new(source, &tree, "rust");
    let annotated = refactor
        .add_attribute("(function_item) @item", "#[inline]")
        .unwrap();
    assert_eq!(annotated.matches("#[inline]").count(), 2);

    let annotated_tree = parse(&annotated);
    let refactor = Refactor::new(annotated.clone(), &annotated_tree, "rust");
    let cleaned = refactor.remove_matching("(line_comment) @item").unwrap();
    assert!(!cleaned.contains("stale note"));
    assert_eq!(cleaned.matches("#[inline]").count(), 2);
}
