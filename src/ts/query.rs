use crate::ts::errors::TreeSitterError;
use crate::ts::lang::LanguageSpec;
use tree_sitter::{Node, Query, QueryCursor, StreamingIterator};

/// One successful instantiation of a query pattern against a subtree,
/// carrying its captures in capture order.
#[derive(Debug, Clone)]
pub struct QueryMatch<'tree> {
    pub pattern_index: usize,
    pub captures: Vec<QueryCapture<'tree>>,
}

/// A named reference to a node produced by a query pattern.
#[derive(Debug, Clone)]
pub struct QueryCapture<'tree> {
    pub name: String,
    pub node: Node<'tree>,
}

impl<'tree> QueryMatch<'tree> {
    /// First capture with the given name.
    pub fn capture(&self, name: &str) -> Option<Node<'tree>> {
        self.captures
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.node)
    }

    /// All captures with the given name, in capture order.
    pub fn captures_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Node<'tree>> + 'a {
        self.captures
            .iter()
            .filter(move |c| c.name == name)
            .map(|c| c.node)
    }

    /// Source text of the first capture with the given name.
    pub fn capture_text<'s>(&self, name: &str, source: &'s str) -> Option<&'s str> {
        self.capture(name).map(|n| &source[n.byte_range()])
    }
}

/// Execute `pattern` against `root` and collect all matches.
///
/// Query construction errors from the query engine surface unchanged in the
/// error message.
pub fn run_query<'tree>(
    language: &LanguageSpec,
    pattern: &str,
    root: Node<'tree>,
    source: &str,
) -> Result<Vec<QueryMatch<'tree>>, TreeSitterError> {
    let ts_language = language.ts_language()?;
    let query = Query::new(&ts_language, pattern).map_err(|e| TreeSitterError::InvalidQuery {
        message: e.to_string(),
    })?;
    let capture_names = query.capture_names();

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, root, source.as_bytes());

    let mut results = Vec::new();
    // tree-sitter 0.25+ yields matches through a streaming iterator
    while let Some(m) = matches.next() {
        let captures = m
            .captures
            .iter()
            .map(|c| QueryCapture {
                name: capture_names[c.index as usize].to_string(),
                node: c.node,
            })
            .collect();
        results.push(QueryMatch {
            pattern_index: m.pattern_index,
            captures,
        });
    }

    Ok(results)
}
