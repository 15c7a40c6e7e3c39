use tree_sitter::{Query, QueryCursor, StreamingIterator};

use super::{SymbolExtractor, get_node_text, parse_strict};
use crate::types::{AutodocError, Result};

const PACKAGE_QUERY: &str = "(package_clause (package_identifier) @name)";

/// Reads the `package` clause of Go source files
pub struct GoPackageExtractor;

impl SymbolExtractor for GoPackageExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn language(&self) -> &'static str {
        "Go"
    }

    fn extract(&self, path: &str, content: &str) -> Result<String> {
        let tree = parse_strict(tree_sitter_go::LANGUAGE, "Go", path, content)?;

        let query = Query::new(&tree_sitter_go::LANGUAGE.into(), PACKAGE_QUERY).map_err(|e| {
            AutodocError::Parse {
                message: format!("Invalid Go package query: {}", e),
                path: path.to_string(),
            }
        })?;

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, tree.root_node(), content.as_bytes());

        while let Some(m) = matches.next() {
            if let Some(cap) = m.captures.first() {
                let name = get_node_text(cap.node, content.as_bytes());
                if !name.is_empty() {
                    return Ok(name.to_string());
                }
            }
        }

        Err(AutodocError::Parse {
            message: "missing package clause".to_string(),
            path: path.to_string(),
        })
    }
}
