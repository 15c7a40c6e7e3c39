use crate::types::{AutodocError, Result};

/// Extracts the declared package/module symbol of a source file.
///
/// Implementations are keyed by file extension in [`super::SymbolRegistry`], so new
/// languages plug in without touching the grouping algorithm.
pub trait SymbolExtractor: Send + Sync {
    /// File extensions (without dot) handled by this extractor
    fn extensions(&self) -> &'static [&'static str];

    /// Language name for logging
    fn language(&self) -> &'static str;

    /// Return the declared symbol, or a parse error for unparsable content
    fn extract(&self, path: &str, content: &str) -> Result<String>;
}

/// Create a tree-sitter parser for a grammar.
pub fn create_ts_parser<L: Into<tree_sitter::Language>>(
    language: L,
    lang_name: &str,
) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.into())
        .map_err(|e| AutodocError::Parse {
            message: format!("Failed to set {} language: {}", lang_name, e),
            path: String::new(),
        })?;
    Ok(parser)
}

/// Parse `content` and reject trees containing syntax errors.
pub fn parse_strict<L: Into<tree_sitter::Language>>(
    language: L,
    lang_name: &str,
    path: &str,
    content: &str,
) -> Result<tree_sitter::Tree> {
    let mut parser = create_ts_parser(language, lang_name).map_err(|e| match e {
        AutodocError::Parse { message, .. } => AutodocError::Parse {
            message,
            path: path.to_string(),
        },
        other => other,
    })?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| AutodocError::Parse {
            message: format!("Failed to parse {} file", lang_name),
            path: path.to_string(),
        })?;

    if tree.root_node().has_error() {
        return Err(AutodocError::Parse {
            message: format!("{} syntax error", lang_name),
            path: path.to_string(),
        });
    }

    Ok(tree)
}

/// Extract text content from a tree-sitter node.
#[inline]
pub fn get_node_text<'a>(node: tree_sitter::Node, content: &'a [u8]) -> &'a str {
    node.utf8_text(content).unwrap_or_else(|e| {
        tracing::debug!(
            "UTF-8 extraction failed at {}:{}: {}",
            node.start_position().row + 1,
            node.start_position().column,
            e
        );
        ""
    })
}
