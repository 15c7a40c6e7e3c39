//! Package Symbol Extraction
//!
//! Lightweight tree-sitter parsing used by `package_symbol` grouping. Each extractor
//! only reads the declared package of a file; no further language analysis is done.
//!
//! ```rust,ignore
//! use autodoc::analyzer::parser::SymbolRegistry;
//!
//! let registry = SymbolRegistry::with_defaults();
//! let symbol = registry.extract("pkg/util.go", content)?;
//! ```

pub mod go;
pub mod java;
pub mod traits;

pub use go::GoPackageExtractor;
pub use java::JavaPackageExtractor;
pub use traits::{SymbolExtractor, create_ts_parser, get_node_text, parse_strict};

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::types::{AutodocError, Result};

/// Shared extractor for registry lookups
pub type SharedExtractor = Arc<dyn SymbolExtractor>;

/// Extension-keyed set of symbol extractors
#[derive(Clone, Default)]
pub struct SymbolRegistry {
    extractors: HashMap<String, SharedExtractor>,
}

impl SymbolRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in extractor
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GoPackageExtractor));
        registry.register(Arc::new(JavaPackageExtractor));
        registry
    }

    /// Register an extractor for all of its extensions, replacing earlier ones
    pub fn register(&mut self, extractor: SharedExtractor) {
        for ext in extractor.extensions() {
            self.extractors
                .insert(ext.to_ascii_lowercase(), Arc::clone(&extractor));
        }
    }

    /// Extractor responsible for a file path, by extension
    pub fn for_path(&self, path: &str) -> Option<&SharedExtractor> {
        let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
        self.extractors.get(&ext)
    }

    /// Extract the declared symbol of a file
    pub fn extract(&self, path: &str, content: &str) -> Result<String> {
        let extractor = self.for_path(path).ok_or_else(|| {
            AutodocError::InvalidInput(format!(
                "no package symbol extractor registered for {}",
                path
            ))
        })?;
        extractor.extract(path, content)
    }
}
