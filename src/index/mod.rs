//! Indexing Sink
//!
//! Optional vector-store forwarding of raw sources and generated summaries.
//! The [`VectorStore`] trait is the collaborator boundary; [`MemoryVectorStore`]
//! is the bundled in-process implementation.
//!
//! Every document carries `package`, `type` (`code` or `doc`) and, for file-level
//! documents, `filename` metadata.

pub mod memory;

pub use memory::MemoryVectorStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::constants::index::{META_FILENAME, META_PACKAGE, META_TYPE, TYPE_CODE, TYPE_DOC};
use crate::types::Result;

/// Content plus string metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Raw source of a file
    pub fn code(package: &str, filename: &str, content: impl Into<String>) -> Self {
        Self::new(content)
            .with_meta(META_PACKAGE, package)
            .with_meta(META_FILENAME, filename)
            .with_meta(META_TYPE, TYPE_CODE)
    }

    /// Generated summary of a file, or of the whole package when `filename` is `None`
    pub fn summary(package: &str, filename: Option<&str>, content: impl Into<String>) -> Self {
        let doc = Self::new(content)
            .with_meta(META_PACKAGE, package)
            .with_meta(META_TYPE, TYPE_DOC);
        match filename {
            Some(name) => doc.with_meta(META_FILENAME, name),
            None => doc,
        }
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub score: f32,
    pub document: Document,
}

/// Vector store collaborator
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store documents and return their ids in input order
    async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>>;

    /// Best `top_k` matches for `query`, highest score first
    async fn similarity_search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredDocument>>;
}

/// Shared store reference
pub type SharedVectorStore = Arc<dyn VectorStore>;
