use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{Document, ScoredDocument, VectorStore};
use crate::types::{AutodocError, Result};

type TermVector = HashMap<String, f32>;

struct Entry {
    id: String,
    document: Document,
    vector: TermVector,
    norm: f32,
}

/// In-process vector store using term-frequency cosine similarity.
///
/// Scoped to a named collection (the project name); contents live only for the
/// process lifetime.
pub struct MemoryVectorStore {
    collection: String,
    entries: RwLock<Vec<Entry>>,
}

impl MemoryVectorStore {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// All stored documents in insertion order
    pub async fn documents(&self) -> Vec<Document> {
        self.entries
            .read()
            .await
            .iter()
            .map(|e| e.document.clone())
            .collect()
    }
}

fn term_vector(text: &str) -> TermVector {
    let mut vector = TermVector::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        *vector.entry(token.to_lowercase()).or_insert(0.0) += 1.0;
    }
    vector
}

fn norm(vector: &TermVector) -> f32 {
    vector.values().map(|v| v * v).sum::<f32>().sqrt()
}

fn cosine(a: &TermVector, a_norm: f32, b: &TermVector, b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f32 = small
        .iter()
        .filter_map(|(term, weight)| large.get(term).map(|other| weight * other))
        .sum();
    dot / (a_norm * b_norm)
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>> {
        let mut entries = self.entries.write().await;
        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            let vector = term_vector(&document.content);
            let id = Uuid::new_v4().to_string();
            entries.push(Entry {
                id: id.clone(),
                norm: norm(&vector),
                vector,
                document,
            });
            ids.push(id);
        }
        debug!(collection = %self.collection, added = ids.len(), "Indexed documents");
        Ok(ids)
    }

    async fn similarity_search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredDocument>> {
        if top_k == 0 {
            return Err(AutodocError::Indexing("top_k must be positive".to_string()));
        }
        let query_vector = term_vector(query);
        let query_norm = norm(&query_vector);

        let entries = self.entries.read().await;
        let mut scored: Vec<(f32, &Entry)> = entries
            .iter()
            .map(|e| (cosine(&query_vector, query_norm, &e.vector, e.norm), e))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, e)| ScoredDocument {
                score,
                document: e.document.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_returns_unique_ids() {
        let store = MemoryVectorStore::new("proj");
        let ids = store
            .add_documents(vec![Document::new("a"), Document::new("b")])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_search_ranks_by_overlap() {
        let store = MemoryVectorStore::new("proj");
        store
            .add_documents(vec![
                Document::summary("db", None, "Database connection pool and migrations"),
                Document::summary("http", None, "HTTP server routing and handlers"),
                Document::summary("cfg", None, "Configuration loading from files"),
            ])
            .await
            .unwrap();

        let hits = store
            .similarity_search("how are database migrations run", 2)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.meta("package"), Some("db"));
        assert!(hits[0].score > 0.0 && hits[0].score <= 1.0);
    }

    #[tokio::test]
    async fn test_search_empty_store_and_zero_k() {
        let store = MemoryVectorStore::new("proj");
        assert!(store.similarity_search("x", 2).await.unwrap().is_empty());
        assert!(matches!(
            store.similarity_search("x", 0).await,
            Err(AutodocError::Indexing(_))
        ));
    }
}
