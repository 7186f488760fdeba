//! Vector store abstraction for FlyPal.
//!
//! Documents live in named collections. A collection is always replaced as a
//! whole so readers never see a mix of two flights' facts.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::config::Settings;
use crate::error::{FlypalError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// A document stored in a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier, unique within its collection.
    pub id: String,
    /// Text content.
    pub content: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this document was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document.
    pub fn new(id: impl Into<String>, content: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// A document rejected while filling a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDocument {
    pub id: String,
    pub reason: String,
}

/// Outcome of replacing a collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaceReport {
    /// Documents written to the new collection.
    pub inserted: usize,
    /// Documents rejected individually.
    pub skipped: Vec<SkippedDocument>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Drop the collection if it exists, create it empty, and insert `docs`.
    ///
    /// Runs as one step: concurrent readers see either the old collection or
    /// the new one. Invalid documents are skipped and reported, not fatal.
    async fn replace_collection(&self, name: &str, docs: Vec<Document>) -> Result<ReplaceReport>;

    /// Delete a collection. Returns false if it did not exist.
    async fn delete_collection(&self, name: &str) -> Result<bool>;

    /// Find the documents closest to `query_embedding`.
    ///
    /// Fails with [`FlypalError::CollectionNotFound`] when the collection does
    /// not exist; an empty collection yields an empty result.
    async fn query(
        &self,
        name: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Number of documents in a collection.
    async fn count(&self, name: &str) -> Result<usize>;

    /// Names of all existing collections.
    async fn list_collections(&self) -> Result<Vec<String>>;
}

/// Build the vector store selected in the settings.
pub fn create_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match settings.vector_store.provider.as_str() {
        "memory" => Arc::new(MemoryVectorStore::new()),
        "sqlite" => Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?),
        other => {
            return Err(FlypalError::Config(format!(
                "Unknown vector store provider: {} (expected memory or sqlite)",
                other
            )))
        }
    };
    Ok(store)
}

/// Split documents into those fit for insertion and those to skip.
///
/// A document is skipped when its embedding is empty, its dimension differs
/// from the first accepted document, or its id was already used.
pub(crate) fn validate_documents(docs: Vec<Document>) -> (Vec<Document>, Vec<SkippedDocument>) {
    let mut accepted: Vec<Document> = Vec::with_capacity(docs.len());
    let mut skipped = Vec::new();
    let mut seen_ids = HashSet::new();

    for doc in docs {
        let reason = if doc.embedding.is_empty() {
            Some("empty embedding".to_string())
        } else if let Some(dim) = accepted.first().map(|d| d.embedding.len()) {
            (doc.embedding.len() != dim).then(|| {
                format!(
                    "embedding has {} dimensions, collection expects {}",
                    doc.embedding.len(),
                    dim
                )
            })
        } else {
            None
        };

        let reason = reason.or_else(|| {
            (!seen_ids.insert(doc.id.clone())).then(|| "duplicate id".to_string())
        });

        match reason {
            Some(reason) => {
                warn!("Failed to add document {} to the collection: {}", doc.id, reason);
                skipped.push(SkippedDocument { id: doc.id, reason });
            }
            None => accepted.push(doc),
        }
    }

    (accepted, skipped)
}

/// Rank documents by similarity to the query and keep the best `limit`.
pub(crate) fn rank(docs: &[Document], query_embedding: &[f32], limit: usize) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = docs
        .iter()
        .map(|doc| SearchResult {
            document: doc.clone(),
            score: cosine_similarity(query_embedding, &doc.embedding),
        })
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);
    results
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
