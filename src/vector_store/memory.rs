//! In-memory vector store implementation.
//!
//! Ephemeral: collections vanish when the process exits. This is the default
//! store, since only the latest flight's facts are ever needed.

use super::{rank, validate_documents, Document, ReplaceReport, SearchResult, VectorStore};
use crate::error::{FlypalError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

/// In-memory vector store.
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: PoisonError<T>) -> FlypalError {
    FlypalError::VectorStore(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn replace_collection(&self, name: &str, docs: Vec<Document>) -> Result<ReplaceReport> {
        let (accepted, skipped) = validate_documents(docs);
        let inserted = accepted.len();

        let mut collections = self.collections.write().map_err(poisoned)?;
        if collections.insert(name.to_string(), accepted).is_some() {
            debug!("Discarded previous contents of collection {}", name);
        }

        info!("Replaced collection {} with {} documents", name, inserted);
        Ok(ReplaceReport { inserted, skipped })
    }

    async fn delete_collection(&self, name: &str) -> Result<bool> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        Ok(collections.remove(name).is_some())
    }

    async fn query(
        &self,
        name: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().map_err(poisoned)?;
        let docs = collections
            .get(name)
            .ok_or_else(|| FlypalError::CollectionNotFound(name.to_string()))?;

        Ok(rank(docs, query_embedding, limit))
    }

    async fn count(&self, name: &str) -> Result<usize> {
        let collections = self.collections.read().map_err(poisoned)?;
        collections
            .get(name)
            .map(Vec::len)
            .ok_or_else(|| FlypalError::CollectionNotFound(name.to_string()))
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let collections = self.collections.read().map_err(poisoned)?;
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(contents: &[(&str, Vec<f32>)]) -> Vec<Document> {
        contents
            .iter()
            .enumerate()
            .map(|(i, (content, embedding))| Document::new(i.to_string(), *content, embedding.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_replace_and_query() {
        let store = MemoryVectorStore::new();

        let report = store
            .replace_collection(
                "flight_docs",
                docs(&[("Hello world", vec![1.0, 0.0, 0.0]), ("Goodbye world", vec![0.0, 1.0, 0.0])]),
            )
            .await
            .unwrap();
        assert_eq!(report.inserted, 2);
        assert!(report.skipped.is_empty());
        assert_eq!(store.count("flight_docs").await.unwrap(), 2);

        let results = store.query("flight_docs", &[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score > results[1].score);
        assert_eq!(results[0].document.content, "Hello world");
    }

    #[tokio::test]
    async fn test_replace_discards_previous_contents() {
        let store = MemoryVectorStore::new();
        store
            .replace_collection("flight_docs", docs(&[("old", vec![1.0, 0.0])]))
            .await
            .unwrap();
        store
            .replace_collection("flight_docs", docs(&[("new", vec![0.0, 1.0])]))
            .await
            .unwrap();

        let results = store.query("flight_docs", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.content, "new");
    }

    #[tokio::test]
    async fn test_missing_collection() {
        let store = MemoryVectorStore::new();
        assert!(matches!(
            store.query("flight_docs", &[1.0], 1).await,
            Err(FlypalError::CollectionNotFound(_))
        ));
        assert!(matches!(
            store.count("flight_docs").await,
            Err(FlypalError::CollectionNotFound(_))
        ));
        assert!(!store.delete_collection("flight_docs").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_collection_is_not_missing() {
        let store = MemoryVectorStore::new();
        let report = store
            .replace_collection("flight_docs", docs(&[("broken", vec![])]))
            .await
            .unwrap();
        assert_eq!(report.inserted, 0);
        assert_eq!(report.skipped.len(), 1);

        assert!(store.query("flight_docs", &[1.0], 1).await.unwrap().is_empty());
        assert_eq!(store.list_collections().await.unwrap(), vec!["flight_docs"]);

        assert!(store.delete_collection("flight_docs").await.unwrap());
        assert!(store.list_collections().await.unwrap().is_empty());
    }
}
