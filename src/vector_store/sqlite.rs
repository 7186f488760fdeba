//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! Collections survive restarts, which is useful for inspecting what the
//! assistant last indexed.

use super::{rank, validate_documents, Document, ReplaceReport, SearchResult, VectorStore};
use crate::error::{FlypalError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS collections (
    name TEXT PRIMARY KEY,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    indexed_at TEXT NOT NULL,
    PRIMARY KEY (collection, id)
);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| FlypalError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn collection_exists(conn: &Connection, name: &str) -> Result<bool> {
        let found = conn
            .query_row(
                "SELECT 1 FROM collections WHERE name = ?1",
                params![name],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, docs), fields(count = docs.len()))]
    async fn replace_collection(&self, name: &str, docs: Vec<Document>) -> Result<ReplaceReport> {
        let (accepted, skipped) = validate_documents(docs);

        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute("DELETE FROM documents WHERE collection = ?1", params![name])?;
        tx.execute("DELETE FROM collections WHERE name = ?1", params![name])?;
        tx.execute(
            "INSERT INTO collections (name, created_at) VALUES (?1, ?2)",
            params![name, Utc::now().to_rfc3339()],
        )?;

        for doc in &accepted {
            tx.execute(
                r#"
                INSERT INTO documents (collection, id, content, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    name,
                    doc.id,
                    doc.content,
                    Self::embedding_to_bytes(&doc.embedding),
                    doc.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Replaced collection {} with {} documents", name, accepted.len());

        Ok(ReplaceReport {
            inserted: accepted.len(),
            skipped,
        })
    }

    async fn delete_collection(&self, name: &str) -> Result<bool> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM documents WHERE collection = ?1", params![name])?;
        let removed = tx.execute("DELETE FROM collections WHERE name = ?1", params![name])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    #[instrument(skip(self, query_embedding))]
    async fn query(
        &self,
        name: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;
        if !Self::collection_exists(&conn, name)? {
            return Err(FlypalError::CollectionNotFound(name.to_string()));
        }

        let mut stmt = conn.prepare(
            r#"
            SELECT id, content, embedding, indexed_at
            FROM documents
            WHERE collection = ?1
            ORDER BY rowid
            "#,
        )?;

        let docs = stmt
            .query_map(params![name], |row| {
                let embedding_bytes: Vec<u8> = row.get(2)?;
                let indexed_at_str: String = row.get(3)?;

                Ok(Document {
                    id: row.get(0)?,
                    content: row.get(1)?,
                    embedding: Self::bytes_to_embedding(&embedding_bytes),
                    indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Scoring {} documents in {}", docs.len(), name);
        Ok(rank(&docs, query_embedding, limit))
    }

    async fn count(&self, name: &str) -> Result<usize> {
        let conn = self.lock()?;
        if !Self::collection_exists(&conn, name)? {
            return Err(FlypalError::CollectionNotFound(name.to_string()));
        }

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT name FROM collections ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replace_and_query() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let docs = vec![
            Document::new("0", "Flight number AA123 is heading 270 degrees.", vec![1.0, 0.0]),
            Document::new("1", "Flight number AA123 has a squawk code of 1200.", vec![0.0, 1.0]),
        ];
        let report = store.replace_collection("flight_docs", docs).await.unwrap();
        assert_eq!(report.inserted, 2);

        let results = store.query("flight_docs", &[0.1, 0.9], 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.id, "1");
        assert_eq!(results[0].document.embedding, vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_replace_is_not_a_merge() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store
            .replace_collection("flight_docs", vec![Document::new("0", "AA123", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .replace_collection("flight_docs", vec![Document::new("0", "UA789", vec![1.0, 0.0])])
            .await
            .unwrap();

        assert_eq!(store.count("flight_docs").await.unwrap(), 1);
        let results = store.query("flight_docs", &[1.0, 0.0], 5).await.unwrap();
        assert_eq!(results[0].document.content, "UA789");
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store
            .replace_collection("a", vec![Document::new("0", "in a", vec![1.0])])
            .await
            .unwrap();
        store.replace_collection("b", Vec::new()).await.unwrap();

        assert_eq!(store.list_collections().await.unwrap(), vec!["a", "b"]);
        assert!(store.query("b", &[1.0], 1).await.unwrap().is_empty());

        assert!(store.delete_collection("a").await.unwrap());
        assert!(matches!(
            store.query("a", &[1.0], 1).await,
            Err(FlypalError::CollectionNotFound(_))
        ));
    }

    #[test]
    fn test_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vectors.db");
        let store = SqliteVectorStore::new(&path).unwrap();
        drop(store);
        assert!(path.exists());
    }
}
