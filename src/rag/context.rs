//! Knowledge base of flight facts backed by a vector store.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{Document, VectorStore};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Shown in place of facts when the collection exists but is empty.
pub const NO_RESULTS: &str = "No results found.";

/// Outcome of a knowledge-base lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    /// No flight number was known, so nothing was looked up.
    Skipped,
    /// The collection exists but holds no documents.
    NoResults,
    /// The closest facts, best match first.
    Found(Vec<String>),
}

impl Retrieval {
    /// The retrieved facts joined into one block, if any were found.
    pub fn facts(&self) -> Option<String> {
        match self {
            Retrieval::Found(facts) if !facts.is_empty() => Some(facts.join(" ")),
            _ => None,
        }
    }

    /// Text suitable for showing the user what was retrieved.
    pub fn display_text(&self) -> String {
        match self {
            Retrieval::Skipped => String::new(),
            Retrieval::NoResults => NO_RESULTS.to_string(),
            Retrieval::Found(facts) => facts.join(" "),
        }
    }
}

/// Summary of a rebuild.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebuildSummary {
    /// Sentences handed to the rebuild.
    pub sentences: usize,
    /// Documents now stored in the collection.
    pub indexed: usize,
    /// Sentences dropped because embedding or insertion failed.
    pub skipped: usize,
}

/// Embeds fact sentences into a single named collection and retrieves them.
pub struct KnowledgeBase {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    collection: String,
    top_k: usize,
}

impl KnowledgeBase {
    /// Create a knowledge base over the given collection.
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        collection: &str,
    ) -> Self {
        Self {
            vector_store,
            embedder,
            collection: collection.to_string(),
            top_k: 1,
        }
    }

    /// Set the number of facts returned per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.vector_store.clone()
    }

    /// Replace the collection with embeddings of `sentences`.
    ///
    /// Best effort per sentence: a sentence whose embedding fails is logged
    /// and left out. The swap itself happens in a single store call.
    #[instrument(skip(self, sentences), fields(collection = %self.collection, count = sentences.len()))]
    pub async fn rebuild(&self, sentences: &[String]) -> Result<RebuildSummary> {
        let mut documents = Vec::with_capacity(sentences.len());
        let mut skipped = 0;

        for (i, sentence) in sentences.iter().enumerate() {
            match self.embedder.embed(sentence).await {
                Ok(embedding) => documents.push(Document::new(i.to_string(), sentence.as_str(), embedding)),
                Err(e) => {
                    warn!("Failed to add document {} to the collection: {}", i, e);
                    skipped += 1;
                }
            }
        }

        let report = self
            .vector_store
            .replace_collection(&self.collection, documents)
            .await?;

        let summary = RebuildSummary {
            sentences: sentences.len(),
            indexed: report.inserted,
            skipped: skipped + report.skipped.len(),
        };
        info!(
            "Stored {} of {} facts in {}",
            summary.indexed, summary.sentences, self.collection
        );
        Ok(summary)
    }

    /// Retrieve the facts closest to `query`.
    ///
    /// Without a flight number nothing is embedded or read.
    #[instrument(skip(self, query), fields(collection = %self.collection))]
    pub async fn query(&self, query: &str, flight_number: Option<&str>) -> Result<Retrieval> {
        if flight_number.is_none() {
            debug!("No flight number known, skipping retrieval");
            return Ok(Retrieval::Skipped);
        }

        let query_embedding = self.embedder.embed(query).await?;
        let results = self
            .vector_store
            .query(&self.collection, &query_embedding, self.top_k)
            .await?;

        if results.is_empty() {
            return Ok(Retrieval::NoResults);
        }

        debug!("Best match scored {:.3}", results[0].score);
        Ok(Retrieval::Found(
            results.into_iter().map(|r| r.document.content).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlypalError;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds text as letter counts; fails on text containing "FAIL".
    #[derive(Default)]
    struct LetterEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for LetterEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.contains("FAIL") {
                return Err(FlypalError::Embedding("refused".to_string()));
            }
            let mut v = vec![0.0; 36];
            for c in text.to_lowercase().chars() {
                if let Some(d) = c.to_digit(36) {
                    v[d as usize] += 1.0;
                }
            }
            Ok(v)
        }

        fn model(&self) -> &str {
            "letters"
        }
    }

    fn knowledge_base() -> (KnowledgeBase, Arc<LetterEmbedder>) {
        let embedder = Arc::new(LetterEmbedder::default());
        let kb = KnowledgeBase::new(
            Arc::new(MemoryVectorStore::new()),
            embedder.clone(),
            "flight_docs",
        );
        (kb, embedder)
    }

    fn sentences(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_rebuild_then_query_round_trip() {
        let (kb, _) = knowledge_base();
        let facts = sentences(&[
            "Flight number AA123 is heading 271 degrees.",
            "Flight number AA123 has a squawk code of 3412.",
            "The RSSI for flight number AA123 is -21.7 dB.",
        ]);

        let summary = kb.rebuild(&facts).await.unwrap();
        assert_eq!(summary, RebuildSummary { sentences: 3, indexed: 3, skipped: 0 });

        let retrieval = kb.query(&facts[1], Some("AA123")).await.unwrap();
        assert_eq!(retrieval, Retrieval::Found(vec![facts[1].clone()]));
    }

    #[tokio::test]
    async fn test_query_without_flight_number_is_skipped() {
        let (kb, embedder) = knowledge_base();
        kb.rebuild(&sentences(&["Flight number AA123 is heading 271 degrees."]))
            .await
            .unwrap();
        let calls_after_rebuild = embedder.calls.load(Ordering::SeqCst);

        let retrieval = kb.query("heading?", None).await.unwrap();
        assert_eq!(retrieval, Retrieval::Skipped);
        assert_eq!(retrieval.facts(), None);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), calls_after_rebuild);
    }

    #[tokio::test]
    async fn test_query_before_any_rebuild_fails() {
        let (kb, _) = knowledge_base();
        assert!(matches!(
            kb.query("Where is AA123?", Some("AA123")).await,
            Err(FlypalError::CollectionNotFound(name)) if name == "flight_docs"
        ));
    }

    #[tokio::test]
    async fn test_embedding_failures_leave_partial_collection() {
        let (kb, _) = knowledge_base();
        let summary = kb
            .rebuild(&sentences(&["first fact", "FAIL here", "third fact"]))
            .await
            .unwrap();

        assert_eq!(summary, RebuildSummary { sentences: 3, indexed: 2, skipped: 1 });
        assert_eq!(kb.vector_store().count("flight_docs").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_empty_collection_yields_no_results() {
        let (kb, _) = knowledge_base();
        kb.rebuild(&[]).await.unwrap();

        let retrieval = kb.query("anything", Some("AA123")).await.unwrap();
        assert_eq!(retrieval, Retrieval::NoResults);
        assert_eq!(retrieval.facts(), None);
        assert_eq!(retrieval.display_text(), NO_RESULTS);
    }

    #[tokio::test]
    async fn test_top_k() {
        let (kb, _) = knowledge_base();
        let kb = kb.with_top_k(2);
        kb.rebuild(&sentences(&["aaa", "bbb", "ccc"])).await.unwrap();

        match kb.query("aab", Some("X1")).await.unwrap() {
            Retrieval::Found(facts) => assert_eq!(facts, vec!["aaa", "bbb"]),
            other => panic!("unexpected retrieval: {other:?}"),
        }
    }
}
