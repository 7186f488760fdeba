//! Ollama embeddings implementation.

use super::Embedder;
use crate::error::Result;
use crate::ollama::OllamaClient;
use async_trait::async_trait;
use tracing::instrument;

/// Embedder backed by a local Ollama server.
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embeddings(&self.model, text).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}
