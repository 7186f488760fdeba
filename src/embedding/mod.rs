//! Embedding generation for semantic retrieval of flight facts.

mod ollama;
mod openai;

pub use ollama::OllamaEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::{Provider, Settings};
use crate::error::Result;
use crate::ollama::OllamaClient;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Name of the model producing the embeddings.
    fn model(&self) -> &str;
}

/// Build the embedder selected in the settings.
pub fn create_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match settings.embedding.provider {
        Provider::Ollama => {
            let client = OllamaClient::new(&settings.ollama.base_url, settings.request_timeout())?;
            Arc::new(OllamaEmbedder::new(client, &settings.embedding.model))
        }
        Provider::OpenAI => Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
            settings.request_timeout(),
        )?),
    };
    Ok(embedder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_default_embedder() {
        let embedder = create_embedder(&Settings::default()).unwrap();
        assert_eq!(embedder.model(), "mxbai-embed-large");
    }
}
