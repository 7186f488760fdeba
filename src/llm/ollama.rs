//! Ollama completion backend.

use super::LanguageModel;
use crate::error::Result;
use crate::ollama::OllamaClient;
use async_trait::async_trait;

/// Language model served by a local Ollama instance.
pub struct OllamaLanguageModel {
    client: OllamaClient,
    model: String,
    temperature: f32,
}

impl OllamaLanguageModel {
    pub fn new(client: OllamaClient, model: &str, temperature: f32) -> Self {
        Self {
            client,
            model: model.to_string(),
            temperature,
        }
    }
}

#[async_trait]
impl LanguageModel for OllamaLanguageModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.client
            .generate(&self.model, prompt, self.temperature)
            .await
    }

    fn model(&self) -> &str {
        &self.model
    }
}
