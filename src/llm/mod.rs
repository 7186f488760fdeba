//! Language model backends used for reply generation.

mod ollama;
mod openai;

pub use ollama::OllamaLanguageModel;
pub use openai::OpenAILanguageModel;

use crate::config::{Provider, Settings};
use crate::error::Result;
use crate::ollama::OllamaClient;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for single-prompt text completion.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a fully rendered prompt and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Name of the underlying model.
    fn model(&self) -> &str;
}

/// Build the language model selected in the settings.
pub fn create_language_model(settings: &Settings) -> Result<Arc<dyn LanguageModel>> {
    let llm: Arc<dyn LanguageModel> = match settings.llm.provider {
        Provider::Ollama => {
            let client = OllamaClient::new(&settings.ollama.base_url, settings.request_timeout())?;
            Arc::new(OllamaLanguageModel::new(
                client,
                &settings.llm.model,
                settings.llm.temperature,
            ))
        }
        Provider::OpenAI => Arc::new(OpenAILanguageModel::new(
            &settings.llm.model,
            settings.llm.temperature,
            settings.request_timeout(),
        )?),
    };
    Ok(llm)
}
