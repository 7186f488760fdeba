//! OpenAI chat-completion backend.

use super::LanguageModel;
use crate::error::{FlypalError, Result};
use crate::openai::create_client;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_trait::async_trait;
use std::time::Duration;
use tracing::instrument;

/// Language model served by the OpenAI chat completions API.
///
/// The rendered prompt already carries the conversation history, so it is
/// sent as a single user message.
pub struct OpenAILanguageModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAILanguageModel {
    pub fn new(model: &str, temperature: f32, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            client: create_client(timeout)?,
            model: model.to_string(),
            temperature,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAILanguageModel {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| FlypalError::Generation(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .temperature(self.temperature)
            .build()
            .map_err(|e| FlypalError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| FlypalError::Generation(format!("OpenAI: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| FlypalError::Generation("Empty response from LLM".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
