//! Reply generation from conversation memory and user input.

use super::memory::ConversationMemory;
use crate::config::Prompts;
use crate::error::{FlypalError, Result};
use crate::llm::LanguageModel;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Renders the conversation prompt and asks the language model for a reply.
pub struct ResponseGenerator {
    llm: Arc<dyn LanguageModel>,
    prompts: Prompts,
}

impl ResponseGenerator {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            llm,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Render the full prompt for `input` given the conversation so far.
    pub fn render_prompt(&self, input: &str, memory: &ConversationMemory) -> String {
        let mut vars = HashMap::new();
        vars.insert("history".to_string(), memory.render());
        vars.insert("input".to_string(), input.to_string());
        self.prompts
            .render_with_custom(&self.prompts.conversation.template, &vars)
    }

    /// Attach retrieved facts to the user's text.
    pub fn with_context(&self, facts: &str, input: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("facts".to_string(), facts.to_string());
        vars.insert("input".to_string(), input.to_string());
        self.prompts
            .render_with_custom(&self.prompts.conversation.context, &vars)
    }

    /// Generate a reply. Any model failure is returned as a generation error.
    #[instrument(skip_all, fields(model = %self.llm.model(), history = memory.len()))]
    pub async fn generate(&self, input: &str, memory: &ConversationMemory) -> Result<String> {
        let prompt = self.render_prompt(input, memory);
        debug!("Prompt:\n{}", prompt);

        let reply = self.llm.complete(&prompt).await.map_err(|e| match e {
            FlypalError::Generation(_) => e,
            other => FlypalError::Generation(other.to_string()),
        })?;

        info!("Generated reply ({} chars)", reply.len());
        Ok(reply.trim().to_string())
    }
}
