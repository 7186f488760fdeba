//! Configuration module for FlyPal.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ConversationPrompts, Prompts};
pub use settings::{
    EmbeddingSettings, GeneralSettings, LlmSettings, OllamaSettings, PromptSettings, Provider,
    Settings, TelemetrySettings, VectorStoreSettings,
};
