//! OpenAI client configuration.

use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create an OpenAI client, optionally bounded by a request timeout.
///
/// The API key is read from `OPENAI_API_KEY`.
pub fn create_client(timeout: Option<Duration>) -> Result<Client<OpenAIConfig>> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(builder.build()?))
}
