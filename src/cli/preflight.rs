//! Pre-flight checks before talking to external services.
//!
//! Validates configuration that would otherwise only fail midway through a
//! conversation turn.

use crate::config::Settings;
use crate::error::{FlypalError, Result};
use url::Url;

/// Run pre-flight checks for the configured services.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(settings: &Settings) -> Result<()> {
    check_url("telemetry.base_url", &settings.telemetry.base_url)?;
    if settings.uses_ollama() {
        check_url("ollama.base_url", &settings.ollama.base_url)?;
    }
    if settings.uses_openai() {
        check_api_key()?;
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(FlypalError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(FlypalError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

fn check_url(key: &str, value: &str) -> Result<()> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| FlypalError::Config(format!("{} is not a valid URL ({}): {}", key, value, e)))
}
