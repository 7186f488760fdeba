//! Configuration settings for FlyPal.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub telemetry: TelemetrySettings,
    pub ollama: OllamaSettings,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    pub vector_store: VectorStoreSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error) used when no -v flag is given.
    pub log_level: String,
    /// Timeout applied to every outbound HTTP request. None waits indefinitely.
    pub request_timeout_seconds: Option<u64>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.flypal".to_string(),
            log_level: "warn".to_string(),
            request_timeout_seconds: None,
        }
    }
}

/// Backend for embedding and language-model calls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Local Ollama server (default).
    #[default]
    Ollama,
    /// OpenAI API (requires OPENAI_API_KEY).
    OpenAI,
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Provider::Ollama),
            "openai" => Ok(Provider::OpenAI),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Ollama => write!(f, "ollama"),
            Provider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Flight telemetry API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Base URL of the ADS-B API; callsign lookups go to `{base_url}callsign/{callsign}`.
    pub base_url: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            base_url: "https://opendata.adsb.fi/api/v2/".to_string(),
        }
    }
}

/// Ollama server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    pub base_url: String,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (ollama, openai).
    pub provider: Provider,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions (only sent to OpenAI).
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Ollama,
            model: "mxbai-embed-large".to_string(),
            dimensions: 1024,
        }
    }
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// LLM provider (ollama, openai).
    pub provider: Provider,
    /// Model used for response generation.
    pub model: String,
    /// Sampling temperature. Zero keeps replies deterministic.
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Ollama,
            model: "llama3.1".to_string(),
            temperature: 0.0,
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (memory, sqlite).
    pub provider: String,
    /// Name of the collection holding the current flight's facts.
    pub collection: String,
    /// Number of facts retrieved per query.
    pub top_k: usize,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "memory".to_string(),
            collection: "flight_docs".to_string(),
            top_k: 1,
            sqlite_path: "~/.flypal/vectors.db".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::FlypalError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flypal")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }

    /// Outbound request timeout, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.general.request_timeout_seconds.map(Duration::from_secs)
    }

    /// Whether any configured service talks to the OpenAI API.
    pub fn uses_openai(&self) -> bool {
        self.embedding.provider == Provider::OpenAI || self.llm.provider == Provider::OpenAI
    }

    /// Whether any configured service talks to an Ollama server.
    pub fn uses_ollama(&self) -> bool {
        self.embedding.provider == Provider::Ollama || self.llm.provider == Provider::Ollama
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.vector_store.collection, "flight_docs");
        assert_eq!(settings.vector_store.top_k, 1);
        assert_eq!(settings.embedding.model, "mxbai-embed-large");
        assert_eq!(settings.llm.model, "llama3.1");
        assert_eq!(settings.llm.temperature, 0.0);
        assert!(settings.request_timeout().is_none());
        assert!(settings.uses_ollama());
        assert!(!settings.uses_openai());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[llm]
provider = "openai"
model = "gpt-4o-mini"

[general]
request_timeout_seconds = 30
"#
        )
        .unwrap();

        let settings = Settings::load_from(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(settings.llm.provider, Provider::OpenAI);
        assert_eq!(settings.llm.model, "gpt-4o-mini");
        assert_eq!(settings.llm.temperature, 0.0);
        assert_eq!(settings.embedding.provider, Provider::Ollama);
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(30)));
        assert!(settings.uses_openai());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.telemetry.base_url, "https://opendata.adsb.fi/api/v2/");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.vector_store.provider = "sqlite".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.vector_store.provider, "sqlite");
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("Ollama".parse::<Provider>().unwrap(), Provider::Ollama);
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert!("chroma".parse::<Provider>().is_err());
        assert_eq!(Provider::OpenAI.to_string(), "openai");
    }
}
