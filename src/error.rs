//! Error types for FlyPal.

use thiserror::Error;

/// Library-level error type for FlyPal operations.
#[derive(Error, Debug)]
pub enum FlypalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to retrieve flight data: {0}")]
    Fetch(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Failed to generate response: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for FlyPal operations.
pub type Result<T> = std::result::Result<T, FlypalError>;
