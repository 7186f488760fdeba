//! Minimal client for the Ollama HTTP API.
//!
//! Covers the three endpoints FlyPal needs: embeddings, non-streaming
//! generation, and the model list used by `flypal doctor`.

use crate::error::{FlypalError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Shared Ollama client.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Failure of a single Ollama call, before it is mapped onto a pipeline error.
#[derive(Debug)]
enum CallError {
    Transport(reqwest::Error),
    Status(reqwest::StatusCode, String),
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallError::Transport(e) => write!(f, "{}", e),
            CallError::Status(status, message) => write!(f, "{} ({})", message, status),
        }
    }
}

impl OllamaClient {
    /// Create a client for an Ollama server.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FlypalError::Config(format!("Invalid Ollama URL '{}': {}", base_url, e)))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| FlypalError::Config(format!("Failed to build Ollama URL: {}", e)))
    }

    async fn post_json<Req, Resp>(&self, url: Url, body: &Req) -> std::result::Result<Resp, CallError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(CallError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            return Err(CallError::Status(status, message));
        }

        response.json().await.map_err(CallError::Transport)
    }

    /// Compute an embedding for one piece of text.
    #[instrument(skip(self, prompt), fields(model = %model))]
    pub async fn embeddings(&self, model: &str, prompt: &str) -> Result<Vec<f32>> {
        let url = self.endpoint("/api/embeddings")?;
        let response: EmbeddingsResponse = self
            .post_json(url, &EmbeddingsRequest { model, prompt })
            .await
            .map_err(|e| FlypalError::Embedding(format!("Ollama: {}", e)))?;

        if response.embedding.is_empty() {
            return Err(FlypalError::Embedding(format!(
                "Ollama returned an empty embedding for model {}",
                model
            )));
        }

        debug!("Received embedding with {} dimensions", response.embedding.len());
        Ok(response.embedding)
    }

    /// Run a single non-streaming completion.
    #[instrument(skip(self, prompt), fields(model = %model, prompt_len = prompt.len()))]
    pub async fn generate(&self, model: &str, prompt: &str, temperature: f32) -> Result<String> {
        let url = self.endpoint("/api/generate")?;
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            options: GenerateOptions { temperature },
        };

        let response: GenerateResponse = self
            .post_json(url, &request)
            .await
            .map_err(|e| FlypalError::Generation(format!("Ollama: {}", e)))?;

        Ok(response.response)
    }

    /// List the models installed on the server.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = self.endpoint("/api/tags")?;
        let tags: TagsResponse = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

/// Whether a model name from `/api/tags` matches a configured model.
///
/// Ollama reports untagged models with an implicit `:latest` suffix.
pub fn model_matches(installed: &str, configured: &str) -> bool {
    installed == configured
        || (!configured.contains(':') && installed == format!("{}:latest", configured))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_embeddings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_json(json!({"model": "mxbai-embed-large", "prompt": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.1, 0.2, 0.3]})))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), None).unwrap();
        let embedding = client.embeddings("mxbai-embed-large", "hello").await.unwrap();
        assert_eq!(embedding.len(), 3);
    }

    #[tokio::test]
    async fn test_embeddings_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "model \"nope\" not found"})),
            )
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), None).unwrap();
        match client.embeddings("nope", "hello").await {
            Err(FlypalError::Embedding(msg)) => assert!(msg.contains("not found"), "{msg}"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_sends_temperature() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_json(json!({
                "model": "llama3.1",
                "prompt": "Say hi",
                "stream": false,
                "options": {"temperature": 0.0}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.1",
                "response": "Hi!",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), None).unwrap();
        let reply = client.generate("llama3.1", "Say hi", 0.0).await.unwrap();
        assert_eq!(reply, "Hi!");
    }

    #[tokio::test]
    async fn test_generate_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), None).unwrap();
        assert!(matches!(
            client.generate("llama3.1", "Say hi", 0.0).await,
            Err(FlypalError::Generation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "llama3.1:latest"}, {"name": "mxbai-embed-large:latest"}]
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri(), None).unwrap();
        let models = client.list_models().await.unwrap();
        assert_eq!(models.len(), 2);
        assert!(models.iter().any(|m| model_matches(m, "llama3.1")));
        assert!(!models.iter().any(|m| model_matches(m, "llama3.1:70b")));
    }
}
