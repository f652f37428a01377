//! Embedding service client.
//!
//! Talks to an OpenAI-compatible embeddings endpoint (LM Studio by default).
//! One outbound call per invocation, no retries: callers decide how a failed
//! file is recorded.

use serde::Deserialize;
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Default embedding model served by the local inference server.
pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-nomic-embed-text-v1.5";

/// Connection settings for the inference service.
///
/// Read-only after construction; cloned freely into every client handle.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,

    /// API key sent as a bearer token.
    pub api_key: String,
}

impl ServiceConfig {
    /// Create a config from explicit values.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Read the service location from the environment, defaulting to a local
    /// unauthenticated server.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("CODESIM_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:1234/v1".to_string()),
            api_key: std::env::var("CODESIM_API_KEY").unwrap_or_else(|_| "lm-studio".to_string()),
        }
    }
}

/// Client for the embeddings-creation API.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    /// Service connection settings.
    config: ServiceConfig,

    /// HTTP client.
    client: reqwest::Client,

    /// Model used for embedding requests.
    model: String,
}

impl EmbeddingClient {
    /// Create a new client with the default embedding model.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            model: DEFAULT_EMBED_MODEL.to_string(),
        }
    }

    /// Set the embedding model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Get the configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate an embedding for a single text.
    pub async fn embed(&self, text: &str) -> Result<Embedding> {
        if text.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        debug!("Generating embedding with model: {}", self.model);

        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });

        let data = self.request(&body).await?;

        let embedding = data
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding in response".to_string()))?
            .embedding;

        debug!("Generated embedding with {} dimensions", embedding.len());

        Ok(embedding)
    }

    /// Embed several texts in one request.
    ///
    /// The response vectors are re-associated with their inputs by the
    /// service-reported index, so the returned order always matches `texts`.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|text| text.is_empty()) {
            return Err(EmbeddingError::EmptyInput);
        }

        debug!(
            "Generating batch embeddings for {} texts with model: {}",
            texts.len(),
            self.model
        );

        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let mut data = self.request(&body).await?;

        if data.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                data.len()
            )));
        }

        data.sort_by_key(|item| item.index);

        info!("Generated {} batch embeddings", data.len());

        Ok(data.into_iter().map(|item| item.embedding).collect())
    }

    async fn request(&self, body: &serde_json::Value) -> Result<Vec<EmbeddingData>> {
        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "API error: {error_text}"
            )));
        }

        let result: EmbeddingsResponse = response.json().await?;
        Ok(result.data)
    }
}

/// Embeddings API response format.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
    #[serde(default)]
    index: usize,
}
