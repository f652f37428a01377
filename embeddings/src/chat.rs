//! Chat-completion client for code analysis prompts.

use serde::Deserialize;
use tracing::debug;

use crate::client::ServiceConfig;
use crate::error::{EmbeddingError, Result};

/// Default chat model served by the local inference server.
pub const DEFAULT_CHAT_MODEL: &str = "codellama-7b-instruct";

/// A single chat-completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// System message fixing the assistant's persona.
    pub system: String,

    /// User message carrying the prompt.
    pub user: String,

    /// Sampling temperature.
    pub temperature: f64,

    /// Output size cap in tokens.
    pub max_tokens: u32,
}

/// Client for the chat-completions API.
#[derive(Debug, Clone)]
pub struct ChatClient {
    /// Service connection settings.
    config: ServiceConfig,

    /// HTTP client.
    client: reqwest::Client,

    /// Model used for completion requests.
    model: String,
}

impl ChatClient {
    /// Create a new client with the default chat model.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }

    /// Set the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Request a completion and return the assistant message text.
    pub async fn complete(&self, request: &ChatRequest) -> Result<String> {
        debug!("Requesting chat completion with model: {}", self.model);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.user},
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "API error: {error_text}"
            )));
        }

        let result: ChatResponse = response.json().await?;

        let content = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no choices in response".to_string()))?
            .message
            .content;

        Ok(content)
    }
}

/// Chat API response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}
