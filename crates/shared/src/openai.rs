use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PulseError, Result};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// A prompt-in, text-out language model.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, api_key: &str, request: &ChatRequest) -> Result<String>;
}

/// OpenAI chat completions over HTTP.
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        // No timeout: a completion may legitimately take a while.
        let client = Client::builder()
            .build()
            .map_err(|e| PulseError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, api_key: &str, request: &ChatRequest) -> Result<String> {
        debug!(model = %request.model, "sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(PulseError::provider(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        first_completion(&body)
    }
}

/// Extracts the first choice's text from a chat completions body.
pub fn first_completion(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| PulseError::provider(format!("failed to parse OpenAI response: {e}")))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| PulseError::provider("OpenAI response contained no completion"))
}
