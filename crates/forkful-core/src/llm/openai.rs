//! OpenAI provider using the Chat Completions API.
//!
//! Sends the template as a system message and the image via data URL in the
//! user message content array.

use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// OpenAI provider using Chat Completions API.
pub struct OpenAiProvider {
    name: &'static str,
    api_key: String,
    model: String,
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self::with_endpoint(
            "openai",
            api_key,
            model,
            "https://api.openai.com/v1/chat/completions",
        )
    }

    /// Create with a custom endpoint (used by OpenAI-compatible providers).
    pub fn with_endpoint(name: &'static str, api_key: &str, model: &str, endpoint: &str) -> Self {
        Self {
            name,
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[cfg(test)]
    pub(crate) fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_body(&self, request: &LlmRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: vec![ChatContent::Text {
                        text: request.system.clone(),
                    }],
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: vec![
                        ChatContent::ImageUrl {
                            image_url: ImageUrl {
                                url: request.image.data_url(),
                            },
                        },
                        ChatContent::Text {
                            text: request.prompt.clone(),
                        },
                    ],
                },
            ],
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: Option<String>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ProviderError> {
        let start = Instant::now();
        let body = self.build_body(request);

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| ProviderError::transport(self.name, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(self.name, status.as_u16(), &text));
        }

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| {
            ProviderError::bad_response(self.name, format!("Failed to parse response: {e}"))
        })?;

        let text = chat_resp
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ProviderError::bad_response(self.name, "empty choices array, no content generated")
            })?
            .to_string();

        Ok(LlmResponse {
            text,
            model: chat_resp.model.unwrap_or_else(|| self.model.clone()),
            tokens_used: chat_resp.usage.map(|u| u.total_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
