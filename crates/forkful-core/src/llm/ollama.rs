//! Ollama provider for local open-weights vision models.
//!
//! Talks to a local Ollama instance via its HTTP API.
//! No authentication required, just needs Ollama running locally.
//!
//! The model is loaded into memory on the first call and that result is kept
//! for the rest of the process, so later calls skip straight to generation.

use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;

const NAME: &str = "ollama";

/// Ollama provider for local vision model inference.
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    loaded: OnceCell<()>,
    timeout: Duration,
}

impl OllamaProvider {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            loaded: OnceCell::new(),
            // Vision models running locally can be slow
            timeout: Duration::from_secs(120),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load the model once per process.
    ///
    /// A generate request without a prompt makes Ollama load the model and
    /// return immediately. Failures are not cached, so the next call retries.
    async fn ensure_loaded(&self) -> Result<(), ProviderError> {
        self.loaded
            .get_or_try_init(|| async {
                tracing::info!("Loading {} in Ollama (first call only)", self.model);
                let url = format!("{}/api/generate", self.endpoint);
                let resp = self
                    .client
                    .post(&url)
                    .json(&LoadRequest {
                        model: &self.model,
                        stream: false,
                    })
                    .timeout(self.timeout())
                    .send()
                    .await
                    .map_err(|e| ProviderError::transport(NAME, e))?;

                let status = resp.status();
                if status.as_u16() == 404 {
                    return Err(ProviderError::InvalidInput {
                        provider: NAME.to_string(),
                        message: format!(
                            "model '{}' is not installed. Run `ollama pull {}`.",
                            self.model, self.model
                        ),
                    });
                }
                if !status.is_success() {
                    let text = resp.text().await.unwrap_or_default();
                    return Err(ProviderError::from_status(NAME, status.as_u16(), &text));
                }
                tracing::debug!("Ollama model {} loaded", self.model);
                Ok(())
            })
            .await
            .map(|_| ())
    }

    fn build_body(&self, request: &LlmRequest) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            system: request.system.clone(),
            prompt: request.prompt.clone(),
            images: vec![request.image.data.clone()],
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }
}

/// Body that only loads the model.
#[derive(Serialize)]
struct LoadRequest<'a> {
    model: &'a str,
    stream: bool,
}

/// Ollama /api/generate request body.
#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    system: String,
    prompt: String,
    images: Vec<String>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama /api/generate response.
#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.endpoint);
        match self.client.get(&url).timeout(Duration::from_secs(5)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ProviderError> {
        self.ensure_loaded().await?;

        let url = format!("{}/api/generate", self.endpoint);
        let start = Instant::now();
        let body = self.build_body(request);

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| ProviderError::transport(NAME, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(NAME, status.as_u16(), &text));
        }

        let ollama_resp: OllamaResponse = resp.json().await.map_err(|e| {
            ProviderError::bad_response(NAME, format!("Failed to parse Ollama response: {e}"))
        })?;

        let text = ollama_resp.response.trim().to_string();
        if text.is_empty() {
            return Err(ProviderError::bad_response(
                NAME,
                "Ollama returned empty response, no content generated",
            ));
        }

        let tokens_used = match (ollama_resp.prompt_eval_count, ollama_resp.eval_count) {
            (None, None) => None,
            (p, e) => Some(p.unwrap_or(0) + e.unwrap_or(0)),
        };

        Ok(LlmResponse {
            text,
            model: self.model.clone(),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
