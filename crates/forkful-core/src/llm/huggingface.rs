//! Hugging Face inference router provider (OpenAI-compatible API).
//!
//! Serves hosted open-weights vision models such as Qwen2-VL. The router
//! speaks the Chat Completions format, so this delegates to `OpenAiProvider`
//! with a custom endpoint.

use super::openai::OpenAiProvider;
use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::error::ProviderError;
use async_trait::async_trait;
use std::time::Duration;

/// Hugging Face provider wrapping an OpenAI-compatible endpoint.
pub struct HuggingFaceProvider {
    inner: OpenAiProvider,
}

impl HuggingFaceProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str) -> Self {
        let url = format!("{}/chat/completions", endpoint.trim_end_matches('/'));
        Self {
            // Cold starts on shared inference hardware are slow
            inner: OpenAiProvider::with_endpoint("huggingface", api_key, model, &url)
                .with_timeout(Duration::from_secs(120)),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.with_timeout(timeout);
        self
    }
}

#[async_trait]
impl LlmProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ProviderError> {
        self.inner.generate(request).await
    }

    fn timeout(&self) -> Duration {
        self.inner.timeout()
    }
}
