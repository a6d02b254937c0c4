//! Vision-language model provider trait and request/response types.
//!
//! Defines the interface that all providers implement, plus the factory that
//! creates the right provider from CLI flags and config.

use crate::config::LlmConfig;
use crate::error::ProviderError;
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

/// Base64-encoded image ready to send to a provider API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the image format identifier (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// One image plus one prompt, as sent to a provider.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// The food photo
    pub image: ImageInput,
    /// System instruction: the analysis kind's fixed template
    pub system: String,
    /// User line: default request or the user's own question
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// The response from a provider call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated markdown text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "gemini", "ollama").
    fn name(&self) -> &str;

    /// Model the provider was configured with.
    fn model(&self) -> &str;

    /// Check whether the provider is configured and reachable.
    async fn is_available(&self) -> bool;

    /// Generate text for one image and prompt.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ProviderError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Environment variable holding a provider's credential, if it needs one.
pub fn credential_env_var(provider: &str) -> Option<&'static str> {
    match provider {
        "gemini" => Some("GEMINI_API_KEY"),
        "huggingface" => Some("HF_TOKEN"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        _ => None,
    }
}

/// Provider identifiers accepted by the factory.
pub const PROVIDERS: &[&str] = &["gemini", "huggingface", "ollama", "anthropic", "openai"];

/// Factory that creates the appropriate provider from CLI flags and config.
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create a provider based on provider name, config, and optional overrides.
    ///
    /// A provider that needs a credential is never constructed without one:
    /// a missing key fails here with `ProviderError::Unauthenticated`, before
    /// any request can be made.
    ///
    /// # Arguments
    /// * `provider` - Provider identifier (see [`PROVIDERS`])
    /// * `config` - The full LLM config section
    /// * `model_override` - Optional model name that overrides the config default
    /// * `api_key_override` - Optional session key (e.g. entered interactively)
    pub fn create(
        provider: &str,
        config: &LlmConfig,
        model_override: Option<&str>,
        api_key_override: Option<&str>,
    ) -> Result<Box<dyn LlmProvider>, ProviderError> {
        Self::build(provider, config, model_override, api_key_override, None)
    }

    /// Like [`create`](Self::create), but every HTTP request the provider
    /// makes is bounded by `timeout` instead of the provider's default.
    pub fn create_with_timeout(
        provider: &str,
        config: &LlmConfig,
        model_override: Option<&str>,
        api_key_override: Option<&str>,
        timeout: Duration,
    ) -> Result<Box<dyn LlmProvider>, ProviderError> {
        Self::build(provider, config, model_override, api_key_override, Some(timeout))
    }

    fn build(
        provider: &str,
        config: &LlmConfig,
        model_override: Option<&str>,
        api_key_override: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Box<dyn LlmProvider>, ProviderError> {
        let pick_model =
            |default: &str| model_override.map(String::from).unwrap_or(default.to_string());
        let key = |configured: &str| -> Result<String, ProviderError> {
            api_key_override
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .or_else(|| resolve_env_var(configured))
                .ok_or_else(|| {
                    ProviderError::missing_credential(
                        provider,
                        credential_env_var(provider).unwrap_or("an API key"),
                    )
                })
        };

        match provider {
            "gemini" => {
                let cfg = config.gemini.clone().unwrap_or_default();
                let api_key = key(&cfg.api_key)?;
                let p =
                    super::gemini::GeminiProvider::new(&cfg.endpoint, &api_key, &pick_model(&cfg.model));
                Ok(Box::new(match timeout {
                    Some(t) => p.with_timeout(t),
                    None => p,
                }))
            }
            "huggingface" => {
                let cfg = config.huggingface.clone().unwrap_or_default();
                let api_key = key(&cfg.api_key)?;
                let p = super::huggingface::HuggingFaceProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    &pick_model(&cfg.model),
                );
                Ok(Box::new(match timeout {
                    Some(t) => p.with_timeout(t),
                    None => p,
                }))
            }
            "ollama" => {
                let cfg = config.ollama.clone().unwrap_or_default();
                let p = super::ollama::OllamaProvider::new(&cfg.endpoint, &pick_model(&cfg.model));
                Ok(Box::new(match timeout {
                    Some(t) => p.with_timeout(t),
                    None => p,
                }))
            }
            "anthropic" => {
                let cfg = config.anthropic.clone().unwrap_or_default();
                let api_key = key(&cfg.api_key)?;
                let p = super::anthropic::AnthropicProvider::new(&api_key, &pick_model(&cfg.model));
                Ok(Box::new(match timeout {
                    Some(t) => p.with_timeout(t),
                    None => p,
                }))
            }
            "openai" => {
                let cfg = config.openai.clone().unwrap_or_default();
                let api_key = key(&cfg.api_key)?;
                let p = super::openai::OpenAiProvider::new(&api_key, &pick_model(&cfg.model));
                Ok(Box::new(match timeout {
                    Some(t) => p.with_timeout(t),
                    None => p,
                }))
            }
            other => Err(ProviderError::InvalidInput {
                provider: other.to_string(),
                message: format!("Unknown provider. Expected one of: {}", PROVIDERS.join(", ")),
            }),
        }
    }
}
