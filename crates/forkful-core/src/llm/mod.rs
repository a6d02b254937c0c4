//! Vision-language model integration.
//!
//! Provides a provider abstraction over several VLM backends (Gemini, Hugging
//! Face, Ollama, Anthropic, OpenAI) and the retry policy that wraps every
//! provider call made by the analyzer.

pub(crate) mod anthropic;
pub(crate) mod gemini;
pub(crate) mod huggingface;
pub(crate) mod ollama;
pub(crate) mod openai;
pub(crate) mod provider;
pub(crate) mod retry;

pub use provider::{
    credential_env_var, resolve_env_var, ImageInput, LlmProvider, LlmProviderFactory, LlmRequest,
    LlmResponse, PROVIDERS,
};
pub use retry::{Backoff, RetryPolicy, RetryPredicate};
