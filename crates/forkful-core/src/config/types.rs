//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Limits applied to input images before any provider call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum pixel count (width * height)
    pub max_pixels: u64,

    /// Accepted raster formats (by extension / detected format name)
    pub supported_formats: Vec<String>,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Per-attempt provider timeout in milliseconds
    pub llm_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            // Gemini rejects inline payloads over 20MB
            max_file_size_mb: 20,
            max_pixels: 25_000_000,
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
            ],
            decode_timeout_ms: 5000,
            llm_timeout_ms: 120_000,
        }
    }
}

impl LimitsConfig {
    /// Whether a format name is in the accepted set (case-insensitive).
    pub fn is_supported(&self, format: &str) -> bool {
        self.supported_formats
            .iter()
            .any(|f| f.eq_ignore_ascii_case(format))
    }
}

/// Retry settings for provider calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, including the first
    pub max_attempts: u32,

    /// Delay between attempts (base delay for exponential backoff)
    pub delay_ms: u64,

    /// "fixed" or "exponential"
    pub backoff: String,

    /// Upper bound for exponential backoff
    pub max_delay_ms: u64,

    /// Retry every provider failure, including auth and bad-request errors
    pub retry_all_errors: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
            backoff: "fixed".to_string(),
            max_delay_ms: 30_000,
            retry_all_errors: false,
        }
    }
}

/// Analysis behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Run the food check before every analysis of a new image
    pub validate_food: bool,

    /// Sampling temperature for analysis calls (validation always uses 0.0)
    pub temperature: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            validate_food: true,
            temperature: 0.3,
        }
    }
}

/// Interactive session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of recent results kept for display
    pub history_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { history_size: 5 }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Provider selection plus per-provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Default provider: gemini, huggingface, ollama, anthropic, openai
    pub provider: String,

    /// Google Gemini configuration
    pub gemini: Option<GeminiConfig>,

    /// Hugging Face inference router configuration
    pub huggingface: Option<HuggingFaceConfig>,

    /// Ollama (local) configuration
    pub ollama: Option<OllamaConfig>,

    /// Anthropic configuration
    pub anthropic: Option<AnthropicConfig>,

    /// OpenAI configuration
    pub openai: Option<OpenAiConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            gemini: None,
            huggingface: None,
            ollama: None,
            anthropic: None,
            openai: None,
        }
    }
}

/// Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: "${GEMINI_API_KEY}".to_string(),
            model: "gemini-1.5-flash".to_string(),
        }
    }
}

/// Hugging Face router configuration (OpenAI-compatible).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HuggingFaceConfig {
    /// API endpoint
    pub endpoint: String,

    /// Access token (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://router.huggingface.co/v1".to_string(),
            api_key: "${HF_TOKEN}".to_string(),
            model: "Qwen/Qwen2-VL-7B-Instruct".to_string(),
        }
    }
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama API endpoint
    pub endpoint: String,

    /// Model name
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "qwen2.5vl:7b".to_string(),
        }
    }
}

/// Anthropic configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: "${ANTHROPIC_API_KEY}".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
        }
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}
