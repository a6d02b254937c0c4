//! Error types for Forkful food photo analysis.
//!
//! Errors are organized by where they arise: configuration, input handling,
//! and the model provider boundary. Messages carry enough context (file path,
//! provider name, attempt count) to be shown to the user as-is.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Forkful operations.
#[derive(Error, Debug)]
pub enum ForkfulError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image loading or analysis errors
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failures reported by a vision-language model provider.
///
/// This is the whole provider contract: every backend maps its transport and
/// HTTP failures onto these four kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Credential missing, invalid, or rejected
    #[error("{provider}: authentication failed: {message}")]
    Unauthenticated { provider: String, message: String },

    /// Provider quota or rate limit hit
    #[error("{provider}: rate limited: {message}")]
    RateLimited { provider: String, message: String },

    /// Network failure, timeout, 5xx, or an unusable response body
    #[error("{provider}: unavailable: {message}")]
    Unavailable { provider: String, message: String },

    /// The provider rejected the request itself
    #[error("{provider}: invalid request: {message}")]
    InvalidInput { provider: String, message: String },
}

impl ProviderError {
    /// Classify an unsuccessful HTTP status into a provider error.
    pub fn from_status(provider: &str, status: u16, body: &str) -> Self {
        let provider = provider.to_string();
        let message = format!("HTTP {status}: {}", body.trim());
        match status {
            401 | 403 => Self::Unauthenticated { provider, message },
            429 => Self::RateLimited { provider, message },
            408 | 500..=599 => Self::Unavailable { provider, message },
            _ => Self::InvalidInput { provider, message },
        }
    }

    /// Transport-level failure (connection refused, DNS, TLS, timeout).
    pub fn transport(provider: &str, err: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            provider: provider.to_string(),
            message: format!("request failed: {err}"),
        }
    }

    /// The response arrived but could not be used.
    pub fn bad_response(provider: &str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// No credential could be resolved for a provider that requires one.
    pub fn missing_credential(provider: &str, env_var: &str) -> Self {
        Self::Unauthenticated {
            provider: provider.to_string(),
            message: format!("API key not set. Set {env_var} or add it to the config file."),
        }
    }

    /// Name of the provider that produced the error.
    pub fn provider(&self) -> &str {
        match self {
            Self::Unauthenticated { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::Unavailable { provider, .. }
            | Self::InvalidInput { provider, .. } => provider,
        }
    }

    /// Transient failures that may succeed on a later attempt.
    ///
    /// Bad credentials and malformed requests fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Unavailable { .. })
    }
}

/// Errors from loading an image or running an analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Pixel count exceeds the configured ceiling
    #[error("Image too large: {path} ({width}x{height} = {pixels} pixels > {max_pixels})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        pixels: u64,
        max_pixels: u64,
    },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Image bytes could not be decoded
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Decoding took too long
    #[error("Timeout decoding {path} after {timeout_ms}ms")]
    Timeout { path: PathBuf, timeout_ms: u64 },

    /// A question analysis was requested without a question
    #[error("Please enter a question about the food first.")]
    EmptyQuestion,

    /// Provider failure that was not retried
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Every attempt failed with a retryable error
    #[error("Analysis failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: ProviderError,
    },
}

impl AnalysisError {
    /// The provider failure behind this error, if any.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(e) | Self::RetriesExhausted { source: e, .. } => Some(e),
            _ => None,
        }
    }
}

/// Convenience type alias for Forkful results.
pub type Result<T> = std::result::Result<T, ForkfulError>;

/// Convenience type alias for analysis-specific results.
pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
