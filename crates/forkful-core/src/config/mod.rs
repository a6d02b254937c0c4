//! Configuration management for Forkful.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. A missing file is not an error; every section falls back to its
//! `Default` impl.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Forkful.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input image limits
    pub limits: LimitsConfig,

    /// Retry policy for provider calls
    pub retry: RetryConfig,

    /// Analysis behaviour
    pub analysis: AnalysisConfig,

    /// Interactive session settings
    pub session: SessionConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Model provider settings
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path (with ~ expansion).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let path = expand_path(path);
        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.forkful.forkful/config.toml
    /// - Linux: ~/.config/forkful/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\forkful\config\config.toml
    ///
    /// Falls back to ~/.forkful/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "forkful", "forkful")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".forkful").join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
