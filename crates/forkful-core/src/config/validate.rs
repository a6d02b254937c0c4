//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::llm::PROVIDERS;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_pixels == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_pixels must be > 0".into(),
            ));
        }
        if self.limits.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "limits.supported_formats must not be empty".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.llm_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.llm_timeout_ms must be > 0".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be > 0".into(),
            ));
        }
        if !matches!(self.retry.backoff.as_str(), "fixed" | "exponential") {
            return Err(ConfigError::ValidationError(format!(
                "retry.backoff must be \"fixed\" or \"exponential\", got \"{}\"",
                self.retry.backoff
            )));
        }
        if !(0.0..=2.0).contains(&self.analysis.temperature) {
            return Err(ConfigError::ValidationError(
                "analysis.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.session.history_size == 0 {
            return Err(ConfigError::ValidationError(
                "session.history_size must be > 0".into(),
            ));
        }
        if !PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "llm.provider must be one of {}, got \"{}\"",
                PROVIDERS.join(", "),
                self.llm.provider
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_validate_rejects_zero_pixel_ceiling() {
        let mut config = Config::default();
        config.limits.max_pixels = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_pixels"));
    }

    #[test]
    fn test_validate_rejects_unknown_backoff() {
        let mut config = Config::default();
        config.retry.backoff = "jittered".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("retry.backoff"));
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = Config::default();
        config.llm.provider = "mistral".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("llm.provider"));
    }

    #[test]
    fn test_validate_rejects_invalid_temperature() {
        let mut config = Config::default();
        config.analysis.temperature = 3.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));

        config.analysis.temperature = -0.1;
        assert!(config.validate().is_err());
    }
}
