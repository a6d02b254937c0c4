//! Analyzer setup: provider resolution and credential check.

use forkful_core::{Config, FoodAnalyzer, LlmProviderFactory, ProviderError};
use std::time::Duration;

use super::types::ProviderArg;

/// Pick the provider from the CLI flag, falling back to `llm.provider`.
pub fn resolve_provider(flag: Option<ProviderArg>, config: &Config) -> anyhow::Result<ProviderArg> {
    if let Some(provider) = flag {
        return Ok(provider);
    }
    ProviderArg::from_name(&config.llm.provider).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown provider '{}' in config.\n\n  Hint: Use one of: {}",
            config.llm.provider,
            forkful_core::llm::PROVIDERS.join(", ")
        )
    })
}

/// Build the analyzer for `provider`.
///
/// Fails before anything else happens when the provider needs a credential
/// and none can be found.
pub fn create_analyzer(
    provider: ProviderArg,
    model: Option<&str>,
    api_key: Option<&str>,
    config: &Config,
) -> anyhow::Result<FoodAnalyzer> {
    let provider_name = provider.to_string();
    // HTTP requests share the per-attempt bound so neither cuts the other short
    let timeout = Duration::from_millis(config.limits.llm_timeout_ms);
    let llm = match LlmProviderFactory::create_with_timeout(
        &provider_name,
        &config.llm,
        model,
        api_key,
        timeout,
    ) {
        Ok(llm) => llm,
        Err(e @ ProviderError::Unauthenticated { .. }) => {
            let env_var = forkful_core::llm::credential_env_var(&provider_name).unwrap_or("API_KEY");
            anyhow::bail!(
                "{e}\n\n  Hint: export {env_var}=..., add it to a .env file, \
                 or run `forkful` with no arguments to enter it interactively."
            );
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Using {} ({})", llm.name(), llm.model());
    Ok(FoodAnalyzer::new(llm, config))
}
