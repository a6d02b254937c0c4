//! Provider setup: API key detection, input, and optional persistence.

use crate::cli::analyze::ProviderArg;
use console::Style;
use dialoguer::{Input, Password, Select};
use forkful_core::llm::{credential_env_var, resolve_env_var};
use forkful_core::Config;
use std::path::Path;

use super::theme::forkful_theme;

/// Result of the provider selection flow.
pub struct ProviderSelection {
    pub provider: ProviderArg,
    pub model: String,
    /// API key entered during this session (not from env/config).
    pub api_key: Option<String>,
}

/// Guide the user through choosing a provider, API key, and model.
///
/// Returns `None` if the user cancels.
pub fn select_provider(
    config: &Config,
    config_path: &Path,
) -> anyhow::Result<Option<ProviderSelection>> {
    let theme = forkful_theme();
    let dim = Style::new().for_stderr().dim();
    let warn = Style::new().for_stderr().yellow();

    // Step 1: Choose provider, defaulting to the configured one
    let labels: Vec<String> = ProviderArg::ALL
        .iter()
        .map(|p| format!("{} ({})", provider_label(p), provider_hint(p)))
        .collect();
    let default = ProviderArg::ALL
        .iter()
        .position(|p| p.to_string() == config.llm.provider)
        .unwrap_or(0);

    let Some(selection) = Select::with_theme(&theme)
        .with_prompt("Vision model provider")
        .items(&labels)
        .default(default)
        .interact_opt()?
    else {
        return Ok(None);
    };
    let provider = ProviderArg::ALL[selection];

    // Step 2: API key handling (Ollama doesn't need one)
    let mut session_api_key: Option<String> = None;

    if let Some(env_var) = env_var_for(&provider) {
        if env_has_key(env_var) || config_has_key(config, &provider) {
            eprintln!(
                "  {}",
                dim.apply_to(format!("Using existing API key from {env_var} / config"))
            );
        } else {
            eprintln!("  {}", warn.apply_to(format!("{env_var} not set.")));

            let key: String = match Password::with_theme(&theme)
                .with_prompt(format!(
                    "Enter your {} API key (Esc to cancel)",
                    provider_label(&provider)
                ))
                .allow_empty_password(true)
                .interact()
            {
                Ok(k) if !k.trim().is_empty() => k.trim().to_string(),
                _ => return Ok(None),
            };

            let save_options = &["Yes, save to config file", "No, use for this session only"];
            let save_choice = Select::with_theme(&theme)
                .with_prompt("Save this key for future sessions?")
                .items(save_options)
                .default(1)
                .interact_opt()?;

            match save_choice {
                Some(0) => {
                    match save_key_to_config(config_path, &provider, &key) {
                        Ok(()) => eprintln!(
                            "  {}",
                            dim.apply_to(format!("Key saved to {}", config_path.display()))
                        ),
                        Err(e) => {
                            eprintln!(
                                "  {}",
                                warn.apply_to(format!("Could not save to config: {e}"))
                            );
                            eprintln!("  Using key for this session only.");
                        }
                    }
                    session_api_key = Some(key);
                }
                Some(1) => session_api_key = Some(key),
                _ => return Ok(None),
            }
        }
    }

    // Step 3: Model, prefilled with the configured default
    let Some(model) = super::handle_interrupt(
        Input::<String>::with_theme(&theme)
            .with_prompt(format!("{} model", provider_label(&provider)))
            .default(configured_model(config, &provider))
            .interact_text(),
    )?
    else {
        return Ok(None);
    };
    if model.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(ProviderSelection {
        provider,
        model: model.trim().to_string(),
        api_key: session_api_key,
    }))
}

/// Get the environment variable name for a provider's API key.
pub(crate) fn env_var_for(provider: &ProviderArg) -> Option<&'static str> {
    credential_env_var(&provider.to_string())
}

fn env_has_key(env_var: &str) -> bool {
    std::env::var(env_var).is_ok_and(|v| !v.trim().is_empty())
}

/// Human-readable label for a provider.
pub(crate) fn provider_label(provider: &ProviderArg) -> &'static str {
    match provider {
        ProviderArg::Gemini => "Gemini",
        ProviderArg::Huggingface => "Hugging Face",
        ProviderArg::Ollama => "Ollama",
        ProviderArg::Anthropic => "Anthropic",
        ProviderArg::Openai => "OpenAI",
    }
}

fn provider_hint(provider: &ProviderArg) -> &'static str {
    match provider {
        ProviderArg::Gemini => "hosted, Google",
        ProviderArg::Huggingface => "hosted Qwen2-VL",
        ProviderArg::Ollama => "local, no key",
        ProviderArg::Anthropic => "hosted, Claude",
        ProviderArg::Openai => "hosted, GPT-4o",
    }
}

/// The configured (or default) model for a provider.
pub(crate) fn configured_model(config: &Config, provider: &ProviderArg) -> String {
    let llm = &config.llm;
    match provider {
        ProviderArg::Gemini => llm.gemini.clone().unwrap_or_default().model,
        ProviderArg::Huggingface => llm.huggingface.clone().unwrap_or_default().model,
        ProviderArg::Ollama => llm.ollama.clone().unwrap_or_default().model,
        ProviderArg::Anthropic => llm.anthropic.clone().unwrap_or_default().model,
        ProviderArg::Openai => llm.openai.clone().unwrap_or_default().model,
    }
}

/// Check if the config already resolves to an API key for the provider.
///
/// `${VAR}` references count only when the variable is set.
pub(crate) fn config_has_key(config: &Config, provider: &ProviderArg) -> bool {
    let llm = &config.llm;
    let configured = match provider {
        ProviderArg::Gemini => llm.gemini.as_ref().map(|c| c.api_key.as_str()),
        ProviderArg::Huggingface => llm.huggingface.as_ref().map(|c| c.api_key.as_str()),
        ProviderArg::Anthropic => llm.anthropic.as_ref().map(|c| c.api_key.as_str()),
        ProviderArg::Openai => llm.openai.as_ref().map(|c| c.api_key.as_str()),
        ProviderArg::Ollama => return true,
    };
    configured.and_then(resolve_env_var).is_some()
}

/// Save an API key to the config file, preserving existing comments.
fn save_key_to_config(path: &Path, provider: &ProviderArg, key: &str) -> anyhow::Result<()> {
    if env_var_for(provider).is_none() {
        return Ok(());
    }
    let section_name = provider.to_string();

    let content = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };
    let mut doc: toml_edit::DocumentMut = content.parse()?;

    if !doc.contains_key("llm") {
        doc["llm"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    if !doc["llm"]
        .as_table()
        .is_some_and(|t| t.contains_key(&section_name))
    {
        doc["llm"][section_name.as_str()] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["llm"][section_name.as_str()]["api_key"] = toml_edit::value(key);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, doc.to_string())?;
    tracing::debug!("Saved {section_name} API key to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use forkful_core::config::{AnthropicConfig, HuggingFaceConfig};

    // ── config_has_key tests ────────────────────────────────────────────

    #[test]
    fn config_has_key_with_literal_key() {
        let mut config = Config::default();
        config.llm.anthropic = Some(AnthropicConfig {
            api_key: "sk-ant-real-key-123".to_string(),
            ..AnthropicConfig::default()
        });
        assert!(config_has_key(&config, &ProviderArg::Anthropic));
    }

    #[test]
    fn config_has_key_empty_key() {
        let mut config = Config::default();
        config.llm.huggingface = Some(HuggingFaceConfig {
            api_key: String::new(),
            ..HuggingFaceConfig::default()
        });
        assert!(!config_has_key(&config, &ProviderArg::Huggingface));
    }

    #[test]
    fn config_has_key_unset_template() {
        let mut config = Config::default();
        config.llm.anthropic = Some(AnthropicConfig {
            api_key: "${FORKFUL_TEST_NOT_SET_987}".to_string(),
            ..AnthropicConfig::default()
        });
        assert!(!config_has_key(&config, &ProviderArg::Anthropic));
    }

    #[test]
    fn config_has_key_section_none() {
        let config = Config::default();
        assert!(!config_has_key(&config, &ProviderArg::Gemini));
    }

    #[test]
    fn config_has_key_ollama_always_true() {
        assert!(config_has_key(&Config::default(), &ProviderArg::Ollama));
    }

    // ── env_var_for / labels ────────────────────────────────────────────

    #[test]
    fn env_var_for_all_providers() {
        assert_eq!(env_var_for(&ProviderArg::Gemini), Some("GEMINI_API_KEY"));
        assert_eq!(env_var_for(&ProviderArg::Huggingface), Some("HF_TOKEN"));
        assert_eq!(env_var_for(&ProviderArg::Anthropic), Some("ANTHROPIC_API_KEY"));
        assert_eq!(env_var_for(&ProviderArg::Openai), Some("OPENAI_API_KEY"));
        assert_eq!(env_var_for(&ProviderArg::Ollama), None);
    }

    #[test]
    fn provider_label_all_providers() {
        assert_eq!(provider_label(&ProviderArg::Gemini), "Gemini");
        assert_eq!(provider_label(&ProviderArg::Huggingface), "Hugging Face");
        assert_eq!(provider_label(&ProviderArg::Ollama), "Ollama");
    }

    #[test]
    fn configured_model_falls_back_to_default() {
        let config = Config::default();
        assert_eq!(
            configured_model(&config, &ProviderArg::Gemini),
            "gemini-1.5-flash"
        );
        assert_eq!(
            configured_model(&config, &ProviderArg::Huggingface),
            "Qwen/Qwen2-VL-7B-Instruct"
        );
    }

    // ── save_key_to_config ──────────────────────────────────────────────

    #[test]
    fn save_key_preserves_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "# my settings\n[retry]\nmax_attempts = 4 # be patient\n",
        )
        .unwrap();

        save_key_to_config(&path, &ProviderArg::Gemini, "AIza-test").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# my settings"));
        assert!(content.contains("# be patient"));

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.llm.gemini.unwrap().api_key, "AIza-test");
        assert!(config_has_key(
            &Config::load_from(&path).unwrap(),
            &ProviderArg::Gemini
        ));
    }

    #[test]
    fn save_key_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        save_key_to_config(&path, &ProviderArg::Huggingface, "hf_abc").unwrap();
        let config = Config::load_from(&path).unwrap();
        let hf = config.llm.huggingface.unwrap();
        assert_eq!(hf.api_key, "hf_abc");
        assert_eq!(hf.model, "Qwen/Qwen2-VL-7B-Instruct");
    }

    #[test]
    fn save_key_is_noop_for_ollama() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        save_key_to_config(&path, &ProviderArg::Ollama, "unused").unwrap();
        assert!(!path.exists());
    }
}
