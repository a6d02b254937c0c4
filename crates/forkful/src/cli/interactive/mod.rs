//! Interactive mode: guided experience for bare `forkful` invocation.
//!
//! When `forkful` is invoked with no subcommand on a TTY, this module walks
//! the user through provider setup, then loads a photo and offers a menu of
//! analyses. It uses the same analyzer as `forkful analyze`.

pub mod session;
pub mod setup;
pub mod theme;

use console::Style;
use forkful_core::Config;
use std::path::Path;

use crate::cli::analyze::{create_analyzer, ProviderArg};

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
///
/// Use this to wrap `interact_text()` / `interact()` calls that lack an `_opt`
/// variant, so interrupts exit the current flow cleanly instead of panicking.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Entry point for interactive mode.
pub async fn run(config: &Config, config_path: &Path) -> anyhow::Result<()> {
    theme::print_banner();

    let Some(selection) = setup::select_provider(config, config_path)? else {
        return Ok(());
    };

    // A missing credential ends the session here, before any image is loaded
    let analyzer = create_analyzer(
        selection.provider,
        Some(&selection.model),
        selection.api_key.as_deref(),
        config,
    )?;

    let dim = Style::new().for_stderr().dim();
    eprintln!(
        "  {}",
        dim.apply_to(format!(
            "Using {} / {}",
            setup::provider_label(&selection.provider),
            analyzer.model()
        ))
    );
    if !analyzer.is_available().await {
        let warn = Style::new().for_stderr().yellow();
        eprintln!("  {}", warn.apply_to(unavailable_hint(selection.provider)));
    }
    eprintln!();

    session::run_session(&analyzer, config).await
}

fn unavailable_hint(provider: ProviderArg) -> String {
    match provider {
        ProviderArg::Ollama => {
            "Ollama is not reachable. Start it with `ollama serve`, or analyses will fail.".into()
        }
        other => format!(
            "{} is not configured. Analyses will fail until it is.",
            setup::provider_label(&other)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_hint_names_the_fix() {
        assert!(unavailable_hint(ProviderArg::Ollama).contains("ollama serve"));
        assert!(unavailable_hint(ProviderArg::Gemini).contains("not configured"));
    }
}
