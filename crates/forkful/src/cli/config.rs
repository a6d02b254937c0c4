//! The `forkful config` command for configuration management.

use clap::{Args, Subcommand};
use forkful_core::Config;
use std::path::Path;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command against the file at `path`.
pub async fn execute(args: ConfigArgs, path: &Path) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = if path.exists() {
                Config::load_from(path)?
            } else {
                Config::default()
            };
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, Config::default().to_toml()?)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init(force: bool) -> ConfigArgs {
        ConfigArgs {
            command: ConfigCommand::Init { force },
        }
    }

    #[tokio::test]
    async fn init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        execute(init(false), &path).await.unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[tokio::test]
    async fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[retry]\nmax_attempts = 5\n").unwrap();

        assert!(execute(init(false), &path).await.is_err());
        assert_eq!(Config::load_from(&path).unwrap().retry.max_attempts, 5);

        execute(init(true), &path).await.unwrap();
        assert_eq!(Config::load_from(&path).unwrap().retry.max_attempts, 3);
    }
}
