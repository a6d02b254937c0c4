//! Forkful CLI - ingredients, recipes and nutrition from a food photo.
//!
//! Forkful sends a food photograph with a fixed prompt to a vision-language
//! model and prints the markdown it returns.
//!
//! # Usage
//!
//! ```bash
//! # List the ingredients in a photo
//! forkful analyze pad_thai.jpg
//!
//! # Recipe from a local model
//! forkful analyze pad_thai.jpg --kind recipe --provider ollama
//!
//! # Ask a question
//! forkful analyze pad_thai.jpg --kind question --question "Is this gluten free?"
//!
//! # Guided mode
//! forkful
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use forkful_core::config::expand_path;
use forkful_core::Config;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

mod cli;
mod logging;

/// Forkful - food photo analysis with vision-language models.
#[derive(Parser, Debug)]
#[command(name = "forkful")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "FORKFUL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a food photo (ingredients, recipe, nutrition, or a question)
    Analyze(cli::analyze::AnalyzeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // API keys may live in a .env file; a missing file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_deref()
        .map(expand_path)
        .unwrap_or_else(Config::default_path);

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = load_config(&config_path);
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Forkful v{}", forkful_core::VERSION);

    match cli.command {
        Some(Commands::Analyze(args)) => cli::analyze::execute(args, &config).await,
        Some(Commands::Config(args)) => cli::config::execute(args, &config_path).await,
        None => {
            if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() {
                cli::interactive::run(&config, &config_path).await
            } else {
                Cli::command().print_help()?;
                Ok(())
            }
        }
    }
}

fn load_config(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match Config::load_from(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `forkful config path`."
            );
            Config::default()
        }
    }
}
