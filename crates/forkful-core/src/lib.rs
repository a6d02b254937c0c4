//! Forkful Core - food photo analysis with vision-language models.
//!
//! Forkful takes a food photograph, pairs it with a fixed prompt for the
//! requested analysis, sends both to a VLM provider and returns the markdown
//! the model wrote.
//!
//! # Architecture
//!
//! ```text
//! Image → Validate (size, format, pixels) → Prompt template → Provider (with retry) → Markdown
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use forkful_core::{AnalysisKind, Config, FoodAnalyzer, ImageLoader, LlmProviderFactory};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let provider = LlmProviderFactory::create("gemini", &config.llm, None, None)?;
//!     let analyzer = FoodAnalyzer::new(provider, &config);
//!
//!     let image = ImageLoader::new(config.limits.clone())
//!         .load("./pad_thai.jpg".as_ref())
//!         .await?;
//!     if analyzer.validate(&image).await?.is_food() {
//!         let recipe = analyzer.analyze(&image, AnalysisKind::Recipe, None).await?;
//!         println!("{}", recipe.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod prompts;
pub mod session;
pub mod types;

pub use analyzer::FoodAnalyzer;
pub use config::Config;
pub use error::{AnalysisError, AnalysisResult, ConfigError, ForkfulError, ProviderError, Result};
pub use input::{ImageLoader, Validator};
pub use llm::{LlmProvider, LlmProviderFactory, RetryPolicy};
pub use output::{render_markdown, OutputFormat, OutputWriter};
pub use prompts::AnalysisKind;
pub use session::{Session, SessionEntry};
pub use types::{Analysis, FoodImage, FoodVerdict};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
