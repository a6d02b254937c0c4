//! CLI enum types for the analyze command: analysis kind, provider, output format.

use clap::ValueEnum;
use forkful_core::prompts::IDENTIFY_QUESTION;
use forkful_core::AnalysisKind;

/// Analysis to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Only check whether the image shows food
    Validate,
    /// List the visible ingredients
    Ingredients,
    /// Write a recipe for the dish
    Recipe,
    /// Estimate calories and nutrients
    Nutrition,
    /// Name the dish, its cooking method and origin
    Identify,
    /// Answer a free-form question (requires --question)
    Question,
}

impl From<KindArg> for AnalysisKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Validate => AnalysisKind::Validation,
            KindArg::Ingredients => AnalysisKind::Ingredients,
            KindArg::Recipe => AnalysisKind::Recipe,
            KindArg::Nutrition => AnalysisKind::Nutrition,
            KindArg::Identify | KindArg::Question => AnalysisKind::Question,
        }
    }
}

impl KindArg {
    /// Question sent when `--question` is not given.
    pub fn preset_question(self) -> Option<&'static str> {
        match self {
            KindArg::Identify => Some(IDENTIFY_QUESTION),
            _ => None,
        }
    }
}

/// Supported vision-language model providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    /// Google Gemini API
    Gemini,
    /// Hugging Face inference router
    Huggingface,
    /// Local Ollama instance
    Ollama,
    /// Anthropic API
    Anthropic,
    /// OpenAI API
    Openai,
}

impl ProviderArg {
    pub const ALL: [ProviderArg; 5] = [
        Self::Gemini,
        Self::Huggingface,
        Self::Ollama,
        Self::Anthropic,
        Self::Openai,
    ];

    /// Parse a provider name as written in the config file.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.to_string().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for ProviderArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderArg::Gemini => write!(f, "gemini"),
            ProviderArg::Huggingface => write!(f, "huggingface"),
            ProviderArg::Ollama => write!(f, "ollama"),
            ProviderArg::Anthropic => write!(f, "anthropic"),
            ProviderArg::Openai => write!(f, "openai"),
        }
    }
}

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Heading plus the model's markdown
    Markdown,
    /// Single JSON object
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for forkful_core::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Markdown => forkful_core::OutputFormat::Markdown,
            OutputFormat::Json => forkful_core::OutputFormat::Json,
            OutputFormat::Jsonl => forkful_core::OutputFormat::JsonLines,
        }
    }
}
