//! The `forkful analyze` command: one image, one analysis.

mod setup;
pub mod types;

pub use setup::{create_analyzer, resolve_provider};
pub use types::{KindArg, OutputFormat, ProviderArg};

use clap::Args;
use forkful_core::{AnalysisKind, Config, FoodVerdict, ImageLoader, OutputWriter};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::future::Future;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Food photo to analyze (jpg, png, webp)
    #[arg(required = true)]
    pub image: PathBuf,

    /// What to ask about the dish
    #[arg(short, long, value_enum, default_value = "ingredients")]
    pub kind: KindArg,

    /// Question text (required for --kind question, replaces the default
    /// request for the other kinds)
    #[arg(short, long)]
    pub question: Option<String>,

    /// Model provider (defaults to `llm.provider` from config)
    #[arg(short, long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Model name (provider-specific)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Skip the food check before analysing
    #[arg(long)]
    pub no_validate: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "markdown")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the analyze command.
pub async fn execute(args: AnalyzeArgs, config: &Config) -> anyhow::Result<()> {
    let kind = AnalysisKind::from(args.kind);
    let question = args.question.as_deref().or(args.kind.preset_question());
    // Reject a missing question before touching the provider or the image
    kind.user_text(question)?;

    let provider = resolve_provider(args.provider, config)?;
    let analyzer = create_analyzer(provider, args.model.as_deref(), None, config)?;

    let loader = ImageLoader::new(config.limits.clone());
    let image = loader.load(&args.image).await.map_err(|e| {
        anyhow::anyhow!(
            "{e}\n\n  Hint: Supported formats are {}, up to {}MB and {} pixels.",
            config.limits.supported_formats.join(", "),
            config.limits.max_file_size_mb,
            config.limits.max_pixels
        )
    })?;
    tracing::debug!(
        "Loaded {} ({}x{}, {})",
        image.file_name(),
        image.width,
        image.height,
        image.format
    );

    let check_food = kind != AnalysisKind::Validation && !args.no_validate && analyzer.validates_food();
    if check_food {
        let verdict = with_spinner(
            AnalysisKind::Validation.progress_message(),
            analyzer.validate(&image),
        )
        .await?;
        if verdict == FoodVerdict::NotFood {
            anyhow::bail!(
                "{} was not recognized as food.\n\n  Hint: Use a clear photo of a dish, \
                 or pass --no-validate to analyze it anyway.",
                image.file_name()
            );
        }
    }

    let analysis = with_spinner(
        kind.progress_message(),
        analyzer.analyze(&image, kind, question),
    )
    .await?;

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, args.format.into(), true);
    writer.write_analysis(&analysis)?;
    writer.flush()?;

    if let Some(path) = &args.output {
        tracing::info!("Wrote {} analysis to {}", kind, path.display());
    }
    Ok(())
}

/// Show a spinner on stderr while `fut` runs.
pub(crate) async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    let output = fut.await;
    pb.finish_and_clear();
    output
}
