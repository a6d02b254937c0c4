//! The analysis loop: load a photo, then pick analyses from a menu.
//!
//! One provider call runs at a time, behind a spinner. Results go to stdout
//! as markdown; failures are shown on stderr and kept in the session history.

use console::Style;
use dialoguer::{Input, Select};
use forkful_core::prompts::IDENTIFY_QUESTION;
use forkful_core::{
    render_markdown, AnalysisKind, Config, FoodAnalyzer, FoodVerdict, ImageLoader, Session,
    SessionEntry,
};
use std::path::PathBuf;

use super::theme::forkful_theme;
use crate::cli::analyze::with_spinner;

/// Menu entries, in display order.
const MENU_ITEMS: &[&str] = &[
    "Ingredients",
    "Recipe",
    "Nutrition",
    "Identify the dish",
    "Ask a question",
    "Recent results",
    "Load another image",
    "Exit",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Analyze(AnalysisKind),
    Identify,
    History,
    NewImage,
    Exit,
}

fn menu_action(selection: Option<usize>) -> MenuAction {
    match selection {
        Some(0) => MenuAction::Analyze(AnalysisKind::Ingredients),
        Some(1) => MenuAction::Analyze(AnalysisKind::Recipe),
        Some(2) => MenuAction::Analyze(AnalysisKind::Nutrition),
        Some(3) => MenuAction::Identify,
        Some(4) => MenuAction::Analyze(AnalysisKind::Question),
        Some(5) => MenuAction::History,
        Some(6) => MenuAction::NewImage,
        _ => MenuAction::Exit,
    }
}

/// Run the menu loop until the user exits.
pub async fn run_session(analyzer: &FoodAnalyzer, config: &Config) -> anyhow::Result<()> {
    let theme = forkful_theme();
    let loader = ImageLoader::new(config.limits.clone());
    let mut session = Session::new(config.session.history_size);

    if !load_image(analyzer, &loader, &mut session).await? {
        return Ok(());
    }

    loop {
        let name = session
            .image()
            .map(|i| i.file_name())
            .unwrap_or_default();
        let selection = Select::with_theme(&theme)
            .with_prompt(format!("What would you like to know about {name}?"))
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match menu_action(selection) {
            MenuAction::Analyze(kind) => {
                let question = if kind == AnalysisKind::Question {
                    match ask_question()? {
                        Some(q) => Some(q),
                        None => continue,
                    }
                } else {
                    None
                };
                analyze(analyzer, &mut session, kind, question.as_deref()).await;
            }
            MenuAction::Identify => {
                analyze(
                    analyzer,
                    &mut session,
                    AnalysisKind::Question,
                    Some(IDENTIFY_QUESTION),
                )
                .await;
            }
            MenuAction::History => show_history(&session),
            MenuAction::NewImage => {
                if !load_image(analyzer, &loader, &mut session).await? {
                    break;
                }
            }
            MenuAction::Exit => break,
        }
    }

    Ok(())
}

/// Prompt for an image until one loads and passes the food check.
///
/// Returns `false` if the user cancels.
async fn load_image(
    analyzer: &FoodAnalyzer,
    loader: &ImageLoader,
    session: &mut Session,
) -> anyhow::Result<bool> {
    let theme = forkful_theme();
    let warn = Style::new().for_stderr().yellow();
    let ok = Style::new().for_stderr().green();

    loop {
        let Some(raw_path) = super::handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt("Path to a food photo (jpg, png, webp)")
                .interact_text(),
        )?
        else {
            return Ok(false);
        };
        let raw_path = raw_path.trim();
        if raw_path.is_empty() {
            return Ok(false);
        }

        let path = PathBuf::from(shellexpand::tilde(raw_path).into_owned());
        let image = match loader.load(&path).await {
            Ok(image) => image,
            Err(e) => {
                eprintln!("  {}", warn.apply_to(e.to_string()));
                continue;
            }
        };
        eprintln!(
            "  {}",
            Style::new().for_stderr().dim().apply_to(format!(
                "{} · {}x{} · {:.1} MB",
                image.file_name(),
                image.width,
                image.height,
                image.file_size() as f64 / 1_000_000.0
            ))
        );

        if !analyzer.validates_food() {
            session.load_image(image);
            return Ok(true);
        }

        let verdict = with_spinner(
            AnalysisKind::Validation.progress_message(),
            analyzer.validate(&image),
        )
        .await;
        match verdict {
            Ok(FoodVerdict::Food) => {
                eprintln!("  {} Food detected", ok.apply_to("✓"));
                session.load_image(image);
                session.set_verdict(FoodVerdict::Food);
                return Ok(true);
            }
            Ok(FoodVerdict::NotFood) => {
                eprintln!(
                    "  {}",
                    warn.apply_to(
                        "This image was not recognized as food. Please try a photo of a dish."
                    )
                );
            }
            Err(e) => {
                eprintln!("  {}", warn.apply_to(format!("Food check failed: {e}")));
            }
        }
    }
}

fn ask_question() -> anyhow::Result<Option<String>> {
    let theme = forkful_theme();
    let answer = super::handle_interrupt(
        Input::<String>::with_theme(&theme)
            .with_prompt("Your question about this dish")
            .allow_empty(true)
            .interact_text(),
    )?;
    Ok(answer)
}

/// Run one analysis on the session image and show the outcome.
async fn analyze(
    analyzer: &FoodAnalyzer,
    session: &mut Session,
    kind: AnalysisKind,
    question: Option<&str>,
) {
    let result = match session.image() {
        Some(image) => {
            with_spinner(
                kind.progress_message(),
                analyzer.analyze(image, kind, question),
            )
            .await
        }
        None => return,
    };

    match &result {
        Ok(analysis) => {
            println!();
            println!("{}", render_markdown(analysis));
        }
        Err(e) => {
            let err = Style::new().for_stderr().red();
            eprintln!("  {} {e}", err.apply_to("✗"));
            eprintln!();
        }
    }
    session.record(kind, &result);
}

fn show_history(session: &Session) {
    let dim = Style::new().for_stderr().dim();
    if session.history_len() == 0 {
        eprintln!("  {}", dim.apply_to("No results yet for this image."));
        eprintln!();
        return;
    }
    eprintln!();
    for line in history_lines(session) {
        eprintln!("  {line}");
    }
    eprintln!();
}

/// One summary line per recorded result, oldest first.
fn history_lines(session: &Session) -> Vec<String> {
    session
        .history()
        .enumerate()
        .map(|(i, entry)| match entry {
            SessionEntry::Success(analysis) => {
                let first_line = analysis
                    .text
                    .lines()
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .unwrap_or("");
                format!(
                    "{}. {} ({}ms): {}",
                    i + 1,
                    analysis.kind.heading(),
                    analysis.latency_ms,
                    truncate(first_line, 60)
                )
            }
            SessionEntry::Failure { kind, message } => {
                format!("{}. {} failed: {}", i + 1, kind.heading(), message)
            }
        })
        .collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forkful_core::{Analysis, AnalysisError};

    #[test]
    fn menu_maps_every_item() {
        assert_eq!(MENU_ITEMS.len(), 8);
        assert_eq!(
            menu_action(Some(0)),
            MenuAction::Analyze(AnalysisKind::Ingredients)
        );
        assert_eq!(menu_action(Some(3)), MenuAction::Identify);
        assert_eq!(
            menu_action(Some(4)),
            MenuAction::Analyze(AnalysisKind::Question)
        );
        assert_eq!(menu_action(Some(5)), MenuAction::History);
        assert_eq!(menu_action(Some(6)), MenuAction::NewImage);
        assert_eq!(menu_action(Some(7)), MenuAction::Exit);
        // Esc / Ctrl+C
        assert_eq!(menu_action(None), MenuAction::Exit);
    }

    #[test]
    fn history_lines_summarise_results() {
        let mut session = Session::new(5);
        session.record(
            AnalysisKind::Recipe,
            &Ok(Analysis {
                kind: AnalysisKind::Recipe,
                image: "soup.jpg".to_string(),
                question: None,
                text: "\n## Tomato Soup\nSimmer.".to_string(),
                model: "mock".to_string(),
                tokens_used: None,
                latency_ms: 850,
                created_at: chrono::Utc::now(),
            }),
        );
        session.record(AnalysisKind::Question, &Err(AnalysisError::EmptyQuestion));

        let lines = history_lines(&session);
        assert_eq!(
            lines[0],
            "1. Complete Recipe & Cooking Instructions (850ms): ## Tomato Soup"
        );
        assert_eq!(
            lines[1],
            "2. Answer to Your Question failed: Please enter a question about the food first."
        );
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("crème brûlée", 5), "crème…");
        assert_eq!(truncate("pho", 5), "pho");
    }
}
