//! Per-session state for the interactive surface.

use crate::error::AnalysisError;
use crate::prompts::AnalysisKind;
use crate::types::{Analysis, FoodImage, FoodVerdict};
use std::collections::VecDeque;

/// Outcome of one action, as shown to the user.
#[derive(Debug, Clone)]
pub enum SessionEntry {
    /// Markdown response from the model
    Success(Analysis),
    /// User-visible error string
    Failure { kind: AnalysisKind, message: String },
}

impl SessionEntry {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::Success(analysis) => analysis.kind,
            Self::Failure { kind, .. } => *kind,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// The currently loaded image, its food verdict and recent results.
///
/// Loading a new image clears everything tied to the previous one.
#[derive(Debug)]
pub struct Session {
    image: Option<FoodImage>,
    verdict: Option<FoodVerdict>,
    history: VecDeque<SessionEntry>,
    history_size: usize,
}

impl Session {
    pub fn new(history_size: usize) -> Self {
        Self {
            image: None,
            verdict: None,
            history: VecDeque::with_capacity(history_size),
            history_size: history_size.max(1),
        }
    }

    /// Replace the current image, dropping the old verdict and history.
    pub fn load_image(&mut self, image: FoodImage) {
        tracing::debug!("Session image set to {}", image.file_name());
        self.image = Some(image);
        self.verdict = None;
        self.history.clear();
    }

    pub fn image(&self) -> Option<&FoodImage> {
        self.image.as_ref()
    }

    pub fn verdict(&self) -> Option<FoodVerdict> {
        self.verdict
    }

    pub fn set_verdict(&mut self, verdict: FoodVerdict) {
        self.verdict = Some(verdict);
    }

    /// Record the outcome of an analysis, evicting the oldest entry when full.
    pub fn record(&mut self, kind: AnalysisKind, result: &Result<Analysis, AnalysisError>) {
        let entry = match result {
            Ok(analysis) => SessionEntry::Success(analysis.clone()),
            Err(e) => SessionEntry::Failure {
                kind,
                message: e.to_string(),
            },
        };
        if self.history.len() == self.history_size {
            self.history.pop_front();
        }
        self.history.push_back(entry);
    }

    /// Recent results, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &SessionEntry> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn image(name: &str) -> FoodImage {
        FoodImage {
            path: PathBuf::from(name),
            bytes: vec![0xFF, 0xD8, 0xFF],
            format: "jpeg".to_string(),
            width: 10,
            height: 10,
        }
    }

    fn analysis(kind: AnalysisKind, text: &str) -> Analysis {
        Analysis {
            kind,
            image: "tacos.jpg".to_string(),
            question: None,
            text: text.to_string(),
            model: "mock".to_string(),
            tokens_used: None,
            latency_ms: 1,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_history_is_bounded() {
        let mut session = Session::new(2);
        session.load_image(image("tacos.jpg"));
        session.record(AnalysisKind::Ingredients, &Ok(analysis(AnalysisKind::Ingredients, "a")));
        session.record(AnalysisKind::Recipe, &Ok(analysis(AnalysisKind::Recipe, "b")));
        session.record(AnalysisKind::Nutrition, &Err(AnalysisError::EmptyQuestion));

        assert_eq!(session.history_len(), 2);
        let kinds: Vec<_> = session.history().map(SessionEntry::kind).collect();
        assert_eq!(kinds, vec![AnalysisKind::Recipe, AnalysisKind::Nutrition]);
        assert!(!session.history().last().unwrap().is_success());
    }

    #[test]
    fn test_failure_keeps_user_visible_message() {
        let mut session = Session::new(5);
        session.record(AnalysisKind::Question, &Err(AnalysisError::EmptyQuestion));
        let entry = session.history().next().unwrap();
        match entry {
            SessionEntry::Failure { message, .. } => {
                assert_eq!(message, "Please enter a question about the food first.");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_new_image_clears_state() {
        let mut session = Session::new(5);
        session.load_image(image("tacos.jpg"));
        session.set_verdict(FoodVerdict::Food);
        session.record(AnalysisKind::Recipe, &Ok(analysis(AnalysisKind::Recipe, "r")));

        session.load_image(image("salad.png"));
        assert_eq!(session.image().unwrap().file_name(), "salad.png");
        assert!(session.verdict().is_none());
        assert_eq!(session.history_len(), 0);
    }
}
