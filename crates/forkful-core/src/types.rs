//! Core data types: the uploaded image, the food verdict, and analysis results.

use crate::prompts::AnalysisKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An image loaded into memory and checked against the configured limits.
///
/// Read once per analysis action; the bytes are sent to the provider as-is.
#[derive(Debug, Clone)]
pub struct FoodImage {
    /// Where the image came from (file path or upload label)
    pub path: PathBuf,

    /// Raw encoded bytes
    pub bytes: Vec<u8>,

    /// Detected format ("jpeg", "png", "webp")
    pub format: String,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,
}

impl FoodImage {
    /// Total pixel count, computed without overflow.
    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Just the filename portion, for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Size of the encoded image in bytes.
    pub fn file_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Outcome of the food-presence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodVerdict {
    Food,
    NotFood,
}

impl FoodVerdict {
    /// Marker the validation prompt asks the model to answer with.
    pub const FOOD_MARKER: &'static str = "VALID_FOOD";

    /// Classify a validation response.
    ///
    /// Only a response containing `VALID_FOOD` counts as food; `NOT_FOOD`,
    /// empty output and anything else do not.
    pub fn from_response(text: &str) -> Self {
        if text.contains(Self::FOOD_MARKER) {
            Self::Food
        } else {
            Self::NotFood
        }
    }

    pub fn is_food(self) -> bool {
        self == Self::Food
    }
}

/// The result of one analysis call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    /// Which analysis produced this text
    pub kind: AnalysisKind,

    /// Image the analysis was run on
    pub image: String,

    /// The user's question, for question analyses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,

    /// Markdown response from the model
    pub text: String,

    /// Model identifier reported by the provider
    pub model: String,

    /// Tokens used (input + output), if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,

    /// Round-trip latency of the successful attempt in milliseconds
    pub latency_ms: u64,

    /// When the analysis completed
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_valid_food() {
        assert_eq!(FoodVerdict::from_response("VALID_FOOD"), FoodVerdict::Food);
        assert_eq!(
            FoodVerdict::from_response("  VALID_FOOD\n"),
            FoodVerdict::Food
        );
    }

    #[test]
    fn test_verdict_not_food() {
        assert_eq!(FoodVerdict::from_response("NOT_FOOD"), FoodVerdict::NotFood);
        assert_eq!(FoodVerdict::from_response(""), FoodVerdict::NotFood);
        assert_eq!(
            FoodVerdict::from_response("Yes, this is a pizza."),
            FoodVerdict::NotFood
        );
    }

    #[test]
    fn test_pixels_do_not_overflow() {
        let image = FoodImage {
            path: PathBuf::from("huge.png"),
            bytes: Vec::new(),
            format: "png".to_string(),
            width: u32::MAX,
            height: u32::MAX,
        };
        assert_eq!(image.pixels(), u64::from(u32::MAX) * u64::from(u32::MAX));
    }

    #[test]
    fn test_file_name() {
        let image = FoodImage {
            path: PathBuf::from("/tmp/photos/biryani.jpg"),
            bytes: vec![0; 10],
            format: "jpeg".to_string(),
            width: 1,
            height: 1,
        };
        assert_eq!(image.file_name(), "biryani.jpg");
        assert_eq!(image.file_size(), 10);
    }
}
