//! Output formatting for analysis results.
//!
//! Results render as markdown for people, or as JSON / JSON Lines for
//! scripts. The writer works on any `Write`, so the CLI can target stdout or
//! a file.

use crate::types::Analysis;
use serde::Serialize;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `## heading` followed by the model's markdown
    Markdown,
    /// Single JSON object
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Some(Self::Markdown),
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Render an analysis as a markdown section.
pub fn render_markdown(analysis: &Analysis) -> String {
    let mut out = format!("## {}\n\n", analysis.kind.heading());
    if let Some(question) = &analysis.question {
        out.push_str(&format!("> {question}\n\n"));
    }
    out.push_str(analysis.text.trim_end());
    out.push('\n');
    out
}

/// A writer that emits analyses in the chosen format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write one analysis.
    pub fn write_analysis(&mut self, analysis: &Analysis) -> io::Result<()> {
        match self.format {
            OutputFormat::Markdown => {
                if self.items_written > 0 {
                    writeln!(self.writer)?;
                }
                self.writer.write_all(render_markdown(analysis).as_bytes())?;
                self.items_written += 1;
                Ok(())
            }
            _ => self.write(analysis),
        }
    }

    /// Serialize a single item as JSON or JSONL.
    ///
    /// Markdown writers fall back to pretty JSON for arbitrary items.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json | OutputFormat::Markdown => {
                if self.pretty || self.format == OutputFormat::Markdown {
                    serde_json::to_writer_pretty(&mut self.writer, item)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                }
            }
            OutputFormat::JsonLines => {
                // JSONL is never pretty-printed (one object per line)
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
            }
        }
        writeln!(self.writer)?;
        self.items_written += 1;
        Ok(())
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::AnalysisKind;

    fn analysis(kind: AnalysisKind, question: Option<&str>) -> Analysis {
        Analysis {
            kind,
            image: "ramen.webp".to_string(),
            question: question.map(String::from),
            text: "**Broth:** pork bone\n\n".to_string(),
            model: "gemini-1.5-flash".to_string(),
            tokens_used: Some(300),
            latency_ms: 1200,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_render_markdown() {
        let out = render_markdown(&analysis(AnalysisKind::Ingredients, None));
        assert_eq!(out, "## Ingredients Analysis\n\n**Broth:** pork bone\n");
    }

    #[test]
    fn test_render_markdown_quotes_question() {
        let out = render_markdown(&analysis(AnalysisKind::Question, Some("Is it spicy?")));
        assert!(out.starts_with("## Answer to Your Question\n\n> Is it spicy?\n\n"));
    }

    #[test]
    fn test_write_json() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer
            .write_analysis(&analysis(AnalysisKind::Nutrition, None))
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("\"kind\":\"nutrition\""));
        assert!(output.contains("\"tokens_used\":300"));
        assert!(!output.contains("\"question\""));
    }

    #[test]
    fn test_write_jsonl() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer
            .write_analysis(&analysis(AnalysisKind::Recipe, None))
            .unwrap();
        writer
            .write_analysis(&analysis(AnalysisKind::Nutrition, None))
            .unwrap();
        assert_eq!(writer.items_written(), 2);

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_markdown_sections_are_separated() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Markdown, false);
        writer
            .write_analysis(&analysis(AnalysisKind::Ingredients, None))
            .unwrap();
        writer
            .write_analysis(&analysis(AnalysisKind::Recipe, None))
            .unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("pork bone\n\n## Complete Recipe"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("markdown"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("JSONL"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("invalid"), None);
    }
}
