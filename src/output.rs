//! Result types: flashcards, chain stages, and per-run statistics.

use crate::config::Difficulty;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// The synthetic card returned when even the fallback fails.
    pub(crate) fn error_card(error: impl fmt::Display) -> Self {
        Self::new("Error generating flashcards", error.to_string())
    }
}

/// One step of the reasoning chain. Each step is exactly one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Analyze,
    Plan,
    Generate,
    Evaluate,
    Refine,
    /// The one-shot path used when the chain fails.
    Fallback,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Analyze => "analyze",
            Stage::Plan => "plan",
            Stage::Generate => "generate",
            Stage::Evaluate => "evaluate",
            Stage::Refine => "refine",
            Stage::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the evaluation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationVerdict {
    Approved,
    /// Carries the full evaluation text as feedback for the refine stage.
    NeedsImprovement(String),
}

/// Which path produced the final flashcards.
///
/// The flashcard list alone cannot tell a real single-card result from the
/// degraded error card; this can.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationPath {
    /// The full chain completed.
    Chain { refined: bool },
    /// The chain failed and the one-shot fallback succeeded.
    Fallback { reason: String },
    /// Both the chain and the fallback failed; the list holds one error card.
    Degraded { reason: String },
}

impl GenerationPath {
    pub fn is_degraded(&self) -> bool {
        matches!(self, GenerationPath::Degraded { .. })
    }
}

/// Aggregate statistics for one chain run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStats {
    /// Completions requested, successful or not.
    pub completions: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub duration_ms: u64,
}

/// Everything a checked chain run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainOutput {
    pub flashcards: Vec<Flashcard>,
    pub difficulty: Difficulty,
    pub path: GenerationPath,
    pub stats: ChainStats,
}

/// Plain text recovered from an input document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub format: crate::pipeline::input::DocumentFormat,
    pub text: String,
    /// PDF page count; `None` for DOCX, which has no fixed pagination.
    pub page_count: Option<usize>,
    pub title: Option<String>,
}

impl ExtractedDocument {
    /// Character count of the trimmed text, the measure used by the
    /// minimum-length guard.
    pub fn char_count(&self) -> usize {
        self.text.trim().chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flashcard_serialises_with_plain_field_names() {
        let card = Flashcard::new("What is ATP?", "The cell's energy currency.");
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(
            json,
            r#"{"question":"What is ATP?","answer":"The cell's energy currency."}"#
        );
    }

    #[test]
    fn error_card_embeds_message() {
        let card = Flashcard::error_card("fallback stage: upstream error: boom");
        assert_eq!(card.question, "Error generating flashcards");
        assert!(card.answer.contains("boom"));
    }

    #[test]
    fn generation_path_json_shape() {
        let path = GenerationPath::Fallback {
            reason: "generate stage: malformed response".into(),
        };
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json["kind"], "fallback");
        assert!(!path.is_degraded());
        assert!(GenerationPath::Degraded { reason: "x".into() }.is_degraded());
    }

    #[test]
    fn stage_display_is_lowercase() {
        assert_eq!(Stage::Analyze.to_string(), "analyze");
        assert_eq!(Stage::Fallback.to_string(), "fallback");
    }
}
