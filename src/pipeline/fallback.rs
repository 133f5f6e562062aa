//! One-shot fallback generation.
//!
//! Used when any stage of the chain fails: a single prompt with the tier
//! and the document, parsed with the same rules as the chain's card stages.

use super::chain::generation_text;
use super::llm::StageRunner;
use crate::config::{ChainConfig, Difficulty};
use crate::error::ChainError;
use crate::output::{Flashcard, Stage};
use crate::prompts;

/// Generate flashcards with one completion.
pub async fn try_generate_simple(
    runner: &mut StageRunner<'_>,
    text: &str,
    difficulty: &Difficulty,
    config: &ChainConfig,
) -> Result<Vec<Flashcard>, ChainError> {
    let prompt = prompts::simple_prompt(difficulty, generation_text(text, config));
    runner.complete_cards(Stage::Fallback, &prompt).await
}

/// Like [`try_generate_simple`], but a failure becomes a single error card
/// so the caller always receives at least one entry.
///
/// The error is returned alongside so the caller can still report it.
pub async fn generate_simple(
    runner: &mut StageRunner<'_>,
    text: &str,
    difficulty: &Difficulty,
    config: &ChainConfig,
) -> (Vec<Flashcard>, Option<ChainError>) {
    match try_generate_simple(runner, text, difficulty, config).await {
        Ok(cards) => (cards, None),
        Err(e) => (vec![Flashcard::error_card(&e)], Some(e)),
    }
}
