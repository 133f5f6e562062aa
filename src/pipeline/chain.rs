//! The five-stage reasoning chain.
//!
//! ```text
//! analyze ──▶ plan ──▶ generate ──▶ evaluate ──┬─ APPROVED ──▶ done
//! (prefix)   (tier)   (full text)   (critique) └─ IMPROVE ──▶ refine ──▶ done
//! ```
//!
//! Each stage's output is the next stage's context, so the stages run
//! strictly in order. Every stage returns `Result<_, ChainError>`; the
//! first `Err` ends the run and the caller decides what to do with it
//! (see [`crate::chain::FlashcardChain`], which falls back).

use super::llm::{excerpt, StageRunner};
use super::parse::classify_evaluation;
use crate::config::{ChainConfig, Difficulty};
use crate::error::ChainError;
use crate::output::{EvaluationVerdict, Flashcard, Stage};
use crate::prompts;
use tracing::info;

/// Per-request working state. Created at chain start, dropped at the end.
pub struct ChainState<'a> {
    pub text: &'a str,
    pub difficulty: &'a Difficulty,
    pub analysis: Option<String>,
    pub plan: Option<String>,
    pub flashcards: Vec<Flashcard>,
    pub verdict: Option<EvaluationVerdict>,
}

impl<'a> ChainState<'a> {
    pub fn new(text: &'a str, difficulty: &'a Difficulty) -> Self {
        Self {
            text,
            difficulty,
            analysis: None,
            plan: None,
            flashcards: Vec::new(),
            verdict: None,
        }
    }
}

/// Run all stages. Returns whether the refine stage ran.
///
/// On success `state.flashcards` holds the final list.
pub async fn run_chain(
    runner: &mut StageRunner<'_>,
    state: &mut ChainState<'_>,
    config: &ChainConfig,
) -> Result<bool, ChainError> {
    analyze(runner, state, config).await?;
    plan(runner, state).await?;
    generate(runner, state, config).await?;
    evaluate(runner, state).await?;

    let feedback = match &state.verdict {
        Some(EvaluationVerdict::NeedsImprovement(feedback)) => feedback.clone(),
        _ => {
            info!("Stage refine: flashcards approved, no refinement needed");
            return Ok(false);
        }
    };

    refine(runner, state, &feedback).await?;
    Ok(true)
}

/// Stage 1: structural pass over a bounded prefix of the document.
async fn analyze(
    runner: &mut StageRunner<'_>,
    state: &mut ChainState<'_>,
    config: &ChainConfig,
) -> Result<(), ChainError> {
    let prefix = excerpt(state.text, config.analysis_char_limit);
    let prompt = prompts::analysis_prompt(prefix);
    state.analysis = Some(runner.complete_text(Stage::Analyze, &prompt).await?);
    Ok(())
}

/// Stage 2: extraction strategy from the analysis.
async fn plan(runner: &mut StageRunner<'_>, state: &mut ChainState<'_>) -> Result<(), ChainError> {
    let analysis = state.analysis.as_deref().unwrap_or_default();
    let prompt = prompts::planning_prompt(analysis, state.difficulty);
    state.plan = Some(runner.complete_text(Stage::Plan, &prompt).await?);
    Ok(())
}

/// Stage 3: the working flashcard list, from the plan and the full text.
async fn generate(
    runner: &mut StageRunner<'_>,
    state: &mut ChainState<'_>,
    config: &ChainConfig,
) -> Result<(), ChainError> {
    let plan = state.plan.as_deref().unwrap_or_default();
    let body = generation_text(state.text, config);
    let prompt = prompts::generation_prompt(plan, state.difficulty, body);
    state.flashcards = runner.complete_cards(Stage::Generate, &prompt).await?;
    Ok(())
}

/// Stage 4: critique, classified by the `IMPROVE` marker.
async fn evaluate(
    runner: &mut StageRunner<'_>,
    state: &mut ChainState<'_>,
) -> Result<(), ChainError> {
    let prompt = prompts::evaluation_prompt(&state.flashcards, state.difficulty);
    let text = runner.complete_text(Stage::Evaluate, &prompt).await?;
    let verdict = classify_evaluation(&text);
    info!(
        "Stage evaluate: {}",
        match verdict {
            EvaluationVerdict::Approved => "approved",
            EvaluationVerdict::NeedsImprovement(_) => "needs improvement",
        }
    );
    state.verdict = Some(verdict);
    Ok(())
}

/// Stage 5: replace the working list with the refined one.
async fn refine(
    runner: &mut StageRunner<'_>,
    state: &mut ChainState<'_>,
    feedback: &str,
) -> Result<(), ChainError> {
    let prompt = prompts::refinement_prompt(feedback, &state.flashcards);
    let refined = runner.complete_cards(Stage::Refine, &prompt).await?;
    info!(
        "Stage refine: {} flashcards replaced by {}",
        state.flashcards.len(),
        refined.len()
    );
    state.flashcards = refined;
    Ok(())
}

/// Source text for the generation and fallback prompts: the whole document
/// unless `generation_char_limit` is set.
pub fn generation_text<'t>(text: &'t str, config: &ChainConfig) -> &'t str {
    match config.generation_char_limit {
        Some(limit) => excerpt(text, limit),
        None => text,
    }
}
