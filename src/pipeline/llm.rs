//! Single-stage completion runner.
//!
//! Every stage of the chain (and the fallback) is one call to the
//! [`CompletionClient`]. [`StageRunner`] wraps that call with the parts
//! that are the same for every stage: progress events, logging, token and
//! call accounting, and mapping failures to a stage-tagged [`ChainError`].
//! Prompt text lives in [`crate::prompts`]; the order of stages lives in
//! [`super::chain`].

use super::parse::parse_flashcards;
use crate::client::CompletionClient;
use crate::error::ChainError;
use crate::output::{ChainStats, Flashcard, Stage};
use crate::progress::ProgressCallback;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Characters of each completion echoed to the debug log.
const LOG_EXCERPT_CHARS: usize = 200;

/// Runs stages against one client and accumulates [`ChainStats`].
///
/// One runner per request; it is never shared.
pub struct StageRunner<'a> {
    client: &'a dyn CompletionClient,
    progress: Option<&'a ProgressCallback>,
    stats: ChainStats,
}

impl<'a> StageRunner<'a> {
    pub fn new(client: &'a dyn CompletionClient, progress: Option<&'a ProgressCallback>) -> Self {
        Self {
            client,
            progress,
            stats: ChainStats::default(),
        }
    }

    /// Run a stage whose output is opaque text (analyze, plan, evaluate).
    pub async fn complete_text(&mut self, stage: Stage, prompt: &str) -> Result<String, ChainError> {
        let text = self.request(stage, prompt).await?;
        if let Some(cb) = self.progress {
            cb.on_stage_complete(stage, text.chars().count());
        }
        Ok(text)
    }

    /// Run a stage whose output must parse as a flashcard list
    /// (generate, refine, fallback).
    pub async fn complete_cards(
        &mut self,
        stage: Stage,
        prompt: &str,
    ) -> Result<Vec<Flashcard>, ChainError> {
        let text = self.request(stage, prompt).await?;
        match parse_flashcards(&text) {
            Ok(cards) => {
                info!("Stage {}: parsed {} flashcards", stage, cards.len());
                if let Some(cb) = self.progress {
                    cb.on_stage_complete(stage, text.chars().count());
                }
                Ok(cards)
            }
            Err(e) => {
                let err = e.at(stage);
                self.report_error(&err);
                Err(err)
            }
        }
    }

    /// Statistics gathered so far.
    pub fn stats(&self) -> &ChainStats {
        &self.stats
    }

    pub fn into_stats(self) -> ChainStats {
        self.stats
    }

    async fn request(&mut self, stage: Stage, prompt: &str) -> Result<String, ChainError> {
        if let Some(cb) = self.progress {
            cb.on_stage_start(stage);
        }
        info!("Stage {}: requesting completion ({} chars of prompt)", stage, prompt.len());

        let start = Instant::now();
        self.stats.completions += 1;
        let result = self.client.complete(prompt).await;
        let elapsed = start.elapsed();

        match result {
            Ok(completion) => {
                self.stats.input_tokens += completion.input_tokens as u64;
                self.stats.output_tokens += completion.output_tokens as u64;
                debug!(
                    "Stage {} complete in {:?}: {}...",
                    stage,
                    elapsed,
                    excerpt(&completion.text, LOG_EXCERPT_CHARS)
                );
                Ok(completion.text)
            }
            Err(source) => {
                let err = ChainError::Upstream { stage, source };
                self.report_error(&err);
                Err(err)
            }
        }
    }

    fn report_error(&self, err: &ChainError) {
        warn!("{}", err);
        if let Some(cb) = self.progress {
            cb.on_stage_error(err.stage(), &err.to_string());
        }
    }
}

/// The first `max_chars` characters of `s`, on a char boundary.
pub fn excerpt(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
