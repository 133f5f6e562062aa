//! The flashcard chain orchestrator.
//!
//! [`FlashcardChain`] owns an injected [`CompletionClient`] and a
//! [`ChainConfig`]. It runs the five-stage chain and, when any stage
//! returns a [`crate::error::ChainError`], discards the chain's progress
//! and runs the one-shot fallback instead. The fallback's own failure is
//! reported as a single error card, so the flashcard-returning methods
//! never fail; [`ChainOutput::path`] records which of the three outcomes
//! happened.

use crate::client::{CompletionClient, LlmCompletionClient};
use crate::config::{ChainConfig, Difficulty};
use crate::error::FlashcardError;
use crate::output::{ChainOutput, Flashcard, GenerationPath};
use crate::pipeline::chain::{run_chain, ChainState};
use crate::pipeline::extract::ensure_sufficient_text;
use crate::pipeline::fallback;
use crate::pipeline::llm::StageRunner;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Generates flashcards from plain text through the reasoning chain.
///
/// Cheap to clone; concurrent requests may share one instance.
///
/// # Example
/// ```rust,no_run
/// use edgequake_flashcards::{ChainConfig, Difficulty, FlashcardChain};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let chain = FlashcardChain::from_config(ChainConfig::default())?;
/// let output = chain.run(&std::fs::read_to_string("notes.txt")?, &Difficulty::Easy).await?;
/// for card in &output.flashcards {
///     println!("Q: {}\nA: {}\n", card.question, card.answer);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FlashcardChain {
    client: Arc<dyn CompletionClient>,
    config: ChainConfig,
}

impl fmt::Debug for FlashcardChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlashcardChain")
            .field("client", &"<dyn CompletionClient>")
            .field("config", &self.config)
            .finish()
    }
}

impl FlashcardChain {
    pub fn new(client: Arc<dyn CompletionClient>, config: ChainConfig) -> Self {
        Self { client, config }
    }

    /// Build a chain around the provider that `config` resolves to.
    pub fn from_config(config: ChainConfig) -> Result<Self, FlashcardError> {
        let client = LlmCompletionClient::from_config(&config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Checked entry point.
    ///
    /// # Errors
    /// [`FlashcardError::InsufficientText`] when `text` has fewer than
    /// `min_text_chars` characters after trimming; no completion is
    /// requested in that case. Chain and fallback failures are not errors
    /// here, see [`ChainOutput::path`].
    pub async fn run(
        &self,
        text: &str,
        difficulty: &Difficulty,
    ) -> Result<ChainOutput, FlashcardError> {
        ensure_sufficient_text(text, self.config.min_text_chars)?;

        let start = Instant::now();
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_chain_start(difficulty);
        }
        info!(
            "Starting {} flashcard chain over {} chars",
            difficulty,
            text.chars().count()
        );

        let mut runner = StageRunner::new(&*self.client, self.config.progress_callback.as_ref());
        let (flashcards, path) = self.generate_with(&mut runner, text, difficulty).await;

        let mut stats = runner.into_stats();
        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Chain complete: {} flashcards via {:?} in {}ms ({} completions)",
            flashcards.len(),
            path,
            stats.duration_ms,
            stats.completions
        );
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_chain_complete(flashcards.len());
        }

        Ok(ChainOutput {
            flashcards,
            difficulty: difficulty.clone(),
            path,
            stats,
        })
    }

    /// Run the chain with fallback and return only the flashcards.
    ///
    /// Never fails and never returns an empty list. Does not apply the
    /// minimum-text guard; use [`FlashcardChain::run`] for that.
    pub async fn generate(&self, text: &str, difficulty: &Difficulty) -> Vec<Flashcard> {
        let mut runner = StageRunner::new(&*self.client, self.config.progress_callback.as_ref());
        self.generate_with(&mut runner, text, difficulty).await.0
    }

    /// The one-shot fallback on its own. A failure becomes one error card.
    pub async fn generate_simple(&self, text: &str, difficulty: &Difficulty) -> Vec<Flashcard> {
        let mut runner = StageRunner::new(&*self.client, self.config.progress_callback.as_ref());
        fallback::generate_simple(&mut runner, text, difficulty, &self.config)
            .await
            .0
    }

    async fn generate_with(
        &self,
        runner: &mut StageRunner<'_>,
        text: &str,
        difficulty: &Difficulty,
    ) -> (Vec<Flashcard>, GenerationPath) {
        let mut state = ChainState::new(text, difficulty);

        let reason = match run_chain(runner, &mut state, &self.config).await {
            Ok(refined) => return (state.flashcards, GenerationPath::Chain { refined }),
            Err(e) => e.to_string(),
        };

        // Nothing from the failed chain survives into the fallback.
        drop(state);
        warn!("Chain failed ({}); falling back to one-shot generation", reason);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_fallback(&reason);
        }

        match fallback::generate_simple(runner, text, difficulty, &self.config).await {
            (cards, None) => (cards, GenerationPath::Fallback { reason }),
            (cards, Some(e)) => {
                warn!("Fallback generation failed: {}", e);
                (
                    cards,
                    GenerationPath::Degraded {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }
}
