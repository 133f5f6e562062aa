//! # edgequake-flashcards
//!
//! Turn study documents (PDF or DOCX) into question/answer flashcards with
//! a multi-stage LLM reasoning chain.
//!
//! ## Why a chain?
//!
//! A single "make flashcards from this" prompt tends to produce shallow,
//! repetitive cards. This crate first has the model analyse the document's
//! structure, plan what to extract for the requested difficulty, generate,
//! then critique its own output and refine it when the critique asks for
//! improvement. If any stage fails, a one-shot prompt takes over, so a
//! request that got past validation always produces cards.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / DOCX
//!  │
//!  ├─ 1. Input     resolve local file or download from URL, detect format
//!  ├─ 2. Extract   pdfium / docx text (CPU-bound, spawn_blocking)
//!  ├─ 3. Normalise whitespace, hyphenation, invisible characters
//!  ├─ 4. Chain     analyze → plan → generate → evaluate → refine?
//!  ├─ 5. Fallback  one-shot prompt when any chain stage fails
//!  └─ 6. Output    flashcards + generation path + token stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_flashcards::{generate, ChainConfig, Difficulty};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = ChainConfig::default();
//!     let output = generate("lecture.pdf", &Difficulty::Medium, &config).await?;
//!     for card in &output.flashcards {
//!         println!("Q: {}\nA: {}\n", card.question, card.answer);
//!     }
//!     eprintln!("tokens: {} in / {} out",
//!         output.stats.input_tokens,
//!         output.stats.output_tokens);
//!     Ok(())
//! }
//! ```
//!
//! ## Difficulty Tiers
//!
//! | Tier | Cards | Focus |
//! |------|-------|-------|
//! | `Easy`   | 5–8   | Basic definitions and key facts |
//! | `Medium` | 8–12  | Concepts, relationships, applications |
//! | `Hard`   | 12–15 | Synthesis, analysis, edge cases |
//!
//! Any other label is passed through to the prompts verbatim.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `flashcards` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! edgequake-flashcards = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod chain;
pub mod client;
pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use chain::FlashcardChain;
pub use client::{Completion, CompletionClient, LlmCompletionClient};
pub use config::{ChainConfig, ChainConfigBuilder, Difficulty, DEFAULT_MODEL};
pub use error::{ChainError, CompletionError, FlashcardError, MalformedResponse};
pub use generate::{
    extract, generate, generate_from_bytes, generate_from_text, generate_sync, generate_to_file,
    write_flashcards,
};
pub use output::{
    ChainOutput, ChainStats, EvaluationVerdict, ExtractedDocument, Flashcard, GenerationPath,
    Stage,
};
pub use pipeline::input::DocumentFormat;
pub use progress::{ChainProgressCallback, NoopProgressCallback, ProgressCallback};
