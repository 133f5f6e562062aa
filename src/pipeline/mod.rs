//! Pipeline stages for document-to-flashcards generation.
//!
//! Each submodule implements exactly one transformation step, so each is
//! testable on its own and the orchestrator in [`crate::chain`] only wires
//! them together.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ normalise ──▶ chain (llm + parse) ──▶ cards
//! (path/URL)  (pdfium/   (cleanup)     │ on ChainError
//!              docx)                   └──▶ fallback ──▶ cards
//! ```
//!
//! 1. [`input`]    : canonicalise the path or URL and pick the format
//! 2. [`extract`]  : pull plain text out of the PDF or DOCX; blocking work
//!    runs in `spawn_blocking`
//! 3. [`normalise`]: deterministic cleanup of layout residue
//! 4. [`chain`]    : analyze → plan → generate → evaluate → refine
//! 5. [`llm`]      : one completion per stage, with accounting and events
//! 6. [`parse`]    : fence unwrapping, JSON decoding, verdict detection
//! 7. [`fallback`] : the one-shot path taken when the chain fails

pub mod chain;
pub mod extract;
pub mod fallback;
pub mod input;
pub mod llm;
pub mod normalise;
pub mod parse;
