//! Error types for the edgequake-flashcards library.
//!
//! Two tiers of failure exist, mirroring the two halves of the pipeline:
//!
//! * [`FlashcardError`]: **Fatal**: the request cannot proceed at all
//!   (file missing, unsupported format, too little text, provider not
//!   configured). Returned as `Err(FlashcardError)` from the top-level
//!   `generate*` functions, always before any completion is requested.
//!
//! * [`ChainError`]: **Recoverable**: one stage of the reasoning chain
//!   failed (upstream error, unparseable completion). The orchestrator
//!   catches it and switches to the one-shot fallback, so it only reaches
//!   the caller as a `reason` inside [`crate::output::GenerationPath`].

use crate::output::Stage;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-flashcards library.
#[derive(Debug, Error)]
pub enum FlashcardError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Document errors ───────────────────────────────────────────────────
    /// The document type is not one we can extract text from.
    #[error("Unsupported file format for '{path}'. Please upload PDF or DOCX")]
    UnsupportedFormat { path: PathBuf },

    /// The extension promised one format but the bytes say otherwise.
    #[error("'{path}' is not a valid {expected} file\nFirst bytes: {magic:?}")]
    FormatMismatch {
        path: PathBuf,
        expected: &'static str,
        magic: [u8; 4],
    },

    /// The container or page structure could not be parsed.
    #[error("Document '{path}' is corrupt: {detail}")]
    CorruptDocument { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDF text extraction needs the pdfium shared library at runtime.\n\
  • Install pdfium system-wide, or\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    /// Extraction succeeded but yielded too little text to build cards from.
    #[error("Could not extract sufficient text from document ({chars} chars, need at least {min})")]
    InsufficientText { chars: usize, min: usize },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failure reported by a [`crate::client::CompletionClient`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompletionError {
    /// The service errored, was unreachable, or returned no text.
    #[error("{0}")]
    Upstream(String),

    /// The call did not finish within the configured timeout.
    #[error("completion timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// A recoverable failure inside one stage of the chain.
///
/// Any `ChainError` from stages 1–5 sends the orchestrator down the
/// fallback path; one from the fallback itself becomes the degraded card.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    /// The completion service failed for this stage.
    #[error("{stage} stage: upstream error: {source}")]
    Upstream {
        stage: Stage,
        #[source]
        source: CompletionError,
    },

    /// The completion could not be parsed into a flashcard list.
    #[error("{stage} stage: malformed response: {detail}")]
    MalformedResponse { stage: Stage, detail: String },
}

impl ChainError {
    /// The stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            ChainError::Upstream { stage, .. } | ChainError::MalformedResponse { stage, .. } => {
                *stage
            }
        }
    }
}

/// A completion that could not be turned into flashcards.
///
/// Produced by [`crate::pipeline::parse::parse_flashcards`]; the chain
/// attaches the stage when it converts this into a [`ChainError`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct MalformedResponse(pub String);

impl MalformedResponse {
    pub(crate) fn at(self, stage: Stage) -> ChainError {
        ChainError::MalformedResponse {
            stage,
            detail: self.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_text_display() {
        let e = FlashcardError::InsufficientText { chars: 49, min: 50 };
        let msg = e.to_string();
        assert!(msg.contains("49 chars"), "got: {msg}");
        assert!(msg.contains("50"), "got: {msg}");
    }

    #[test]
    fn unsupported_format_mentions_accepted_types() {
        let e = FlashcardError::UnsupportedFormat {
            path: PathBuf::from("notes.txt"),
        };
        let msg = e.to_string();
        assert!(msg.contains("notes.txt"));
        assert!(msg.contains("PDF or DOCX"));
    }

    #[test]
    fn chain_error_display_names_stage() {
        let e = ChainError::Upstream {
            stage: Stage::Evaluate,
            source: CompletionError::Timeout { secs: 30 },
        };
        assert_eq!(e.stage(), Stage::Evaluate);
        let msg = e.to_string();
        assert!(msg.contains("evaluate"), "got: {msg}");
        assert!(msg.contains("30s"), "got: {msg}");
    }

    #[test]
    fn malformed_response_carries_stage() {
        let e = MalformedResponse("expected a JSON array".into()).at(Stage::Refine);
        assert_eq!(e.stage(), Stage::Refine);
        assert!(e.to_string().contains("expected a JSON array"));
    }
}
