//! Document-level entry points: path or URL in, flashcards out.
//!
//! These wrap the full request flow: resolve the input, extract and
//! normalise its text, refuse documents with too little text, resolve the
//! LLM provider, and run the [`FlashcardChain`]. Every fatal error is
//! returned before the first completion is requested.

use crate::chain::FlashcardChain;
use crate::config::{ChainConfig, Difficulty};
use crate::error::FlashcardError;
use crate::output::{ChainOutput, ChainStats, ExtractedDocument};
use crate::pipeline::extract::{ensure_sufficient_text, extract_text};
use crate::pipeline::input::resolve_input;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Generate flashcards from a PDF or DOCX file path or URL.
///
/// # Errors
/// Returns `Err(FlashcardError)` only for fatal errors:
/// - File not found / permission denied / download failed
/// - Unsupported or corrupt document
/// - Extracted text shorter than `config.min_text_chars`
/// - No LLM provider configured
///
/// Chain failures are recovered internally; inspect
/// [`ChainOutput::path`] to see whether the fallback was used.
pub async fn generate(
    input_str: impl AsRef<str>,
    difficulty: &Difficulty,
    config: &ChainConfig,
) -> Result<ChainOutput, FlashcardError> {
    let input_str = input_str.as_ref();
    info!("Starting flashcard generation: {}", input_str);

    // ── Step 1: Resolve input and extract text ───────────────────────────
    let document = extract(input_str, config).await?;

    // ── Step 2: Refuse short documents before touching the provider ──────
    ensure_sufficient_text(&document.text, config.min_text_chars)?;

    // ── Step 3: Run the chain ────────────────────────────────────────────
    let chain = FlashcardChain::from_config(config.clone())?;
    chain.run(&document.text, difficulty).await
}

/// Generate flashcards from text that has already been extracted.
pub async fn generate_from_text(
    text: &str,
    difficulty: &Difficulty,
    config: &ChainConfig,
) -> Result<ChainOutput, FlashcardError> {
    ensure_sufficient_text(text, config.min_text_chars)?;
    let chain = FlashcardChain::from_config(config.clone())?;
    chain.run(text, difficulty).await
}

/// Generate flashcards from an uploaded document held in memory.
///
/// `filename` supplies the extension that decides the format, exactly as
/// an upload's original name would. The bytes are written to a managed
/// [`tempfile`] that is deleted when this function returns.
pub async fn generate_from_bytes(
    bytes: &[u8],
    filename: &str,
    difficulty: &Difficulty,
    config: &ChainConfig,
) -> Result<ChainOutput, FlashcardError> {
    let suffix = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let mut tmp = tempfile::Builder::new()
        .prefix("flashcards-upload-")
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| FlashcardError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| FlashcardError::Internal(format!("tempfile write: {e}")))?;
    tmp.flush()
        .map_err(|e| FlashcardError::Internal(format!("tempfile write: {e}")))?;

    let path = tmp.path().to_string_lossy().to_string();
    // `tmp` is dropped (and the file deleted) when `generate` returns
    generate(&path, difficulty, config).await
}

/// Generate flashcards and write them to `output_path` as a JSON array.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn generate_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    difficulty: &Difficulty,
    config: &ChainConfig,
) -> Result<ChainOutput, FlashcardError> {
    let output = generate(input_str, difficulty, config).await?;
    write_flashcards(output_path.as_ref(), &output).await?;
    Ok(output)
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    input_str: impl AsRef<str>,
    difficulty: &Difficulty,
    config: &ChainConfig,
) -> Result<ChainOutput, FlashcardError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| FlashcardError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(input_str, difficulty, config))
}

/// Extract a document's text without generating flashcards.
///
/// Does not require an LLM provider or API key.
pub async fn extract(
    input_str: impl AsRef<str>,
    config: &ChainConfig,
) -> Result<ExtractedDocument, FlashcardError> {
    let resolved = resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    extract_text(&resolved, config.password.as_deref()).await
}

/// Write `output.flashcards` as pretty JSON, atomically.
pub async fn write_flashcards(path: &Path, output: &ChainOutput) -> Result<ChainStats, FlashcardError> {
    let write_err = |source| FlashcardError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let json = serde_json::to_string_pretty(&output.flashcards)
        .map_err(|e| FlashcardError::Internal(format!("serialise flashcards: {e}")))?;

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    Ok(output.stats.clone())
}
