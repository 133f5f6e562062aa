//! Response parsing: turn free-form completions into structured data.
//!
//! Models asked for "ONLY a JSON array" still wrap it in code fences or
//! surround it with prose often enough that the chain cannot trust the raw
//! text. Every fragile text-sniffing rule lives in this module:
//!
//! 1. [`unwrap_fenced`]: locate the payload inside ```` ```json ```` or
//!    generic ```` ``` ```` fences
//! 2. [`parse_flashcards`]: decode the payload as a non-empty array of
//!    `{question, answer}` objects
//! 3. [`classify_evaluation`]: the `IMPROVE` marker test on evaluation text

use crate::error::MalformedResponse;
use crate::output::{EvaluationVerdict, Flashcard};

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Marker that makes an evaluation a request for refinement.
pub const IMPROVE_MARKER: &str = "IMPROVE";

/// Extract the structured payload from a completion.
///
/// Rules, in order:
/// - surrounding whitespace is trimmed;
/// - if a ```` ```json ```` fence appears (any case), the payload is the
///   text after the first one, up to the next fence or the end;
/// - else if any fence appears, the payload is the text between the first
///   fence and the next one (or the end);
/// - else the trimmed text is the payload.
pub fn unwrap_fenced(raw: &str) -> &str {
    let text = raw.trim();
    // ASCII lowering keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();

    let body = if let Some(start) = lowered.find(JSON_FENCE) {
        &text[start + JSON_FENCE.len()..]
    } else if let Some(start) = text.find(FENCE) {
        &text[start + FENCE.len()..]
    } else {
        return text;
    };

    match body.find(FENCE) {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Parse a completion into a flashcard list.
///
/// # Errors
/// [`MalformedResponse`] when the payload is not valid JSON, is not an
/// array of `{question, answer}` objects, is an empty array, or contains a
/// card with a blank question or answer. A partial list is never returned.
pub fn parse_flashcards(raw: &str) -> Result<Vec<Flashcard>, MalformedResponse> {
    let payload = unwrap_fenced(raw);
    if payload.is_empty() {
        return Err(MalformedResponse("empty payload".into()));
    }

    let cards: Vec<Flashcard> = serde_json::from_str(payload).map_err(|e| {
        MalformedResponse(format!(
            "expected a JSON array of {{question, answer}} objects: {e}"
        ))
    })?;

    if cards.is_empty() {
        return Err(MalformedResponse("flashcard array is empty".into()));
    }

    if let Some(pos) = cards
        .iter()
        .position(|c| c.question.trim().is_empty() || c.answer.trim().is_empty())
    {
        return Err(MalformedResponse(format!(
            "flashcard {} has a blank question or answer",
            pos + 1
        )));
    }

    Ok(cards)
}

/// Classify evaluation-stage text.
///
/// Any occurrence of `IMPROVE`, in any case, means the cards need work; the
/// whole trimmed text becomes the feedback for the refine stage.
pub fn classify_evaluation(text: &str) -> EvaluationVerdict {
    if text.to_uppercase().contains(IMPROVE_MARKER) {
        EvaluationVerdict::NeedsImprovement(text.trim().to_string())
    } else {
        EvaluationVerdict::Approved
    }
}
