//! Prompt templates for every stage of the flashcard chain.
//!
//! All prompt text lives here so the orchestrator only decides *which*
//! prompt to send, never *what it says*. Unit tests inspect the rendered
//! prompts directly, without a model.
//!
//! The generate, refine and fallback prompts all end with the same JSON
//! shape instruction; [`crate::pipeline::parse`] is written against it.

use crate::config::Difficulty;
use crate::output::Flashcard;

/// Example array shown to the model in the generate and fallback prompts.
const JSON_EXAMPLE: &str = r#"[
  {"question": "What is X?", "answer": "X is..."},
  {"question": "How does Y work?", "answer": "Y works by..."}
]"#;

/// Stage 1: structural analysis of the document prefix.
pub fn analysis_prompt(excerpt: &str) -> String {
    format!(
        "Analyze the following text and provide:
1. Main topics covered
2. Complexity level
3. Key concepts that should be highlighted

Text:
{excerpt}

Provide a structured analysis."
    )
}

/// Stage 2: extraction strategy for the requested tier.
pub fn planning_prompt(analysis: &str, difficulty: &Difficulty) -> String {
    let ranges = tier_ranges();
    format!(
        "Based on this analysis:
{analysis}

Create a plan to generate {difficulty} difficulty flashcards from the document.
Consider:
- How many flashcards to generate ({ranges})
- What type of questions to ask (Easy: definitions, Medium: concepts, Hard: application/analysis)
- How to structure questions for {difficulty} level

Provide a clear extraction strategy."
    )
}

/// "Easy: 5-8, Medium: 8-12, Hard: 12-15", from [`Difficulty::target_range`].
fn tier_ranges() -> String {
    [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
        .iter()
        .filter_map(|d| d.target_range().map(|(lo, hi)| format!("{d}: {lo}-{hi}")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Stage 3: the flashcards themselves, from the plan and the full text.
pub fn generation_prompt(plan: &str, difficulty: &Difficulty, text: &str) -> String {
    let emphasis = difficulty.emphasis();
    format!(
        "Based on this plan:
{plan}

Generate flashcards from the following text at {difficulty} difficulty level:
{text}

Requirements:
- {difficulty} level: {emphasis}
- Questions should be clear and specific
- Answers should be comprehensive but concise
- Each flashcard should test one key concept

Return ONLY a valid JSON array in this exact format:
{JSON_EXAMPLE}

Return ONLY the JSON array, no additional text."
    )
}

/// Stage 4: critique of the generated list.
///
/// The reply is classified by looking for the `IMPROVE` marker.
pub fn evaluation_prompt(cards: &[Flashcard], difficulty: &Difficulty) -> String {
    let cards_json = cards_to_json(cards);
    format!(
        "Evaluate these flashcards for:
1. Clarity of questions
2. Accuracy of answers
3. Appropriate difficulty level ({difficulty})
4. Completeness

Flashcards:
{cards_json}

Respond with:
- \"APPROVED\" if flashcards are good
- \"IMPROVE: [specific issues]\" if they need refinement"
    )
}

/// Stage 5: rewrite the list according to the evaluation feedback.
pub fn refinement_prompt(feedback: &str, cards: &[Flashcard]) -> String {
    let cards_json = cards_to_json(cards);
    format!(
        "Improve these flashcards based on this feedback:
{feedback}

Original flashcards:
{cards_json}

Return ONLY a valid JSON array with improved flashcards in the same format:
[
  {{\"question\": \"...\", \"answer\": \"...\"}}
]

Return ONLY the JSON array, no additional text."
    )
}

/// One-shot prompt used when the chain fails.
pub fn simple_prompt(difficulty: &Difficulty, text: &str) -> String {
    format!(
        "Generate {difficulty} difficulty flashcards from this text:
{text}

Return ONLY a valid JSON array:
{JSON_EXAMPLE}"
    )
}

/// Pretty-printed JSON, two-space indent.
fn cards_to_json(cards: &[Flashcard]) -> String {
    // Serialising plain string pairs cannot fail.
    serde_json::to_string_pretty(cards).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_embeds_excerpt() {
        let p = analysis_prompt("Mitochondria produce ATP.");
        assert!(p.contains("Mitochondria produce ATP."));
        assert!(p.contains("Main topics covered"));
    }

    #[test]
    fn planning_prompt_names_tier_and_ranges() {
        let p = planning_prompt("topics: biology", &Difficulty::Hard);
        assert!(p.contains("generate Hard difficulty flashcards"));
        assert!(p.contains("Hard: 12-15"));
        assert!(p.contains("topics: biology"));
    }

    #[test]
    fn planning_ranges_follow_tier_targets() {
        assert_eq!(tier_ranges(), "Easy: 5-8, Medium: 8-12, Hard: 12-15");
        let p = planning_prompt("a", &Difficulty::Custom("Expert".into()));
        assert!(p.contains("(Easy: 5-8, Medium: 8-12, Hard: 12-15)"));
    }

    #[test]
    fn generation_prompt_uses_tier_emphasis() {
        let easy = generation_prompt("plan", &Difficulty::Easy, "body");
        assert!(easy.contains("Easy level: Focus on key definitions and basic concepts"));

        let medium = generation_prompt("plan", &Difficulty::Medium, "body");
        assert!(medium.contains("Focus on understanding and relationships"));

        let custom = generation_prompt("plan", &Difficulty::Custom("Expert".into()), "body");
        assert!(custom.contains("Expert level: Focus on application, analysis, and critical thinking"));
    }

    #[test]
    fn generation_prompt_asks_for_json_only() {
        let p = generation_prompt("plan", &Difficulty::Medium, "body");
        assert!(p.ends_with("Return ONLY the JSON array, no additional text."));
        assert!(p.contains(r#"{"question": "What is X?", "answer": "X is..."}"#));
    }

    #[test]
    fn evaluation_prompt_contains_pretty_json() {
        let cards = vec![Flashcard::new("Q1", "A1")];
        let p = evaluation_prompt(&cards, &Difficulty::Easy);
        assert!(p.contains("\"question\": \"Q1\""));
        assert!(p.contains("Appropriate difficulty level (Easy)"));
        assert!(p.contains("\"IMPROVE: [specific issues]\""));
    }

    #[test]
    fn refinement_prompt_contains_feedback_and_cards() {
        let cards = vec![Flashcard::new("Q1", "A1")];
        let p = refinement_prompt("IMPROVE: answers too short", &cards);
        assert!(p.contains("IMPROVE: answers too short"));
        assert!(p.contains("\"answer\": \"A1\""));
        assert!(p.contains(r#"{"question": "...", "answer": "..."}"#));
    }

    #[test]
    fn simple_prompt_is_self_contained() {
        let p = simple_prompt(&Difficulty::Medium, "The water cycle.");
        assert!(p.starts_with("Generate Medium difficulty flashcards from this text:"));
        assert!(p.contains("The water cycle."));
    }
}
