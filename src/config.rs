//! Configuration types for flashcard generation.
//!
//! All behaviour is controlled through [`ChainConfig`], built via its
//! [`ChainConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share a config across concurrent requests and to log exactly what a
//! run was configured with.

use crate::error::FlashcardError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Configuration for a flashcard-generation run.
///
/// Built via [`ChainConfig::builder()`] or using [`ChainConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_flashcards::ChainConfig;
///
/// let config = ChainConfig::builder()
///     .model("gpt-4.1-nano")
///     .temperature(0.4)
///     .generation_char_limit(60_000)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ChainConfig {
    /// LLM model identifier, e.g. "gpt-4.1-nano", "gemini-2.5-flash".
    /// If None, uses [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "gemini").
    /// If None along with `provider`, the provider is detected from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for every completion. Default: 0.7.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per completion. Default: 8192.
    ///
    /// The generation and refine stages return a whole JSON array in one
    /// completion; a Hard-tier list of 15 cards with paragraph answers can
    /// pass 3 000 tokens, and a truncated array is unparseable.
    pub max_tokens: usize,

    /// Per-completion timeout in seconds; 0 disables it. Default: 120.
    ///
    /// A timed-out stage counts as an upstream failure and sends the chain
    /// to the fallback path like any other error.
    pub api_timeout_secs: u64,

    /// Characters of source text shown to the analysis stage. Default: 3000.
    ///
    /// The analysis pass only needs the document's shape, so it sees a
    /// prefix. The generation stage always sees the full text unless
    /// `generation_char_limit` is set.
    pub analysis_char_limit: usize,

    /// Optional cap on characters of source text sent to the generation and
    /// fallback stages. Default: None (unbounded).
    pub generation_char_limit: Option<usize>,

    /// Minimum trimmed character count of extracted text. Default: 50.
    pub min_text_chars: usize,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Receives stage-by-stage progress events.
    pub progress_callback: Option<ProgressCallback>,
}

/// Model used when neither the config nor the environment names one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.7,
            max_tokens: 8192,
            api_timeout_secs: 120,
            analysis_char_limit: 3000,
            generation_char_limit: None,
            min_text_chars: 50,
            password: None,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("analysis_char_limit", &self.analysis_char_limit)
            .field("generation_char_limit", &self.generation_char_limit)
            .field("min_text_chars", &self.min_text_chars)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ChainProgressCallback>"),
            )
            .finish()
    }
}

impl ChainConfig {
    /// Create a new builder for `ChainConfig`.
    pub fn builder() -> ChainConfigBuilder {
        ChainConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ChainConfig`].
#[derive(Debug)]
pub struct ChainConfigBuilder {
    config: ChainConfig,
}

impl ChainConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn analysis_char_limit(mut self, chars: usize) -> Self {
        self.config.analysis_char_limit = chars;
        self
    }

    pub fn generation_char_limit(mut self, chars: usize) -> Self {
        self.config.generation_char_limit = Some(chars);
        self
    }

    pub fn min_text_chars(mut self, chars: usize) -> Self {
        self.config.min_text_chars = chars;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ChainConfig, FlashcardError> {
        let c = &self.config;
        if c.analysis_char_limit == 0 {
            return Err(FlashcardError::InvalidConfig(
                "Analysis character limit must be ≥ 1".into(),
            ));
        }
        if c.generation_char_limit == Some(0) {
            return Err(FlashcardError::InvalidConfig(
                "Generation character limit must be ≥ 1 when set".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(FlashcardError::InvalidConfig(
                "Max tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Difficulty ───────────────────────────────────────────────────────────

/// Requested difficulty tier.
///
/// The tier shapes the prompts (target card count, question style) but is
/// never enforced on the output. Strings other than the three known tiers
/// are carried through to the prompts verbatim as [`Difficulty::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Custom(String),
}

impl Difficulty {
    pub fn as_str(&self) -> &str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Custom(s) => s,
        }
    }

    /// Target card-count range communicated to the model, if the tier has one.
    pub fn target_range(&self) -> Option<(usize, usize)> {
        match self {
            Difficulty::Easy => Some((5, 8)),
            Difficulty::Medium => Some((8, 12)),
            Difficulty::Hard => Some((12, 15)),
            Difficulty::Custom(_) => None,
        }
    }

    /// What the generation stage should emphasise at this tier.
    ///
    /// Custom tiers get the Hard emphasis.
    pub fn emphasis(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Focus on key definitions and basic concepts",
            Difficulty::Medium => "Focus on understanding and relationships",
            Difficulty::Hard | Difficulty::Custom(_) => {
                "Focus on application, analysis, and critical thinking"
            }
        }
    }
}

impl FromStr for Difficulty {
    type Err = Infallible;

    /// Case-sensitive match on the three tiers; anything else (including an
    /// empty string) becomes `Custom`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Easy" => Difficulty::Easy,
            "Medium" => Difficulty::Medium,
            "Hard" => Difficulty::Hard,
            other => Difficulty::Custom(other.to_string()),
        })
    }
}

impl From<String> for Difficulty {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Easy" => Difficulty::Easy,
            "Medium" => Difficulty::Medium,
            "Hard" => Difficulty::Hard,
            _ => Difficulty::Custom(s),
        }
    }
}

impl From<&str> for Difficulty {
    fn from(s: &str) -> Self {
        Difficulty::from(s.to_string())
    }
}

impl From<Difficulty> for String {
    fn from(d: Difficulty) -> Self {
        match d {
            Difficulty::Custom(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ChainConfig::default();
        assert_eq!(c.analysis_char_limit, 3000);
        assert_eq!(c.generation_char_limit, None);
        assert_eq!(c.min_text_chars, 50);
        assert!(c.provider.is_none());
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = ChainConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn builder_rejects_zero_limits() {
        assert!(ChainConfig::builder().analysis_char_limit(0).build().is_err());
        assert!(ChainConfig::builder().generation_char_limit(0).build().is_err());
        assert!(ChainConfig::builder().max_tokens(0).build().is_err());
    }

    #[test]
    fn difficulty_parses_known_tiers() {
        assert_eq!("Easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("Medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
    }

    #[test]
    fn unknown_difficulty_passes_through() {
        let d: Difficulty = "Expert".parse().unwrap();
        assert_eq!(d, Difficulty::Custom("Expert".into()));
        assert_eq!(d.to_string(), "Expert");
        assert_eq!(d.target_range(), None);
        assert_eq!(d.emphasis(), Difficulty::Hard.emphasis());
    }

    #[test]
    fn difficulty_defaults_to_medium() {
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }

    #[test]
    fn difficulty_serde_is_a_plain_string() {
        let json = serde_json::to_string(&Difficulty::Hard).unwrap();
        assert_eq!(json, r#""Hard""#);
        let back: Difficulty = serde_json::from_str(r#""Beginner""#).unwrap();
        assert_eq!(back, Difficulty::Custom("Beginner".into()));
    }
}
