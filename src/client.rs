//! The completion seam: "submit a text prompt, receive a text completion".
//!
//! The orchestrator depends only on [`CompletionClient`], injected at
//! construction, so tests drive the whole chain with scripted stubs and no
//! process-wide client exists. [`LlmCompletionClient`] is the production
//! implementation on top of any `edgequake_llm` provider.

use crate::config::{ChainConfig, DEFAULT_MODEL};
use crate::error::{CompletionError, FlashcardError};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// One completion returned by a [`CompletionClient`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl Completion {
    /// A completion with no token accounting, as returned by stubs.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

impl From<&str> for Completion {
    fn from(text: &str) -> Self {
        Completion::text(text)
    }
}

impl From<String> for Completion {
    fn from(text: String) -> Self {
        Completion::text(text)
    }
}

/// Stateless text-completion capability.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Completion, CompletionError>;
}

/// [`CompletionClient`] backed by an `edgequake_llm` provider.
///
/// Each call sends a single user message; temperature, token budget and
/// timeout come from the [`ChainConfig`] the client was built with.
pub struct LlmCompletionClient {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    timeout: Option<Duration>,
}

impl LlmCompletionClient {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ChainConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
            timeout: (config.api_timeout_secs > 0)
                .then(|| Duration::from_secs(config.api_timeout_secs)),
        }
    }

    /// Resolve a provider from `config` and wrap it.
    pub fn from_config(config: &ChainConfig) -> Result<Self, FlashcardError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config))
    }
}

#[async_trait]
impl CompletionClient for LlmCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<Completion, CompletionError> {
        let start = Instant::now();
        let messages = vec![ChatMessage::user(prompt)];
        let call = self.provider.chat(&messages, Some(&self.options));

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| CompletionError::Timeout {
                    secs: limit.as_secs(),
                })?,
            None => call.await,
        };

        let response = result.map_err(|e| CompletionError::Upstream(e.to_string()))?;
        debug!(
            "Completion: {} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        if response.content.trim().is_empty() {
            return Err(CompletionError::Upstream(
                "provider returned an empty completion".into(),
            ));
        }

        Ok(Completion {
            text: response.content,
            input_tokens: response.prompt_tokens as usize,
            output_tokens: response.completion_tokens as usize,
        })
    }
}

/// Build `CompletionOptions` from the chain config.
fn build_options(config: &ChainConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, FlashcardError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        FlashcardError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`): used as-is.
/// 2. **Named provider + model** (`config.provider_name`): built by
///    [`ProviderFactory::create_llm_provider`], which reads the matching API
///    key from the environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **OpenAI key present**: OpenAI with the configured or default model,
///    so users holding several keys get a predictable default.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_provider(config: &ChainConfig) -> Result<Arc<dyn LLMProvider>, FlashcardError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);

    if let Some(ref name) = config.provider_name {
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_provider(&prov, &env_model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| FlashcardError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, GEMINI_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults() {
        let config = ChainConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.7));
        assert_eq!(opts.max_tokens, Some(8192));
    }

    #[test]
    fn completion_from_str_has_no_token_counts() {
        let c: Completion = "APPROVED".into();
        assert_eq!(c.text, "APPROVED");
        assert_eq!(c.input_tokens, 0);
        assert_eq!(c.output_tokens, 0);
    }
}
