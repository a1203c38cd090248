//! The shared completion primitive every workflow pattern is built on
//!
//! `Completer::complete` issues one prompt and returns `Some(text)` or `None`.
//! Any transport or service error is logged and converted to `None` so that
//! higher-level workflow logic can treat a failed sub-call as missing content
//! instead of aborting the whole workflow. Retries, backoff, and rate limiting
//! are the caller's responsibility.

use crate::llm::provider::{CompletionRequest, LlmProvider, Message};
use std::sync::Arc;
use tracing::{debug, error};

/// Model tier selection, a cost/quality tradeoff made per call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// Cheaper, faster model for classification and simple responses
    Fast,
    /// More capable model for reasoning, planning, and synthesis
    Capable,
}

/// Concrete model identifiers for each tier
#[derive(Debug, Clone)]
pub struct ModelSelection {
    pub fast: String,
    pub capable: String,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            fast: "gpt-4o-mini".to_string(),
            capable: "gpt-4o".to_string(),
        }
    }
}

/// Completion primitive over an injected provider
#[derive(Clone)]
pub struct Completer {
    provider: Arc<dyn LlmProvider>,
    models: ModelSelection,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl Completer {
    /// Create a new completer with default model selection
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self::with_models(provider, ModelSelection::default())
    }

    /// Create a completer with explicit model identifiers per tier
    pub fn with_models(provider: Arc<dyn LlmProvider>, models: ModelSelection) -> Self {
        Self {
            provider,
            models,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Set a max token budget applied to every completion
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set a sampling temperature applied to every completion
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Resolve a tier to the configured model identifier
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.models.fast,
            ModelTier::Capable => &self.models.capable,
        }
    }

    /// Issue one prompt and return the text output, or `None` on any failure.
    ///
    /// The optional system instruction is prepended as a separate turn. No
    /// retry is attempted; the error is logged and swallowed here so callers
    /// see a uniform sentinel.
    pub async fn complete(
        &self,
        prompt: &str,
        system: Option<&str>,
        tier: ModelTier,
    ) -> Option<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(instruction) = system {
            messages.push(Message::system(instruction));
        }
        messages.push(Message::user(prompt));

        let mut request = CompletionRequest::text(self.model_for(tier), messages);
        request.max_tokens = self.max_tokens;
        request.temperature = self.temperature;

        match self.provider.complete(request).await {
            Ok(response) => {
                debug!(
                    model = %response.model,
                    total_tokens = response.usage.total_tokens,
                    "completion succeeded"
                );
                response.content
            }
            Err(e) => {
                error!(provider = self.provider.name(), error = %e, "completion failed");
                None
            }
        }
    }
}
