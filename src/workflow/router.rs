//! Routing workflow: classify an input, dispatch it to a specialized branch
//!
//! A cheap classification call picks one of a fixed, closed set of categories;
//! each category dispatches to its own completion call with its own system
//! instruction and model tier. Classification must never take the pipeline
//! down: an ambiguous, unrecognized, or failed classification falls back to
//! the conversational branch.

use crate::llm::completion::{Completer, ModelTier};
use tracing::{debug, info};

const ROUTER_SYSTEM_PROMPT: &str = r#"You are a router agent. Your only job is to decide which agent should handle the user's input.
Simply respond with either "reasoning" or "conversational" based on these rules:

- Response should be "reasoning" if:
  * The query requires extensive reasoning
  * The query involves math or coding
- Response should be "conversational" if:
  * The query needs a simple answer
  * The query is casual conversation

Respond with only one word: either "reasoning" or "conversational""#;

const REASONING_SYSTEM_PROMPT: &str =
    "You are a reasoning agent that can help the user with their questions.";

const CONVERSATIONAL_SYSTEM_PROMPT: &str =
    "You are a conversational agent that can help the user with their questions.";

/// The closed set of routing categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteCategory {
    Reasoning,
    Conversational,
}

impl RouteCategory {
    /// Interpret a raw classification response.
    ///
    /// Case-insensitive substring match on "reasoning"; everything else,
    /// including a failed classification call, defaults to conversational.
    pub fn from_response(response: Option<&str>) -> Self {
        match response {
            Some(text) if text.to_lowercase().contains("reasoning") => RouteCategory::Reasoning,
            _ => RouteCategory::Conversational,
        }
    }

    /// Stable label for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteCategory::Reasoning => "reasoning",
            RouteCategory::Conversational => "conversational",
        }
    }
}

/// Routing workflow
#[derive(Clone)]
pub struct Router {
    completer: Completer,
}

impl Router {
    pub fn new(completer: Completer) -> Self {
        Self { completer }
    }

    /// Classify a prompt into a routing category
    pub async fn route(&self, prompt: &str) -> RouteCategory {
        let response = self
            .completer
            .complete(prompt, Some(ROUTER_SYSTEM_PROMPT), ModelTier::Fast)
            .await;

        let category = RouteCategory::from_response(response.as_deref());
        debug!(category = category.as_str(), "routing classification");
        category
    }

    /// Classify a prompt and dispatch it to the matching branch.
    ///
    /// The reasoning branch runs on the capable tier, the conversational
    /// branch on the fast tier.
    pub async fn handle(&self, prompt: &str) -> Option<String> {
        let category = self.route(prompt).await;
        info!(category = category.as_str(), "dispatching routed prompt");

        match category {
            RouteCategory::Reasoning => {
                self.completer
                    .complete(prompt, Some(REASONING_SYSTEM_PROMPT), ModelTier::Capable)
                    .await
            }
            RouteCategory::Conversational => {
                self.completer
                    .complete(
                        prompt,
                        Some(CONVERSATIONAL_SYSTEM_PROMPT),
                        ModelTier::Fast,
                    )
                    .await
            }
        }
    }
}
