//! Error types for agentflow operations
//!
//! Workflow functions deliberately do NOT return these errors: failures inside
//! a workflow are absorbed into sentinel values at the completion boundary.
//! `AgentError` covers the integration layer (price feed, news search, email
//! dispatch, configuration) where propagation with `?` is the right call.

use crate::agents::store::StoreError;
use crate::config::ConfigError;
use crate::llm::provider::LlmError;
use thiserror::Error;

/// Main error type for agent integrations
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM provider error: {0}")]
    Llm(#[from] LlmError),

    #[error("Search API error: {message}")]
    SearchError { message: String },

    #[error("Price feed error: {message}")]
    PriceFeedError { message: String },

    #[error("Email dispatch error: {message}")]
    MailError { message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}

impl AgentError {
    /// Create a search API error
    pub fn search<S: Into<String>>(message: S) -> Self {
        Self::SearchError {
            message: message.into(),
        }
    }

    /// Create a price feed error
    pub fn price_feed<S: Into<String>>(message: S) -> Self {
        Self::PriceFeedError {
            message: message.into(),
        }
    }

    /// Create an email dispatch error
    pub fn mail<S: Into<String>>(message: S) -> Self {
        Self::MailError {
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

/// Result type for agent operations
pub type AgentResult<T> = Result<T, AgentError>;
