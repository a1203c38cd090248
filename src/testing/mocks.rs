//! Mock implementations for testing
//!
//! Provides mock LlmProvider and Mailer implementations to enable
//! comprehensive testing without external dependencies.

use crate::agents::email::{Mailer, OutgoingEmail};
use crate::error::AgentError;
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider, MessageRole,
    TokenUsage, ToolCall,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Mock LLM provider for testing
///
/// Serves canned responses in sequence, cycling when the sequence is
/// exhausted. Every request is recorded for later inspection.
#[derive(Debug)]
pub struct MockLlmProvider {
    pub responses: Vec<String>,
    pub tool_call_batches: Vec<Vec<ToolCall>>,
    pub current_response: Arc<Mutex<usize>>,
    pub should_fail: bool,
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLlmProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            tool_call_batches: vec![],
            current_response: Arc::new(Mutex::new(0)),
            should_fail: false,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Self::new(vec![])
        }
    }

    pub fn single_response(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Serve tool call batches before falling through to text responses
    pub fn with_tool_calls(batches: Vec<Vec<ToolCall>>) -> Self {
        Self {
            tool_call_batches: batches,
            ..Self::new(vec![])
        }
    }

    /// Append text responses served after any tool call batches
    pub fn then_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// All requests seen so far, in call order
    pub async fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of completion calls made against this provider
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn available_models(&self) -> Vec<String> {
        vec!["mock-model".to_string()]
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().await.push(request);

        if self.should_fail {
            return Err(LlmError::RequestFailed("Mock LLM failure".to_string()));
        }

        let mut current = self.current_response.lock().await;
        let call_idx = *current;
        *current += 1;

        // Tool call batches are consumed first, then text responses cycle
        if call_idx < self.tool_call_batches.len() {
            return Ok(CompletionResponse {
                content: None,
                model: "mock-model".to_string(),
                usage: TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                },
                finish_reason: FinishReason::Stop,
                tool_calls: Some(self.tool_call_batches[call_idx].clone()),
            });
        }

        let text_idx = call_idx - self.tool_call_batches.len();
        let content = if self.responses.is_empty() {
            "Mock response".to_string()
        } else {
            self.responses[text_idx % self.responses.len()].clone()
        };

        Ok(CompletionResponse {
            content: Some(content),
            model: "mock-model".to_string(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            finish_reason: FinishReason::Stop,
            tool_calls: None,
        })
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        if self.should_fail {
            Err(LlmError::RequestFailed(
                "Mock health check failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// A single scripted rule keyed on request content
#[derive(Debug, Clone)]
struct ResponseRule {
    /// Substring matched against the last user message
    matches: String,
    /// None means the rule simulates a provider failure
    response: Option<String>,
    /// Artificial latency before responding
    delay: Option<Duration>,
}

/// Content-matched mock provider for concurrency tests
///
/// Unlike [`MockLlmProvider`], responses are selected by matching a substring
/// against the last user message rather than by call order. Per-rule delays
/// let tests force sibling branches to complete out of submission order.
#[derive(Debug, Default)]
pub struct ScriptedLlmProvider {
    rules: Vec<ResponseRule>,
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedLlmProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `response` when the last user message contains `pattern`
    pub fn on(mut self, pattern: impl Into<String>, response: impl Into<String>) -> Self {
        self.rules.push(ResponseRule {
            matches: pattern.into(),
            response: Some(response.into()),
            delay: None,
        });
        self
    }

    /// Like [`on`](Self::on) but sleeps for `delay` before responding
    pub fn on_delayed(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
        delay: Duration,
    ) -> Self {
        self.rules.push(ResponseRule {
            matches: pattern.into(),
            response: Some(response.into()),
            delay: Some(delay),
        });
        self
    }

    /// Simulate a provider failure when the last user message contains `pattern`
    pub fn on_failure(mut self, pattern: impl Into<String>) -> Self {
        self.rules.push(ResponseRule {
            matches: pattern.into(),
            response: None,
            delay: None,
        });
        self
    }

    pub async fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    fn last_user_content(request: &CompletionRequest) -> &str {
        request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlmProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn available_models(&self) -> Vec<String> {
        vec!["mock-model".to_string()]
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let rule = {
            let content = Self::last_user_content(&request);
            self.rules
                .iter()
                .find(|rule| content.contains(&rule.matches))
                .cloned()
        };
        self.requests.lock().await.push(request);

        let Some(rule) = rule else {
            return Err(LlmError::RequestFailed(
                "No scripted rule matched request".to_string(),
            ));
        };

        if let Some(delay) = rule.delay {
            tokio::time::sleep(delay).await;
        }

        match rule.response {
            Some(content) => Ok(CompletionResponse {
                content: Some(content),
                model: "mock-model".to_string(),
                usage: TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                },
                finish_reason: FinishReason::Stop,
                tool_calls: None,
            }),
            None => Err(LlmError::RequestFailed(
                "Scripted provider failure".to_string(),
            )),
        }
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        Ok(())
    }
}

/// Mock mailer for testing email delivery
#[derive(Debug, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    pub should_fail: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub async fn sent_emails(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), AgentError> {
        if self.should_fail {
            return Err(AgentError::mail("Mock mail delivery failure"));
        }
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}
