//! Sectioning workflow: fixed parallel fan-out with one aggregation call
//!
//! Two specialized agents analyze the identical input concurrently, one from a
//! factual/technical angle and one from a contextual/strategic angle. Both
//! must finish (or fail) before aggregation starts; this is a join barrier,
//! not a race. The aggregation prompt embeds both raw responses in declaration
//! order, factual first, so the synthesis input is deterministic with respect
//! to wall-clock completion order.

use crate::llm::completion::{Completer, ModelTier};
use tracing::{info, warn};

const FACTUAL_AGENT_NAME: &str = "FactualAnalysisAgent";
const CONTEXTUAL_AGENT_NAME: &str = "ContextualReasoningAgent";

/// Placeholder embedded in the aggregation prompt for a failed branch
const MISSING_RESPONSE: &str = "(no response)";

/// One agent's tagged output slot
#[derive(Debug, Clone)]
pub struct AgentResponse {
    pub agent_name: String,
    pub response: Option<String>,
}

/// What to do when a branch fails before aggregation.
///
/// The upstream behavior is to proceed with a placeholder for the failed
/// slot, silently degrading quality. Abstaining instead is the caller's
/// choice; neither policy cancels the sibling branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegradedPolicy {
    /// Aggregate anyway, substituting a placeholder for the failed slot
    #[default]
    Proceed,
    /// Skip aggregation and return `None` when any branch failed
    Abstain,
}

/// Sectioning workflow
#[derive(Clone)]
pub struct Sectioning {
    completer: Completer,
    policy: DegradedPolicy,
}

impl Sectioning {
    pub fn new(completer: Completer) -> Self {
        Self {
            completer,
            policy: DegradedPolicy::default(),
        }
    }

    /// Override the degraded-branch policy
    pub fn with_policy(mut self, policy: DegradedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run both section agents concurrently, then synthesize their outputs
    pub async fn run(&self, prompt: &str) -> Option<String> {
        let (factual, contextual) =
            tokio::join!(self.factual_agent(prompt), self.contextual_agent(prompt));

        let failed = factual.response.is_none() || contextual.response.is_none();
        if failed {
            warn!(
                factual_ok = factual.response.is_some(),
                contextual_ok = contextual.response.is_some(),
                "section branch failed before aggregation"
            );
            if self.policy == DegradedPolicy::Abstain {
                return None;
            }
        }

        info!("aggregating section responses");
        self.aggregate(&[factual, contextual], prompt).await
    }

    async fn factual_agent(&self, prompt: &str) -> AgentResponse {
        let specific_prompt = format!(
            r#"You are a factual analysis agent. Your role is to:
1. Identify and list the key facts and technical details from the question
2. Provide objective analysis based on concrete information
3. Focus on "what" and "how" aspects

Original question: {prompt}

Provide your analysis in a clear, structured format."#
        );

        let response = self
            .completer
            .complete(&specific_prompt, None, ModelTier::Capable)
            .await;

        AgentResponse {
            agent_name: FACTUAL_AGENT_NAME.to_string(),
            response,
        }
    }

    async fn contextual_agent(&self, prompt: &str) -> AgentResponse {
        let specific_prompt = format!(
            r#"You are a contextual reasoning agent. Your role is to:
1. Consider broader implications and context
2. Identify potential challenges or considerations
3. Focus on "why" aspects and strategic implications
4. Suggest alternative approaches or considerations

Original question: {prompt}

Provide your insights in a clear, structured format."#
        );

        let response = self
            .completer
            .complete(&specific_prompt, None, ModelTier::Capable)
            .await;

        AgentResponse {
            agent_name: CONTEXTUAL_AGENT_NAME.to_string(),
            response,
        }
    }

    async fn aggregate(&self, responses: &[AgentResponse], original: &str) -> Option<String> {
        let factual = responses[0].response.as_deref().unwrap_or(MISSING_RESPONSE);
        let contextual = responses[1].response.as_deref().unwrap_or(MISSING_RESPONSE);

        let aggregation_prompt = format!(
            r#"You are a synthesis agent. Your role is to create a comprehensive final answer by:
1. Combining the factual analysis and contextual insights provided
2. Resolving any potential contradictions
3. Creating a coherent, well-structured response
4. Ensuring all key points are addressed

Original question: {original}

Factual Analysis (Agent 1): {factual}
Contextual Analysis (Agent 2): {contextual}

Provide a comprehensive final answer that synthesizes both perspectives into a clear, actionable response."#
        );

        self.completer
            .complete(&aggregation_prompt, None, ModelTier::Capable)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mocks::MockLlmProvider;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_run_invokes_three_completions() {
        let provider = Arc::new(MockLlmProvider::new(vec![
            "factual answer".to_string(),
            "contextual answer".to_string(),
            "synthesized".to_string(),
        ]));
        let sectioning = Sectioning::new(Completer::new(provider.clone()));

        let result = sectioning.run("How do I sleep well?").await;
        assert!(result.is_some());

        let requests = provider.recorded_requests().await;
        assert_eq!(requests.len(), 3);
    }

    #[tokio::test]
    async fn test_default_policy_is_proceed() {
        let sectioning = Sectioning::new(Completer::new(Arc::new(
            MockLlmProvider::single_response("ok"),
        )));
        assert_eq!(sectioning.policy, DegradedPolicy::Proceed);
    }
}
