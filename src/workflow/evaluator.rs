//! Evaluator/optimizer workflow: generate, judge, refine
//!
//! State machine: GENERATE (skipped when a seed artifact is supplied), then
//! EVALUATE -> stop on pass, or OPTIMIZE and loop, bounded by the iteration
//! budget. The loop condition is `iterations < max_iterations`, so the body
//! runs at most `max_iterations - 1` times after the initial generation, and
//! one more evaluation always happens after the loop exits on budget so the
//! reported `passed` state reflects the final artifact. Changing this shape
//! changes observable call counts; callers and tests depend on it.
//!
//! Budget exhaustion is a normal terminal state, not an error: the result
//! carries `passed: false` and the best artifact produced so far.

use crate::llm::completion::{Completer, ModelTier};
use crate::llm::extract;
use serde::Deserialize;
use tracing::{debug, info, Instrument};
use uuid::Uuid;

/// Default iteration budget; the initial generation counts as iteration 1
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Fallback feedback when the judge response cannot be parsed
const PARSE_FAILURE_FEEDBACK: &str = "Failed to parse evaluation";

const GENERATOR_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Parsed judge verdict
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationResult {
    pub passed: bool,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl EvaluationResult {
    /// Safe default for an unparseable or failed judge call
    fn parse_failure() -> Self {
        Self {
            passed: false,
            feedback: Some(PARSE_FAILURE_FEEDBACK.to_string()),
        }
    }
}

/// Terminal record of one evaluator/optimizer run
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    pub final_result: String,
    pub iterations: u32,
    pub passed: bool,
}

/// Evaluator/optimizer workflow
#[derive(Clone)]
pub struct EvaluatorOptimizer {
    completer: Completer,
}

impl EvaluatorOptimizer {
    pub fn new(completer: Completer) -> Self {
        Self { completer }
    }

    /// Run the refinement loop.
    ///
    /// When `seed` is given, generation is skipped and the seed becomes the
    /// current artifact at iteration 1 (useful for improving a known-bad
    /// draft). Pass and budget exhaustion are both valid terminal states,
    /// distinguished only by `passed`.
    pub async fn run(
        &self,
        task: &str,
        criteria: &str,
        max_iterations: u32,
        seed: Option<String>,
    ) -> WorkflowResult {
        let run_id = Uuid::new_v4();
        let span = crate::workflow_span!(pattern = "evaluator_optimizer", run_id = %run_id);

        async {
            info!(max_iterations, seeded = seed.is_some(), "starting refinement run");

            let mut current_result = match seed {
                Some(seed) => seed,
                None => self
                    .completer
                    .complete(task, Some(GENERATOR_SYSTEM_PROMPT), ModelTier::Capable)
                    .await
                    .unwrap_or_default(),
            };

            let mut iterations = 1;

            while iterations < max_iterations {
                debug!(iteration = iterations, "evaluating current artifact");
                let evaluation = self.evaluate(&current_result, criteria).await;

                if evaluation.passed {
                    info!(iterations, "criteria met, run complete");
                    return WorkflowResult {
                        final_result: current_result,
                        iterations,
                        passed: true,
                    };
                }

                current_result = self
                    .optimize(
                        &current_result,
                        evaluation.feedback.as_deref().unwrap_or_default(),
                        task,
                    )
                    .await;
                iterations += 1;
            }

            // Budget expired mid-loop; evaluate once more so the reported
            // verdict matches the artifact we actually return.
            let final_evaluation = self.evaluate(&current_result, criteria).await;

            info!(
                iterations,
                passed = final_evaluation.passed,
                "refinement run finished"
            );

            WorkflowResult {
                final_result: current_result,
                iterations,
                passed: final_evaluation.passed,
            }
        }
        .instrument(span)
        .await
    }

    /// Judge the artifact against the criteria; never fails, never panics
    async fn evaluate(&self, result: &str, criteria: &str) -> EvaluationResult {
        let evaluation_prompt = format!(
            r#"Please evaluate the following result against these criteria:
{criteria}

Result to evaluate:
{result}

Respond in JSON format:
{{
  "passed": boolean,
  "feedback": "detailed feedback if not passed, or 'approved' if passed"
}}"#
        );

        let response = self
            .completer
            .complete(&evaluation_prompt, Some(GENERATOR_SYSTEM_PROMPT), ModelTier::Capable)
            .await;

        let verdict = extract::parse_json::<EvaluationResult>(response.as_deref())
            .unwrap_or_else(EvaluationResult::parse_failure);

        debug!(passed = verdict.passed, feedback = ?verdict.feedback, "judge verdict");
        verdict
    }

    /// Improve the artifact from judge feedback; a failed call keeps the
    /// prior artifact unchanged
    async fn optimize(&self, current_result: &str, feedback: &str, original_task: &str) -> String {
        let optimization_prompt = format!(
            r#"Original task: {original_task}

Current result: {current_result}

Feedback from evaluation: {feedback}

Please improve the result based on the feedback provided."#
        );

        self.completer
            .complete(&optimization_prompt, Some(GENERATOR_SYSTEM_PROMPT), ModelTier::Capable)
            .await
            .unwrap_or_else(|| current_result.to_string())
    }
}
