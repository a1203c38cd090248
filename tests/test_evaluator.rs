//! Integration tests for the evaluator/optimizer workflow
//!
//! The iteration accounting is a binding contract: generation counts as
//! iteration 1, the loop body runs while `iterations < max_iterations`, and
//! one final evaluation follows budget exhaustion so the reported verdict
//! matches the returned artifact.

use agentflow::llm::completion::Completer;
use agentflow::testing::mocks::MockLlmProvider;
use agentflow::workflow::evaluator::{EvaluatorOptimizer, DEFAULT_MAX_ITERATIONS};
use std::sync::Arc;

fn pass_verdict() -> String {
    r#"{"passed": true, "feedback": "approved"}"#.to_string()
}

fn fail_verdict(feedback: &str) -> String {
    format!(r#"{{"passed": false, "feedback": "{feedback}"}}"#)
}

#[tokio::test]
async fn test_first_pass_stops_immediately() {
    let provider = Arc::new(MockLlmProvider::new(vec![
        "draft email".to_string(),
        pass_verdict(),
    ]));
    let workflow = EvaluatorOptimizer::new(Completer::new(provider.clone()));

    let result = workflow
        .run("write an email", "professional tone", DEFAULT_MAX_ITERATIONS, None)
        .await;

    assert_eq!(result.final_result, "draft email");
    assert_eq!(result.iterations, 1);
    assert!(result.passed);

    // Exactly one generation and one evaluation; no optimization ran
    assert_eq!(provider.call_count().await, 2);
}

#[tokio::test]
async fn test_budget_exhaustion_call_accounting() {
    // Never passes: with max_iterations = 3 the shape is
    // generate, (evaluate, optimize) x2, final evaluate = 6 calls
    let provider = Arc::new(MockLlmProvider::new(vec![
        "draft v1".to_string(),
        fail_verdict("too long"),
        "draft v2".to_string(),
        fail_verdict("still too long"),
        "draft v3".to_string(),
        fail_verdict("no better"),
    ]));
    let workflow = EvaluatorOptimizer::new(Completer::new(provider.clone()));

    let result = workflow.run("write an email", "short", 3, None).await;

    assert_eq!(result.final_result, "draft v3");
    assert_eq!(result.iterations, 3);
    assert!(!result.passed);
    assert_eq!(provider.call_count().await, 6);
}

#[tokio::test]
async fn test_pass_on_second_iteration() {
    let provider = Arc::new(MockLlmProvider::new(vec![
        "draft v1".to_string(),
        fail_verdict("missing greeting"),
        "draft v2".to_string(),
        pass_verdict(),
    ]));
    let workflow = EvaluatorOptimizer::new(Completer::new(provider.clone()));

    let result = workflow.run("write an email", "greeting", 3, None).await;

    assert_eq!(result.final_result, "draft v2");
    assert_eq!(result.iterations, 2);
    assert!(result.passed);
    // generate, evaluate, optimize, evaluate
    assert_eq!(provider.call_count().await, 4);
}

#[tokio::test]
async fn test_seed_skips_generation() {
    let provider = Arc::new(MockLlmProvider::new(vec![pass_verdict()]));
    let workflow = EvaluatorOptimizer::new(Completer::new(provider.clone()));

    let result = workflow
        .run(
            "improve this email",
            "no placeholders",
            3,
            Some("Dear [Name], best regards".to_string()),
        )
        .await;

    assert_eq!(result.final_result, "Dear [Name], best regards");
    assert_eq!(result.iterations, 1);
    assert!(result.passed);
    // Only the evaluation ran; no generation call
    assert_eq!(provider.call_count().await, 1);
}

#[tokio::test]
async fn test_seeded_placeholder_email_gets_refined() {
    // A seeded known-bad draft fails evaluation, is optimized once, then
    // passes
    let provider = Arc::new(MockLlmProvider::new(vec![
        fail_verdict("contains bracket placeholders"),
        "Dear Alex, best regards".to_string(),
        pass_verdict(),
    ]));
    let workflow = EvaluatorOptimizer::new(Completer::new(provider.clone()));

    let result = workflow
        .run(
            "write a professional email",
            "no bracket placeholders like [Name]",
            3,
            Some("Dear [Name], [Your message here]".to_string()),
        )
        .await;

    assert_eq!(result.final_result, "Dear Alex, best regards");
    assert_eq!(result.iterations, 2);
    assert!(result.passed);
}

#[tokio::test]
async fn test_unparseable_judge_response_counts_as_failure() {
    // Judge replies with prose instead of JSON every time
    let provider = Arc::new(MockLlmProvider::new(vec![
        "draft".to_string(),
        "Looks good to me!".to_string(),
        "revised draft".to_string(),
        "Still looks good!".to_string(),
    ]));
    let workflow = EvaluatorOptimizer::new(Completer::new(provider.clone()));

    let result = workflow.run("task", "criteria", 2, None).await;

    // generate, evaluate (unparseable -> fail), optimize, final evaluate
    assert_eq!(result.final_result, "revised draft");
    assert_eq!(result.iterations, 2);
    assert!(!result.passed);
    assert_eq!(provider.call_count().await, 4);
}

#[tokio::test]
async fn test_seeded_run_with_unparseable_final_verdict() {
    // Seeded artifact, never parses a verdict: the run terminates on budget
    // with passed = false instead of panicking
    let provider = Arc::new(MockLlmProvider::new(vec![
        "not json".to_string(),
        "refined once".to_string(),
        "still not json".to_string(),
    ]));
    let workflow = EvaluatorOptimizer::new(Completer::new(provider.clone()));

    let result = workflow
        .run("task", "criteria", 2, Some("seed draft".to_string()))
        .await;

    assert_eq!(result.final_result, "refined once");
    assert_eq!(result.iterations, 2);
    assert!(!result.passed);
    // evaluate, optimize, final evaluate; generation skipped
    assert_eq!(provider.call_count().await, 3);
}

#[tokio::test]
async fn test_total_provider_failure_terminates_with_empty_artifact() {
    let provider = Arc::new(MockLlmProvider::with_failure());
    let workflow = EvaluatorOptimizer::new(Completer::new(provider.clone()));

    let result = workflow.run("task", "criteria", 3, None).await;

    // Generation failure yields an empty artifact; evaluation failures parse
    // as not-passed; optimization failures keep the artifact unchanged
    assert_eq!(result.final_result, "");
    assert_eq!(result.iterations, 3);
    assert!(!result.passed);
    assert_eq!(provider.call_count().await, 6);
}

#[tokio::test]
async fn test_max_iterations_one_evaluates_exactly_once() {
    // The loop body never runs; only the post-loop evaluation happens
    let provider = Arc::new(MockLlmProvider::new(vec![
        "only draft".to_string(),
        fail_verdict("never refined"),
    ]));
    let workflow = EvaluatorOptimizer::new(Completer::new(provider.clone()));

    let result = workflow.run("task", "criteria", 1, None).await;

    assert_eq!(result.final_result, "only draft");
    assert_eq!(result.iterations, 1);
    assert!(!result.passed);
    assert_eq!(provider.call_count().await, 2);
}

#[tokio::test]
async fn test_fenced_judge_json_is_accepted() {
    let fenced_verdict = "```json\n{\"passed\": true, \"feedback\": \"approved\"}\n```";
    let provider = Arc::new(MockLlmProvider::new(vec![
        "draft".to_string(),
        fenced_verdict.to_string(),
    ]));
    let workflow = EvaluatorOptimizer::new(Completer::new(provider.clone()));

    let result = workflow.run("task", "criteria", 3, None).await;

    assert!(result.passed);
    assert_eq!(result.iterations, 1);
}
