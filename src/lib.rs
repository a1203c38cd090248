//! Agentflow - Composable LLM Workflow Patterns
//!
//! Four workflow patterns built on a single completion primitive:
//! - **Routing**: classify an input and dispatch it to a specialized branch
//! - **Sectioning**: run fixed specialized workers in parallel, then synthesize
//! - **Orchestrator/Workers**: decompose a task dynamically, fan out, synthesize
//! - **Evaluator/Optimizer**: generate, judge against criteria, refine until it
//!   passes or the iteration budget runs out
//!
//! All patterns share one failure philosophy: external calls are unreliable, so
//! failures are absorbed at the boundary where they happen and replaced with a
//! well-defined sentinel. A workflow function never unwinds with a panic or an
//! escaping error because one sub-call misbehaved.
//!
//! # Quick Start
//!
//! ```rust
//! use agentflow::workflow::orchestrator::{Task, WorkerResult};
//! use agentflow::workflow::evaluator::WorkflowResult;
//!
//! // A subtask as produced by the decomposition step
//! let task = Task {
//!     id: "1".to_string(),
//!     prompt: "List the physical benefits of exercise".to_string(),
//! };
//!
//! // Worker output keyed back to its task
//! let result = WorkerResult {
//!     task_id: task.id.clone(),
//!     prompt: task.prompt.clone(),
//!     result: "Improved cardiovascular health, ...".to_string(),
//! };
//!
//! // Terminal record of one evaluator/optimizer run
//! let outcome = WorkflowResult {
//!     final_result: "Final email draft".to_string(),
//!     iterations: 2,
//!     passed: true,
//! };
//!
//! assert_eq!(result.task_id, "1");
//! assert!(outcome.passed);
//!
//! // Tasks round-trip through the JSON the decomposition model emits
//! let json = serde_json::to_string(&task).unwrap();
//! let back: Task = serde_json::from_str(&json).unwrap();
//! assert_eq!(back.prompt, task.prompt);
//! ```

pub mod agents;
pub mod config;
pub mod error;
pub mod llm;
pub mod observability;
pub mod testing;
pub mod workflow;

pub use config::AppConfig;
pub use error::{AgentError, AgentResult};
pub use llm::completion::{Completer, ModelTier};
pub use llm::provider::{LlmProvider, Message, MessageRole};
pub use workflow::evaluator::{EvaluatorOptimizer, WorkflowResult};
pub use workflow::orchestrator::Orchestrator;
pub use workflow::router::{RouteCategory, Router};
pub use workflow::sectioning::{DegradedPolicy, Sectioning};
