//! Orchestrator/workers workflow: dynamic decomposition and fan-out
//!
//! Linear state machine: DECOMPOSE -> DISPATCH -> COLLECT -> SYNTHESIZE.
//! The subtask list is decided by a planning completion, not fixed code, so
//! its cardinality is unknown until runtime. Dispatch is unbounded concurrent;
//! collection preserves submission order regardless of completion order so the
//! synthesis prompt is deterministic with respect to the decomposition.
//!
//! An unparseable plan is terminal for the run: optimizing or retrying a bad
//! decomposition is out of scope, so the orchestrator fails fast with a fixed
//! failure string and never dispatches a worker. A failed planning call is
//! different: it degrades to an empty plan, dispatching no workers but still
//! synthesizing, the same as a plan that legitimately contains zero subtasks.

use crate::llm::completion::{Completer, ModelTier};
use crate::llm::extract;
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Instrument};
use uuid::Uuid;

/// Returned when the decomposition response cannot be parsed
pub const DECOMPOSITION_FAILED: &str = "Failed to break down the task";

/// Substituted for a worker whose completion call failed
pub const WORKER_FAILED: &str = "Failed to process subtask";

/// Returned when the synthesis completion call failed
pub const SYNTHESIS_FAILED: &str = "Failed to synthesize results";

const WORKER_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// An independent subtask produced by decomposition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub prompt: String,
}

/// One worker's output, keyed back to its task
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerResult {
    pub task_id: String,
    pub prompt: String,
    pub result: String,
}

/// Orchestrator/workers workflow
#[derive(Clone)]
pub struct Orchestrator {
    completer: Completer,
}

impl Orchestrator {
    pub fn new(completer: Completer) -> Self {
        Self { completer }
    }

    /// Run the full decompose/dispatch/collect/synthesize pipeline
    pub async fn orchestrate(&self, main_prompt: &str) -> String {
        let run_id = Uuid::new_v4();
        let span = crate::workflow_span!(pattern = "orchestrator", run_id = %run_id);

        async {
            let tasks = match self.decompose(main_prompt).await {
                Some(tasks) => tasks,
                None => {
                    warn!("decomposition unparseable, aborting run");
                    return DECOMPOSITION_FAILED.to_string();
                }
            };

            info!(task_count = tasks.len(), "dispatching workers");

            // join_all preserves submission order in its output
            let workers = tasks.into_iter().map(|task| self.worker(task));
            let results = futures::future::join_all(workers).await;

            self.synthesize(&results, main_prompt).await
        }
        .instrument(span)
        .await
    }

    /// Ask the planning model to split the task into independent subtasks
    async fn decompose(&self, main_prompt: &str) -> Option<Vec<Task>> {
        let breakdown_prompt = format!(
            r#"Break down the following task into smaller subtasks that can be executed in parallel.
IMPORTANT:
- Each subtask MUST be independent and not rely on the results of other subtasks
- Do not create sequential tasks (like "first do X, then do Y")
- Each subtask should be self-contained and executable on its own

Return a JSON array of subtasks, where each subtask has an "id" and a "prompt".
Important: Return ONLY the JSON array, without any markdown formatting or backticks.

Task: {main_prompt}"#
        );

        let response = self
            .completer
            .complete(&breakdown_prompt, None, ModelTier::Capable)
            .await;

        // A failed call means empty content, which is an empty plan; the
        // terminal sentinel is reserved for output that cannot be parsed
        let raw = response.unwrap_or_else(|| "[]".to_string());
        extract::parse_json(Some(&raw))
    }

    /// Execute one subtask; a failed completion degrades to a fixed sentinel
    async fn worker(&self, task: Task) -> WorkerResult {
        let result = self
            .completer
            .complete(&task.prompt, Some(WORKER_SYSTEM_PROMPT), ModelTier::Fast)
            .await
            .unwrap_or_else(|| WORKER_FAILED.to_string());

        WorkerResult {
            task_id: task.id,
            prompt: task.prompt,
            result,
        }
    }

    /// Combine all worker results into one final answer
    async fn synthesize(&self, results: &[WorkerResult], original_prompt: &str) -> String {
        let results_text = results
            .iter()
            .map(|r| {
                format!(
                    "Task {}:\nQuestion: {}\nAnswer: {}",
                    r.task_id, r.prompt, r.result
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let synthesis_prompt = format!(
            r#"Synthesize the following results into a coherent final answer.
Original task: {original_prompt}

Results:
{results_text}"#
        );

        self.completer
            .complete(&synthesis_prompt, None, ModelTier::Fast)
            .await
            .unwrap_or_else(|| SYNTHESIS_FAILED.to_string())
    }
}
