//! Composable workflow patterns over the completion primitive
//!
//! Each pattern is a standalone struct constructed from a [`Completer`]; they
//! carry no shared state and can run concurrently within one process.
//!
//! [`Completer`]: crate::llm::completion::Completer

pub mod evaluator;
pub mod orchestrator;
pub mod router;
pub mod sectioning;
