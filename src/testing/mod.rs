//! Testing utilities and mock implementations
//!
//! This module provides mock implementations for exercising workflows and
//! agents without live LLM providers or external APIs.

pub mod mocks;

pub use mocks::*;
