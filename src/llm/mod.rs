//! LLM provider abstraction, completion primitive, and structured extraction

pub mod completion;
pub mod extract;
pub mod provider;
pub mod providers;
