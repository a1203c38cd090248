//! Structured extraction from model text output
//!
//! Several workflows ask the model for JSON and get it back wrapped in
//! markdown code fences more often than not. This is an inherently fragile
//! external contract, so the stripping and parsing live in exactly one place
//! with a logged, recoverable failure mode. Every call site decides its own
//! fallback value; nothing in here ever panics or propagates a parse error.

use serde::de::DeserializeOwned;
use tracing::warn;

/// Remove markdown code-fence markup surrounding a model response.
///
/// Handles ```` ```json ```` and bare ```` ``` ```` delimiters anywhere in the
/// text, then trims surrounding whitespace.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse a model response as JSON after stripping code fences.
///
/// `raw` is the optional output of the completion primitive; `None` input
/// (a failed completion) and malformed JSON both yield `None`.
pub fn parse_json<T: DeserializeOwned>(raw: Option<&str>) -> Option<T> {
    let text = strip_code_fences(raw?);
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, response = %text, "failed to parse structured model output");
            None
        }
    }
}
