//! Recover the JSON object embedded in a model reply.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("No JSON object found in model response")]
    NoJsonFound,

    #[error("Invalid JSON in model response: {0}")]
    InvalidJson(String),
}

/// Decode the text between the first `{` and the last `}`.
///
/// The model is free to wrap the object in prose or code fences. Nothing is
/// repaired: a truncated or malformed object is an error.
pub fn extract_json(text: &str) -> Result<Value, ParseError> {
    let (start, end) = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => (start, end),
        _ => {
            tracing::debug!(response_length = text.len(), "no JSON object in model response");
            return Err(ParseError::NoJsonFound);
        }
    };

    serde_json::from_str(&text[start..=end]).map_err(|e| {
        tracing::debug!(response_length = text.len(), error = %e, "model response JSON did not decode");
        ParseError::InvalidJson(e.to_string())
    })
}
