use thiserror::Error;

use crate::ai::{ConfigError, ParseError, ValidationError};
use crate::llm::LlmError;
use crate::store::StoreError;

/// Errors surfaced by [`crate::ai::RecipeGenerator`].
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid generation request: {0}")]
    InvalidRequest(String),

    #[error("Recipe generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to store recipe: {0}")]
    Storage(#[from] StoreError),
}
