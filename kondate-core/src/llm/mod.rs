//! Generative text provider abstraction.
//!
//! A provider turns one prompt into one text reply. Retries live in
//! [`RetryingProvider`], which wraps any other provider.

mod fake;
mod gemini;
mod retry;

pub use fake::FakeProvider;
pub use gemini::{GeminiProvider, SamplingParams};
pub use retry::RetryingProvider;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for provider calls.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response envelope: {0}")]
    ParseError(String),

    #[error("Response contained no generated text")]
    MissingText,

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Generation failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        attempts: u32,
        last_error: Box<LlmError>,
    },
}

impl LlmError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            LlmError::NotConfigured(_) | LlmError::RetriesExhausted { .. }
        )
    }
}

/// Trait for generative text providers.
///
/// Implementations make exactly one upstream call per `complete` and return
/// the model's text unparsed.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Send a prompt and get the model's text reply.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Provider name (e.g., "gemini", "fake").
    fn provider_name(&self) -> &'static str;

    /// Model name (e.g., "gemini-2.5-flash-lite").
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<P: LlmProvider + ?Sized> LlmProvider for std::sync::Arc<P> {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).complete(prompt).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
