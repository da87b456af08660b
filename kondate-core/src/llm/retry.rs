//! Retry wrapper with exponential backoff.

use std::time::Duration;

use super::{LlmError, LlmProvider};
use async_trait::async_trait;

/// Wraps a provider and retries failed calls.
///
/// After failed attempt `n` (1-based) the wrapper sleeps `base_delay * 2^n`
/// before trying again, so with a one second base the waits are 2s, 4s, ...
/// Once `max_retries` attempts have failed, the last error is returned inside
/// [`LlmError::RetriesExhausted`].
#[derive(Debug)]
pub struct RetryingProvider {
    inner: Box<dyn LlmProvider>,
    max_retries: u32,
    base_delay: Duration,
}

impl RetryingProvider {
    pub fn new(inner: Box<dyn LlmProvider>, max_retries: u32) -> Self {
        Self {
            inner,
            max_retries: max_retries.max(1),
            base_delay: Duration::from_secs(1),
        }
    }

    /// Override the backoff base (one second by default).
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[async_trait]
impl LlmProvider for RetryingProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let mut attempt = 0;

        loop {
            let error = match self.inner.complete(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => e,
            };

            attempt += 1;
            tracing::warn!(
                attempt,
                max_retries = self.max_retries,
                prompt_length = prompt.len(),
                error = %error,
                "generation attempt failed"
            );

            if attempt >= self.max_retries {
                return Err(LlmError::RetriesExhausted {
                    attempts: attempt,
                    last_error: Box::new(error),
                });
            }

            tokio::time::sleep(self.backoff(attempt)).await;
        }
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
