//! Oracle calls with bounded transient retries.
//!
//! [`OracleCaller`] wraps any [`TextOracle`] with exponential backoff.
//! Retryable failures (timeouts, rate limits, overload, network) are retried
//! up to the configured bound and then surface as
//! [`PipelineError::TransientExhausted`]; anything else fails immediately as
//! [`PipelineError::Oracle`].

use std::sync::Arc;
use std::time::Duration;

use crate::error::{OracleError, PipelineError};
use crate::traits::{OracleRequest, TextOracle};

/// Where a call sits in the pipeline, for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite<'a> {
    /// Round number (0 = persona synthesis).
    pub round: u8,
    /// Artifact being produced.
    pub artifact: &'a str,
}

/// Retrying front for a [`TextOracle`].
pub struct OracleCaller<C: TextOracle> {
    oracle: Arc<C>,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl<C: TextOracle> OracleCaller<C> {
    /// Create a caller. `max_retries` counts retries after the first attempt.
    #[must_use]
    pub const fn new(oracle: Arc<C>, max_retries: u32, retry_delay_ms: u64) -> Self {
        Self {
            oracle,
            max_retries,
            retry_delay_ms,
        }
    }

    /// Call the oracle, retrying transient failures with exponential backoff.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::TransientExhausted`] after `max_retries + 1` transient failures
    /// - [`PipelineError::Oracle`] on the first non-retryable failure
    pub async fn call(
        &self,
        request: OracleRequest,
        site: CallSite<'_>,
    ) -> Result<String, PipelineError> {
        let mut delay = self.retry_delay_ms;
        let mut last_error: Option<OracleError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    label = %request.label,
                    attempt,
                    delay_ms = delay,
                    "Retrying oracle call"
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay = delay.saturating_mul(2);
            }

            match self.oracle.generate(request.clone()).await {
                Ok(text) => {
                    tracing::debug!(label = %request.label, chars = text.len(), "Oracle replied");
                    return Ok(text);
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(label = %request.label, error = %e, attempt, "Transient oracle error");
                    last_error = Some(e);
                }
                Err(e) => {
                    tracing::error!(label = %request.label, error = %e, "Oracle call failed");
                    return Err(PipelineError::Oracle {
                        round: site.round,
                        artifact: site.artifact.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Err(PipelineError::TransientExhausted {
            round: site.round,
            artifact: site.artifact.to_string(),
            attempts: self.max_retries + 1,
            message: last_error.map_or_else(|| "unknown error".to_string(), |e| e.to_string()),
        })
    }
}

impl<C: TextOracle> Clone for OracleCaller<C> {
    fn clone(&self) -> Self {
        Self {
            oracle: Arc::clone(&self.oracle),
            max_retries: self.max_retries,
            retry_delay_ms: self.retry_delay_ms,
        }
    }
}

impl<C: TextOracle> std::fmt::Debug for OracleCaller<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleCaller")
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish_non_exhaustive()
    }
}
