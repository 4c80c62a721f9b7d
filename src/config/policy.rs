//! Runtime policy handed to the decision pipeline.

use super::{
    DEFAULT_AGENT_TEMPERATURE, DEFAULT_DIRECTOR_TEMPERATURE, DEFAULT_MAX_RETRIES,
    DEFAULT_PERSONA_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS, DEFAULT_SYNTHESIS_MAX_ATTEMPTS,
};

/// Retry bounds and sampling temperatures used by the pipeline.
///
/// Holds no secrets, so it can be logged and cloned freely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelinePolicy {
    /// Transient retries per oracle call.
    pub max_transient_retries: u32,
    /// Initial backoff in milliseconds, doubled per retry.
    pub retry_delay_ms: u64,
    /// Director synthesis attempts per round.
    pub synthesis_max_attempts: u32,
    /// Persona synthesis attempts.
    pub persona_max_attempts: u32,
    /// Temperature for persona turns.
    pub agent_temperature: f64,
    /// Temperature for Director synthesis.
    pub director_temperature: f64,
}

impl PipelinePolicy {
    /// Policy with no backoff delay, for tests and local runs.
    #[must_use]
    pub const fn without_delay(mut self) -> Self {
        self.retry_delay_ms = 0;
        self
    }

    /// Set the transient retry count.
    #[must_use]
    pub const fn with_max_transient_retries(mut self, retries: u32) -> Self {
        self.max_transient_retries = retries;
        self
    }

    /// Set the synthesis attempt bound.
    #[must_use]
    pub const fn with_synthesis_max_attempts(mut self, attempts: u32) -> Self {
        self.synthesis_max_attempts = attempts;
        self
    }

    /// Set the persona attempt bound.
    #[must_use]
    pub const fn with_persona_max_attempts(mut self, attempts: u32) -> Self {
        self.persona_max_attempts = attempts;
        self
    }
}

impl Default for PipelinePolicy {
    fn default() -> Self {
        Self {
            max_transient_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            synthesis_max_attempts: DEFAULT_SYNTHESIS_MAX_ATTEMPTS,
            persona_max_attempts: DEFAULT_PERSONA_MAX_ATTEMPTS,
            agent_temperature: DEFAULT_AGENT_TEMPERATURE,
            director_temperature: DEFAULT_DIRECTOR_TEMPERATURE,
        }
    }
}
