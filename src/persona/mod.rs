//! Persona synthesis.
//!
//! [`PersonaSynthesizer`] asks the oracle for three contrasting evaluators
//! grounded in the user's core values. A reply that fails a structural check
//! is fed back as a correction until the attempt bound runs out.

mod parsing;

pub use parsing::{parse_personas, PERSONA_COUNT};

use std::sync::Arc;

use crate::caller::{CallSite, OracleCaller};
use crate::config::PipelinePolicy;
use crate::error::PipelineError;
use crate::model::{Persona, UserProfile};
use crate::prompts::{persona_synthesis_prompt, PERSONA_SYNTHESIS_SYSTEM};
use crate::traits::{OracleRequest, TextOracle};

/// Artifact name for persona synthesis.
pub const PERSONAS_ARTIFACT: &str = "personas";

const PERSONA_MAX_TOKENS: u32 = 4096;

/// Builds the session's three personas from a user profile.
pub struct PersonaSynthesizer<C: TextOracle> {
    caller: OracleCaller<C>,
    max_attempts: u32,
    temperature: f64,
}

impl<C: TextOracle> PersonaSynthesizer<C> {
    /// Create a synthesizer using the policy's persona bound and agent temperature.
    #[must_use]
    pub fn new(oracle: Arc<C>, policy: &PipelinePolicy) -> Self {
        Self {
            caller: OracleCaller::new(
                oracle,
                policy.max_transient_retries,
                policy.retry_delay_ms,
            ),
            max_attempts: policy.persona_max_attempts.max(1),
            temperature: policy.agent_temperature,
        }
    }

    /// Synthesize exactly three personas.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::PersonaGeneration`] when every attempt is rejected
    /// - [`PipelineError::TransientExhausted`] / [`PipelineError::Oracle`] from the oracle
    pub async fn synthesize(&self, profile: &UserProfile) -> Result<Vec<Persona>, PipelineError> {
        let site = CallSite {
            round: 0,
            artifact: PERSONAS_ARTIFACT,
        };
        let mut feedback: Option<String> = None;

        for attempt in 1..=self.max_attempts {
            let request = OracleRequest::new(
                PERSONAS_ARTIFACT,
                persona_synthesis_prompt(profile, feedback.as_deref()),
            )
            .with_system_prompt(PERSONA_SYNTHESIS_SYSTEM)
            .with_temperature(self.temperature)
            .with_max_tokens(PERSONA_MAX_TOKENS);

            let text = self.caller.call(request, site).await?;

            match parse_personas(&text, profile) {
                Ok(personas) => {
                    tracing::info!(
                        attempt,
                        names = ?personas.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
                        "Personas synthesized"
                    );
                    return Ok(personas);
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Persona synthesis rejected");
                    feedback = Some(e.to_string());
                }
            }
        }

        Err(PipelineError::PersonaGeneration {
            attempts: self.max_attempts,
            reason: feedback.unwrap_or_default(),
        })
    }
}

impl<C: TextOracle> std::fmt::Debug for PersonaSynthesizer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonaSynthesizer")
            .field("max_attempts", &self.max_attempts)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}
