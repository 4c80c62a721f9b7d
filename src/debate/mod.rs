//! The structured 13-turn debate.
//!
//! [`DebateEngine`] runs the fixed plan from [`turn_plan`] over any
//! [`DebateTopic`]: twelve persona turns, each one oracle call seeing the
//! transcript so far, then a Director synthesis parsed into the topic's
//! output. A synthesis that cannot be parsed is retried with the parse error
//! as feedback up to the configured bound.
//!
//! # Example
//!
//! ```ignore
//! let engine = DebateEngine::new(oracle, &policy);
//! let outcome = engine.run(&CriteriaTopic::new(options, 5), &panel).await?;
//! assert_eq!(outcome.turns.len(), 13);
//! ```

mod criteria;
mod pairwise;
mod plan;
mod scoring;
mod topic;

pub use criteria::{CriteriaSelection, CriteriaTopic};
pub use pairwise::{PairwiseRetryContext, PairwiseTopic};
pub use plan::{
    turn_plan, Panel, PlannedTurn, PANEL_SIZE, SYNTHESIS_PHASE, SYNTHESIS_TURN_INDEX,
    TURNS_PER_ROUND,
};
pub use scoring::ScoringTopic;
pub use topic::DebateTopic;

use std::sync::Arc;

use crate::caller::{CallSite, OracleCaller};
use crate::config::PipelinePolicy;
use crate::error::PipelineError;
use crate::model::{DebateTurn, Speaker, TurnType};
use crate::parsing::{extract_json, get_opt_str};
use crate::prompts::{director_system_prompt, role_instruction, synthesis_prompt, turn_prompt};
use crate::traits::{OracleRequest, RealTimeProvider, TextOracle, TimeProvider};

const TURN_MAX_TOKENS: u32 = 1024;
const SYNTHESIS_MAX_TOKENS: u32 = 4096;

/// A finished round: the full transcript and the Director's result.
#[derive(Debug, Clone, PartialEq)]
pub struct DebateOutcome<O> {
    /// All 13 turns in order.
    pub turns: Vec<DebateTurn>,
    /// Parsed synthesis.
    pub output: O,
    /// Director's overall reasoning, if given.
    pub rationale: Option<String>,
}

/// A parsed Director turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis<O> {
    /// The `final_decision` turn.
    pub turn: DebateTurn,
    /// Parsed result.
    pub output: O,
    /// Director's overall reasoning, if given.
    pub rationale: Option<String>,
}

/// Runs debates against a text oracle.
pub struct DebateEngine<C: TextOracle, T: TimeProvider = RealTimeProvider> {
    caller: OracleCaller<C>,
    clock: Arc<T>,
    synthesis_max_attempts: u32,
    agent_temperature: f64,
    director_temperature: f64,
}

impl<C: TextOracle> DebateEngine<C, RealTimeProvider> {
    /// Create an engine stamping turns with the system clock.
    #[must_use]
    pub fn new(oracle: Arc<C>, policy: &PipelinePolicy) -> Self {
        Self::with_clock(oracle, Arc::new(RealTimeProvider), policy)
    }
}

impl<C: TextOracle, T: TimeProvider> DebateEngine<C, T> {
    /// Create an engine with an explicit clock.
    #[must_use]
    pub fn with_clock(oracle: Arc<C>, clock: Arc<T>, policy: &PipelinePolicy) -> Self {
        Self {
            caller: OracleCaller::new(
                oracle,
                policy.max_transient_retries,
                policy.retry_delay_ms,
            ),
            clock,
            synthesis_max_attempts: policy.synthesis_max_attempts.max(1),
            agent_temperature: policy.agent_temperature,
            director_temperature: policy.director_temperature,
        }
    }

    /// Run all 13 turns.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::DebateSynthesis`] if no synthesis attempt parses
    /// - [`PipelineError::TransientExhausted`] / [`PipelineError::Oracle`] from any call
    pub async fn run<P: DebateTopic>(
        &self,
        topic: &P,
        panel: &Panel,
    ) -> Result<DebateOutcome<P::Output>, PipelineError> {
        let mut turns = self.debate(topic, panel).await?;
        let synthesis = self.synthesize(topic, panel, &turns, None).await?;
        turns.push(synthesis.turn);
        Ok(DebateOutcome {
            turns,
            output: synthesis.output,
            rationale: synthesis.rationale,
        })
    }

    /// Run the twelve persona turns of phases 1 to 3.
    ///
    /// # Errors
    ///
    /// [`PipelineError::TransientExhausted`] / [`PipelineError::Oracle`] from any call.
    pub async fn debate<P: DebateTopic>(
        &self,
        topic: &P,
        panel: &Panel,
    ) -> Result<Vec<DebateTurn>, PipelineError> {
        let round = topic.round();
        let subject = topic.subject();
        let mut turns: Vec<DebateTurn> = Vec::with_capacity(TURNS_PER_ROUND);

        for planned in turn_plan(panel) {
            let Some(persona) = planned.persona else {
                continue;
            };
            let label = format!("round{round}.turn{:02}", planned.turn_index);
            tracing::debug!(
                round,
                turn = planned.turn_index,
                speaker = %persona.name,
                turn_type = %planned.turn_type,
                "Debate turn"
            );

            let prompt = turn_prompt(
                &subject,
                &turns,
                &role_instruction(planned.turn_type, &planned.target),
                &topic.turn_instruction(planned.turn_type),
            );
            let request = OracleRequest::new(label, prompt)
                .with_system_prompt(&persona.system_prompt)
                .with_temperature(self.agent_temperature)
                .with_max_tokens(TURN_MAX_TOKENS);
            let content = self
                .caller
                .call(
                    request,
                    CallSite {
                        round,
                        artifact: topic.artifact(),
                    },
                )
                .await?;

            turns.push(DebateTurn {
                turn_index: planned.turn_index,
                phase: planned.phase,
                speaker: Speaker::Persona(persona.name.clone()),
                turn_type: planned.turn_type,
                target: planned.target,
                content,
                created_at: self.clock.now(),
            });
        }

        Ok(turns)
    }

    /// Produce the Director's turn for a transcript.
    ///
    /// `correction` names a defect the caller found in an earlier synthesis.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::DebateSynthesis`] if no attempt parses
    /// - [`PipelineError::TransientExhausted`] / [`PipelineError::Oracle`] from any call
    pub async fn synthesize<P: DebateTopic>(
        &self,
        topic: &P,
        panel: &Panel,
        transcript: &[DebateTurn],
        correction: Option<&str>,
    ) -> Result<Synthesis<P::Output>, PipelineError> {
        let round = topic.round();
        let site = CallSite {
            round,
            artifact: topic.artifact(),
        };
        let subject = topic.subject();
        let format = topic.synthesis_format();
        let mut feedback = correction.map(String::from);

        for attempt in 1..=self.synthesis_max_attempts {
            let request = OracleRequest::new(
                format!("round{round}.synthesis"),
                synthesis_prompt(&subject, transcript, &format, feedback.as_deref()),
            )
            .with_system_prompt(director_system_prompt())
            .with_temperature(self.director_temperature)
            .with_max_tokens(SYNTHESIS_MAX_TOKENS);

            let content = self.caller.call(request, site).await?;
            let parsed = extract_json(&content).and_then(|json| {
                topic
                    .parse_synthesis(&json)
                    .map(|output| (output, get_opt_str(&json, "reasoning")))
            });

            match parsed {
                Ok((output, rationale)) => {
                    tracing::info!(round, artifact = topic.artifact(), attempt, "Synthesis accepted");
                    return Ok(Synthesis {
                        turn: DebateTurn {
                            turn_index: SYNTHESIS_TURN_INDEX,
                            phase: SYNTHESIS_PHASE,
                            speaker: Speaker::Director,
                            turn_type: TurnType::FinalDecision,
                            target: panel.names(),
                            content,
                            created_at: self.clock.now(),
                        },
                        output,
                        rationale,
                    });
                }
                Err(e) => {
                    tracing::warn!(round, artifact = topic.artifact(), attempt, error = %e, "Synthesis rejected");
                    feedback = Some(e.to_string());
                }
            }
        }

        Err(PipelineError::DebateSynthesis {
            round,
            artifact: topic.artifact().to_string(),
            attempts: self.synthesis_max_attempts,
            reason: feedback.unwrap_or_default(),
        })
    }
}

impl<C: TextOracle, T: TimeProvider> std::fmt::Debug for DebateEngine<C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebateEngine")
            .field("caller", &self.caller)
            .field("synthesis_max_attempts", &self.synthesis_max_attempts)
            .field("agent_temperature", &self.agent_temperature)
            .field("director_temperature", &self.director_temperature)
            .finish_non_exhaustive()
    }
}
