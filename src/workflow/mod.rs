//! Session orchestration.
//!
//! [`WorkflowEngine`] drives a [`SessionState`] through
//! `Created -> PersonasReady -> Round1Done -> Round2Done -> Round3Done -> Round4Done`.
//! Every transition is a checkpoint: the round's artifact and the new
//! snapshot are handed to the [`SessionStore`] before the in-memory state
//! moves on, so an interrupted session resumes from its last completed round
//! without repeating earlier oracle calls.

mod artifacts;
mod consistency;
pub mod report;
mod state;

pub use artifacts::{
    CriterionWeight, Round1Result, Round2Result, Round3Result, Round4Result, RoundArtifact,
    ARTIFACT_NAMES,
};
pub use consistency::{decide, ConsistencyDecision, ConsistencyStatus};
pub use report::{build_report, render_markdown, FinalReport, Recommendation, WeightShare};
pub use state::{SessionState, Stage};

use std::sync::Arc;

use serde::Serialize;

use crate::config::PipelinePolicy;
use crate::debate::{
    CriteriaTopic, DebateEngine, Panel, PairwiseRetryContext, PairwiseTopic, ScoringTopic,
};
use crate::error::{PipelineError, StorageError};
use crate::model::{missing_cells, DecisionMatrix, UserProfile};
use crate::numeric::{ahp, topsis};
use crate::persona::PersonaSynthesizer;
use crate::traits::{RealTimeProvider, SessionStore, TextOracle, TimeProvider};

/// Drives sessions from profile to ranking.
pub struct WorkflowEngine<C: TextOracle, S: SessionStore, T: TimeProvider = RealTimeProvider> {
    store: Arc<S>,
    clock: Arc<T>,
    personas: PersonaSynthesizer<C>,
    debate: DebateEngine<C, T>,
}

impl<C: TextOracle, S: SessionStore> WorkflowEngine<C, S, RealTimeProvider> {
    /// Create an engine using the system clock.
    #[must_use]
    pub fn new(oracle: Arc<C>, store: Arc<S>, policy: PipelinePolicy) -> Self {
        Self::with_clock(oracle, store, Arc::new(RealTimeProvider), policy)
    }
}

impl<C: TextOracle, S: SessionStore, T: TimeProvider> WorkflowEngine<C, S, T> {
    /// Create an engine with an explicit clock.
    #[must_use]
    pub fn with_clock(
        oracle: Arc<C>,
        store: Arc<S>,
        clock: Arc<T>,
        policy: PipelinePolicy,
    ) -> Self {
        Self {
            store,
            personas: PersonaSynthesizer::new(Arc::clone(&oracle), &policy),
            debate: DebateEngine::with_clock(oracle, Arc::clone(&clock), &policy),
            clock,
        }
    }

    /// Validate the profile and store a new session.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InvalidInput`] before anything is stored
    /// - [`PipelineError::Storage`] if the session can't be saved
    pub async fn start(&self, profile: UserProfile) -> Result<SessionState, PipelineError> {
        profile.validate()?;
        let state = SessionState::new(uuid::Uuid::new_v4().to_string(), profile, self.clock.now());
        self.store
            .save_session(&state)
            .await
            .map_err(|source| PipelineError::Storage { round: 0, source })?;
        tracing::info!(
            session_id = %state.id,
            options = state.profile.candidate_options.len(),
            "Session created"
        );
        Ok(state)
    }

    /// Run a new session to completion.
    ///
    /// # Errors
    ///
    /// Any [`PipelineError`]; the session stays stored at its last checkpoint.
    pub async fn run(&self, profile: UserProfile) -> Result<SessionState, PipelineError> {
        let mut state = self.start(profile).await?;
        self.run_to_completion(&mut state).await?;
        Ok(state)
    }

    /// Reload a stored session and finish it.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::SessionNotFound`] for an unknown id
    /// - any error of the remaining stages
    pub async fn resume(&self, session_id: &str) -> Result<SessionState, PipelineError> {
        let mut state = self
            .store
            .load_session(session_id)
            .await
            .map_err(|source| PipelineError::Storage { round: 0, source })?
            .ok_or_else(|| PipelineError::SessionNotFound {
                session_id: session_id.to_string(),
            })?;
        tracing::info!(session_id, stage = %state.stage, "Resuming session");
        self.run_to_completion(&mut state).await?;
        Ok(state)
    }

    /// Run every remaining stage in order.
    ///
    /// # Errors
    ///
    /// The first stage error.
    pub async fn run_to_completion(&self, state: &mut SessionState) -> Result<(), PipelineError> {
        loop {
            match state.stage {
                Stage::Created => self.generate_personas(state).await?,
                Stage::PersonasReady => self.run_round1(state).await?,
                Stage::Round1Done => self.run_round2(state).await?,
                Stage::Round2Done => self.run_round3(state).await?,
                Stage::Round3Done => self.run_round4(state).await?,
                Stage::Round4Done => return Ok(()),
            }
        }
    }

    /// Synthesize the panel.
    ///
    /// # Errors
    ///
    /// [`PipelineError::PersonaGeneration`], oracle or storage errors.
    pub async fn generate_personas(&self, state: &mut SessionState) -> Result<(), PipelineError> {
        state.ensure_can_enter(Stage::PersonasReady)?;
        let personas = self.personas.synthesize(&state.profile).await?;
        let panel = Panel::try_from(personas).map_err(|e| PipelineError::PersonaGeneration {
            attempts: 1,
            reason: e.to_string(),
        })?;
        self.checkpoint(state, Stage::PersonasReady, &panel, |s| s.panel = Some(panel.clone()))
            .await
    }

    /// Round 1: debate and select exactly `maxCriteria` criteria.
    ///
    /// # Errors
    ///
    /// [`PipelineError::CriteriaCountMismatch`] after one corrective synthesis,
    /// plus debate and storage errors.
    pub async fn run_round1(&self, state: &mut SessionState) -> Result<(), PipelineError> {
        state.ensure_can_enter(Stage::Round1Done)?;
        let panel = state.require_panel()?;
        let expected = state.profile.settings.max_criteria;
        let topic =
            CriteriaTopic::new(state.profile.options(), expected).with_panel(panel.names());

        let mut turns = self.debate.debate(&topic, panel).await?;
        let mut synthesis = self.debate.synthesize(&topic, panel, &turns, None).await?;
        let mut corrective_retries = 0;

        if synthesis.output.criteria.len() != expected {
            let correction = format!(
                "select exactly {expected} distinct criteria; you selected {}",
                synthesis.output.criteria.len()
            );
            tracing::warn!(session_id = %state.id, %correction, "Criteria count mismatch");
            corrective_retries = 1;
            synthesis = self
                .debate
                .synthesize(&topic, panel, &turns, Some(&correction))
                .await?;
            let actual = synthesis.output.criteria.len();
            if actual != expected {
                return Err(PipelineError::CriteriaCountMismatch {
                    expected,
                    actual,
                    attempts: 2,
                });
            }
        }

        turns.push(synthesis.turn);
        let result = Round1Result {
            turns,
            criteria: synthesis.output.criteria,
            summary: synthesis.output.summary,
            rationale: synthesis.rationale,
            corrective_retries,
        };
        self.checkpoint(state, Stage::Round1Done, &result, |s| s.round1 = Some(result.clone()))
            .await
    }

    /// Round 2: compare criteria pairwise and weight them with AHP.
    ///
    /// Re-runs the debate while the consistency ratio exceeds the session's
    /// threshold, up to `crMaxRetries` times, then keeps the most consistent
    /// attempt.
    ///
    /// # Errors
    ///
    /// Debate, numeric and storage errors. A high ratio is never an error.
    pub async fn run_round2(&self, state: &mut SessionState) -> Result<(), PipelineError> {
        state.ensure_can_enter(Stage::Round2Done)?;
        let panel = state.require_panel()?;
        let round1 = state.require_round1()?;
        let names = round1.criterion_names();
        let settings = state.profile.settings;

        let mut attempts = Vec::new();
        let mut history: Vec<f64> = Vec::new();
        let mut retry: Option<PairwiseRetryContext> = None;

        let (index, status) = loop {
            let mut topic = PairwiseTopic::new(round1.criteria.clone());
            if let Some(context) = retry.take() {
                topic = topic.with_retry(context);
            }
            let outcome = self.debate.run(&topic, panel).await?;
            let ahp = ahp::analyze(&names, &outcome.output)
                .map_err(|source| PipelineError::Numeric { round: 2, source })?;
            tracing::info!(
                session_id = %state.id,
                attempt = history.len() + 1,
                consistency_ratio = ahp.consistency_ratio,
                "Pairwise attempt evaluated"
            );
            history.push(ahp.consistency_ratio);

            match decide(&history, settings.cr_threshold, settings.cr_max_retries) {
                ConsistencyDecision::Accept { index, status } => {
                    attempts.push((outcome, ahp));
                    break (index, status);
                }
                ConsistencyDecision::Retry => {
                    retry = Some(PairwiseRetryContext {
                        comparisons: outcome.output.clone(),
                        consistency_ratio: ahp.consistency_ratio,
                        threshold: settings.cr_threshold,
                    });
                    attempts.push((outcome, ahp));
                }
            }
        };

        if status == ConsistencyStatus::FailedButUsed {
            tracing::warn!(
                session_id = %state.id,
                consistency_ratio = history.get(index).copied().unwrap_or_default(),
                threshold = settings.cr_threshold,
                "Consistency threshold not met; using most consistent attempt"
            );
        }

        let retry_count = u32::try_from(history.len().saturating_sub(1)).unwrap_or(u32::MAX);
        let (outcome, ahp) = attempts.swap_remove(index);
        let result = Round2Result {
            turns: outcome.turns,
            comparisons: outcome.output,
            weights: names
                .iter()
                .zip(&ahp.weights)
                .map(|(criterion, &weight)| CriterionWeight {
                    criterion: criterion.clone(),
                    weight,
                })
                .collect(),
            consistency_ratio: ahp.consistency_ratio,
            consistency_index: ahp.consistency_index,
            eigenvalue_max: ahp.eigenvalue_max,
            retry_count,
            attempt_history: history,
            consistency_status: status,
            rationale: outcome.rationale,
        };
        self.checkpoint(state, Stage::Round2Done, &result, |s| s.round2 = Some(result.clone()))
            .await
    }

    /// Round 3: score every option on every criterion.
    ///
    /// # Errors
    ///
    /// [`PipelineError::IncompleteMatrix`] after one corrective synthesis,
    /// plus debate and storage errors.
    pub async fn run_round3(&self, state: &mut SessionState) -> Result<(), PipelineError> {
        state.ensure_can_enter(Stage::Round3Done)?;
        let panel = state.require_panel()?;
        let round1 = state.require_round1()?;
        let options = state.profile.options();
        let names = round1.criterion_names();
        let topic = ScoringTopic::new(options.clone(), round1.criteria.clone());

        let mut turns = self.debate.debate(&topic, panel).await?;
        let mut synthesis = self.debate.synthesize(&topic, panel, &turns, None).await?;
        let mut corrective_retries = 0;

        let missing = missing_cells(&synthesis.output, &options, &names);
        if !missing.is_empty() {
            let correction = format!("score these missing cells too: {}", missing.join(", "));
            tracing::warn!(session_id = %state.id, missing = missing.len(), "Decision matrix incomplete");
            corrective_retries = 1;
            synthesis = self
                .debate
                .synthesize(&topic, panel, &turns, Some(&correction))
                .await?;
            let missing = missing_cells(&synthesis.output, &options, &names);
            if !missing.is_empty() {
                return Err(PipelineError::IncompleteMatrix {
                    missing,
                    attempts: 2,
                });
            }
        }

        let decision_matrix = DecisionMatrix::from_sheet(&options, &names, &synthesis.output)
            .map_err(|source| PipelineError::Numeric { round: 3, source })?;
        turns.push(synthesis.turn);
        let result = Round3Result {
            turns,
            decision_matrix,
            rationale: synthesis.rationale,
            corrective_retries,
        };
        self.checkpoint(state, Stage::Round3Done, &result, |s| s.round3 = Some(result.clone()))
            .await
    }

    /// Round 4: rank the options with TOPSIS. No oracle calls.
    ///
    /// # Errors
    ///
    /// Numeric and storage errors.
    pub async fn run_round4(&self, state: &mut SessionState) -> Result<(), PipelineError> {
        state.ensure_can_enter(Stage::Round4Done)?;
        let round1 = state.require_round1()?;
        let round2 = state.require_round2()?;
        let round3 = state.require_round3()?;

        let types: Vec<_> = round1.criteria.iter().map(|c| c.criterion_type).collect();
        let topsis = topsis::rank(&round3.decision_matrix, &round2.weight_values(), &types)
            .map_err(|source| PipelineError::Numeric { round: 4, source })?;
        let result = Round4Result {
            final_ranking: topsis.final_ranking(),
            topsis,
        };
        self.checkpoint(state, Stage::Round4Done, &result, |s| s.round4 = Some(result.clone()))
            .await
    }

    /// Persist `payload` and the advanced snapshot, then commit in memory.
    async fn checkpoint<P: Serialize + Sync>(
        &self,
        state: &mut SessionState,
        to: Stage,
        payload: &P,
        apply: impl FnOnce(&mut SessionState) + Send,
    ) -> Result<(), PipelineError> {
        let round = to.round();
        let now = self.clock.now();
        let storage = |source: StorageError| PipelineError::Storage { round, source };

        let mut next = state.clone();
        apply(&mut next);
        next.advance(to, now)?;
        let artifact = RoundArtifact::new(&next.id, round, payload, now).map_err(storage)?;
        self.store
            .save_checkpoint(&next, &artifact)
            .await
            .map_err(storage)?;

        tracing::info!(
            session_id = %next.id,
            stage = %to,
            version = next.version,
            "Checkpoint stored"
        );
        *state = next;
        Ok(())
    }
}

impl<C: TextOracle, S: SessionStore, T: TimeProvider> std::fmt::Debug for WorkflowEngine<C, S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("personas", &self.personas)
            .field("debate", &self.debate)
            .finish_non_exhaustive()
    }
}
