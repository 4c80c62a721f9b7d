//! Per-round results and the stored artifact envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::consistency::ConsistencyStatus;
use crate::error::StorageError;
use crate::model::{Criterion, DebateTurn, DecisionMatrix, PairwiseComparison};
use crate::numeric::{RankedOption, TopsisResult};

/// Artifact name of each round, indexed by round number.
pub const ARTIFACT_NAMES: [&str; 5] = [
    "personas",
    "selected_criteria",
    "comparison_matrix",
    "decision_matrix",
    "final_ranking",
];

/// Round 1: criteria selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round1Result {
    /// The 13 turns.
    pub turns: Vec<DebateTurn>,
    /// Exactly `maxCriteria` distinct criteria.
    pub criteria: Vec<Criterion>,
    /// How the panel converged.
    #[serde(default)]
    pub summary: Option<String>,
    /// Director's reasoning.
    #[serde(default)]
    pub rationale: Option<String>,
    /// Corrective syntheses requested (0 or 1).
    pub corrective_retries: u32,
}

impl Round1Result {
    /// Criterion names in order.
    #[must_use]
    pub fn criterion_names(&self) -> Vec<String> {
        self.criteria.iter().map(|c| c.name.clone()).collect()
    }
}

/// A criterion's AHP weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionWeight {
    /// Criterion name.
    pub criterion: String,
    /// Weight in [0, 1].
    pub weight: f64,
}

/// Round 2: weighted criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round2Result {
    /// Turns of the accepted attempt.
    pub turns: Vec<DebateTurn>,
    /// One comparison per criteria pair.
    pub comparisons: Vec<PairwiseComparison>,
    /// Weights in criterion order, summing to 1.
    pub weights: Vec<CriterionWeight>,
    /// Consistency ratio of the accepted attempt.
    pub consistency_ratio: f64,
    /// Consistency index of the accepted attempt.
    pub consistency_index: f64,
    /// Principal eigenvalue of the accepted attempt.
    pub eigenvalue_max: f64,
    /// Debates re-run because the ratio was too high.
    pub retry_count: u32,
    /// Ratio of every attempt, oldest first.
    pub attempt_history: Vec<f64>,
    /// Whether the accepted ratio met the threshold.
    pub consistency_status: ConsistencyStatus,
    /// Director's reasoning for the accepted attempt.
    #[serde(default)]
    pub rationale: Option<String>,
}

impl Round2Result {
    /// Weight values in criterion order.
    #[must_use]
    pub fn weight_values(&self) -> Vec<f64> {
        self.weights.iter().map(|w| w.weight).collect()
    }
}

/// Round 3: decision matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round3Result {
    /// The 13 turns.
    pub turns: Vec<DebateTurn>,
    /// Complete options x criteria scores.
    pub decision_matrix: DecisionMatrix,
    /// Director's reasoning.
    #[serde(default)]
    pub rationale: Option<String>,
    /// Corrective syntheses requested (0 or 1).
    pub corrective_retries: u32,
}

/// Round 4: TOPSIS ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round4Result {
    /// Full TOPSIS figures.
    pub topsis: TopsisResult,
    /// Rank, option and closeness.
    pub final_ranking: Vec<RankedOption>,
}

/// Append-once record of one completed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundArtifact {
    /// Owning session.
    pub session_id: String,
    /// Round number, 0 = personas.
    pub round: u8,
    /// Artifact name.
    pub artifact: String,
    /// Round result as JSON.
    pub payload: Value,
    /// When the round completed.
    pub created_at: DateTime<Utc>,
}

impl RoundArtifact {
    /// Wrap a round result.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if the payload can't be encoded.
    pub fn new<T: Serialize>(
        session_id: impl Into<String>,
        round: u8,
        payload: &T,
        created_at: DateTime<Utc>,
    ) -> Result<Self, StorageError> {
        let payload = serde_json::to_value(payload).map_err(|e| StorageError::Serialization {
            message: e.to_string(),
        })?;
        Ok(Self {
            session_id: session_id.into(),
            round,
            artifact: ARTIFACT_NAMES
                .get(usize::from(round))
                .copied()
                .unwrap_or("unknown")
                .to_string(),
            payload,
            created_at,
        })
    }
}
