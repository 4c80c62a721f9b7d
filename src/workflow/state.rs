//! Session state machine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifacts::{Round1Result, Round2Result, Round3Result, Round4Result};
use crate::debate::Panel;
use crate::error::PipelineError;
use crate::model::UserProfile;

/// Pipeline stage a session has completed.
///
/// ```text
/// Created -> PersonasReady -> Round1Done -> Round2Done -> Round3Done -> Round4Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Profile accepted, nothing generated yet.
    Created,
    /// Personas synthesized.
    PersonasReady,
    /// Criteria selected.
    Round1Done,
    /// Criteria weighted.
    Round2Done,
    /// Options scored.
    Round3Done,
    /// Options ranked. Terminal.
    Round4Done,
}

impl Stage {
    /// Snake-case label, as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::PersonasReady => "personas_ready",
            Self::Round1Done => "round1_done",
            Self::Round2Done => "round2_done",
            Self::Round3Done => "round3_done",
            Self::Round4Done => "round4_done",
        }
    }

    /// The only stage reachable from this one.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Created => Some(Self::PersonasReady),
            Self::PersonasReady => Some(Self::Round1Done),
            Self::Round1Done => Some(Self::Round2Done),
            Self::Round2Done => Some(Self::Round3Done),
            Self::Round3Done => Some(Self::Round4Done),
            Self::Round4Done => None,
        }
    }

    /// Round whose checkpoint produces this stage (0 = personas).
    #[must_use]
    pub const fn round(self) -> u8 {
        match self {
            Self::Created | Self::PersonasReady => 0,
            Self::Round1Done => 1,
            Self::Round2Done => 2,
            Self::Round3Done => 3,
            Self::Round4Done => 4,
        }
    }

    /// Returns true once the ranking exists.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Round4Done)
    }

    /// Returns true if `to` directly follows this stage.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        self.next() == Some(to)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Versioned snapshot of one session.
///
/// Each completed stage produces a new snapshot with `version` incremented;
/// the snapshot is stored together with that stage's artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Session identifier.
    pub id: String,
    /// Incremented on every stage transition.
    pub version: u64,
    /// Last completed stage.
    pub stage: Stage,
    /// Validated user input.
    pub profile: UserProfile,
    /// Personas in leader-rotation order.
    #[serde(default)]
    pub panel: Option<Panel>,
    /// Round 1 result.
    #[serde(default)]
    pub round1: Option<Round1Result>,
    /// Round 2 result.
    #[serde(default)]
    pub round2: Option<Round2Result>,
    /// Round 3 result.
    #[serde(default)]
    pub round3: Option<Round3Result>,
    /// Round 4 result.
    #[serde(default)]
    pub round4: Option<Round4Result>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last transition.
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    /// Fresh session in [`Stage::Created`].
    #[must_use]
    pub fn new(id: impl Into<String>, profile: UserProfile, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            version: 1,
            stage: Stage::Created,
            profile,
            panel: None,
            round1: None,
            round2: None,
            round3: None,
            round4: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to the next stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTransition`] unless `to` directly
    /// follows the current stage.
    pub fn advance(&mut self, to: Stage, now: DateTime<Utc>) -> Result<(), PipelineError> {
        self.ensure_can_enter(to)?;
        self.stage = to;
        self.version += 1;
        self.updated_at = now;
        Ok(())
    }

    /// Check that `to` may be entered from the current stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTransition`] otherwise.
    pub fn ensure_can_enter(&self, to: Stage) -> Result<(), PipelineError> {
        if self.stage.can_transition_to(to) {
            Ok(())
        } else {
            Err(PipelineError::InvalidTransition {
                from: self.stage,
                to,
            })
        }
    }

    /// The panel, required from [`Stage::PersonasReady`] on.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTransition`] if personas don't exist yet.
    pub fn require_panel(&self) -> Result<&Panel, PipelineError> {
        self.panel.as_ref().ok_or(PipelineError::InvalidTransition {
            from: self.stage,
            to: Stage::Round1Done,
        })
    }

    /// Round 1 result, required from Round 2 on.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTransition`] if Round 1 hasn't run.
    pub fn require_round1(&self) -> Result<&Round1Result, PipelineError> {
        self.round1.as_ref().ok_or(PipelineError::InvalidTransition {
            from: self.stage,
            to: Stage::Round2Done,
        })
    }

    /// Round 2 result, required from Round 3 on.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTransition`] if Round 2 hasn't run.
    pub fn require_round2(&self) -> Result<&Round2Result, PipelineError> {
        self.round2.as_ref().ok_or(PipelineError::InvalidTransition {
            from: self.stage,
            to: Stage::Round3Done,
        })
    }

    /// Round 3 result, required for Round 4.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTransition`] if Round 3 hasn't run.
    pub fn require_round3(&self) -> Result<&Round3Result, PipelineError> {
        self.round3.as_ref().ok_or(PipelineError::InvalidTransition {
            from: self.stage,
            to: Stage::Round4Done,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::SessionSettings;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn state() -> SessionState {
        let profile = UserProfile::new(
            "Robots and astronomy",
            "Maths and patience",
            "high pay, meaningful impact",
            vec!["Physics".into(), "Law".into()],
            SessionSettings::default(),
        )
        .unwrap();
        SessionState::new("s-1", profile, Utc::now())
    }

    #[test_case(Stage::Created, "\"created\"")]
    #[test_case(Stage::PersonasReady, "\"personas_ready\"")]
    #[test_case(Stage::Round2Done, "\"round2_done\"")]
    fn test_stage_serde_matches_display(stage: Stage, json: &str) {
        assert_eq!(serde_json::to_string(&stage).unwrap(), json);
        assert_eq!(format!("\"{stage}\""), json);
    }

    #[test]
    fn test_stage_chain_is_linear() {
        let mut stage = Stage::Created;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            stage = next;
            seen.push(stage);
        }
        assert_eq!(seen.len(), 6);
        assert!(stage.is_terminal());
        assert_eq!(stage.round(), 4);
    }

    #[test]
    fn test_advance_bumps_version() {
        let mut state = state();
        let later = state.created_at + chrono::Duration::seconds(5);
        state.advance(Stage::PersonasReady, later).unwrap();
        assert_eq!(state.stage, Stage::PersonasReady);
        assert_eq!(state.version, 2);
        assert_eq!(state.updated_at, later);
    }

    #[test]
    fn test_skipping_a_stage_is_rejected() {
        let mut state = state();
        let err = state.advance(Stage::Round2Done, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            PipelineError::InvalidTransition {
                from: Stage::Created,
                to: Stage::Round2Done
            }
        );
        assert_eq!(state.version, 1);
    }

    #[test]
    fn test_missing_results_reported() {
        let state = state();
        assert!(state.require_panel().is_err());
        assert!(state.require_round1().is_err());
        assert!(state.require_round3().is_err());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let state = state();
        let json = serde_json::to_string(&state).unwrap();
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
