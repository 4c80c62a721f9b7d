//! Debate transcript types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved name of the synthesizer role.
pub const DIRECTOR_NAME: &str = "Director";

/// Who speaks a turn.
///
/// Serialised as the bare speaker name; `"Director"` is reserved for the
/// synthesizer role and can never be a persona name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Speaker {
    /// A persona, by name.
    Persona(String),
    /// The synthesizer that closes every debate.
    Director,
}

impl Speaker {
    /// Speaker name as shown in transcripts.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Persona(name) => name,
            Self::Director => DIRECTOR_NAME,
        }
    }

    /// Returns true for the Director.
    #[must_use]
    pub const fn is_director(&self) -> bool {
        matches!(self, Self::Director)
    }
}

impl From<String> for Speaker {
    fn from(name: String) -> Self {
        if name == DIRECTOR_NAME {
            Self::Director
        } else {
            Self::Persona(name)
        }
    }
}

impl From<Speaker> for String {
    fn from(speaker: Speaker) -> Self {
        match speaker {
            Speaker::Persona(name) => name,
            Speaker::Director => DIRECTOR_NAME.to_string(),
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Role of a turn within its phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnType {
    /// Phase leader states a position.
    Proposal,
    /// Another persona challenges the proposal.
    Critique,
    /// Phase leader answers both critiques.
    Defense,
    /// Director's structured synthesis.
    FinalDecision,
}

impl TurnType {
    /// Snake-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proposal => "proposal",
            Self::Critique => "critique",
            Self::Defense => "defense",
            Self::FinalDecision => "final_decision",
        }
    }
}

impl fmt::Display for TurnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a round's append-only transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateTurn {
    /// Position in the round, 1..=13.
    pub turn_index: u8,
    /// Phase, 1..=4.
    pub phase: u8,
    /// Who spoke.
    pub speaker: Speaker,
    /// Role of the turn.
    pub turn_type: TurnType,
    /// Speakers this turn responds to.
    pub target: Vec<String>,
    /// Oracle output.
    pub content: String,
    /// When the turn was recorded.
    pub created_at: DateTime<Utc>,
}
