//! The fixed 13-turn debate plan.
//!
//! Phases 1 to 3 are led by each persona once, in panel order:
//!
//! ```text
//! phase k: proposal (leader) -> critique (next) -> critique (next+1) -> defense (leader)
//! phase 4: final_decision (Director)
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::model::{Persona, Speaker, TurnType, DIRECTOR_NAME};

/// Personas per panel.
pub const PANEL_SIZE: usize = 3;

/// Turns in every debate round.
pub const TURNS_PER_ROUND: usize = 13;

/// Phase of the Director's synthesis turn.
pub const SYNTHESIS_PHASE: u8 = 4;

/// Index of the Director's synthesis turn.
pub const SYNTHESIS_TURN_INDEX: u8 = 13;

/// The three personas in leader-rotation order.
///
/// Fixed when personas are synthesized and reused by every round of the
/// session, so persona `i` always leads phase `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Persona>", into = "Vec<Persona>")]
pub struct Panel([Persona; PANEL_SIZE]);

impl Panel {
    /// Personas in rotation order.
    #[must_use]
    pub fn personas(&self) -> &[Persona] {
        &self.0
    }

    /// Persona names in rotation order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|p| p.name.clone()).collect()
    }

    /// Leader of a persona phase (1..=3).
    #[must_use]
    pub fn leader(&self, phase: u8) -> Option<&Persona> {
        usize::from(phase)
            .checked_sub(1)
            .and_then(|i| self.0.get(i))
    }
}

impl TryFrom<Vec<Persona>> for Panel {
    type Error = ParseError;

    fn try_from(personas: Vec<Persona>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();
        for persona in &personas {
            if persona.name.eq_ignore_ascii_case(DIRECTOR_NAME)
                || !seen.insert(persona.name.to_lowercase())
            {
                return Err(ParseError::InvalidValue {
                    field: "personas".into(),
                    reason: format!("persona name '{}' is reserved or repeated", persona.name),
                });
            }
        }
        let count = personas.len();
        let array: [Persona; PANEL_SIZE] =
            personas
                .try_into()
                .map_err(|_| ParseError::InvalidValue {
                    field: "personas".into(),
                    reason: format!("expected {PANEL_SIZE} personas, got {count}"),
                })?;
        Ok(Self(array))
    }
}

impl From<Panel> for Vec<Persona> {
    fn from(panel: Panel) -> Self {
        panel.0.into()
    }
}

/// One slot of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTurn<'a> {
    /// Position in the round, 1..=13.
    pub turn_index: u8,
    /// Phase, 1..=4.
    pub phase: u8,
    /// Role of the turn.
    pub turn_type: TurnType,
    /// Speaking persona; `None` for the Director.
    pub persona: Option<&'a Persona>,
    /// Names this turn responds to.
    pub target: Vec<String>,
}

impl PlannedTurn<'_> {
    /// Who speaks.
    #[must_use]
    pub fn speaker(&self) -> Speaker {
        self.persona
            .map_or(Speaker::Director, |p| Speaker::Persona(p.name.clone()))
    }
}

/// Build the 13-turn plan for a panel.
#[must_use]
pub fn turn_plan(panel: &Panel) -> Vec<PlannedTurn<'_>> {
    let personas = panel.personas();
    let mut plan = Vec::with_capacity(TURNS_PER_ROUND);
    let mut index = 0_u8;
    let mut phase = 0_u8;

    for (offset, leader) in personas.iter().enumerate() {
        phase += 1;
        let first = &personas[(offset + 1) % PANEL_SIZE];
        let second = &personas[(offset + 2) % PANEL_SIZE];
        let slots = [
            (TurnType::Proposal, leader, Vec::new()),
            (TurnType::Critique, first, vec![leader.name.clone()]),
            (TurnType::Critique, second, vec![leader.name.clone()]),
            (
                TurnType::Defense,
                leader,
                vec![first.name.clone(), second.name.clone()],
            ),
        ];
        for (turn_type, speaker, target) in slots {
            index += 1;
            plan.push(PlannedTurn {
                turn_index: index,
                phase,
                turn_type,
                persona: Some(speaker),
                target,
            });
        }
    }

    plan.push(PlannedTurn {
        turn_index: SYNTHESIS_TURN_INDEX,
        phase: SYNTHESIS_PHASE,
        turn_type: TurnType::FinalDecision,
        persona: None,
        target: panel.names(),
    });
    plan
}
