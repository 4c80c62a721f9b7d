//! Evaluator personas.

use serde::{Deserialize, Serialize};

/// One of the three contrasting evaluators taking part in every debate.
///
/// Created once per session by the persona synthesizer and read-only
/// afterwards. `name` is the persona's identity for the whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Unique, session-stable name.
    pub name: String,
    /// Short label for the viewpoint.
    pub perspective: String,
    /// Who this persona is.
    pub description: String,
    /// Ordered strengths the persona brings.
    pub strengths: Vec<String>,
    /// Debate position statement.
    pub stance: String,
    /// Phrase from the user's core values this persona champions.
    pub value_anchor: String,
    /// Persistent oracle system context.
    pub system_prompt: String,
}

impl Persona {
    /// Case-insensitive name comparison.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}
