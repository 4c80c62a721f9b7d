//! What a debate decides.

use serde_json::Value;

use crate::error::ParseError;
use crate::model::TurnType;

/// A decision topic the 13-turn protocol can run over.
///
/// The engine owns turn order, transcripts and retries; a topic supplies the
/// wording and turns the Director's JSON into its typed result.
pub trait DebateTopic: Send + Sync {
    /// Structured result of the Director's synthesis.
    type Output: Send;

    /// Round number this topic belongs to.
    fn round(&self) -> u8;

    /// Artifact name used in labels, logs and errors.
    fn artifact(&self) -> &'static str;

    /// Question under debate, shown at the top of every prompt.
    fn subject(&self) -> String;

    /// Topic-specific instruction for a persona turn.
    fn turn_instruction(&self, turn_type: TurnType) -> String;

    /// Output format the Director must follow.
    fn synthesis_format(&self) -> String;

    /// Parse the Director's JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if required fields are missing or malformed.
    fn parse_synthesis(&self, json: &Value) -> Result<Self::Output, ParseError>;
}
