//! Shared types for the traits module.
//!
//! - [`OracleRequest`]: a single text-generation request

/// A single request to the text-generation oracle.
///
/// The `label` names the call site (for example `round2.turn05` or
/// `personas`). It is used in log fields and lets deterministic test
/// oracles script responses per call.
#[derive(Debug, Clone, PartialEq)]
// Cannot derive Eq: f64 temperature field does not implement Eq (IEEE 754 NaN != NaN)
#[allow(clippy::derive_partial_eq_without_eq)]
pub struct OracleRequest {
    /// Call-site label.
    pub label: String,
    /// User prompt.
    pub prompt: String,
    /// Persistent system context for the speaker.
    pub system_prompt: Option<String>,
    /// Sampling temperature (0.0 to 1.0).
    pub temperature: Option<f64>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
}

impl OracleRequest {
    /// Create a request with only a label and prompt.
    #[must_use]
    pub fn new(label: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prompt: prompt.into(),
            system_prompt: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}
