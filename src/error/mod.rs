//! Error types for the major advisor.
//!
//! This module defines a hierarchical error system:
//! - [`AppError`]: Top-level application errors
//! - [`OracleError`]: Text-generation oracle failures (transport level)
//! - [`StorageError`]: Database operation errors
//! - [`PipelineError`]: Decision pipeline failures, carrying round context
//! - [`NumericError`]: AHP / TOPSIS input errors
//! - [`ParseError`]: Structured-output extraction failures
//! - [`InputError`]: User profile validation errors
//! - [`ConfigError`]: Configuration errors
//!
//! All errors implement `Send + Sync` for async compatibility.

use thiserror::Error;

use crate::workflow::Stage;

/// Top-level application error.
///
/// This is the main error type returned by the binary.
/// It wraps all subsystem errors for unified error handling.
#[derive(Debug, Error)]
pub enum AppError {
    /// Oracle error outside of a pipeline stage.
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Input error.
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Text-generation oracle errors.
///
/// These errors represent failures when requesting text from the oracle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Authentication failed due to invalid API key.
    #[error("Authentication failed: invalid API key")]
    AuthenticationFailed,

    /// Request was rate limited.
    #[error("Rate limited: retry after {retry_after_seconds}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_seconds: u64,
    },

    /// The requested model is overloaded.
    #[error("Model overloaded: {model}")]
    ModelOverloaded {
        /// The model that is overloaded.
        model: String,
    },

    /// Request timed out.
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Invalid request parameters.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what's invalid.
        message: String,
    },

    /// Network communication error.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error.
        message: String,
    },

    /// Unexpected response from the oracle.
    #[error("Unexpected response: {message}")]
    UnexpectedResponse {
        /// Description of what was unexpected.
        message: String,
    },
}

impl OracleError {
    /// Returns true if this error is transient and the call may be retried.
    ///
    /// Rate limiting, overload, timeouts and network errors are retryable.
    /// Authentication and invalid request errors are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::ModelOverloaded { .. }
                | Self::Timeout { .. }
                | Self::Network { .. }
        )
    }
}

/// Storage errors.
///
/// These errors represent failures in database operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Failed to connect to the database.
    #[error("Database connection failed: {message}")]
    ConnectionFailed {
        /// Description of the connection failure.
        message: String,
    },

    /// A database query failed.
    #[error("Query failed: {query} - {message}")]
    QueryFailed {
        /// The query that failed (may be truncated).
        query: String,
        /// Description of the failure.
        message: String,
    },

    /// An artifact for this round was already recorded.
    #[error("Artifact for round {round} of session {session_id} already recorded")]
    DuplicateArtifact {
        /// The owning session.
        session_id: String,
        /// The round number.
        round: u8,
    },

    /// Stored JSON could not be encoded or decoded.
    #[error("Serialization failed: {message}")]
    Serialization {
        /// Description of the failure.
        message: String,
    },

    /// Database migration failed.
    #[error("Migration failed: {version} - {message}")]
    MigrationFailed {
        /// The migration version that failed.
        version: String,
        /// Description of the failure.
        message: String,
    },

    /// Internal storage error.
    #[error("Internal storage error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

/// Numeric engine errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NumericError {
    /// Fewer than two criteria were supplied to AHP.
    #[error("Degenerate comparison matrix: need at least 2 criteria, got {size}")]
    DegenerateMatrix {
        /// Number of criteria supplied.
        size: usize,
    },

    /// The decision matrix has no options or no criteria.
    #[error("Empty decision matrix: {options} options x {criteria} criteria")]
    EmptyMatrix {
        /// Number of options.
        options: usize,
        /// Number of criteria.
        criteria: usize,
    },

    /// Input vectors do not line up with the matrix.
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which input is misaligned.
        what: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// A comparison names a criterion that is not part of the set.
    #[error("Unknown criterion: {name}")]
    UnknownCriterion {
        /// The unrecognised name.
        name: String,
    },

    /// A pair of criteria has no comparison.
    #[error("Missing comparison: {first} vs {second}")]
    MissingComparison {
        /// First criterion.
        first: String,
        /// Second criterion.
        second: String,
    },

    /// A pair of criteria was compared more than once, or with itself.
    #[error("Invalid comparison: {first} vs {second}")]
    InvalidComparison {
        /// First criterion.
        first: String,
        /// Second criterion.
        second: String,
    },

    /// A value lies outside the Saaty scale {1.0, 1.5, ..., 9.0}.
    #[error("Value {value} is not on the Saaty scale")]
    InvalidSaatyValue {
        /// The offending value.
        value: f64,
    },

    /// A decision matrix cell is missing.
    #[error("Missing score for {option} / {criterion}")]
    MissingCell {
        /// The option.
        option: String,
        /// The criterion.
        criterion: String,
    },
}

/// Errors extracting structured data from oracle text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parsing failed: {message}")]
    JsonParseFailed {
        /// Description of the parsing error.
        message: String,
    },

    /// Missing required field.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The missing field name.
        field: String,
    },

    /// Invalid value for a field.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// The field name.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },
}

/// User profile validation errors.
///
/// Raised before any oracle call is made.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    /// A free-text field is too short after trimming.
    #[error("{field} must be at least {min} characters, got {actual}")]
    TooShort {
        /// The field name.
        field: String,
        /// Minimum length.
        min: usize,
        /// Actual trimmed length.
        actual: usize,
    },

    /// Not enough distinct candidate options.
    #[error("At least 2 unique candidate options are required, got {actual}")]
    TooFewOptions {
        /// Number of options supplied.
        actual: usize,
    },

    /// A candidate option appears twice or is blank.
    #[error("Invalid candidate option: {option:?}")]
    InvalidOption {
        /// The offending option.
        option: String,
    },

    /// A setting is outside its allowed range.
    #[error("{field} out of range: {reason}")]
    OutOfRange {
        /// The setting name.
        field: String,
        /// Allowed range.
        reason: String,
    },

    /// The profile document could not be read.
    #[error("Malformed profile: {message}")]
    Malformed {
        /// Description of the problem.
        message: String,
    },
}

/// Decision pipeline errors.
///
/// Every variant that happens inside a round names the round
/// (0 = persona synthesis, 1..=4 = rounds) so that callers can resume from
/// the last stored checkpoint instead of restarting the session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// The user profile failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// Personas could not be produced.
    #[error("Persona generation failed after {attempts} attempts: {reason}")]
    PersonaGeneration {
        /// Attempts made.
        attempts: u32,
        /// Last defect found.
        reason: String,
    },

    /// The Director's synthesis could not be parsed.
    #[error("Round {round} synthesis of {artifact} failed after {attempts} attempts: {reason}")]
    DebateSynthesis {
        /// Round number.
        round: u8,
        /// Artifact being synthesised.
        artifact: String,
        /// Attempts made.
        attempts: u32,
        /// Last parse failure.
        reason: String,
    },

    /// Round 1 produced the wrong number of distinct criteria.
    #[error("Expected {expected} criteria, got {actual} after {attempts} attempts")]
    CriteriaCountMismatch {
        /// Required count.
        expected: usize,
        /// Distinct criteria produced.
        actual: usize,
        /// Attempts made.
        attempts: u32,
    },

    /// Round 3 left decision matrix cells empty.
    #[error("Decision matrix incomplete after {attempts} attempts, missing: {}", .missing.join(", "))]
    IncompleteMatrix {
        /// Missing cells as `option/criterion`.
        missing: Vec<String>,
        /// Attempts made.
        attempts: u32,
    },

    /// Transient oracle failures persisted past the retry budget.
    #[error("Round {round} {artifact}: oracle unavailable after {attempts} attempts: {message}")]
    TransientExhausted {
        /// Round number.
        round: u8,
        /// Artifact being produced.
        artifact: String,
        /// Attempts made.
        attempts: u32,
        /// Last transport error.
        message: String,
    },

    /// The oracle rejected the call outright.
    #[error("Round {round} {artifact}: oracle error: {message}")]
    Oracle {
        /// Round number.
        round: u8,
        /// Artifact being produced.
        artifact: String,
        /// The oracle's error.
        message: String,
    },

    /// Numeric evaluation failed.
    #[error("Round {round} numeric error: {source}")]
    Numeric {
        /// Round number.
        round: u8,
        /// Underlying error.
        #[source]
        source: NumericError,
    },

    /// A checkpoint could not be persisted or loaded.
    #[error("Round {round} storage error: {source}")]
    Storage {
        /// Round number.
        round: u8,
        /// Underlying error.
        #[source]
        source: StorageError,
    },

    /// A stage was requested out of order.
    #[error("Invalid stage transition: {from} -> {to}")]
    InvalidTransition {
        /// Current stage.
        from: Stage,
        /// Requested stage.
        to: Stage,
    },

    /// No stored session with this id.
    #[error("Session not found: {session_id}")]
    SessionNotFound {
        /// The missing session id.
        session_id: String,
    },
}

impl PipelineError {
    /// Round in which the error happened, if it is tied to one.
    #[must_use]
    pub const fn round(&self) -> Option<u8> {
        match self {
            Self::PersonaGeneration { .. } => Some(0),
            Self::CriteriaCountMismatch { .. } => Some(1),
            Self::IncompleteMatrix { .. } => Some(3),
            Self::DebateSynthesis { round, .. }
            | Self::TransientExhausted { round, .. }
            | Self::Oracle { round, .. }
            | Self::Numeric { round, .. }
            | Self::Storage { round, .. } => Some(*round),
            Self::InvalidInput(_) | Self::InvalidTransition { .. } | Self::SessionNotFound { .. } => {
                None
            }
        }
    }

    /// Returns true if the failure was transient transport trouble.
    ///
    /// Such sessions can be resumed later from their last checkpoint
    /// with a reasonable expectation of success.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TransientExhausted { .. })
    }

    /// Returns true if the session's last checkpoint is still a valid resume point.
    #[must_use]
    pub const fn is_resumable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidInput(_) | Self::InvalidTransition { .. } | Self::SessionNotFound { .. }
        )
    }
}

/// Configuration errors.
///
/// These errors represent failures in configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required configuration is missing.
    #[error("Missing required: {var}")]
    MissingRequired {
        /// The missing variable name.
        var: String,
    },

    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}
