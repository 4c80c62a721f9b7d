//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading (with `.env` support)
//! - Configuration validation
//! - Projection of the pipeline knobs into a [`PipelinePolicy`]
//! - Secure API key storage via [`SecretString`]
//!
//! # Example
//!
//! ```
//! use major_advisor::config::{Config, SecretString, DEFAULT_MODEL};
//!
//! let config = Config {
//!     api_key: SecretString::new("sk-ant-example-key"),
//!     ..Config::with_api_key("unused")
//! };
//!
//! assert_eq!(config.model, DEFAULT_MODEL);
//! let debug = format!("{config:?}");
//! assert!(debug.contains("<REDACTED>"));
//! assert!(!debug.contains("sk-ant-example-key"));
//! ```

mod policy;
mod secret;
mod validation;

pub use policy::PipelinePolicy;
pub use secret::SecretString;
pub use validation::{
    validate_config, MAX_ATTEMPTS, MAX_RETRIES, MAX_RETRY_DELAY_MS, MAX_TIMEOUT_MS, MIN_TIMEOUT_MS,
};

use crate::error::ConfigError;

/// Default database path.
pub const DEFAULT_DATABASE_PATH: &str = "./data/advisor.db";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default per-call oracle timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 60_000;

/// Default transient retry count per oracle call.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default initial backoff in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Default number of Director synthesis attempts per round.
pub const DEFAULT_SYNTHESIS_MAX_ATTEMPTS: u32 = 3;

/// Default number of persona synthesis attempts.
pub const DEFAULT_PERSONA_MAX_ATTEMPTS: u32 = 3;

/// Default sampling temperature for persona turns.
pub const DEFAULT_AGENT_TEMPERATURE: f64 = 0.5;

/// Default sampling temperature for Director synthesis.
pub const DEFAULT_DIRECTOR_TEMPERATURE: f64 = 0.0;

/// Default Anthropic model.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Application configuration.
///
/// Use [`Config::from_env`] to load configuration from environment variables.
/// The `api_key` field uses [`SecretString`] to prevent accidental logging.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Anthropic API key (protected from logging via [`SecretString`]).
    pub api_key: SecretString,
    /// Anthropic model to use.
    pub model: String,
    /// Database path.
    pub database_path: String,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
    /// Per-call oracle timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Transient retries per oracle call.
    pub max_retries: u32,
    /// Initial retry backoff in milliseconds, doubled per retry.
    pub retry_delay_ms: u64,
    /// Director synthesis attempts per round.
    pub synthesis_max_attempts: u32,
    /// Persona synthesis attempts.
    pub persona_max_attempts: u32,
    /// Sampling temperature for persona turns.
    pub agent_temperature: f64,
    /// Sampling temperature for Director synthesis.
    pub director_temperature: f64,
}

impl Config {
    /// Configuration with every optional value at its default.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key),
            model: DEFAULT_MODEL.into(),
            database_path: DEFAULT_DATABASE_PATH.into(),
            log_level: DEFAULT_LOG_LEVEL.into(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            synthesis_max_attempts: DEFAULT_SYNTHESIS_MAX_ATTEMPTS,
            persona_max_attempts: DEFAULT_PERSONA_MAX_ATTEMPTS,
            agent_temperature: DEFAULT_AGENT_TEMPERATURE,
            director_temperature: DEFAULT_DIRECTOR_TEMPERATURE,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `ANTHROPIC_API_KEY`: Anthropic API key
    ///
    /// Optional environment variables (with defaults):
    /// - `ANTHROPIC_MODEL` (`claude-sonnet-4-20250514`)
    /// - `DATABASE_PATH` (`./data/advisor.db`)
    /// - `LOG_LEVEL` (`info`)
    /// - `REQUEST_TIMEOUT_MS` (`60000`)
    /// - `MAX_RETRIES` (`3`)
    /// - `RETRY_DELAY_MS` (`1000`)
    /// - `SYNTHESIS_MAX_ATTEMPTS` (`3`)
    /// - `PERSONA_MAX_ATTEMPTS` (`3`)
    /// - `AGENT_TEMPERATURE` (`0.5`)
    /// - `DIRECTOR_TEMPERATURE` (`0.0`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the API key is missing, a number fails to
    /// parse, or any value fails validation (see [`validate_config`]).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let api_key =
            std::env::var("ANTHROPIC_API_KEY").map_err(|_| ConfigError::MissingRequired {
                var: "ANTHROPIC_API_KEY".into(),
            })?;

        let mut config = Self::with_api_key(api_key);
        if let Ok(model) = std::env::var("ANTHROPIC_MODEL") {
            config.model = model;
        }
        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database_path = path;
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }
        config.request_timeout_ms = parse_env_u64("REQUEST_TIMEOUT_MS", config.request_timeout_ms)?;
        config.max_retries = parse_env_u32("MAX_RETRIES", config.max_retries)?;
        config.retry_delay_ms = parse_env_u64("RETRY_DELAY_MS", config.retry_delay_ms)?;
        config.synthesis_max_attempts =
            parse_env_u32("SYNTHESIS_MAX_ATTEMPTS", config.synthesis_max_attempts)?;
        config.persona_max_attempts =
            parse_env_u32("PERSONA_MAX_ATTEMPTS", config.persona_max_attempts)?;
        config.agent_temperature = parse_env_f64("AGENT_TEMPERATURE", config.agent_temperature)?;
        config.director_temperature =
            parse_env_f64("DIRECTOR_TEMPERATURE", config.director_temperature)?;

        validate_config(&config)?;
        Ok(config)
    }

    /// The non-secret knobs the pipeline runs with.
    #[must_use]
    pub const fn pipeline_policy(&self) -> PipelinePolicy {
        PipelinePolicy {
            max_transient_retries: self.max_retries,
            retry_delay_ms: self.retry_delay_ms,
            synthesis_max_attempts: self.synthesis_max_attempts,
            persona_max_attempts: self.persona_max_attempts,
            agent_temperature: self.agent_temperature,
            director_temperature: self.director_temperature,
        }
    }
}

/// Parse an environment variable as u64, using a default if not set.
fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

/// Parse an environment variable as u32, using a default if not set.
fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

/// Parse an environment variable as f64, using a default if not set.
fn parse_env_f64(name: &str, default: f64) -> Result<f64, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a number".into(),
        })
    })
}
