//! Configuration validation.
//!
//! Range checks for every configurable value.

use super::Config;
use crate::error::ConfigError;

/// Minimum allowed timeout in milliseconds (1 second).
pub const MIN_TIMEOUT_MS: u64 = 1000;

/// Maximum allowed timeout in milliseconds (5 minutes).
pub const MAX_TIMEOUT_MS: u64 = 300_000;

/// Maximum allowed retry count.
pub const MAX_RETRIES: u32 = 10;

/// Maximum allowed initial backoff (1 minute).
pub const MAX_RETRY_DELAY_MS: u64 = 60_000;

/// Maximum allowed synthesis or persona attempt bound.
pub const MAX_ATTEMPTS: u32 = 10;

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] naming the first variable out of range.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.api_key.is_blank() {
        return Err(invalid("ANTHROPIC_API_KEY", "must not be empty".into()));
    }

    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&config.request_timeout_ms) {
        return Err(invalid(
            "REQUEST_TIMEOUT_MS",
            format!("must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS} ms"),
        ));
    }

    if config.max_retries > MAX_RETRIES {
        return Err(invalid(
            "MAX_RETRIES",
            format!("must be between 0 and {MAX_RETRIES}"),
        ));
    }

    if config.retry_delay_ms > MAX_RETRY_DELAY_MS {
        return Err(invalid(
            "RETRY_DELAY_MS",
            format!("must be between 0 and {MAX_RETRY_DELAY_MS} ms"),
        ));
    }

    for (var, attempts) in [
        ("SYNTHESIS_MAX_ATTEMPTS", config.synthesis_max_attempts),
        ("PERSONA_MAX_ATTEMPTS", config.persona_max_attempts),
    ] {
        if !(1..=MAX_ATTEMPTS).contains(&attempts) {
            return Err(invalid(var, format!("must be between 1 and {MAX_ATTEMPTS}")));
        }
    }

    for (var, temperature) in [
        ("AGENT_TEMPERATURE", config.agent_temperature),
        ("DIRECTOR_TEMPERATURE", config.director_temperature),
    ] {
        if !(0.0..=1.0).contains(&temperature) {
            return Err(invalid(var, "must be between 0.0 and 1.0".into()));
        }
    }

    Ok(())
}

fn invalid(var: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.into(),
        reason,
    }
}
