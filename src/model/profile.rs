//! User profile and per-session settings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Minimum trimmed length of each free-text field.
pub const MIN_TEXT_LENGTH: usize = 10;

/// Allowed range for `maxCriteria`.
const CRITERIA_RANGE: std::ops::RangeInclusive<usize> = 3..=10;

/// Allowed range for `crThreshold`.
const CR_THRESHOLD_RANGE: std::ops::RangeInclusive<f64> = 0.05..=0.20;

/// Per-session decision settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    /// Number of criteria Round 1 must finalise.
    pub max_criteria: usize,
    /// Maximum acceptable AHP consistency ratio.
    pub cr_threshold: f64,
    /// Extra Round 2 debates allowed when the ratio is too high.
    pub cr_max_retries: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_criteria: 5,
            cr_threshold: 0.10,
            cr_max_retries: 3,
        }
    }
}

/// The user's self-description and the majors under consideration.
///
/// Deserialised from the input layer's JSON; call [`UserProfile::validate`]
/// (or construct through [`UserProfile::new`]) before any oracle call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// What the user enjoys.
    pub interests: String,
    /// What the user is good at.
    pub aptitudes: String,
    /// What the user cares about. The primary axis of persona disagreement.
    pub core_values: String,
    /// Candidate majors, in input order.
    pub candidate_options: Vec<String>,
    /// Decision settings.
    #[serde(default)]
    pub settings: SessionSettings,
}

impl UserProfile {
    /// Build and validate a profile. Options are trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] describing the first violated constraint.
    pub fn new(
        interests: impl Into<String>,
        aptitudes: impl Into<String>,
        core_values: impl Into<String>,
        candidate_options: Vec<String>,
        settings: SessionSettings,
    ) -> Result<Self, InputError> {
        let profile = Self {
            interests: interests.into(),
            aptitudes: aptitudes.into(),
            core_values: core_values.into(),
            candidate_options: candidate_options
                .into_iter()
                .map(|o| o.trim().to_string())
                .collect(),
            settings,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Check every field and setting constraint.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] describing the first violated constraint.
    pub fn validate(&self) -> Result<(), InputError> {
        for (field, text) in [
            ("interests", &self.interests),
            ("aptitudes", &self.aptitudes),
            ("core_values", &self.core_values),
        ] {
            let actual = text.trim().chars().count();
            if actual < MIN_TEXT_LENGTH {
                return Err(InputError::TooShort {
                    field: field.into(),
                    min: MIN_TEXT_LENGTH,
                    actual,
                });
            }
        }

        let mut seen = HashSet::new();
        for option in &self.candidate_options {
            let trimmed = option.trim();
            if trimmed.is_empty() || !seen.insert(trimmed.to_lowercase()) {
                return Err(InputError::InvalidOption {
                    option: option.clone(),
                });
            }
        }
        if seen.len() < 2 {
            return Err(InputError::TooFewOptions { actual: seen.len() });
        }

        let settings = &self.settings;
        if !CRITERIA_RANGE.contains(&settings.max_criteria) {
            return Err(InputError::OutOfRange {
                field: "maxCriteria".into(),
                reason: format!(
                    "{} not in [{}, {}]",
                    settings.max_criteria,
                    CRITERIA_RANGE.start(),
                    CRITERIA_RANGE.end()
                ),
            });
        }
        if !CR_THRESHOLD_RANGE.contains(&settings.cr_threshold) {
            return Err(InputError::OutOfRange {
                field: "crThreshold".into(),
                reason: format!(
                    "{} not in [{}, {}]",
                    settings.cr_threshold,
                    CR_THRESHOLD_RANGE.start(),
                    CR_THRESHOLD_RANGE.end()
                ),
            });
        }

        Ok(())
    }

    /// Candidate options, trimmed.
    #[must_use]
    pub fn options(&self) -> Vec<String> {
        self.candidate_options
            .iter()
            .map(|o| o.trim().to_string())
            .collect()
    }
}
