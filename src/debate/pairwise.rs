//! Round 2: pairwise comparison of criteria.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DebateTopic;
use crate::error::ParseError;
use crate::model::{Criterion, PairwiseComparison, TurnType};
use crate::parsing::get_object;
use crate::prompts::{pairwise_subject, pairwise_synthesis_format, pairwise_turn_instruction};

/// A previous Round 2 attempt whose consistency ratio was too high.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseRetryContext {
    /// The rejected comparisons.
    pub comparisons: Vec<PairwiseComparison>,
    /// Their consistency ratio.
    pub consistency_ratio: f64,
    /// The session's limit.
    pub threshold: f64,
}

/// Debate over the relative importance of every criteria pair.
#[derive(Debug, Clone)]
pub struct PairwiseTopic {
    criteria: Vec<Criterion>,
    retry: Option<PairwiseRetryContext>,
}

impl PairwiseTopic {
    /// First attempt.
    #[must_use]
    pub const fn new(criteria: Vec<Criterion>) -> Self {
        Self {
            criteria,
            retry: None,
        }
    }

    /// Re-run informed by a failed attempt.
    #[must_use]
    pub fn with_retry(mut self, retry: PairwiseRetryContext) -> Self {
        self.retry = Some(retry);
        self
    }

    fn resolve(&self, raw: &str, key: &str) -> Result<&str, ParseError> {
        let raw = raw.trim();
        self.criteria
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(raw))
            .map(|c| c.name.as_str())
            .ok_or_else(|| ParseError::InvalidValue {
                field: "comparison_matrix".into(),
                reason: format!("'{key}' names unknown criterion '{raw}'"),
            })
    }

    /// Match `"A vs B"` against every ordered pair of known criteria, so
    /// names that themselves contain `vs` still resolve.
    fn match_pair(&self, key: &str) -> Result<(&str, &str), ParseError> {
        let key_lower = key.trim().to_lowercase();
        for a in &self.criteria {
            let Some(rest) = key_lower.strip_prefix(&a.name.to_lowercase()) else {
                continue;
            };
            if !rest.starts_with(char::is_whitespace) {
                continue;
            }
            let Some(rest) = rest.trim_start().strip_prefix("vs ") else {
                continue;
            };
            if let Some(b) = self
                .criteria
                .iter()
                .find(|b| b.name != a.name && b.name.to_lowercase() == rest.trim())
            {
                return Ok((a.name.as_str(), b.name.as_str()));
            }
        }

        let (raw_a, raw_b) = split_pair(key).ok_or_else(|| ParseError::InvalidValue {
            field: "comparison_matrix".into(),
            reason: format!("key '{key}' is not of the form 'A vs B'"),
        })?;
        let a = self.resolve(raw_a, key)?;
        let b = self.resolve(raw_b, key)?;
        Err(ParseError::InvalidValue {
            field: "comparison_matrix".into(),
            reason: format!("key '{key}' does not pair two distinct criteria ({a}, {b})"),
        })
    }
}

/// Split `"A vs B"` on the first standalone `vs`, for error reporting.
fn split_pair(key: &str) -> Option<(&str, &str)> {
    let lower = key.to_ascii_lowercase();
    let at = lower.find(" vs ")?;
    Some((&key[..at], &key[at + 4..]))
}

impl DebateTopic for PairwiseTopic {
    type Output = Vec<PairwiseComparison>;

    fn round(&self) -> u8 {
        2
    }

    fn artifact(&self) -> &'static str {
        "comparison_matrix"
    }

    fn subject(&self) -> String {
        pairwise_subject(&self.criteria, self.retry.as_ref())
    }

    fn turn_instruction(&self, turn_type: TurnType) -> String {
        pairwise_turn_instruction(turn_type).to_string()
    }

    fn synthesis_format(&self) -> String {
        pairwise_synthesis_format(&self.criteria)
    }

    fn parse_synthesis(&self, json: &Value) -> Result<Vec<PairwiseComparison>, ParseError> {
        let matrix = get_object(json, "comparison_matrix")?;
        let mut parsed: Vec<PairwiseComparison> = Vec::with_capacity(matrix.len());

        for (key, value) in matrix {
            let (a, b) = self.match_pair(key)?;
            let raw = value.as_f64().ok_or_else(|| ParseError::InvalidValue {
                field: key.clone(),
                reason: "value is not a number".into(),
            })?;
            let comparison =
                PairwiseComparison::canonical(a, b, raw).map_err(|e| ParseError::InvalidValue {
                    field: key.clone(),
                    reason: e.to_string(),
                })?;
            if parsed.iter().any(|c| c.covers(a, b)) {
                return Err(ParseError::InvalidValue {
                    field: key.clone(),
                    reason: format!("pair {a} / {b} given more than once"),
                });
            }
            parsed.push(comparison);
        }

        let mut ordered = Vec::with_capacity(parsed.len());
        for (i, a) in self.criteria.iter().enumerate() {
            for b in &self.criteria[i + 1..] {
                let position = parsed
                    .iter()
                    .position(|c| c.covers(&a.name, &b.name))
                    .ok_or_else(|| ParseError::InvalidValue {
                        field: "comparison_matrix".into(),
                        reason: format!("missing pair '{} vs {}'", a.name, b.name),
                    })?;
                ordered.push(parsed.swap_remove(position));
            }
        }
        Ok(ordered)
    }
}
