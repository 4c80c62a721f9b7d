//! Round 3: scoring every option on every criterion.

use std::collections::BTreeMap;

use serde_json::Value;

use super::DebateTopic;
use crate::error::ParseError;
use crate::model::{Criterion, SaatyValue, ScoreSheet, TurnType};
use crate::parsing::get_object;
use crate::prompts::{scoring_subject, scoring_synthesis_format, scoring_turn_instruction};

/// Debate over the decision matrix.
#[derive(Debug, Clone)]
pub struct ScoringTopic {
    options: Vec<String>,
    criteria: Vec<Criterion>,
}

impl ScoringTopic {
    /// Create the topic.
    #[must_use]
    pub const fn new(options: Vec<String>, criteria: Vec<Criterion>) -> Self {
        Self { options, criteria }
    }
}

/// Exact spelling wins over a case-insensitive match.
fn resolve<'a>(names: &[&'a str], raw: &str, kind: &str) -> Result<&'a str, ParseError> {
    let raw_trimmed = raw.trim();
    names
        .iter()
        .find(|n| **n == raw_trimmed)
        .or_else(|| names.iter().find(|n| n.eq_ignore_ascii_case(raw_trimmed)))
        .copied()
        .ok_or_else(|| ParseError::InvalidValue {
            field: "decision_matrix".into(),
            reason: format!("unknown {kind} '{raw_trimmed}'"),
        })
}

impl DebateTopic for ScoringTopic {
    type Output = ScoreSheet;

    fn round(&self) -> u8 {
        3
    }

    fn artifact(&self) -> &'static str {
        "decision_matrix"
    }

    fn subject(&self) -> String {
        scoring_subject(&self.options, &self.criteria)
    }

    fn turn_instruction(&self, turn_type: TurnType) -> String {
        scoring_turn_instruction(turn_type).to_string()
    }

    fn synthesis_format(&self) -> String {
        scoring_synthesis_format(&self.options, &self.criteria)
    }

    /// Cells may be missing here; coverage is checked by the caller.
    fn parse_synthesis(&self, json: &Value) -> Result<ScoreSheet, ParseError> {
        let matrix = get_object(json, "decision_matrix")?;
        let options: Vec<&str> = self.options.iter().map(String::as_str).collect();
        let criteria: Vec<&str> = self.criteria.iter().map(|c| c.name.as_str()).collect();
        let mut sheet = ScoreSheet::new();

        for (raw_option, row) in matrix {
            let option = resolve(&options, raw_option, "option")?;
            if sheet.contains_key(option) {
                return Err(ParseError::InvalidValue {
                    field: "decision_matrix".into(),
                    reason: format!("row '{raw_option}' repeats option '{option}'"),
                });
            }
            let row = row.as_object().ok_or_else(|| ParseError::InvalidValue {
                field: option.to_string(),
                reason: "row is not an object".into(),
            })?;
            let entry: &mut BTreeMap<String, SaatyValue> =
                sheet.entry(option.to_string()).or_default();
            for (raw_criterion, score) in row {
                let criterion = resolve(&criteria, raw_criterion, "criterion")?;
                if entry.contains_key(criterion) {
                    return Err(ParseError::InvalidValue {
                        field: option.to_string(),
                        reason: format!("criterion '{criterion}' scored twice"),
                    });
                }
                let value = score
                    .as_f64()
                    .ok_or_else(|| ParseError::InvalidValue {
                        field: format!("{option}/{criterion}"),
                        reason: "score is not a number".into(),
                    })
                    .and_then(|v| {
                        SaatyValue::new(v).map_err(|e| ParseError::InvalidValue {
                            field: format!("{option}/{criterion}"),
                            reason: e.to_string(),
                        })
                    })?;
                entry.insert(criterion.to_string(), value);
            }
        }

        Ok(sheet)
    }
}
