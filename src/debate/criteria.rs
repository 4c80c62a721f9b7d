//! Round 1: criteria selection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DebateTopic;
use crate::error::ParseError;
use crate::model::{Criterion, CriterionType, TurnType, DIRECTOR_NAME};
use crate::parsing::{get_array, get_opt_str, get_str};
use crate::prompts::{criteria_subject, criteria_synthesis_format, criteria_turn_instruction};

/// Criteria finalised by the Director.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaSelection {
    /// Distinct criteria in the Director's order.
    pub criteria: Vec<Criterion>,
    /// How the panel converged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Debate over which criteria to use.
#[derive(Debug, Clone)]
pub struct CriteriaTopic {
    options: Vec<String>,
    max_criteria: usize,
    panel: Vec<String>,
}

impl CriteriaTopic {
    /// Create the topic for the given options.
    #[must_use]
    pub const fn new(options: Vec<String>, max_criteria: usize) -> Self {
        Self {
            options,
            max_criteria,
            panel: Vec::new(),
        }
    }

    /// Persona names a criterion may be credited to.
    #[must_use]
    pub fn with_panel(mut self, names: Vec<String>) -> Self {
        self.panel = names;
        self
    }

    /// Panel spelling of `source_agent`, or the Director when it names no persona.
    fn proposer(&self, source_agent: Option<String>) -> String {
        source_agent
            .and_then(|raw| {
                let found = self.panel.iter().find(|n| n.eq_ignore_ascii_case(&raw));
                if found.is_none() {
                    tracing::debug!(source_agent = %raw, "Crediting unknown proposer to the Director");
                }
                found.cloned()
            })
            .unwrap_or_else(|| DIRECTOR_NAME.to_string())
    }
}

impl DebateTopic for CriteriaTopic {
    type Output = CriteriaSelection;

    fn round(&self) -> u8 {
        1
    }

    fn artifact(&self) -> &'static str {
        "selected_criteria"
    }

    fn subject(&self) -> String {
        criteria_subject(&self.options, self.max_criteria)
    }

    fn turn_instruction(&self, turn_type: TurnType) -> String {
        criteria_turn_instruction(turn_type).to_string()
    }

    fn synthesis_format(&self) -> String {
        criteria_synthesis_format(self.max_criteria)
    }

    fn parse_synthesis(&self, json: &Value) -> Result<CriteriaSelection, ParseError> {
        let items = get_array(json, "selected_criteria")?;
        if items.is_empty() {
            return Err(ParseError::InvalidValue {
                field: "selected_criteria".into(),
                reason: "no criteria selected".into(),
            });
        }

        let mut seen = HashSet::new();
        let mut criteria = Vec::with_capacity(items.len());
        for item in items {
            let name = get_str(item, "name")?;
            if !seen.insert(name.to_lowercase()) {
                tracing::debug!(criterion = %name, "Dropping repeated criterion");
                continue;
            }
            let criterion_type = match get_opt_str(item, "type") {
                None => CriterionType::Benefit,
                Some(raw) => CriterionType::parse(&raw).ok_or_else(|| ParseError::InvalidValue {
                    field: "type".into(),
                    reason: format!("'{raw}' is neither benefit nor cost"),
                })?,
            };
            let proposed_by = self.proposer(get_opt_str(item, "source_agent"));
            let mut criterion = Criterion::new(name, get_str(item, "description")?, proposed_by)
                .with_type(criterion_type);
            if let Some(reasoning) = get_opt_str(item, "reasoning") {
                criterion = criterion.with_reasoning(reasoning);
            }
            criteria.push(criterion);
        }

        Ok(CriteriaSelection {
            criteria,
            summary: get_opt_str(json, "summary"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn topic() -> CriteriaTopic {
        CriteriaTopic::new(vec!["Physics".into(), "Law".into()], 3)
            .with_panel(vec!["Ava".into(), "Ben".into(), "Cleo".into()])
    }

    #[test]
    fn test_parse_selection() {
        let json = json!({
            "selected_criteria": [
                {"name": "Salary", "description": "Pay", "type": "benefit", "source_agent": "Ava", "reasoning": "Money"},
                {"name": "Study load", "description": "Hours", "type": "Cost", "source_agent": "Cleo"},
                {"name": "Impact", "description": "Good done"}
            ],
            "summary": "Converged quickly"
        });
        let selection = topic().parse_synthesis(&json).unwrap();
        assert_eq!(selection.criteria.len(), 3);
        assert_eq!(selection.criteria[0].reasoning.as_deref(), Some("Money"));
        assert_eq!(selection.criteria[1].proposed_by, "Cleo");
        assert_eq!(selection.criteria[1].criterion_type, CriterionType::Cost);
        assert_eq!(selection.criteria[2].proposed_by, "Director");
        assert_eq!(selection.summary.as_deref(), Some("Converged quickly"));
    }

    #[test]
    fn test_proposer_must_be_a_panel_member() {
        let json = json!({"selected_criteria": [
            {"name": "Salary", "description": "Pay", "source_agent": "ben"},
            {"name": "Impact", "description": "Good", "source_agent": "Zed"},
            {"name": "Balance", "description": "Time", "source_agent": "The panel"}
        ]});
        let selection = topic().parse_synthesis(&json).unwrap();
        let proposers: Vec<&str> = selection
            .criteria
            .iter()
            .map(|c| c.proposed_by.as_str())
            .collect();
        assert_eq!(proposers, vec!["Ben", "Director", "Director"]);
    }

    #[test]
    fn test_repeated_names_collapse() {
        let json = json!({"selected_criteria": [
            {"name": "Salary", "description": "Pay"},
            {"name": "salary", "description": "Pay again"}
        ]});
        let selection = topic().parse_synthesis(&json).unwrap();
        assert_eq!(selection.criteria.len(), 1);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let json = json!({"selected_criteria": [
            {"name": "Salary", "description": "Pay", "type": "neutral"}
        ]});
        let err = topic().parse_synthesis(&json).unwrap_err();
        assert!(err.to_string().contains("neither benefit nor cost"));
    }

    #[test]
    fn test_missing_fields_rejected() {
        assert!(topic().parse_synthesis(&json!({"criteria": []})).is_err());
        assert!(topic().parse_synthesis(&json!({"selected_criteria": []})).is_err());
        assert_eq!(
            topic()
                .parse_synthesis(&json!({"selected_criteria": [{"name": "Salary"}]}))
                .unwrap_err(),
            ParseError::MissingField {
                field: "description".into()
            }
        );
    }

    #[test]
    fn test_topic_identity() {
        let topic = topic();
        assert_eq!(topic.round(), 1);
        assert_eq!(topic.artifact(), "selected_criteria");
        assert!(topic.subject().contains("Which 3 criteria"));
    }
}
