//! Evaluation criteria.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction in which a criterion's scores are better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionType {
    /// Higher is better.
    #[default]
    Benefit,
    /// Lower is better.
    Cost,
}

impl CriterionType {
    /// Parse `"benefit"` / `"cost"` (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "benefit" => Some(Self::Benefit),
            "cost" => Some(Self::Cost),
            _ => None,
        }
    }
}

impl fmt::Display for CriterionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Benefit => f.write_str("benefit"),
            Self::Cost => f.write_str("cost"),
        }
    }
}

/// A criterion selected in Round 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    /// Unique name.
    pub name: String,
    /// What it measures.
    pub description: String,
    /// Benefit or cost.
    #[serde(rename = "type", default)]
    pub criterion_type: CriterionType,
    /// Persona who proposed it.
    pub proposed_by: String,
    /// Director's reason for keeping it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Criterion {
    /// Create a benefit criterion.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        proposed_by: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            criterion_type: CriterionType::Benefit,
            proposed_by: proposed_by.into(),
            reasoning: None,
        }
    }

    /// Set the criterion type.
    #[must_use]
    pub const fn with_type(mut self, criterion_type: CriterionType) -> Self {
        self.criterion_type = criterion_type;
        self
    }

    /// Set the reasoning.
    #[must_use]
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}
