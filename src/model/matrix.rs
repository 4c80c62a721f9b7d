//! Saaty-scale values, pairwise comparisons, and the decision matrix.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::NumericError;

/// A value on the Saaty scale {1.0, 1.5, ..., 9.0}.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SaatyValue(f64);

impl SaatyValue {
    /// Smallest scale value (equal importance).
    pub const MIN: f64 = 1.0;
    /// Largest scale value.
    pub const MAX: f64 = 9.0;

    /// Accept a value that lies exactly on the scale.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::InvalidSaatyValue`] otherwise.
    pub fn new(value: f64) -> Result<Self, NumericError> {
        let doubled = value * 2.0;
        if value.is_finite()
            && (Self::MIN..=Self::MAX).contains(&value)
            && (doubled - doubled.round()).abs() < 1e-9
        {
            Ok(Self(doubled.round() / 2.0))
        } else {
            Err(NumericError::InvalidSaatyValue { value })
        }
    }

    /// Snap to the nearest half step, then validate.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::InvalidSaatyValue`] if the snapped value is off the scale.
    pub fn snapped(value: f64) -> Result<Self, NumericError> {
        if !value.is_finite() {
            return Err(NumericError::InvalidSaatyValue { value });
        }
        Self::new((value * 2.0).round() / 2.0).map_err(|_| NumericError::InvalidSaatyValue { value })
    }

    /// The underlying number.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for SaatyValue {
    type Error = NumericError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SaatyValue> for f64 {
    fn from(value: SaatyValue) -> Self {
        value.0
    }
}

/// "`first` is `value` times as important as `second`".
///
/// Only the canonical direction (value >= 1) is ever stored; the reciprocal
/// is implied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseComparison {
    /// The more (or equally) important criterion.
    pub first: String,
    /// The less (or equally) important criterion.
    pub second: String,
    /// Intensity on the Saaty scale.
    pub value: SaatyValue,
}

impl PairwiseComparison {
    /// Store "`a` vs `b` = `raw`" in canonical direction.
    ///
    /// A raw value below 1 is read as the reciprocal of "`b` vs `a`", snapped
    /// to the nearest half step.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::InvalidSaatyValue`] for non-positive values or
    /// values that cannot be placed on the scale, and
    /// [`NumericError::InvalidComparison`] for a criterion compared with itself.
    pub fn canonical(a: &str, b: &str, raw: f64) -> Result<Self, NumericError> {
        if a == b {
            return Err(NumericError::InvalidComparison {
                first: a.to_string(),
                second: b.to_string(),
            });
        }
        if !raw.is_finite() || raw <= 0.0 {
            return Err(NumericError::InvalidSaatyValue { value: raw });
        }
        if raw >= SaatyValue::MIN {
            Ok(Self {
                first: a.to_string(),
                second: b.to_string(),
                value: SaatyValue::new(raw)?,
            })
        } else {
            Ok(Self {
                first: b.to_string(),
                second: a.to_string(),
                value: SaatyValue::snapped(1.0 / raw)
                    .map_err(|_| NumericError::InvalidSaatyValue { value: raw })?,
            })
        }
    }

    /// Returns true if this comparison covers the unordered pair `{a, b}`.
    #[must_use]
    pub fn covers(&self, a: &str, b: &str) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }
}

/// Parsed Round 3 scores: option -> criterion -> score.
pub type ScoreSheet = BTreeMap<String, BTreeMap<String, SaatyValue>>;

/// Cells of `options x criteria` absent from `sheet`, as `option/criterion`.
#[must_use]
pub fn missing_cells(sheet: &ScoreSheet, options: &[String], criteria: &[String]) -> Vec<String> {
    options
        .iter()
        .flat_map(|option| {
            criteria.iter().filter_map(move |criterion| {
                let present = sheet
                    .get(option)
                    .is_some_and(|row| row.contains_key(criterion));
                (!present).then(|| format!("{option}/{criterion}"))
            })
        })
        .collect()
}

/// Options x criteria score grid, row-major in option order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionMatrix {
    options: Vec<String>,
    criteria: Vec<String>,
    scores: Vec<Vec<f64>>,
}

impl DecisionMatrix {
    /// Build from explicit rows.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::DimensionMismatch`] if the rows don't match the labels.
    pub fn new(
        options: Vec<String>,
        criteria: Vec<String>,
        scores: Vec<Vec<f64>>,
    ) -> Result<Self, NumericError> {
        if scores.len() != options.len() {
            return Err(NumericError::DimensionMismatch {
                what: "rows".into(),
                expected: options.len(),
                actual: scores.len(),
            });
        }
        if let Some(row) = scores.iter().find(|row| row.len() != criteria.len()) {
            return Err(NumericError::DimensionMismatch {
                what: "columns".into(),
                expected: criteria.len(),
                actual: row.len(),
            });
        }
        Ok(Self {
            options,
            criteria,
            scores,
        })
    }

    /// Build from a complete score sheet.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::MissingCell`] for the first absent cell.
    pub fn from_sheet(
        options: &[String],
        criteria: &[String],
        sheet: &ScoreSheet,
    ) -> Result<Self, NumericError> {
        let mut scores = Vec::with_capacity(options.len());
        for option in options {
            let mut row = Vec::with_capacity(criteria.len());
            for criterion in criteria {
                let value = sheet
                    .get(option)
                    .and_then(|r| r.get(criterion))
                    .ok_or_else(|| NumericError::MissingCell {
                        option: option.clone(),
                        criterion: criterion.clone(),
                    })?;
                row.push(value.value());
            }
            scores.push(row);
        }
        Self::new(options.to_vec(), criteria.to_vec(), scores)
    }

    /// Option labels, in row order.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Criterion labels, in column order.
    #[must_use]
    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    /// Score rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.scores
    }

    /// Score of `option` on `criterion`, by label.
    #[must_use]
    pub fn score(&self, option: &str, criterion: &str) -> Option<f64> {
        let i = self.options.iter().position(|o| o == option)?;
        let j = self.criteria.iter().position(|c| c == criterion)?;
        Some(self.scores[i][j])
    }

    /// Number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.scores.iter().map(Vec::len).sum()
    }
}
