//! TOPSIS ranking.
//!
//! 1. Vector-normalise each column.
//! 2. Multiply each column by its weight.
//! 3. Ideal = best value per column (max for benefit, min for cost);
//!    anti-ideal = worst.
//! 4. Euclidean distance of each row to both.
//! 5. Closeness = d- / (d+ + d-), or 0 when both distances are 0.
//! 6. Rank by closeness descending, then option name ascending.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::NumericError;
use crate::model::{CriterionType, DecisionMatrix};

/// Per-option TOPSIS figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopsisOption {
    /// Option label.
    pub option: String,
    /// Vector-normalised scores, in criterion order.
    pub normalized_scores: Vec<f64>,
    /// Weighted normalised scores.
    pub weighted_scores: Vec<f64>,
    /// Distance to the ideal solution.
    pub distance_to_ideal: f64,
    /// Distance to the anti-ideal solution.
    pub distance_to_anti_ideal: f64,
    /// Closeness coefficient in [0, 1].
    pub closeness_coefficient: f64,
    /// 1-based rank, unique.
    pub rank: usize,
}

/// One line of the final ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedOption {
    /// 1-based rank.
    pub rank: usize,
    /// Option label.
    pub option: String,
    /// Closeness coefficient.
    pub closeness_coefficient: f64,
}

/// Full TOPSIS output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopsisResult {
    /// Options ordered by rank.
    pub options: Vec<TopsisOption>,
    /// Weighted ideal solution.
    pub ideal: Vec<f64>,
    /// Weighted anti-ideal solution.
    pub anti_ideal: Vec<f64>,
}

impl TopsisResult {
    /// Rank, option and closeness only.
    #[must_use]
    pub fn final_ranking(&self) -> Vec<RankedOption> {
        self.options
            .iter()
            .map(|o| RankedOption {
                rank: o.rank,
                option: o.option.clone(),
                closeness_coefficient: o.closeness_coefficient,
            })
            .collect()
    }

    /// Option labels in rank order.
    #[must_use]
    pub fn ranking(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.option.as_str()).collect()
    }
}

/// Rank the options of `matrix`.
///
/// `weights` and `types` are in the matrix's criterion order.
///
/// # Errors
///
/// - [`NumericError::EmptyMatrix`] if there are no options or no criteria
/// - [`NumericError::DimensionMismatch`] if `weights` or `types` don't match the criteria
pub fn rank(
    matrix: &DecisionMatrix,
    weights: &[f64],
    types: &[CriterionType],
) -> Result<TopsisResult, NumericError> {
    let m = matrix.options().len();
    let n = matrix.criteria().len();
    if m == 0 || n == 0 {
        return Err(NumericError::EmptyMatrix {
            options: m,
            criteria: n,
        });
    }
    for (what, actual) in [("weights", weights.len()), ("criterion types", types.len())] {
        if actual != n {
            return Err(NumericError::DimensionMismatch {
                what: what.into(),
                expected: n,
                actual,
            });
        }
    }

    let rows = matrix.rows();
    let norms: Vec<f64> = (0..n)
        .map(|j| rows.iter().map(|row| row[j] * row[j]).sum::<f64>().sqrt())
        .collect();

    let normalized: Vec<Vec<f64>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&norms)
                .map(|(x, norm)| if *norm == 0.0 { 0.0 } else { x / norm })
                .collect()
        })
        .collect();

    let weighted: Vec<Vec<f64>> = normalized
        .iter()
        .map(|row| row.iter().zip(weights).map(|(x, w)| x * w).collect())
        .collect();

    let column = |j: usize| weighted.iter().map(move |row| row[j]);
    let column_max = |j: usize| column(j).fold(f64::NEG_INFINITY, f64::max);
    let column_min = |j: usize| column(j).fold(f64::INFINITY, f64::min);

    let (ideal, anti_ideal): (Vec<f64>, Vec<f64>) = types
        .iter()
        .enumerate()
        .map(|(j, t)| match t {
            CriterionType::Benefit => (column_max(j), column_min(j)),
            CriterionType::Cost => (column_min(j), column_max(j)),
        })
        .unzip();

    let mut options: Vec<TopsisOption> = matrix
        .options()
        .iter()
        .zip(normalized.into_iter().zip(weighted.iter()))
        .map(|(option, (normalized_scores, weighted_scores))| {
            let distance_to_ideal = euclidean(weighted_scores, &ideal);
            let distance_to_anti_ideal = euclidean(weighted_scores, &anti_ideal);
            let total = distance_to_ideal + distance_to_anti_ideal;
            let closeness_coefficient = if total == 0.0 {
                0.0
            } else {
                distance_to_anti_ideal / total
            };
            TopsisOption {
                option: option.clone(),
                normalized_scores,
                weighted_scores: weighted_scores.clone(),
                distance_to_ideal,
                distance_to_anti_ideal,
                closeness_coefficient,
                rank: 0,
            }
        })
        .collect();

    options.sort_by(compare_for_rank);
    for (position, option) in options.iter_mut().enumerate() {
        option.rank = position + 1;
    }

    Ok(TopsisResult {
        options,
        ideal,
        anti_ideal,
    })
}

/// Closeness descending, then option name ascending.
fn compare_for_rank(a: &TopsisOption, b: &TopsisOption) -> Ordering {
    b.closeness_coefficient
        .total_cmp(&a.closeness_coefficient)
        .then_with(|| a.option.cmp(&b.option))
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
