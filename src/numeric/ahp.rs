//! Analytic Hierarchy Process.
//!
//! Weights are the principal eigenvector of the reciprocal comparison
//! matrix, found by power iteration seeded with the normalised row
//! geometric means. Consistency follows Saaty:
//!
//! ```text
//! CI = (lambda_max - n) / (n - 1)      (0 when n <= 2)
//! CR = CI / RI(n)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::NumericError;
use crate::model::PairwiseComparison;

/// Saaty random index for n = 1..=10.
pub const RANDOM_INDEX: [f64; 10] = [0.0, 0.0, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49];

/// Convergence tolerance for power iteration.
const TOLERANCE: f64 = 1e-12;

/// Iteration cap for power iteration.
const MAX_ITERATIONS: usize = 1000;

/// Random index for a matrix of size `n`; sizes beyond the table use the last entry.
#[must_use]
pub fn random_index(n: usize) -> f64 {
    match n {
        0 => 0.0,
        n => RANDOM_INDEX
            .get(n - 1)
            .copied()
            .unwrap_or(RANDOM_INDEX[RANDOM_INDEX.len() - 1]),
    }
}

/// Reciprocal n x n comparison matrix over named criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMatrix {
    criteria: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl ComparisonMatrix {
    /// Build the matrix from exactly C(n,2) canonical comparisons.
    ///
    /// Diagonal entries are 1; for a stored pair `(a, b) = v`,
    /// `m[a][b] = v` and `m[b][a] = 1/v`.
    ///
    /// # Errors
    ///
    /// - [`NumericError::DegenerateMatrix`] if fewer than 2 criteria
    /// - [`NumericError::UnknownCriterion`] if a comparison names an outsider
    /// - [`NumericError::InvalidComparison`] for self or repeated pairs
    /// - [`NumericError::MissingComparison`] if a pair is not covered
    pub fn from_comparisons(
        criteria: &[String],
        comparisons: &[PairwiseComparison],
    ) -> Result<Self, NumericError> {
        let n = criteria.len();
        if n < 2 {
            return Err(NumericError::DegenerateMatrix { size: n });
        }

        let index_of = |name: &str| {
            criteria
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| NumericError::UnknownCriterion {
                    name: name.to_string(),
                })
        };

        let mut values = vec![vec![0.0; n]; n];
        for (i, row) in values.iter_mut().enumerate() {
            row[i] = 1.0;
        }

        for comparison in comparisons {
            let a = index_of(&comparison.first)?;
            let b = index_of(&comparison.second)?;
            if a == b || values[a][b] != 0.0 {
                return Err(NumericError::InvalidComparison {
                    first: comparison.first.clone(),
                    second: comparison.second.clone(),
                });
            }
            let v = comparison.value.value();
            values[a][b] = v;
            values[b][a] = 1.0 / v;
        }

        for i in 0..n {
            for j in (i + 1)..n {
                if values[i][j] == 0.0 {
                    return Err(NumericError::MissingComparison {
                        first: criteria[i].clone(),
                        second: criteria[j].clone(),
                    });
                }
            }
        }

        Ok(Self {
            criteria: criteria.to_vec(),
            values,
        })
    }

    /// Matrix size.
    #[must_use]
    pub fn size(&self) -> usize {
        self.criteria.len()
    }

    /// Criterion labels in row order.
    #[must_use]
    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    /// Entry `m[i][j]`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    /// Matrix rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.values
    }

    fn multiply(&self, w: &[f64]) -> Vec<f64> {
        self.values
            .iter()
            .map(|row| row.iter().zip(w).map(|(a, b)| a * b).sum())
            .collect()
    }
}

/// Weights and consistency statistics for one comparison matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AhpResult {
    /// Criteria weights in matrix order, summing to 1.
    pub weights: Vec<f64>,
    /// Principal eigenvalue estimate.
    pub eigenvalue_max: f64,
    /// Consistency index.
    pub consistency_index: f64,
    /// Consistency ratio.
    pub consistency_ratio: f64,
}

/// Normalised geometric mean of each row.
///
/// Exact for perfectly consistent matrices; used to seed power iteration.
#[must_use]
pub fn geometric_mean_weights(matrix: &ComparisonMatrix) -> Vec<f64> {
    #[allow(clippy::cast_precision_loss)]
    let n = matrix.size() as f64;
    let means: Vec<f64> = matrix
        .rows()
        .iter()
        .map(|row| row.iter().map(|v| v.ln()).sum::<f64>() / n)
        .map(f64::exp)
        .collect();
    normalize(means)
}

/// Principal eigenvector, normalised to sum 1.
#[must_use]
pub fn principal_eigenvector(matrix: &ComparisonMatrix) -> Vec<f64> {
    let mut weights = geometric_mean_weights(matrix);
    for iteration in 0..MAX_ITERATIONS {
        let next = normalize(matrix.multiply(&weights));
        let delta = next
            .iter()
            .zip(&weights)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        weights = next;
        if delta < TOLERANCE {
            tracing::trace!(iteration, "Power iteration converged");
            break;
        }
    }
    weights
}

/// Compute weights, the principal eigenvalue, CI and CR.
///
/// # Errors
///
/// Returns [`NumericError::DegenerateMatrix`] if the matrix has fewer than 2 rows.
pub fn evaluate(matrix: &ComparisonMatrix) -> Result<AhpResult, NumericError> {
    let n = matrix.size();
    if n < 2 {
        return Err(NumericError::DegenerateMatrix { size: n });
    }

    let weights = principal_eigenvector(matrix);
    let product = matrix.multiply(&weights);
    #[allow(clippy::cast_precision_loss)]
    let size = n as f64;
    let eigenvalue_max = product
        .iter()
        .zip(&weights)
        .map(|(aw, w)| aw / w)
        .sum::<f64>()
        / size;

    let consistency_index = if n <= 2 {
        0.0
    } else {
        ((eigenvalue_max - size) / (size - 1.0)).max(0.0)
    };
    let ri = random_index(n);
    let consistency_ratio = if ri > 0.0 { consistency_index / ri } else { 0.0 };

    Ok(AhpResult {
        weights,
        eigenvalue_max,
        consistency_index,
        consistency_ratio,
    })
}

/// Build the matrix and evaluate it in one step.
///
/// # Errors
///
/// See [`ComparisonMatrix::from_comparisons`].
pub fn analyze(
    criteria: &[String],
    comparisons: &[PairwiseComparison],
) -> Result<AhpResult, NumericError> {
    evaluate(&ComparisonMatrix::from_comparisons(criteria, comparisons)?)
}

fn normalize(values: Vec<f64>) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    values.into_iter().map(|v| v / total).collect()
}
