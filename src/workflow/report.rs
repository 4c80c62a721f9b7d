//! Final recommendation report.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::consistency::ConsistencyStatus;
use super::state::SessionState;
use crate::numeric::RankedOption;

/// Scores at or above this mark a strength.
pub const STRENGTH_THRESHOLD: f64 = 7.0;

/// Scores below this mark a weakness.
pub const WEAKNESS_THRESHOLD: f64 = 6.0;

/// Recommendations listed in the report.
pub const TOP_RECOMMENDATIONS: usize = 3;

/// One recommended major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// 1-based rank.
    pub rank: usize,
    /// Major.
    pub option: String,
    /// TOPSIS closeness.
    pub closeness_coefficient: f64,
    /// Criteria scored at or above 7.
    pub strengths: Vec<String>,
    /// Criteria scored below 6.
    pub weaknesses: Vec<String>,
}

/// A criterion's weight as a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightShare {
    /// Criterion name.
    pub criterion: String,
    /// Weight x 100.
    pub percent: f64,
}

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    /// Session identifier.
    pub session_id: String,
    /// Top-ranked majors with their profile.
    pub recommendations: Vec<Recommendation>,
    /// Criteria weights, in criterion order.
    pub criteria_weights: Vec<WeightShare>,
    /// Consistency ratio of the weights.
    pub consistency_ratio: f64,
    /// Whether that ratio met the threshold.
    pub consistency_status: ConsistencyStatus,
    /// Every option in rank order.
    pub full_ranking: Vec<RankedOption>,
}

/// Build the report. Returns `None` until Round 4 is done.
#[must_use]
pub fn build_report(state: &SessionState) -> Option<FinalReport> {
    let round2 = state.round2.as_ref()?;
    let round3 = state.round3.as_ref()?;
    let round4 = state.round4.as_ref()?;
    let matrix = &round3.decision_matrix;

    let recommendations = round4
        .final_ranking
        .iter()
        .take(TOP_RECOMMENDATIONS)
        .map(|ranked| {
            let scored: Vec<(&String, f64)> = matrix
                .criteria()
                .iter()
                .filter_map(|c| matrix.score(&ranked.option, c).map(|s| (c, s)))
                .collect();
            Recommendation {
                rank: ranked.rank,
                option: ranked.option.clone(),
                closeness_coefficient: ranked.closeness_coefficient,
                strengths: scored
                    .iter()
                    .filter(|(_, s)| *s >= STRENGTH_THRESHOLD)
                    .map(|(c, _)| (*c).clone())
                    .collect(),
                weaknesses: scored
                    .iter()
                    .filter(|(_, s)| *s < WEAKNESS_THRESHOLD)
                    .map(|(c, _)| (*c).clone())
                    .collect(),
            }
        })
        .collect();

    Some(FinalReport {
        session_id: state.id.clone(),
        recommendations,
        criteria_weights: round2
            .weights
            .iter()
            .map(|w| WeightShare {
                criterion: w.criterion.clone(),
                percent: w.weight * 100.0,
            })
            .collect(),
        consistency_ratio: round2.consistency_ratio,
        consistency_status: round2.consistency_status,
        full_ranking: round4.final_ranking.clone(),
    })
}

/// Render the report as Markdown.
#[must_use]
pub fn render_markdown(report: &FinalReport) -> String {
    let mut out = String::from("# Major recommendations\n\n");

    for rec in &report.recommendations {
        let _ = writeln!(
            out,
            "## {}. {} (closeness {:.3})\n",
            rec.rank, rec.option, rec.closeness_coefficient
        );
        let list = |items: &[String]| {
            if items.is_empty() {
                "none".to_string()
            } else {
                items.join(", ")
            }
        };
        let _ = writeln!(out, "- Strengths: {}", list(&rec.strengths));
        let _ = writeln!(out, "- Weaknesses: {}\n", list(&rec.weaknesses));
    }

    out.push_str("## Criteria weights\n\n| Criterion | Weight |\n|---|---|\n");
    for share in &report.criteria_weights {
        let _ = writeln!(out, "| {} | {:.1}% |", share.criterion, share.percent);
    }

    let _ = writeln!(
        out,
        "\nConsistency ratio: {:.3} ({})",
        report.consistency_ratio, report.consistency_status
    );

    out.push_str("\n## Full ranking\n\n");
    for ranked in &report.full_ranking {
        let _ = writeln!(
            out,
            "{}. {} ({:.3})",
            ranked.rank, ranked.option, ranked.closeness_coefficient
        );
    }
    out
}
