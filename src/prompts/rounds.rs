//! Topic-specific instructions for the three debate rounds.

use std::fmt::Write as _;

use crate::debate::PairwiseRetryContext;
use crate::model::{Criterion, TurnType};

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("- {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn criteria_list(criteria: &[Criterion]) -> String {
    criteria
        .iter()
        .map(|c| format!("- {} ({}): {}", c.name, c.criterion_type, c.description))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Round 1: criteria selection
// ============================================================================

/// What Round 1 debates.
#[must_use]
pub fn criteria_subject(options: &[String], max_criteria: usize) -> String {
    format!(
        "Which {max_criteria} criteria should be used to compare these majors for this student?\n{}",
        bullet_list(options)
    )
}

/// Per-turn instruction for Round 1.
#[must_use]
pub fn criteria_turn_instruction(turn_type: TurnType) -> &'static str {
    match turn_type {
        TurnType::Proposal => {
            "Propose exactly one new criterion not already selected. Give its name, what it \
             measures, and whether higher is better (benefit) or lower is better (cost)."
        }
        TurnType::Critique => {
            "Say whether the proposed criterion overlaps with others or misses what matters to \
             the student, and suggest a sharper version."
        }
        TurnType::Defense | TurnType::FinalDecision => {
            "Keep, refine, or replace your criterion in light of the critiques."
        }
    }
}

/// Output format for the Round 1 synthesis.
#[must_use]
pub fn criteria_synthesis_format(max_criteria: usize) -> String {
    format!(
        r#"Select exactly {max_criteria} distinct criteria from the debate.

Respond with a JSON object in this exact format:
{{
  "selected_criteria": [
    {{
      "name": "Criterion name",
      "description": "What it measures",
      "type": "benefit",
      "source_agent": "Name of the persona who proposed it",
      "reasoning": "Why it was kept"
    }}
  ],
  "summary": "One paragraph on how the panel converged",
  "reasoning": "Why this set is complete"
}}

"type" is "benefit" when higher scores are better and "cost" when lower scores are better."#
    )
}

// ============================================================================
// Round 2: pairwise comparison
// ============================================================================

/// What Round 2 debates, including the failed attempt on a retry.
#[must_use]
pub fn pairwise_subject(criteria: &[Criterion], retry: Option<&PairwiseRetryContext>) -> String {
    let mut subject = format!(
        "How important is each criterion relative to each other criterion for this student?\n{}\n\
         Use the Saaty scale 1 to 9 in steps of 0.5 (1 = equal, 9 = extreme).",
        criteria_list(criteria)
    );
    if let Some(retry) = retry {
        let _ = write!(
            subject,
            "\n\nThe previous comparison matrix had consistency ratio {:.3}, above the limit of {:.2}:",
            retry.consistency_ratio, retry.threshold
        );
        for c in &retry.comparisons {
            let _ = write!(subject, "\n- {} vs {}: {}", c.first, c.second, c.value.value());
        }
        subject.push_str(
            "\nReduce the inconsistency: if A beats B and B beats C, A must beat C by at least as much.",
        );
    }
    subject
}

/// Per-turn instruction for Round 2.
#[must_use]
pub fn pairwise_turn_instruction(turn_type: TurnType) -> &'static str {
    match turn_type {
        TurnType::Proposal => {
            "State a Saaty-scale value for each pair of criteria, as 'A vs B: value', with one \
             sentence of justification per pair."
        }
        TurnType::Critique => {
            "Point out the pair values you disagree with most and give your own values for them."
        }
        TurnType::Defense | TurnType::FinalDecision => {
            "Revise or defend your values. Keep the judgements transitive."
        }
    }
}

/// Output format for the Round 2 synthesis, listing every required pair.
#[must_use]
pub fn pairwise_synthesis_format(criteria: &[Criterion]) -> String {
    let mut keys = Vec::new();
    for (i, a) in criteria.iter().enumerate() {
        for b in &criteria[i + 1..] {
            keys.push(format!("    \"{} vs {}\": 3.0", a.name, b.name));
        }
    }
    format!(
        r#"Give one value for every pair below. A value v means the first criterion is v times
as important as the second; use 1/v (for example 0.333) when the second is more important.
Allowed values: 1 to 9 in steps of 0.5, or their reciprocals.

Respond with a JSON object in this exact format:
{{
  "comparison_matrix": {{
{pairs}
  }},
  "reasoning": "How the panel settled the values"
}}"#,
        pairs = keys.join(",\n")
    )
}

// ============================================================================
// Round 3: option scoring
// ============================================================================

/// What Round 3 debates.
#[must_use]
pub fn scoring_subject(options: &[String], criteria: &[Criterion]) -> String {
    format!(
        "How well does each major fit this student on each criterion?\nMajors:\n{}\nCriteria:\n{}\n\
         Score on the scale 1 to 9 in steps of 0.5. For cost criteria a higher score means a higher cost.",
        bullet_list(options),
        criteria_list(criteria)
    )
}

/// Per-turn instruction for Round 3.
#[must_use]
pub fn scoring_turn_instruction(turn_type: TurnType) -> &'static str {
    match turn_type {
        TurnType::Proposal => {
            "Score every major on every criterion with a one-line reason each. Avoid using the \
             same score more than 3 times."
        }
        TurnType::Critique => {
            "Challenge the scores you find least justified and propose corrected scores."
        }
        TurnType::Defense | TurnType::FinalDecision => {
            "Adjust or defend your scores in light of the critiques."
        }
    }
}

/// Output format for the Round 3 synthesis.
#[must_use]
pub fn scoring_synthesis_format(options: &[String], criteria: &[Criterion]) -> String {
    let row = criteria
        .iter()
        .map(|c| format!("\"{}\": 5.0", c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let rows = options
        .iter()
        .map(|o| format!("    \"{o}\": {{{row}}}"))
        .collect::<Vec<_>>()
        .join(",\n");
    format!(
        r#"Give a score for every major on every criterion: 1 to 9 in steps of 0.5.
Do not use the same score more than 3 times across the matrix.

Respond with a JSON object in this exact format:
{{
  "decision_matrix": {{
{rows}
  }},
  "reasoning": "How the panel settled the scores"
}}"#
    )
}
