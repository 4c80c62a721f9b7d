//! Test fixtures and a scripted oracle.
//!
//! Only compiled for tests (`#[cfg(test)]`).

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use crate::debate::Panel;
use crate::error::OracleError;
use crate::model::{
    Criterion, DecisionMatrix, PairwiseComparison, Persona, SessionSettings, UserProfile,
};
use crate::numeric::{ahp, topsis};
use crate::traits::{MockTimeProvider, OracleRequest, TextOracle};
use crate::workflow::{
    ConsistencyStatus, CriterionWeight, Round1Result, Round2Result, Round3Result, Round4Result,
    SessionState, Stage,
};

/// Options used by [`sample_profile`].
pub const OPTIONS: [&str; 4] = ["Computer Science", "Physics", "Law", "Fine Arts"];

/// Criteria used by [`finished_session`] and the reply builders.
pub const CRITERIA: [&str; 3] = ["Salary", "Impact", "Balance"];

/// Fixed instant for deterministic timestamps.
#[must_use]
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()
}

/// Clock frozen at [`fixed_time`].
#[must_use]
pub fn mock_time() -> MockTimeProvider {
    let mut mock = MockTimeProvider::new();
    mock.expect_now().return_const(fixed_time());
    mock
}

#[must_use]
pub fn sample_profile() -> UserProfile {
    UserProfile::new(
        "building software and reading about physics",
        "strong at mathematics and writing",
        "high pay, meaningful impact, free time",
        OPTIONS.iter().map(ToString::to_string).collect(),
        SessionSettings {
            max_criteria: 3,
            cr_threshold: 0.1,
            cr_max_retries: 2,
        },
    )
    .unwrap()
}

fn persona(name: &str, anchor: &str) -> Persona {
    Persona {
        name: name.into(),
        perspective: format!("{name}'s lens"),
        description: format!("Advocate for {anchor}"),
        strengths: vec![format!("arguing for {anchor}")],
        stance: format!("{anchor} comes first"),
        value_anchor: anchor.into(),
        system_prompt: format!("You are {name}. You defend {anchor}."),
    }
}

#[must_use]
pub fn sample_personas() -> Vec<Persona> {
    vec![
        persona("Ava", "high pay"),
        persona("Ben", "meaningful impact"),
        persona("Cleo", "free time"),
    ]
}

#[must_use]
pub fn sample_panel() -> Panel {
    Panel::try_from(sample_personas()).unwrap()
}

/// A freshly created session.
#[must_use]
pub fn new_session() -> SessionState {
    SessionState::new("session-1", sample_profile(), fixed_time())
}

fn criteria() -> Vec<Criterion> {
    CRITERIA
        .iter()
        .zip(["Ava", "Ben", "Cleo"])
        .map(|(name, agent)| Criterion::new(*name, format!("{name} of the career"), agent))
        .collect()
}

/// A session that went through every round with equal weights.
///
/// Scores: Computer Science (9, 8, 6.5), Physics (7, 7, 5), Law (6, 5, 4),
/// Fine Arts (3, 4, 6).
#[must_use]
pub fn finished_session() -> SessionState {
    let now = fixed_time();
    let mut state = new_session();
    let names: Vec<String> = CRITERIA.iter().map(ToString::to_string).collect();

    state.panel = Some(sample_panel());
    state.advance(Stage::PersonasReady, now).unwrap();

    state.round1 = Some(Round1Result {
        turns: Vec::new(),
        criteria: criteria(),
        summary: Some("Three values, three criteria".into()),
        rationale: None,
        corrective_retries: 0,
    });
    state.advance(Stage::Round1Done, now).unwrap();

    let comparisons = vec![
        PairwiseComparison::canonical("Salary", "Impact", 1.0).unwrap(),
        PairwiseComparison::canonical("Salary", "Balance", 1.0).unwrap(),
        PairwiseComparison::canonical("Impact", "Balance", 1.0).unwrap(),
    ];
    let result = ahp::analyze(&names, &comparisons).unwrap();
    state.round2 = Some(Round2Result {
        turns: Vec::new(),
        comparisons,
        weights: names
            .iter()
            .zip(&result.weights)
            .map(|(criterion, &weight)| CriterionWeight {
                criterion: criterion.clone(),
                weight,
            })
            .collect(),
        consistency_ratio: result.consistency_ratio,
        consistency_index: result.consistency_index,
        eigenvalue_max: result.eigenvalue_max,
        retry_count: 0,
        attempt_history: vec![result.consistency_ratio],
        consistency_status: ConsistencyStatus::Passed,
        rationale: Some("All values matter equally".into()),
    });
    state.advance(Stage::Round2Done, now).unwrap();

    let matrix = DecisionMatrix::new(
        OPTIONS.iter().map(ToString::to_string).collect(),
        names,
        vec![
            vec![9.0, 8.0, 6.5],
            vec![7.0, 7.0, 5.0],
            vec![6.0, 5.0, 4.0],
            vec![3.0, 4.0, 6.0],
        ],
    )
    .unwrap();
    state.round3 = Some(Round3Result {
        turns: Vec::new(),
        decision_matrix: matrix.clone(),
        rationale: None,
        corrective_retries: 0,
    });
    state.advance(Stage::Round3Done, now).unwrap();

    let types: Vec<_> = criteria().iter().map(|c| c.criterion_type).collect();
    let ranked = topsis::rank(&matrix, &[1.0 / 3.0; 3], &types).unwrap();
    state.round4 = Some(Round4Result {
        final_ranking: ranked.final_ranking(),
        topsis: ranked,
    });
    state.advance(Stage::Round4Done, now).unwrap();
    state
}

/// Persona synthesis reply for [`sample_personas`].
#[must_use]
pub fn personas_reply() -> String {
    let agents: Vec<_> = sample_personas()
        .iter()
        .map(|p| {
            json!({
                "name": p.name,
                "perspective": p.perspective,
                "persona_description": p.description,
                "key_strengths": p.strengths,
                "debate_stance": p.stance,
                "value_anchor": p.value_anchor
            })
        })
        .collect();
    json!({ "agents": agents }).to_string()
}

/// Round 1 Director reply selecting `names`.
#[must_use]
pub fn criteria_reply(names: &[&str]) -> String {
    let selected: Vec<_> = names
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "description": format!("{name} of the career"),
                "type": "benefit",
                "source_agent": "Ava",
                "reasoning": format!("{name} tracks a core value")
            })
        })
        .collect();
    json!({
        "selected_criteria": selected,
        "summary": "The panel converged",
        "reasoning": "Each criterion maps to a stated value"
    })
    .to_string()
}

/// Round 2 Director reply. Keys are `"A vs B"`.
#[must_use]
pub fn pairwise_reply(pairs: &[(&str, f64)]) -> String {
    let matrix: serde_json::Map<String, serde_json::Value> =
        pairs.iter().map(|(k, v)| ((*k).to_string(), json!(v))).collect();
    json!({
        "comparison_matrix": matrix,
        "reasoning": "Weighed against the stated values"
    })
    .to_string()
}

/// Equal importance everywhere; CR 0.
pub const EQUAL_PAIRS: [(&str, f64); 3] = [
    ("Salary vs Impact", 1.0),
    ("Salary vs Balance", 1.0),
    ("Impact vs Balance", 1.0),
];

/// Consistent but unequal; CR about 0.033.
pub const CONSISTENT_PAIRS: [(&str, f64); 3] = [
    ("Salary vs Impact", 3.0),
    ("Salary vs Balance", 5.0),
    ("Impact vs Balance", 3.0),
];

/// Mildly circular; CR about 0.19.
pub const MILD_PAIRS: [(&str, f64); 3] = [
    ("Salary vs Impact", 2.0),
    ("Salary vs Balance", 1.0),
    ("Impact vs Balance", 2.0),
];

/// Strongly circular; CR far above any threshold.
pub const CYCLIC_PAIRS: [(&str, f64); 3] = [
    ("Salary vs Impact", 9.0),
    ("Impact vs Balance", 9.0),
    ("Balance vs Salary", 9.0),
];

/// Round 3 Director reply with one row per option over [`CRITERIA`].
#[must_use]
pub fn scoring_reply(rows: &[(&str, [f64; 3])]) -> String {
    let matrix: serde_json::Map<String, serde_json::Value> = rows
        .iter()
        .map(|(option, scores)| {
            let row: serde_json::Map<String, serde_json::Value> = CRITERIA
                .iter()
                .zip(scores)
                .map(|(c, s)| ((*c).to_string(), json!(s)))
                .collect();
            ((*option).to_string(), serde_json::Value::Object(row))
        })
        .collect();
    json!({
        "decision_matrix": matrix,
        "reasoning": "Scored against the panel's arguments"
    })
    .to_string()
}

/// Full score rows matching [`finished_session`].
pub const SCORE_ROWS: [(&str, [f64; 3]); 4] = [
    ("Computer Science", [9.0, 8.0, 6.5]),
    ("Physics", [7.0, 7.0, 5.0]),
    ("Law", [6.0, 5.0, 4.0]),
    ("Fine Arts", [3.0, 4.0, 6.0]),
];

/// Oracle that replies from per-label queues.
///
/// Debate turns (`*.turnNN`) without a scripted reply get a generic
/// argument; any other unscripted label fails with
/// [`OracleError::UnexpectedResponse`].
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    replies: Mutex<HashMap<String, VecDeque<Result<String, OracleError>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `label`.
    #[must_use]
    pub fn reply(self, label: &str, text: impl Into<String>) -> Self {
        self.push(label, Ok(text.into()));
        self
    }

    /// Queue an error for `label`.
    #[must_use]
    pub fn fail(self, label: &str, error: OracleError) -> Self {
        self.push(label, Err(error));
        self
    }

    fn push(&self, label: &str, reply: Result<String, OracleError>) {
        self.replies
            .lock()
            .unwrap()
            .entry(label.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Labels of every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls whose label starts with `prefix`.
    #[must_use]
    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|l| l.starts_with(prefix)).count()
    }
}

#[async_trait]
impl TextOracle for ScriptedOracle {
    async fn generate(&self, request: OracleRequest) -> Result<String, OracleError> {
        self.calls.lock().unwrap().push(request.label.clone());
        let queued = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&request.label)
            .and_then(VecDeque::pop_front);
        match queued {
            Some(reply) => reply,
            None if request.label.contains(".turn") => {
                Ok(format!("Argument for {}", request.label))
            }
            None => Err(OracleError::UnexpectedResponse {
                message: format!("no scripted reply for {}", request.label),
            }),
        }
    }
}

/// An oracle scripted for a clean run: equal weights and [`SCORE_ROWS`].
#[must_use]
pub fn happy_oracle() -> ScriptedOracle {
    ScriptedOracle::new()
        .reply("personas", personas_reply())
        .reply("round1.synthesis", criteria_reply(&CRITERIA))
        .reply("round2.synthesis", pairwise_reply(&EQUAL_PAIRS))
        .reply("round3.synthesis", scoring_reply(&SCORE_ROWS))
}
