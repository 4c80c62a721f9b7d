//! Scripted oracle and fixtures shared by the integration tests.

#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tempfile::TempDir;

use major_advisor::config::PipelinePolicy;
use major_advisor::error::OracleError;
use major_advisor::model::{SessionSettings, UserProfile};
use major_advisor::storage::SqliteStorage;
use major_advisor::traits::{OracleRequest, TextOracle};
use major_advisor::workflow::WorkflowEngine;

pub const OPTIONS: [&str; 4] = ["Computer Science", "Physics", "Law", "Fine Arts"];
pub const CRITERIA: [&str; 3] = ["Salary", "Impact", "Balance"];

pub type Engine = WorkflowEngine<ScriptedOracle, SqliteStorage>;

/// Oracle that answers from per-label reply queues and records every call.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    replies: Mutex<HashMap<String, VecDeque<Result<String, OracleError>>>>,
    calls: Mutex<Vec<OracleRequest>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, label: &str, text: impl Into<String>) -> Self {
        self.queue(label, Ok(text.into()))
    }

    pub fn fail(self, label: &str, error: OracleError) -> Self {
        self.queue(label, Err(error))
    }

    fn queue(self, label: &str, reply: Result<String, OracleError>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(label.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<OracleRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.label.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl TextOracle for ScriptedOracle {
    async fn generate(&self, request: OracleRequest) -> Result<String, OracleError> {
        let label = request.label.clone();
        self.calls.lock().unwrap().push(request);
        let queued = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&label)
            .and_then(VecDeque::pop_front);
        match queued {
            Some(reply) => reply,
            None if label.contains(".turn") => Ok(format!("My argument for {label}.")),
            None => Err(OracleError::UnexpectedResponse {
                message: format!("no scripted reply for {label}"),
            }),
        }
    }
}

pub fn profile() -> UserProfile {
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

pub fn personas_reply() -> String {
    let agent = |name: &str, anchor: &str| {
        json!({
            "name": name,
            "perspective": format!("{name}'s lens"),
            "persona_description": format!("Speaks for {anchor}"),
            "key_strengths": [format!("arguing for {anchor}")],
            "debate_stance": format!("{anchor} first"),
            "value_anchor": anchor
        })
    };
    json!({
        "agents": [
            agent("Ava", "high pay"),
            agent("Ben", "meaningful impact"),
            agent("Cleo", "free time")
        ]
    })
    .to_string()
}

pub fn criteria_reply(names: &[&str]) -> String {
    let selected: Vec<Value> = names
        .iter()
        .map(|name| json!({"name": name, "description": format!("{name} of the career"), "type": "benefit"}))
        .collect();
    json!({"selected_criteria": selected, "summary": "Converged"}).to_string()
}

pub fn pairwise_reply(pairs: &[(&str, f64)]) -> String {
    let matrix: Map<String, Value> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), json!(v)))
        .collect();
    json!({"comparison_matrix": matrix, "reasoning": "Weighed"}).to_string()
}

pub fn scoring_reply(rows: &[(&str, [f64; 3])]) -> String {
    let matrix: Map<String, Value> = rows
        .iter()
        .map(|(option, scores)| {
            let row: Map<String, Value> = CRITERIA
                .iter()
                .zip(scores)
                .map(|(c, s)| ((*c).to_string(), json!(s)))
                .collect();
            ((*option).to_string(), Value::Object(row))
        })
        .collect();
    json!({"decision_matrix": matrix, "reasoning": "Scored"}).to_string()
}

pub const CONSISTENT_PAIRS: [(&str, f64); 3] = [
    ("Salary vs Impact", 3.0),
    ("Salary vs Balance", 5.0),
    ("Impact vs Balance", 3.0),
];

pub const MILD_PAIRS: [(&str, f64); 3] = [
    ("Salary vs Impact", 2.0),
    ("Salary vs Balance", 1.0),
    ("Impact vs Balance", 2.0),
];

pub const CYCLIC_PAIRS: [(&str, f64); 3] = [
    ("Salary vs Impact", 9.0),
    ("Impact vs Balance", 9.0),
    ("Balance vs Salary", 9.0),
];

pub const SCORE_ROWS: [(&str, [f64; 3]); 4] = [
    ("Computer Science", [9.0, 8.0, 6.5]),
    ("Physics", [7.0, 7.0, 5.0]),
    ("Law", [6.0, 5.0, 4.0]),
    ("Fine Arts", [3.0, 4.0, 6.0]),
];

/// Personas and a valid Round 1; later rounds are up to the test.
pub fn through_round1() -> ScriptedOracle {
    ScriptedOracle::new()
        .reply("personas", personas_reply())
        .reply("round1.synthesis", criteria_reply(&CRITERIA))
}

pub fn happy_oracle() -> ScriptedOracle {
    through_round1()
        .reply("round2.synthesis", pairwise_reply(&CONSISTENT_PAIRS))
        .reply("round3.synthesis", scoring_reply(&SCORE_ROWS))
}

/// File-backed store in a fresh temp dir. Keep the `TempDir` alive.
pub async fn file_store() -> (Arc<SqliteStorage>, TempDir) {
    let dir = TempDir::new().unwrap();
    let storage = SqliteStorage::new(dir.path().join("advisor.db")).await.unwrap();
    (Arc::new(storage), dir)
}

pub fn policy() -> PipelinePolicy {
    PipelinePolicy::default().without_delay()
}

pub fn engine(oracle: &Arc<ScriptedOracle>, store: &Arc<SqliteStorage>) -> Engine {
    WorkflowEngine::new(Arc::clone(oracle), Arc::clone(store), policy())
}
