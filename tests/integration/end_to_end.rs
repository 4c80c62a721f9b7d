//! Full pipeline runs: four options, three criteria, threshold 0.1.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::collections::BTreeSet;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use major_advisor::model::{SaatyValue, Speaker, TurnType};
use major_advisor::traits::SessionStore;
use major_advisor::workflow::{
    build_report, render_markdown, ConsistencyStatus, Stage, ARTIFACT_NAMES,
};

use super::support::{engine, file_store, happy_oracle, profile, OPTIONS};

#[tokio::test]
async fn test_four_options_three_criteria() {
    let (store, _dir) = file_store().await;
    let oracle = Arc::new(happy_oracle());
    let state = engine(&oracle, &store).run(profile()).await.unwrap();
    assert_eq!(state.stage, Stage::Round4Done);

    let round1 = state.round1.as_ref().unwrap();
    let names: BTreeSet<_> = round1.criteria.iter().map(|c| c.name.to_lowercase()).collect();
    assert_eq!(round1.criteria.len(), 3);
    assert_eq!(names.len(), 3);

    let round2 = state.round2.as_ref().unwrap();
    assert_eq!(round2.comparisons.len(), 3);
    let total: f64 = round2.weight_values().iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!(
        round2.consistency_ratio <= 0.1
            || round2.consistency_status == ConsistencyStatus::FailedButUsed
    );

    let matrix = &state.round3.as_ref().unwrap().decision_matrix;
    assert_eq!(matrix.cell_count(), 12);
    for row in matrix.rows() {
        for &score in row {
            assert!(SaatyValue::new(score).is_ok(), "{score} is off the scale");
        }
    }

    let ranking = &state.round4.as_ref().unwrap().final_ranking;
    let ranks: Vec<usize> = ranking.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);
    let ranked: BTreeSet<&str> = ranking.iter().map(|r| r.option.as_str()).collect();
    assert_eq!(ranked, OPTIONS.iter().copied().collect::<BTreeSet<_>>());
    for pair in ranking.windows(2) {
        assert!(pair[0].closeness_coefficient >= pair[1].closeness_coefficient);
    }
    assert_eq!(ranking[0].option, "Computer Science");
}

#[tokio::test]
async fn test_rounds_have_thirteen_turns_in_rotation() {
    let (store, _dir) = file_store().await;
    let oracle = Arc::new(happy_oracle());
    let state = engine(&oracle, &store).run(profile()).await.unwrap();

    let turns = &state.round1.as_ref().unwrap().turns;
    assert_eq!(turns.len(), 13);
    let indices: Vec<u8> = turns.iter().map(|t| t.turn_index).collect();
    assert_eq!(indices, (1..=13).collect::<Vec<u8>>());

    let leaders: Vec<&str> = [0, 4, 8]
        .iter()
        .map(|&i| turns[i].speaker.name())
        .collect();
    assert_eq!(leaders, vec!["Ava", "Ben", "Cleo"]);
    assert!(turns[..12].iter().all(|t| !t.speaker.is_director()));
    assert_eq!(turns[12].speaker, Speaker::Director);
    assert_eq!(turns[12].turn_type, TurnType::FinalDecision);
    assert_eq!(turns[12].phase, 4);
}

#[tokio::test]
async fn test_prompts_carry_persona_context_and_temperatures() {
    let (store, _dir) = file_store().await;
    let oracle = Arc::new(happy_oracle());
    engine(&oracle, &store).run(profile()).await.unwrap();

    let requests = oracle.requests();
    let first_turn = requests.iter().find(|r| r.label == "round1.turn01").unwrap();
    assert!(first_turn.system_prompt.as_deref().unwrap().contains("Ava"));
    assert_eq!(first_turn.temperature, Some(0.5));

    let later_turn = requests.iter().find(|r| r.label == "round1.turn02").unwrap();
    assert!(later_turn.prompt.contains("My argument for round1.turn01."));

    let synthesis = requests.iter().find(|r| r.label == "round1.synthesis").unwrap();
    assert_eq!(synthesis.temperature, Some(0.0));
}

#[tokio::test]
async fn test_artifacts_and_report() {
    let (store, _dir) = file_store().await;
    let oracle = Arc::new(happy_oracle());
    let state = engine(&oracle, &store).run(profile()).await.unwrap();

    let artifacts = store.get_artifacts(&state.id).await.unwrap();
    let rounds: Vec<u8> = artifacts.iter().map(|a| a.round).collect();
    assert_eq!(rounds, vec![0, 1, 2, 3, 4]);
    let names: Vec<&str> = artifacts.iter().map(|a| a.artifact.as_str()).collect();
    assert_eq!(names, ARTIFACT_NAMES.to_vec());

    let report = build_report(&state).unwrap();
    assert_eq!(report.session_id, state.id);
    assert_eq!(report.recommendations.len(), 3);
    assert_eq!(report.recommendations[0].option, "Computer Science");
    let markdown = render_markdown(&report);
    assert!(markdown.contains("Computer Science"));
    assert!(markdown.contains("Salary"));
}
