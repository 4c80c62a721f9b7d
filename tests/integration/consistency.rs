//! Round 2 consistency loop against a file-backed store.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::sync::Arc;

use major_advisor::traits::SessionStore;
use major_advisor::workflow::ConsistencyStatus;

use super::support::{
    engine, file_store, pairwise_reply, profile, scoring_reply, through_round1, CONSISTENT_PAIRS,
    CYCLIC_PAIRS, MILD_PAIRS, SCORE_ROWS,
};

#[tokio::test]
async fn test_retry_prompt_carries_previous_ratio() {
    let (store, _dir) = file_store().await;
    let oracle = Arc::new(
        through_round1()
            .reply("round2.synthesis", pairwise_reply(&CYCLIC_PAIRS))
            .reply("round2.synthesis", pairwise_reply(&CONSISTENT_PAIRS))
            .reply("round3.synthesis", scoring_reply(&SCORE_ROWS)),
    );
    let state = engine(&oracle, &store).run(profile()).await.unwrap();

    let round2 = state.round2.as_ref().unwrap();
    assert_eq!(round2.retry_count, 1);
    assert_eq!(round2.consistency_status, ConsistencyStatus::Passed);
    assert!(round2.consistency_ratio <= 0.1);

    let openers: Vec<String> = oracle
        .requests()
        .into_iter()
        .filter(|r| r.label == "round2.turn01")
        .map(|r| r.prompt)
        .collect();
    assert_eq!(openers.len(), 2);
    let previous = format!("{:.3}", round2.attempt_history[0]);
    assert!(!openers[0].contains(&previous));
    assert!(openers[1].contains(&previous));
}

#[tokio::test]
async fn test_exhausted_retries_use_best_attempt() {
    let (store, _dir) = file_store().await;
    let oracle = Arc::new(
        through_round1()
            .reply("round2.synthesis", pairwise_reply(&CYCLIC_PAIRS))
            .reply("round2.synthesis", pairwise_reply(&CYCLIC_PAIRS))
            .reply("round2.synthesis", pairwise_reply(&MILD_PAIRS))
            .reply("round3.synthesis", scoring_reply(&SCORE_ROWS)),
    );
    let state = engine(&oracle, &store).run(profile()).await.unwrap();

    let round2 = state.round2.as_ref().unwrap();
    assert_eq!(round2.consistency_status, ConsistencyStatus::FailedButUsed);
    assert_eq!(round2.attempt_history.len(), 3);
    assert_eq!(round2.consistency_ratio, round2.attempt_history[2]);
    assert!(state.round4.is_some());

    let artifacts = store.get_artifacts(&state.id).await.unwrap();
    let payload = &artifacts[2].payload;
    assert_eq!(payload["consistency_status"], "failed_but_used");
    assert_eq!(payload["retry_count"], 2);
}
