//! Interrupted sessions continue from their last stored checkpoint.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use major_advisor::error::{OracleError, PipelineError};
use major_advisor::storage::SqliteStorage;
use major_advisor::traits::SessionStore;
use major_advisor::workflow::Stage;

use super::support::{
    engine, file_store, pairwise_reply, profile, scoring_reply, through_round1, ScriptedOracle,
    CONSISTENT_PAIRS, SCORE_ROWS,
};

#[tokio::test]
async fn test_resume_after_fatal_oracle_error() {
    let (store, _dir) = file_store().await;
    let first = Arc::new(
        through_round1()
            .reply("round2.synthesis", pairwise_reply(&CONSISTENT_PAIRS))
            .fail("round3.synthesis", OracleError::AuthenticationFailed),
    );
    let err = engine(&first, &store).run(profile()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Oracle { round: 3, .. }));
    assert!(err.is_resumable());

    let session_id = store
        .session_ids_at(Stage::Round2Done.as_str())
        .await
        .unwrap()
        .pop()
        .unwrap();
    let stored = store.load_session(&session_id).await.unwrap().unwrap();
    assert_eq!(stored.version, 4);
    assert!(stored.round3.is_none());

    let second = Arc::new(
        ScriptedOracle::new().reply("round3.synthesis", scoring_reply(&SCORE_ROWS)),
    );
    let state = engine(&second, &store).resume(&session_id).await.unwrap();

    assert_eq!(state.stage, Stage::Round4Done);
    assert_eq!(state.version, 6);
    assert_eq!(state.round1, stored.round1);
    assert_eq!(state.round2, stored.round2);
    assert_eq!(second.count("personas") + second.count("round1") + second.count("round2"), 0);
    assert_eq!(second.count("round3.turn"), 12);
    assert_eq!(store.get_artifacts(&session_id).await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_resume_after_reopening_database() {
    let (store, dir) = file_store().await;
    let oracle = Arc::new(
        through_round1().fail("round2.synthesis", OracleError::AuthenticationFailed),
    );
    engine(&oracle, &store).run(profile()).await.unwrap_err();
    let session_id = store
        .session_ids_at(Stage::Round1Done.as_str())
        .await
        .unwrap()
        .pop()
        .unwrap();
    drop(store);

    let reopened = Arc::new(SqliteStorage::new(dir.path().join("advisor.db")).await.unwrap());
    let second = Arc::new(
        ScriptedOracle::new()
            .reply("round2.synthesis", pairwise_reply(&CONSISTENT_PAIRS))
            .reply("round3.synthesis", scoring_reply(&SCORE_ROWS)),
    );
    let state = engine(&second, &reopened).resume(&session_id).await.unwrap();
    assert_eq!(state.stage, Stage::Round4Done);
    assert_eq!(second.count("round1"), 0);
}

#[tokio::test]
async fn test_transient_exhaustion_is_distinguishable() {
    let (store, _dir) = file_store().await;
    let oracle = Arc::new(
        ScriptedOracle::new()
            .fail("personas", OracleError::Timeout { timeout_ms: 10 })
            .fail("personas", OracleError::Timeout { timeout_ms: 10 })
            .fail("personas", OracleError::Timeout { timeout_ms: 10 })
            .fail("personas", OracleError::Timeout { timeout_ms: 10 }),
    );
    let err = engine(&oracle, &store).run(profile()).await.unwrap_err();

    assert!(err.is_transient());
    assert_eq!(err.round(), Some(0));
    assert_eq!(oracle.count("personas"), 4);
    let created = store.session_ids_at(Stage::Created.as_str()).await.unwrap();
    assert_eq!(created.len(), 1);
}

#[tokio::test]
async fn test_resume_unknown_session() {
    let (store, _dir) = file_store().await;
    let oracle = Arc::new(ScriptedOracle::new());
    let err = engine(&oracle, &store).resume("nope").await.unwrap_err();
    assert_eq!(
        err,
        PipelineError::SessionNotFound {
            session_id: "nope".into()
        }
    );
}
