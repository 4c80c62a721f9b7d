//! Round artifact operations.

use sqlx::Row;

use super::core::SqliteStorage;
use crate::error::StorageError;
use crate::workflow::{RoundArtifact, SessionState};

impl SqliteStorage {
    /// Append an artifact and replace the snapshot in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DuplicateArtifact`] if the round is already
    /// recorded; nothing is written in that case.
    pub async fn commit_checkpoint(
        &self,
        state: &SessionState,
        artifact: &RoundArtifact,
    ) -> Result<(), StorageError> {
        let payload =
            serde_json::to_string(&artifact.payload).map_err(|e| Self::serialization_error(&e))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::query_error("BEGIN", format!("{e}")))?;

        Self::write_session(&mut *tx, state).await?;

        sqlx::query(
            "INSERT INTO round_artifacts (id, session_id, round, artifact, payload, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Self::generate_id())
        .bind(&artifact.session_id)
        .bind(i64::from(artifact.round))
        .bind(&artifact.artifact)
        .bind(payload)
        .bind(artifact.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StorageError::DuplicateArtifact {
                    session_id: artifact.session_id.clone(),
                    round: artifact.round,
                }
            }
            other => Self::query_error("INSERT round_artifacts", format!("{other}")),
        })?;

        tx.commit()
            .await
            .map_err(|e| Self::query_error("COMMIT", format!("{e}")))?;

        tracing::debug!(
            session_id = %artifact.session_id,
            round = artifact.round,
            artifact = %artifact.artifact,
            "Checkpoint committed"
        );
        Ok(())
    }

    /// Artifacts of a session, ordered by round.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the query fails or stored data is invalid.
    pub async fn fetch_artifacts(&self, session_id: &str) -> Result<Vec<RoundArtifact>, StorageError> {
        let rows = sqlx::query(
            "SELECT session_id, round, artifact, payload, created_at \
             FROM round_artifacts WHERE session_id = ? ORDER BY round ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Self::query_error("SELECT round_artifacts", format!("{e}")))?;

        rows.iter()
            .map(|row| {
                let round: i64 = row.get("round");
                let payload: String = row.get("payload");
                let created_at: String = row.get("created_at");
                Ok(RoundArtifact {
                    session_id: row.get("session_id"),
                    round: u8::try_from(round).map_err(|_| StorageError::Internal {
                        message: format!("stored round {round} out of range"),
                    })?,
                    artifact: row.get("artifact"),
                    payload: serde_json::from_str(&payload)
                        .map_err(|e| Self::serialization_error(&e))?,
                    created_at: Self::parse_datetime(&created_at)?,
                })
            })
            .collect()
    }
}
