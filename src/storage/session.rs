//! Session snapshot operations.

use sqlx::{Row, SqliteConnection};

use super::core::SqliteStorage;
use crate::error::StorageError;
use crate::workflow::SessionState;

impl SqliteStorage {
    /// Insert or replace a session snapshot on an open connection.
    pub(crate) async fn write_session(
        conn: &mut SqliteConnection,
        state: &SessionState,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(state).map_err(|e| Self::serialization_error(&e))?;
        let version = i64::try_from(state.version).map_err(|_| StorageError::Internal {
            message: format!("session version {} out of range", state.version),
        })?;

        sqlx::query(
            "INSERT INTO sessions (id, stage, version, state, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
               stage = excluded.stage, \
               version = excluded.version, \
               state = excluded.state, \
               updated_at = excluded.updated_at",
        )
        .bind(&state.id)
        .bind(state.stage.as_str())
        .bind(version)
        .bind(json)
        .bind(state.created_at.to_rfc3339())
        .bind(state.updated_at.to_rfc3339())
        .execute(&mut *conn)
        .await
        .map_err(|e| Self::query_error("UPSERT sessions", format!("{e}")))?;

        Ok(())
    }

    /// Store a session snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if encoding or the query fails.
    pub async fn store_session(&self, state: &SessionState) -> Result<(), StorageError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| Self::query_error("ACQUIRE connection", format!("{e}")))?;
        Self::write_session(&mut *conn, state).await?;
        tracing::debug!(session_id = %state.id, stage = %state.stage, "Session stored");
        Ok(())
    }

    /// Load the latest snapshot of a session.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the query fails or the stored JSON is invalid.
    pub async fn fetch_session(&self, id: &str) -> Result<Option<SessionState>, StorageError> {
        let row = sqlx::query("SELECT state FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::query_error("SELECT sessions", format!("{e}")))?;

        row.map(|row| {
            let json: String = row.get("state");
            serde_json::from_str(&json).map_err(|e| Self::serialization_error(&e))
        })
        .transpose()
    }

    /// Ids of sessions at a given stage, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the query fails.
    pub async fn session_ids_at(&self, stage: &str) -> Result<Vec<String>, StorageError> {
        let rows = sqlx::query("SELECT id FROM sessions WHERE stage = ? ORDER BY updated_at DESC")
            .bind(stage)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::query_error("SELECT sessions by stage", format!("{e}")))?;
        Ok(rows.iter().map(|row| row.get("id")).collect())
    }
}
