//! `SessionStore` implementation for `SqliteStorage`.

use async_trait::async_trait;

use super::core::SqliteStorage;
use crate::error::StorageError;
use crate::traits::SessionStore;
use crate::workflow::{RoundArtifact, SessionState};

#[async_trait]
impl SessionStore for SqliteStorage {
    async fn save_session(&self, state: &SessionState) -> Result<(), StorageError> {
        self.store_session(state).await
    }

    async fn save_checkpoint(
        &self,
        state: &SessionState,
        artifact: &RoundArtifact,
    ) -> Result<(), StorageError> {
        self.commit_checkpoint(state, artifact).await
    }

    async fn load_session(&self, session_id: &str) -> Result<Option<SessionState>, StorageError> {
        self.fetch_session(session_id).await
    }

    async fn get_artifacts(&self, session_id: &str) -> Result<Vec<RoundArtifact>, StorageError> {
        self.fetch_artifacts(session_id).await
    }
}
