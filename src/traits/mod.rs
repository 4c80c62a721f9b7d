//! Trait definitions for mockable dependencies.
//!
//! This module defines traits for:
//! - [`TextOracle`]: text-generation capability
//! - [`SessionStore`]: checkpoint persistence
//! - [`TimeProvider`]: Time abstraction for testing
//!
//! # Mocking
//!
//! All traits are annotated with `#[cfg_attr(test, mockall::automock)]`
//! which generates mock implementations automatically for testing.
//!
//! # Example
//!
//! ```
//! use major_advisor::traits::{TimeProvider, RealTimeProvider};
//!
//! let time_provider = RealTimeProvider;
//! let now = time_provider.now();
//! println!("Current time: {now}");
//! ```

mod types;

pub use types::OracleRequest;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{OracleError, StorageError};
use crate::workflow::{RoundArtifact, SessionState};

/// Text-generation oracle: given a prompt, produce text.
///
/// Implementations make exactly one attempt per call; retries and backoff
/// belong to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextOracle: Send + Sync {
    /// Generate text for the request.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`]; check [`OracleError::is_retryable`] to tell
    /// transient failures from fatal ones.
    async fn generate(&self, request: OracleRequest) -> Result<String, OracleError>;
}

/// Persistence collaborator for session snapshots and round artifacts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert or replace the session snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn save_session(&self, state: &SessionState) -> Result<(), StorageError>;

    /// Append a round artifact and replace the snapshot atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DuplicateArtifact`] if the round was already
    /// recorded for this session, leaving the stored snapshot untouched.
    async fn save_checkpoint(
        &self,
        state: &SessionState,
        artifact: &RoundArtifact,
    ) -> Result<(), StorageError>;

    /// Load the latest snapshot. Returns `None` if the session doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn load_session(&self, session_id: &str) -> Result<Option<SessionState>, StorageError>;

    /// All artifacts for a session, ordered by round.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database operation fails.
    async fn get_artifacts(&self, session_id: &str) -> Result<Vec<RoundArtifact>, StorageError>;
}

/// Time provider trait for deterministic testing.
#[cfg_attr(test, mockall::automock)]
pub trait TimeProvider: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Real time provider using system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
