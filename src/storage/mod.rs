//! Storage backend.
//!
//! `SQLite` via `sqlx`, split into:
//! - `core`: pool, migrations, helpers
//! - `session`: snapshot upsert and load
//! - `artifact`: transactional checkpoints and artifact reads
//! - `trait_impl`: [`SessionStore`](crate::traits::SessionStore) implementation
//!
//! # Example
//!
//! ```ignore
//! use major_advisor::storage::SqliteStorage;
//!
//! let storage = SqliteStorage::new("./data/advisor.db").await?;
//! let state = storage.fetch_session("3f2a...").await?;
//! ```

mod artifact;
mod core;
mod session;
mod trait_impl;

pub use self::core::SqliteStorage;
