//! Integration tests for the decision pipeline.
//!
//! Every test drives [`major_advisor::workflow::WorkflowEngine`] with a
//! deterministic scripted oracle and a real `SQLite` store.

pub mod support;

mod consistency;
mod end_to_end;
mod resume;
