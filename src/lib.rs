//! Major Advisor
//!
//! Recommends an academic major by letting three synthesized personas debate
//! the user's options, then turning the debate into numbers.
//!
//! # Pipeline
//!
//! 1. Persona synthesis: three value-anchored agents from the user's profile
//! 2. Round 1: debate and select the decision criteria
//! 3. Round 2: pairwise comparisons weighted with AHP, re-debated until consistent
//! 4. Round 3: score every option on every criterion
//! 5. Round 4: rank the options with TOPSIS
//!
//! Every round is a 13-turn debate (12 persona turns and a Director
//! synthesis) run by [`debate::DebateEngine`]. [`workflow::WorkflowEngine`]
//! checkpoints each round to a [`traits::SessionStore`] so a session can
//! resume after a failure.
//!
//! # Quick Start
//!
//! ```bash
//! ANTHROPIC_API_KEY=sk-ant-xxx ./major-advisor profile.json
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐      ┌─────────────────┐      ┌──────────────┐
//! │ UserProfile  │─────▶│ WorkflowEngine  │─────▶│ DebateEngine │──▶ Anthropic API
//! └──────────────┘      └────────┬────────┘      └──────────────┘
//!                                │ checkpoints
//!                                ▼
//!                              SQLite
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod anthropic;
pub mod caller;
pub mod config;
pub mod debate;
pub mod error;
pub mod model;
pub mod numeric;
pub mod parsing;
pub mod persona;
pub mod prompts;
pub mod storage;
pub mod traits;
pub mod workflow;

#[cfg(test)]
mod test_utils;
