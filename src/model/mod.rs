//! Domain data types.
//!
//! - [`UserProfile`] / [`SessionSettings`]: validated user input
//! - [`Persona`], [`Speaker`]: debate participants
//! - [`DebateTurn`], [`TurnType`]: transcript entries
//! - [`Criterion`], [`CriterionType`]: evaluation criteria
//! - [`SaatyValue`], [`PairwiseComparison`], [`DecisionMatrix`]: numeric inputs

mod criteria;
mod debate;
mod matrix;
mod persona;
mod profile;

pub use criteria::{Criterion, CriterionType};
pub use debate::{DebateTurn, Speaker, TurnType, DIRECTOR_NAME};
pub use matrix::{missing_cells, DecisionMatrix, PairwiseComparison, SaatyValue, ScoreSheet};
pub use persona::Persona;
pub use profile::{SessionSettings, UserProfile, MIN_TEXT_LENGTH};
