//! Pure numeric engine.
//!
//! - [`ahp`]: criteria weights and consistency from pairwise comparisons
//! - [`topsis`]: ranking of options by closeness to the ideal solution
//!
//! Nothing here performs I/O; identical inputs give identical outputs.

pub mod ahp;
pub mod topsis;

pub use ahp::{AhpResult, ComparisonMatrix};
pub use topsis::{RankedOption, TopsisOption, TopsisResult};
