//! Exit policy for the Round 2 consistency loop.
//!
//! After every attempt the loop asks [`decide`] whether to accept or run
//! another debate. Giving up is an ordinary outcome: once the retry budget
//! is spent, the attempt with the lowest ratio is used and flagged.

use serde::{Deserialize, Serialize};

/// Whether the accepted comparison matrix met the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyStatus {
    /// Ratio at or below the threshold.
    Passed,
    /// Retries exhausted; best attempt used anyway.
    FailedButUsed,
}

impl ConsistencyStatus {
    /// Snake-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::FailedButUsed => "failed_but_used",
        }
    }
}

impl std::fmt::Display for ConsistencyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyDecision {
    /// Use attempt `index` (0-based).
    Accept {
        /// Which attempt to keep.
        index: usize,
        /// How it is flagged.
        status: ConsistencyStatus,
    },
    /// Debate the comparisons again.
    Retry,
}

/// Decide given the ratios of all attempts so far, oldest first.
///
/// `max_retries` counts re-runs after the first attempt.
#[must_use]
pub fn decide(history: &[f64], threshold: f64, max_retries: u32) -> ConsistencyDecision {
    let Some((&last, _)) = history.split_last() else {
        return ConsistencyDecision::Retry;
    };
    if last <= threshold {
        return ConsistencyDecision::Accept {
            index: history.len() - 1,
            status: ConsistencyStatus::Passed,
        };
    }

    let retries_used = history.len() - 1;
    if retries_used < max_retries as usize {
        return ConsistencyDecision::Retry;
    }

    let best = history
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map_or(0, |(i, _)| i);
    ConsistencyDecision::Accept {
        index: best,
        status: ConsistencyStatus::FailedButUsed,
    }
}
