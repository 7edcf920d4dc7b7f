//! Value types shared by the planner, collector, aggregator and estimator.

use serde::{Deserialize, Serialize};

/// One pairwise judgment to run: "is `item_a` or `item_b` better in regard
/// to `attribute`?" Both presentation orders are planned as separate tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComparisonTask {
    pub item_a: String,
    pub item_b: String,
    pub attribute: String,
    /// Judge model id, passed through untouched.
    pub model: String,
}

/// A successful judgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub winner: String,
    pub loser: String,
    pub attribute: String,
    pub reason: String,
}

impl Outcome {
    pub fn new(
        winner: impl Into<String>,
        loser: impl Into<String>,
        attribute: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            winner: winner.into(),
            loser: loser.into(),
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }
}

/// Bradley-Terry strength for one competitor. Only ratios between
/// strengths carry meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthEstimate {
    pub competitor: String,
    pub strength: f64,
}

/// A judgment that failed and was dropped from the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleFailure {
    pub task: ComparisonTask,
    pub error: String,
}

/// Counts for a finished (or cancelled) collection run.
///
/// `completed + failed + cancelled == submitted` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionReport {
    pub submitted: usize,
    pub completed: usize,
    pub failed: usize,
    /// Tasks skipped because the cancel flag was raised before they started.
    pub cancelled: usize,
    pub failures: Vec<OracleFailure>,
}

impl CollectionReport {
    pub fn finished(&self) -> usize {
        self.completed + self.failed + self.cancelled
    }
}
