//! Pairwise tournament: plan every ordered comparison, collect judgments
//! concurrently, and reduce them to a win-count matrix for the
//! Bradley-Terry estimator.

pub mod aggregate;
pub mod collector;
pub mod config;
pub mod error;
pub mod judge;
pub mod planner;
pub mod run;
pub mod types;

pub use aggregate::WinCountMatrix;
pub use collector::{
    collect_outcomes, Collection, JudgmentEvent, JudgmentObserver, JudgmentOracle,
    JudgmentStatus, ObserverError,
};
pub use config::{TournamentConfig, MAX_COMPETITORS};
pub use error::TournamentError;
pub use judge::{parse_judgment_response, JudgeError, LlmJudge, Preferred};
pub use planner::plan_comparisons;
pub use run::{run_tournament, TournamentResult};
pub use types::{CollectionReport, ComparisonTask, OracleFailure, Outcome, StrengthEstimate};
