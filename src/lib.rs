#![forbid(unsafe_code)]

//! # tournament-harness
//!
//! Rank a set of competitors by asking an LLM which of two is better.
//!
//! Every ordered pair is judged once per attribute, with bounded
//! concurrency. The resulting win counts are fit with a Bradley-Terry model,
//! giving each competitor a positive strength where
//! P(i beats j) = s_i / (s_i + s_j).
//!
//! The pipeline is usable piecewise ([`plan_comparisons`],
//! [`collect_outcomes`], [`WinCountMatrix`], [`BradleyTerry`]) or end to end
//! through [`run_tournament`]. Any [`JudgmentOracle`] can stand in for the
//! LLM judge.

pub mod bradley_terry;
pub mod gateway;
pub mod prompts;
pub mod tournament;

pub use bradley_terry::{estimate_strengths, BradleyTerry, FitSummary};
pub use gateway::{ChatGateway, GatewayConfig, ProviderError, ProviderGateway};
pub use tournament::{
    collect_outcomes, plan_comparisons, run_tournament, Collection, CollectionReport,
    ComparisonTask, JudgeError, JudgmentEvent, JudgmentObserver, JudgmentOracle, LlmJudge,
    ObserverError, OracleFailure, Outcome, StrengthEstimate, TournamentConfig, TournamentError,
    TournamentResult, WinCountMatrix,
};
