//! End-to-end tournament: plan, collect, aggregate, fit.

use std::sync::atomic::AtomicBool;

use serde::Serialize;
use tracing::info;

use crate::bradley_terry::{BradleyTerry, FitSummary};

use super::aggregate::WinCountMatrix;
use super::collector::{collect_outcomes, JudgmentObserver, JudgmentOracle};
use super::config::TournamentConfig;
use super::error::TournamentError;
use super::planner::plan_comparisons;
use super::types::{CollectionReport, StrengthEstimate};

#[derive(Debug, Clone, Serialize)]
pub struct TournamentResult {
    /// Strengths sorted by descending strength.
    pub strengths: Vec<StrengthEstimate>,
    pub matrix: WinCountMatrix,
    pub report: CollectionReport,
    pub fit: FitSummary,
}

/// Run a full tournament over `config.competitors`.
///
/// Oracle failures are absorbed into `report`; the fit runs on whatever
/// outcomes remain and fails with `NoComparisons` if none do.
pub async fn run_tournament<O>(
    oracle: &O,
    config: &TournamentConfig,
    observer: Option<&dyn JudgmentObserver>,
    cancel_flag: Option<&AtomicBool>,
) -> Result<TournamentResult, TournamentError>
where
    O: JudgmentOracle + ?Sized,
{
    config.validate()?;

    let tasks = plan_comparisons(&config.competitors, &config.attributes, &config.model)?;
    info!(
        competitors = config.competitors.len(),
        attributes = config.attributes.len(),
        tasks = tasks.len(),
        model = %config.model,
        "Starting tournament"
    );

    let collection =
        collect_outcomes(oracle, tasks, config.concurrency, observer, cancel_flag).await?;
    let matrix = WinCountMatrix::from_outcomes(&config.competitors, &collection.outcomes)?;
    let fit = BradleyTerry::new(config.estimator.clone()).fit(&matrix)?;

    Ok(TournamentResult {
        strengths: fit.ranked(),
        matrix,
        report: collection.report,
        fit,
    })
}
