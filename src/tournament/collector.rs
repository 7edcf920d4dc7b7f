//! Concurrent judgment collection.
//!
//! Runs every planned task against a [`JudgmentOracle`] with bounded
//! parallelism. A failing task is logged, recorded in the report and
//! dropped; it never aborts the batch and is never retried.

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::error::TournamentError;
use super::types::{CollectionReport, ComparisonTask, OracleFailure, Outcome};

/// Anything that can adjudicate a single comparison.
#[async_trait::async_trait]
pub trait JudgmentOracle: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn judge(&self, task: &ComparisonTask) -> Result<Outcome, Self::Error>;
}

/// Result of one task. Each task yields exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum JudgmentStatus {
    Completed(Outcome),
    Failed(String),
    /// The cancel flag was set before the task started.
    Cancelled,
}

/// Emitted once per finished task, in completion order.
#[derive(Debug, Clone)]
pub struct JudgmentEvent {
    pub task: ComparisonTask,
    pub status: JudgmentStatus,
    /// Tasks finished so far, this one included.
    pub finished: usize,
    pub submitted: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    #[error("{0}")]
    Message(String),
}

/// Per-judgment side effects (progress display, persistence). Errors are
/// logged and otherwise ignored.
#[async_trait::async_trait]
pub trait JudgmentObserver: Send + Sync {
    async fn on_judgment(&self, event: &JudgmentEvent) -> Result<(), ObserverError>;
}

/// Outcomes of the successful tasks plus the bookkeeping for all of them.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub outcomes: Vec<Outcome>,
    pub report: CollectionReport,
}

pub async fn collect_outcomes<O>(
    oracle: &O,
    tasks: Vec<ComparisonTask>,
    concurrency: usize,
    observer: Option<&dyn JudgmentObserver>,
    cancel_flag: Option<&AtomicBool>,
) -> Result<Collection, TournamentError>
where
    O: JudgmentOracle + ?Sized,
{
    if tasks.is_empty() {
        return Err(TournamentError::InvalidInput(
            "no comparison tasks to run".into(),
        ));
    }
    if concurrency == 0 {
        return Err(TournamentError::InvalidInput(
            "concurrency must be >= 1".into(),
        ));
    }

    let submitted = tasks.len();
    let mut report = CollectionReport {
        submitted,
        ..CollectionReport::default()
    };
    let mut outcomes = Vec::with_capacity(submitted);

    let mut results = stream::iter(tasks.into_iter().map(move |task| async move {
        if cancel_flag.is_some_and(|flag| flag.load(AtomicOrdering::Relaxed)) {
            return (task, JudgmentStatus::Cancelled);
        }
        let status = match oracle.judge(&task).await {
            Ok(outcome) => JudgmentStatus::Completed(outcome),
            Err(e) => JudgmentStatus::Failed(e.to_string()),
        };
        (task, status)
    }))
    .buffer_unordered(concurrency);

    while let Some((task, status)) = results.next().await {
        match &status {
            JudgmentStatus::Completed(outcome) => {
                report.completed += 1;
                debug!(
                    item_a = %task.item_a,
                    item_b = %task.item_b,
                    attribute = %task.attribute,
                    winner = %outcome.winner,
                    "Judgment completed"
                );
            }
            JudgmentStatus::Failed(error) => {
                report.failed += 1;
                warn!(
                    item_a = %task.item_a,
                    item_b = %task.item_b,
                    attribute = %task.attribute,
                    model = %task.model,
                    error = %error,
                    "Judgment failed; dropping task"
                );
            }
            JudgmentStatus::Cancelled => report.cancelled += 1,
        }

        let event = JudgmentEvent {
            task,
            status,
            finished: report.finished(),
            submitted,
        };
        if let Some(observer) = observer {
            if let Err(e) = observer.on_judgment(&event).await {
                warn!(error = %e, "Judgment observer failed");
            }
        }

        match event.status {
            JudgmentStatus::Completed(outcome) => outcomes.push(outcome),
            JudgmentStatus::Failed(error) => report.failures.push(OracleFailure {
                task: event.task,
                error,
            }),
            JudgmentStatus::Cancelled => {}
        }
    }

    info!(
        submitted = report.submitted,
        completed = report.completed,
        failed = report.failed,
        cancelled = report.cancelled,
        "Judgment collection finished"
    );

    Ok(Collection { outcomes, report })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("unreachable judge")]
    struct Unreachable;

    struct NeverCalled;

    #[async_trait::async_trait]
    impl JudgmentOracle for NeverCalled {
        type Error = Unreachable;

        async fn judge(&self, _task: &ComparisonTask) -> Result<Outcome, Self::Error> {
            panic!("oracle must not be called");
        }
    }

    fn task() -> ComparisonTask {
        ComparisonTask {
            item_a: "a".into(),
            item_b: "b".into(),
            attribute: "q".into(),
            model: "m".into(),
        }
    }

    #[tokio::test]
    async fn rejects_empty_task_list() {
        let err = collect_outcomes(&NeverCalled, Vec::new(), 4, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TournamentError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn rejects_zero_concurrency() {
        let err = collect_outcomes(&NeverCalled, vec![task()], 0, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TournamentError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn preset_cancel_flag_skips_every_task() {
        let flag = AtomicBool::new(true);
        let collection = collect_outcomes(&NeverCalled, vec![task(), task()], 2, None, Some(&flag))
            .await
            .unwrap();
        assert!(collection.outcomes.is_empty());
        assert_eq!(collection.report.cancelled, 2);
        assert_eq!(collection.report.finished(), collection.report.submitted);
    }
}
