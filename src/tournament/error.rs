/// Fatal errors for a tournament run.
///
/// Per-judgment oracle failures are not represented here: the collector
/// absorbs them and reports them as [`OracleFailure`](super::OracleFailure)s.
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Outcome references unknown competitor '{0}'")]
    UnknownCompetitor(String),
    #[error("No comparisons to fit: win-count matrix is all zero")]
    NoComparisons,
    #[error(
        "Optimization did not converge after {iterations} iterations \
         (gradient norm {gradient_norm:.3e}): {reason}"
    )]
    OptimizationDidNotConverge {
        iterations: usize,
        gradient_norm: f64,
        reason: String,
    },
}
