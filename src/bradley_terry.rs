//! Bradley-Terry maximum-likelihood estimation.
//!
//! Each competitor i has a latent strength s_i > 0 and
//! P(i beats j) = s_i / (s_i + s_j) = sigmoid(θ_i − θ_j) with θ = ln s.
//! The fit minimizes the negative log-likelihood
//!
//! ```text
//! NLL(θ) = −Σ_{i≠j} M[i][j] · ln sigmoid(θ_i − θ_j)
//! ```
//!
//! over every ordered pair, starting from θ = 0, with BFGS.
//!
//! Implementation notes:
//! - The objective is divided by the total number of comparisons. This does
//!   not move the optimum and keeps `gradient_tolerance` independent of how
//!   many judgments were collected.
//! - ln sigmoid is evaluated in its overflow-free form, so the objective is
//!   finite for every finite θ even when a pair probability underflows.
//! - The likelihood is invariant to adding a constant to every θ_i. Reported
//!   strengths are exp(θ_i − mean θ); only their ratios are meaningful.
//! - With separable data (a competitor that never wins, or never loses) the
//!   MLE lies at infinity. The optimizer stops once the gradient is below
//!   tolerance, which leaves large but finite ratios. Non-finite results are
//!   reported as [`TournamentError::OptimizationDidNotConverge`].

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::tournament::{StrengthEstimate, TournamentError, WinCountMatrix};

/// Skip the BFGS update when s·y falls below this (curvature condition).
const CURVATURE_EPS: f64 = 1e-12;

// ---------------------------------------------------------------------
//  Config
// ---------------------------------------------------------------------

/// Optimizer settings for [`BradleyTerry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Iteration budget. `None` means 200 × number of competitors.
    pub max_iterations: Option<usize>,
    /// Converged when max |∂NLL/∂θ_i| (per comparison) is at or below this.
    pub gradient_tolerance: f64,
    /// Largest change of any θ_i in one iteration (step damping).
    pub max_step: f64,

    // -- Backtracking line search --------------------------------------------

    /// Sufficient-decrease constant for the Armijo condition.
    pub armijo_c1: f64,
    /// Halvings tried before giving up on an iteration.
    pub max_line_search_steps: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iterations: None,
            gradient_tolerance: 1e-6,
            max_step: 10.0,
            armijo_c1: 1e-4,
            max_line_search_steps: 50,
        }
    }
}

// ---------------------------------------------------------------------
//  Results
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitSummary {
    /// One estimate per competitor, in win-count matrix order.
    pub strengths: Vec<StrengthEstimate>,
    /// Σ_{i≠j} M[i][j] · ln p_ij at the optimum.
    pub log_likelihood: f64,
    pub iterations: usize,
    /// Max-abs gradient (per comparison) at the optimum.
    pub gradient_norm: f64,
}

impl FitSummary {
    /// Estimated probability that `a` beats `b` in a single comparison.
    pub fn win_probability(&self, a: &str, b: &str) -> Option<f64> {
        let sa = self.strength_of(a)?;
        let sb = self.strength_of(b)?;
        Some(sa / (sa + sb))
    }

    pub fn strength_of(&self, competitor: &str) -> Option<f64> {
        self.strengths
            .iter()
            .find(|e| e.competitor == competitor)
            .map(|e| e.strength)
    }

    /// Estimates sorted by descending strength, ties broken by name.
    pub fn ranked(&self) -> Vec<StrengthEstimate> {
        let mut out = self.strengths.clone();
        out.sort_by(|a, b| {
            b.strength
                .total_cmp(&a.strength)
                .then_with(|| a.competitor.cmp(&b.competitor))
        });
        out
    }
}

// ---------------------------------------------------------------------
//  Objective
// ---------------------------------------------------------------------

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let ex = x.exp();
        ex / (1.0 + ex)
    }
}

/// ln(sigmoid(x)) without overflow or ln(0) for finite x.
fn ln_sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        -(-x).exp().ln_1p()
    } else {
        x - x.exp().ln_1p()
    }
}

/// Negative log-likelihood per comparison, over dense win counts.
struct Objective {
    n: usize,
    wins: DMatrix<f64>,
    total: f64,
}

impl Objective {
    fn new(matrix: &WinCountMatrix) -> Self {
        let n = matrix.len();
        let wins = DMatrix::from_fn(n, n, |i, j| matrix.wins(i, j) as f64);
        Self {
            n,
            wins,
            total: matrix.total() as f64,
        }
    }

    fn value_and_gradient(&self, theta: &DVector<f64>) -> (f64, DVector<f64>) {
        let mut value = 0.0;
        let mut grad = DVector::<f64>::zeros(self.n);

        for i in 0..self.n {
            for j in 0..self.n {
                let m = self.wins[(i, j)];
                if i == j || m == 0.0 {
                    continue;
                }
                let d = theta[i] - theta[j];
                value -= m * ln_sigmoid(d);
                // 1 − sigmoid(d), computed directly to keep precision.
                let q = sigmoid(-d);
                grad[i] -= m * q;
                grad[j] += m * q;
            }
        }

        (value / self.total, grad / self.total)
    }
}

// ---------------------------------------------------------------------
//  Estimator
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct BradleyTerry {
    cfg: Config,
}

impl BradleyTerry {
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Fit strengths to `matrix`.
    ///
    /// Fails with `NoComparisons` on an all-zero matrix, and with
    /// `OptimizationDidNotConverge` when the iteration budget runs out, the
    /// line search stalls, or the result is not finite.
    pub fn fit(&self, matrix: &WinCountMatrix) -> Result<FitSummary, TournamentError> {
        let cfg = &self.cfg;
        if !(cfg.gradient_tolerance > 0.0) || !(cfg.max_step > 0.0) {
            return Err(TournamentError::InvalidInput(
                "gradient_tolerance and max_step must be positive".into(),
            ));
        }
        if matrix.is_empty() {
            return Err(TournamentError::NoComparisons);
        }

        let objective = Objective::new(matrix);
        let n = objective.n;
        let max_iterations = cfg.max_iterations.unwrap_or(200 * n);

        let mut theta = DVector::<f64>::zeros(n);
        let (mut value, mut grad) = objective.value_and_gradient(&theta);
        let mut h_inv = DMatrix::<f64>::identity(n, n);
        let mut iterations = 0;

        let not_converged = |iterations: usize, grad: &DVector<f64>, reason: &str| {
            TournamentError::OptimizationDidNotConverge {
                iterations,
                gradient_norm: grad.amax(),
                reason: reason.to_string(),
            }
        };

        while grad.amax() > cfg.gradient_tolerance {
            if iterations >= max_iterations {
                return Err(not_converged(
                    iterations,
                    &grad,
                    "iteration budget exhausted",
                ));
            }
            iterations += 1;

            let mut direction = -(&h_inv * &grad);
            let mut slope = grad.dot(&direction);
            if !(slope < 0.0) {
                // Lost positive definiteness: restart from steepest descent.
                h_inv = DMatrix::identity(n, n);
                direction = -grad.clone();
                slope = grad.dot(&direction);
            }

            let largest = direction.amax();
            if largest > cfg.max_step {
                let scale = cfg.max_step / largest;
                direction *= scale;
                slope *= scale;
            }

            // Armijo backtracking.
            let mut alpha = 1.0;
            let mut accepted = None;
            for _ in 0..cfg.max_line_search_steps {
                let candidate = &theta + &direction * alpha;
                let (cand_value, cand_grad) = objective.value_and_gradient(&candidate);
                if cand_value.is_finite() && cand_value <= value + cfg.armijo_c1 * alpha * slope {
                    accepted = Some((candidate, cand_value, cand_grad));
                    break;
                }
                alpha *= 0.5;
            }
            let Some((next_theta, next_value, next_grad)) = accepted else {
                return Err(not_converged(
                    iterations,
                    &grad,
                    "line search could not decrease the objective",
                ));
            };

            let s = &next_theta - &theta;
            let y = &next_grad - &grad;
            let sy = s.dot(&y);
            if sy > CURVATURE_EPS {
                let rho = 1.0 / sy;
                let hy = &h_inv * &y;
                let yhy = y.dot(&hy);
                h_inv -= (&hy * s.transpose() + &s * hy.transpose()) * rho;
                h_inv += (&s * s.transpose()) * (rho * rho * yhy + rho);
            }

            theta = next_theta;
            value = next_value;
            grad = next_grad;
        }

        if theta.iter().any(|t| !t.is_finite()) {
            return Err(not_converged(iterations, &grad, "non-finite log-strengths"));
        }

        let mean = theta.mean();
        let strengths: Vec<StrengthEstimate> = matrix
            .competitors()
            .iter()
            .zip(theta.iter())
            .map(|(competitor, &t)| StrengthEstimate {
                competitor: competitor.clone(),
                strength: (t - mean).exp(),
            })
            .collect();

        if strengths.iter().any(|e| !e.strength.is_finite() || e.strength <= 0.0) {
            return Err(not_converged(iterations, &grad, "strength out of range"));
        }

        let log_likelihood = -value * objective.total;
        let gradient_norm = grad.amax();
        debug!(iterations, gradient_norm, "BFGS converged");
        info!(
            competitors = n,
            comparisons = matrix.total(),
            iterations,
            log_likelihood,
            "Bradley-Terry fit complete"
        );

        Ok(FitSummary {
            strengths,
            log_likelihood,
            iterations,
            gradient_norm,
        })
    }
}

/// One-shot fit with default settings.
pub fn estimate_strengths(
    matrix: &WinCountMatrix,
) -> Result<Vec<StrengthEstimate>, TournamentError> {
    BradleyTerry::default().fit(matrix).map(|fit| fit.strengths)
}
