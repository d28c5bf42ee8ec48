#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use super::matrix::DosingMatrix;
use crate::chemistry::ION_COUNT;
use crate::chemistry::catalog::Salt;
use crate::models::IonMap;

pub const DEFAULT_MAX_ITERATIONS: usize = 6000;
pub const DEFAULT_TOLERANCE: f64 = 1e-9;
/// Fixed learning rate used before the adaptive step existed.
pub const LEGACY_LEARNING_RATE: f64 = 2e-4;

/// Gradient step selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSize {
    /// `1 / (2 ||A^T A||_inf)`, never larger than the inverse Lipschitz
    /// constant of the gradient.
    #[default]
    Adaptive,
    Fixed(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_iterations: usize,
    /// Stop once the largest per-salt change in one iteration is below this.
    pub tolerance: f64,
    pub step: StepSize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            step: StepSize::Adaptive,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Converged,
    /// Stopped at `max_iterations` without meeting the tolerance.
    IterationLimit,
    /// A gradient step produced a non-finite value; `x` is the last finite
    /// iterate.
    Diverged,
}

/// Solver output plus the diagnostics a caller needs to judge it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SolveReport {
    pub salts: Vec<Salt>,
    /// g/L of each salt, same order as `salts`. Always >= 0.
    pub x: Vec<f64>,
    pub iterations: usize,
    pub status: SolveStatus,
    /// `||A x - b||^2` in (mg/L)^2.
    pub residual_sq: f64,
    pub step: f64,
    /// Target, mg/L.
    pub target: IonMap,
    /// Ion concentrations delivered by `x`, mg/L.
    pub achieved: IonMap,
}

impl SolveReport {
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }

    /// g/L for `salt`, `None` if it was not enabled.
    pub fn dose(&self, salt: Salt) -> Option<f64> {
        self.salts
            .iter()
            .position(|&s| s == salt)
            .map(|j| self.x[j])
    }
}

fn residual(a: &DosingMatrix, x: &[f64], b: &[f64; ION_COUNT]) -> [f64; ION_COUNT] {
    let mut r = a.apply(x);
    for (ri, bi) in r.iter_mut().zip(b) {
        *ri -= bi;
    }
    r
}

fn sum_sq(v: &[f64]) -> f64 {
    v.iter().map(|r| r * r).sum()
}

/// Non-negative least squares by projected gradient descent.
///
/// Minimises `||A x - b||^2` subject to `x >= 0`, starting from `x = 0`. Each
/// iteration takes a gradient step `x - step * 2 A^T (A x - b)` and projects
/// it back onto the non-negative orthant. Overlapping salts make `A` rank
/// deficient; the result is then one of several equally good solutions.
///
/// Never fails. An empty matrix yields an empty, converged result.
pub fn nnls(a: &DosingMatrix, b: &[f64; ION_COUNT], config: &SolverConfig) -> SolveReport {
    let n = a.cols();
    let step = match config.step {
        StepSize::Fixed(eta) => eta,
        StepSize::Adaptive => {
            let gram = a.gram_norm_inf();
            if gram > 0.0 { 0.5 / gram } else { 0.0 }
        }
    };

    let mut x = vec![0.0; n];
    let mut iterations = 0;
    let mut status = if n == 0 {
        SolveStatus::Converged
    } else {
        SolveStatus::IterationLimit
    };

    if n > 0 {
        let mut next = vec![0.0; n];
        for it in 0..config.max_iterations {
            iterations = it + 1;
            let r = residual(a, &x, b);
            let grad = a.transpose_apply(&r);

            let mut max_delta: f64 = 0.0;
            let mut finite = true;
            for j in 0..n {
                let candidate = x[j] - step * 2.0 * grad[j];
                if !candidate.is_finite() {
                    finite = false;
                    break;
                }
                next[j] = candidate.max(0.0);
                let delta = if next[j] > x[j] {
                    next[j] - x[j]
                } else {
                    x[j] - next[j]
                };
                max_delta = max_delta.max(delta);
            }
            if !finite {
                status = SolveStatus::Diverged;
                break;
            }

            x.copy_from_slice(&next);
            if max_delta < config.tolerance {
                status = SolveStatus::Converged;
                break;
            }
        }
    }

    let r = residual(a, &x, b);
    SolveReport {
        salts: a.salts().to_vec(),
        residual_sq: sum_sq(&r),
        achieved: IonMap::from_array(a.apply(&x)),
        target: IonMap::from_array(*b),
        x,
        iterations,
        status,
        step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::Ion;
    use crate::chemistry::catalog::Catalog;

    fn matrix(salts: &[Salt]) -> DosingMatrix {
        DosingMatrix::build(&Catalog::reference(), salts)
    }

    #[test]
    fn empty_matrix_returns_empty_vector() {
        let b = [10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let rep = nnls(&matrix(&[]), &b, &SolverConfig::default());
        assert!(rep.x.is_empty());
        assert_eq!(rep.iterations, 0);
        assert!(rep.converged());
        assert!((rep.residual_sq - 100.0).abs() < 1e-12);
    }

    #[test]
    fn zero_target_stops_after_one_iteration() {
        let rep = nnls(
            &matrix(&Salt::ALL),
            &[0.0; ION_COUNT],
            &SolverConfig::default(),
        );
        assert_eq!(rep.iterations, 1);
        assert!(rep.converged());
        assert!(rep.x.iter().all(|&v| v == 0.0));
        assert_eq!(rep.residual_sq, 0.0);
    }

    #[test]
    fn single_salt_matches_closed_form() {
        let a = matrix(&[Salt::CalciumChlorideDihydrate]);
        let b = IonMap::default().with(Ion::Ca, 40.0).to_array();
        let rep = nnls(&a, &b, &SolverConfig::default());
        let col = a.column(0);
        let expected = col[Ion::Ca.index()] * 40.0 / col.iter().map(|v| v * v).sum::<f64>();
        assert!(rep.converged());
        assert!((rep.x[0] - expected).abs() < 1e-9);
        assert_eq!(rep.dose(Salt::CalciumChlorideDihydrate), Some(rep.x[0]));
        assert_eq!(rep.dose(Salt::Gypsum), None);
    }

    #[test]
    fn negative_optimum_is_projected_to_zero() {
        let a = matrix(&[Salt::SodiumChloride]);
        let b = IonMap::default().with(Ion::Na, -10.0).to_array();
        let rep = nnls(&a, &b, &SolverConfig::default());
        assert_eq!(rep.x, vec![0.0]);
        assert!(rep.converged());
    }

    #[test]
    fn legacy_fixed_rate_oscillates_on_catalog_scale() {
        let a = matrix(&[Salt::CalciumChlorideDihydrate]);
        let b = IonMap::default().with(Ion::Ca, 40.0).to_array();
        let cfg = SolverConfig {
            step: StepSize::Fixed(LEGACY_LEARNING_RATE),
            ..Default::default()
        };
        let rep = nnls(&a, &b, &cfg);
        assert_eq!(rep.status, SolveStatus::IterationLimit);
        assert_eq!(rep.iterations, DEFAULT_MAX_ITERATIONS);
        assert!(rep.x[0] >= 0.0);
    }

    #[test]
    fn non_finite_step_reports_divergence() {
        let a = matrix(&[Salt::CalciumChlorideDihydrate]);
        let b = IonMap::default().with(Ion::Ca, 40.0).to_array();
        let cfg = SolverConfig {
            step: StepSize::Fixed(f64::INFINITY),
            ..Default::default()
        };
        let rep = nnls(&a, &b, &cfg);
        assert_eq!(rep.status, SolveStatus::Diverged);
        assert_eq!(rep.iterations, 1);
        assert_eq!(rep.x, vec![0.0]);
        assert!(rep.residual_sq.is_finite());
    }

    #[test]
    fn zero_iteration_budget_leaves_origin() {
        let a = matrix(&[Salt::SodiumChloride]);
        let b = IonMap::default().with(Ion::Na, 10.0).to_array();
        let cfg = SolverConfig {
            max_iterations: 0,
            ..Default::default()
        };
        let rep = nnls(&a, &b, &cfg);
        assert_eq!(rep.status, SolveStatus::IterationLimit);
        assert_eq!(rep.x, vec![0.0]);
        assert!((rep.residual_sq - 100.0).abs() < 1e-12);
    }
}
