//! Bounded nonlinear least squares.
//!
//! The NSS fit only needs "minimize a sum of squared residuals over a box,
//! within an iteration budget". That capability is the
//! [`NonlinearLeastSquaresSolver`] trait; [`LevenbergMarquardt`] is the default
//! implementation.
//!
//! The solver works on `Σ r_i(x)^2` with a forward-difference Jacobian, damped
//! normal equations and projection of every trial point onto the box.
//! Convergence follows the usual quasi-Newton stopping rules:
//!
//! - projected gradient norm below `gradient_tolerance`
//! - relative objective decrease below `objective_tolerance`
//! - relative step length below `step_tolerance`
//!
//! Hitting the iteration cap or `max_stagnation` consecutive rejected steps is
//! reported as non-convergence; callers decide whether that is fatal.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, Result};

/// Box constraints; infinite bounds are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxBounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl BoxBounds {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if lower.is_empty() || lower.len() != upper.len() {
            return Err(CurveError::config(
                "bounds need matching, non-empty lower/upper vectors",
            ));
        }
        for (i, (lo, hi)) in lower.iter().zip(&upper).enumerate() {
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(CurveError::config(format!("invalid bound at index {i}: [{lo}, {hi}]")));
            }
        }
        Ok(Self { lower, upper })
    }

    /// No constraints in `n` dimensions.
    pub fn unbounded(n: usize) -> Self {
        Self {
            lower: vec![f64::NEG_INFINITY; n],
            upper: vec![f64::INFINITY; n],
        }
    }

    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    pub fn clamp(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .enumerate()
            .map(|(i, v)| v.clamp(self.lower[i], self.upper[i]))
            .collect()
    }
}

/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    GradientTolerance,
    ObjectiveTolerance,
    StepTolerance,
    MaxIterations,
    Stagnation,
    NumericalFailure,
}

impl Termination {
    pub fn is_converged(self) -> bool {
        matches!(
            self,
            Termination::GradientTolerance
                | Termination::ObjectiveTolerance
                | Termination::StepTolerance
        )
    }
}

/// Outcome of a solve.
#[derive(Debug, Clone)]
pub struct SolverReport {
    pub x: Vec<f64>,
    /// `Σ r_i^2` at `x`.
    pub objective: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub termination: Termination,
}

impl SolverReport {
    pub fn converged(&self) -> bool {
        self.termination.is_converged()
    }
}

/// A bounded, iteration-limited least-squares minimizer.
pub trait NonlinearLeastSquaresSolver {
    /// Minimize `Σ residuals(x)_i^2` over `bounds`, starting at `initial`.
    ///
    /// Returns `Err` only for unusable inputs; running out of iterations is
    /// reported through [`SolverReport::termination`].
    fn minimize<F>(&self, initial: &[f64], bounds: &BoxBounds, residuals: F) -> Result<SolverReport>
    where
        F: FnMut(&[f64]) -> Vec<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LmOptions {
    pub max_iterations: usize,
    pub initial_lambda: f64,
    pub lambda_up: f64,
    pub lambda_down: f64,
    pub gradient_tolerance: f64,
    pub step_tolerance: f64,
    pub objective_tolerance: f64,
    /// Relative forward-difference step.
    pub finite_diff_epsilon: f64,
    pub max_stagnation: usize,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.3,
            gradient_tolerance: 1e-10,
            step_tolerance: 1e-12,
            objective_tolerance: 2.2e-12,
            finite_diff_epsilon: 1.49e-8,
            max_stagnation: 30,
        }
    }
}

/// Damped Gauss–Newton with box projection.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenbergMarquardt {
    pub options: LmOptions,
}

impl LevenbergMarquardt {
    pub fn new(options: LmOptions) -> Self {
        Self { options }
    }
}

fn sum_of_squares(residuals: &[f64]) -> f64 {
    residuals.iter().map(|r| r * r).sum()
}

fn forward_difference_jacobian<F>(
    x: &[f64],
    base: &[f64],
    bounds: &BoxBounds,
    eps: f64,
    residual_fn: &mut F,
    evaluations: &mut usize,
) -> DMatrix<f64>
where
    F: FnMut(&[f64]) -> Vec<f64>,
{
    let m = base.len();
    let n = x.len();
    let mut jac = DMatrix::zeros(m, n);

    for c in 0..n {
        let h = eps * x[c].abs().max(1.0);
        let mut xp = x.to_vec();
        xp[c] = (x[c] + h).min(bounds.upper[c]);
        if xp[c] == x[c] {
            xp[c] = (x[c] - h).max(bounds.lower[c]);
        }
        let denom = xp[c] - x[c];
        if denom == 0.0 {
            continue;
        }

        let rp = residual_fn(&xp);
        *evaluations += 1;
        if rp.len() != m {
            continue;
        }
        for r in 0..m {
            jac[(r, c)] = (rp[r] - base[r]) / denom;
        }
    }

    jac
}

/// Gradient with components that would push an active bound further out zeroed.
fn projected_gradient_norm(x: &[f64], g: &DVector<f64>, bounds: &BoxBounds) -> f64 {
    let mut acc = 0.0;
    for i in 0..x.len() {
        let at_lower = x[i] <= bounds.lower[i] && g[i] > 0.0;
        let at_upper = x[i] >= bounds.upper[i] && g[i] < 0.0;
        if !(at_lower || at_upper) {
            acc += g[i] * g[i];
        }
    }
    acc.sqrt()
}

impl NonlinearLeastSquaresSolver for LevenbergMarquardt {
    fn minimize<F>(&self, initial: &[f64], bounds: &BoxBounds, mut residual_fn: F) -> Result<SolverReport>
    where
        F: FnMut(&[f64]) -> Vec<f64>,
    {
        let opts = self.options;
        if initial.len() != bounds.dimension() {
            return Err(CurveError::config(format!(
                "initial point has {} parameters but bounds have {}",
                initial.len(),
                bounds.dimension()
            )));
        }
        if initial.iter().any(|v| !v.is_finite()) {
            return Err(CurveError::config("initial point must be finite"));
        }

        let mut x = bounds.clamp(initial);
        let mut residuals = residual_fn(&x);
        let mut evaluations = 1usize;
        if residuals.is_empty() {
            return Err(CurveError::data("residual function returned no residuals"));
        }
        let m = residuals.len();

        let mut objective = sum_of_squares(&residuals);
        if !objective.is_finite() {
            return Err(CurveError::data("objective is not finite at the initial point"));
        }

        let mut lambda = opts.initial_lambda.max(1e-12);
        let mut iterations = 0usize;
        let mut stagnation = 0usize;
        let mut termination = Termination::MaxIterations;

        // The Jacobian only changes after an accepted step.
        let mut jacobian = forward_difference_jacobian(
            &x,
            &residuals,
            bounds,
            opts.finite_diff_epsilon,
            &mut residual_fn,
            &mut evaluations,
        );

        while iterations < opts.max_iterations {
            iterations += 1;

            let r_vec = DVector::from_column_slice(&residuals);
            let jt = jacobian.transpose();
            let jtj = &jt * &jacobian;
            let g = &jt * &r_vec;

            let grad_norm = 2.0 * projected_gradient_norm(&x, &g, bounds);
            if !grad_norm.is_finite() {
                termination = Termination::NumericalFailure;
                break;
            }
            if grad_norm <= opts.gradient_tolerance {
                termination = Termination::GradientTolerance;
                break;
            }

            let mut a = jtj.clone();
            for i in 0..a.nrows() {
                a[(i, i)] += lambda * (jtj[(i, i)].abs() + 1e-12);
            }

            let Some(delta) = a.lu().solve(&(-&g)) else {
                lambda = (lambda * opts.lambda_up).min(1e16);
                stagnation += 1;
                if stagnation >= opts.max_stagnation {
                    termination = Termination::Stagnation;
                    break;
                }
                continue;
            };

            let candidate = bounds.clamp(
                &x.iter()
                    .zip(delta.iter())
                    .map(|(xi, di)| xi + di)
                    .collect::<Vec<_>>(),
            );
            let step_norm = candidate
                .iter()
                .zip(&x)
                .map(|(c, xi)| (c - xi) * (c - xi))
                .sum::<f64>()
                .sqrt();
            let x_norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
            if step_norm <= opts.step_tolerance * (x_norm + opts.step_tolerance) {
                termination = Termination::StepTolerance;
                break;
            }

            let candidate_residuals = residual_fn(&candidate);
            evaluations += 1;
            let candidate_obj = if candidate_residuals.len() == m {
                sum_of_squares(&candidate_residuals)
            } else {
                f64::NAN
            };

            if candidate_obj.is_finite() && candidate_obj < objective {
                let decrease = objective - candidate_obj;
                let scale = objective.abs().max(candidate_obj.abs()).max(1.0);
                x = candidate;
                residuals = candidate_residuals;
                objective = candidate_obj;
                lambda = (lambda * opts.lambda_down).max(1e-15);
                stagnation = 0;

                if decrease <= opts.objective_tolerance * scale {
                    termination = Termination::ObjectiveTolerance;
                    break;
                }

                jacobian = forward_difference_jacobian(
                    &x,
                    &residuals,
                    bounds,
                    opts.finite_diff_epsilon,
                    &mut residual_fn,
                    &mut evaluations,
                );
            } else {
                lambda = (lambda * opts.lambda_up).min(1e16);
                stagnation += 1;
                if stagnation >= opts.max_stagnation {
                    termination = Termination::Stagnation;
                    break;
                }
            }
        }

        Ok(SolverReport {
            x,
            objective,
            iterations,
            evaluations,
            termination,
        })
    }
}
