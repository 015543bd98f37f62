//! Ordinary least squares.
//!
//! The spline fit solves one small regression per date:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! We solve it through the SVD, treating singular values below
//! `max(rows, cols) · ε · σ_max` as zero. That yields the minimum-norm solution
//! when the design is rank deficient (e.g. duplicated maturities) instead of
//! failing outright.

use nalgebra::{DMatrix, DVector};

use crate::error::{CurveError, Result};

/// Solve `min ‖x β − y‖²`.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    if x.nrows() != y.len() {
        return Err(CurveError::data(format!(
            "design has {} rows but the response has {} entries",
            x.nrows(),
            y.len()
        )));
    }
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(CurveError::data("empty least-squares design"));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(CurveError::data("least-squares inputs contain non-finite values"));
    }

    let svd = x.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    let eps = f64::EPSILON * x.nrows().max(x.ncols()) as f64 * sigma_max;

    let beta = svd
        .solve(y, eps)
        .map_err(|e| CurveError::fit(0, f64::NAN, format!("least-squares solve failed: {e}")))?;
    if beta.iter().any(|v| !v.is_finite()) {
        return Err(CurveError::fit(0, f64::NAN, "least-squares solution is not finite"));
    }
    Ok(beta)
}
