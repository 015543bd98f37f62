//! McCulloch (1975) cubic-spline discount function.
//!
//! The discount function is affine in a cubic basis:
//!
//! ```text
//! D(t) = 1 + Σ_j β_j f_j(t)
//! ```
//!
//! with `f_1..f_{k-1}` the piecewise cubics of McCulloch's appendix (A.2–A.5)
//! built on knots `d_1..d_{k-1}`, and `f_k(t) = t`. Every `f_j(0) = 0`, so
//! `D(0) = 1` for any coefficients. The additive form is the paper's; it is
//! not an exponential/log-discount parameterization.

use nalgebra::{DMatrix, DVector};

use crate::domain::{Curve, SplineParams};
use crate::error::{CurveError, Result};

/// Knot vector and coefficient count for a sample of bond maturities.
///
/// `ncoef = floor(sqrt(n)) + 1`. Knots run from 0 to the longest maturity with
/// `ncoef - 3` interior knots placed at fractional positions `i·n/(ncoef-2)`
/// of the sorted maturities, interpolating linearly between neighbours.
pub fn place_knots(maturities: &[f64]) -> Result<(Vec<f64>, usize)> {
    let n = maturities.len();
    if n < 4 {
        return Err(CurveError::data(format!(
            "spline fit needs at least 4 bonds, got {n}"
        )));
    }
    if maturities.iter().any(|m| !m.is_finite() || *m < 0.0) {
        return Err(CurveError::data("maturities must be finite and non-negative"));
    }
    if maturities.windows(2).any(|w| w[1] < w[0]) {
        return Err(CurveError::data("maturities must be sorted ascending"));
    }

    let ncoef = (n as f64).sqrt().floor() as usize + 1;
    let t_max = maturities[n - 1];

    let mut knots = Vec::with_capacity(ncoef - 1);
    knots.push(0.0);
    for i in 1..ncoef.saturating_sub(2) {
        let pos = (i * n) as f64 / (ncoef - 2) as f64;
        let h = pos.floor() as usize;
        let theta = pos - h as f64;
        let lo = maturities[h.min(n - 1)];
        let hi = maturities[(h + 1).min(n - 1)];
        knots.push(lo + theta * (hi - lo));
    }
    knots.push(t_max);

    debug_assert_eq!(knots.len(), ncoef - 1);
    Ok((knots, ncoef))
}

fn validate_knots(knots: &[f64], ncoef: usize) -> Result<()> {
    if ncoef < 3 {
        return Err(CurveError::data(format!(
            "spline basis needs at least 3 coefficients, got {ncoef}"
        )));
    }
    if knots.len() != ncoef - 1 {
        return Err(CurveError::data(format!(
            "need {} knots for {} coefficients, got {}",
            ncoef - 1,
            ncoef,
            knots.len()
        )));
    }
    if knots.iter().any(|d| !d.is_finite()) {
        return Err(CurveError::data("knots must be finite"));
    }
    if knots.windows(2).any(|w| w[1] < w[0]) {
        return Err(CurveError::data("knots must be non-decreasing"));
    }
    Ok(())
}

/// `f_j(m)` for `j = 1..k-1` (1-based, paper indexing).
fn basis_value(m: f64, j: usize, knots: &[f64], k: usize) -> f64 {
    let (a, b, c) = if j == 1 {
        (0.0, knots[0], knots[1])
    } else {
        let next = if j < k - 1 { knots[j] } else { knots[k - 2] };
        (knots[j - 2], knots[j - 1], next)
    };

    if m < a {
        0.0
    } else if m < b {
        let denom = 6.0 * (b - a);
        if denom != 0.0 { (m - a).powi(3) / denom } else { 0.0 }
    } else if m < c {
        let cc = b - a;
        let e = m - b;
        let denom = 6.0 * (c - b);
        let quad = cc * cc / 6.0 + cc * e / 2.0 + e * e / 2.0;
        if denom != 0.0 { quad - e.powi(3) / denom } else { quad }
    } else {
        (c - a) * ((2.0 * c - b - a) / 6.0 + (m - c) / 2.0)
    }
}

/// Basis matrix `F` with `F[(i, j-1)] = f_j(t_i)`.
pub fn basis(t: &[f64], knots: &[f64], ncoef: usize) -> Result<DMatrix<f64>> {
    validate_knots(knots, ncoef)?;

    let mut f = DMatrix::zeros(t.len(), ncoef);
    for (i, &m) in t.iter().enumerate() {
        for j in 1..ncoef {
            f[(i, j - 1)] = basis_value(m, j, knots, ncoef);
        }
        f[(i, ncoef - 1)] = m;
    }
    Ok(f)
}

/// Coefficient-weighted basis row sum `Σ_i w_i F[i, :]` (one design row per bond).
pub fn weighted_basis_row(t: &[f64], weights: &[f64], knots: &[f64], ncoef: usize) -> Result<DVector<f64>> {
    if t.len() != weights.len() {
        return Err(CurveError::data("cash-flow times and amounts differ in length"));
    }
    let f = basis(t, knots, ncoef)?;
    let w = DVector::from_column_slice(weights);
    Ok(f.transpose() * w)
}

/// Discount factors `1 + F·β` at each `t`.
pub fn discount_factors(t: &[f64], params: &SplineParams) -> Result<Vec<f64>> {
    let ncoef = params.coefficients.len();
    let f = basis(t, &params.knots, ncoef)?;
    let beta = DVector::from_column_slice(&params.coefficients);
    Ok((f * beta).iter().map(|v| 1.0 + v).collect())
}

/// Discount curve on the knot vector itself.
pub fn node_curve(params: &SplineParams) -> Result<Curve> {
    let d = discount_factors(&params.knots, params)?;
    Curve::new(&params.knots, &d)
}
