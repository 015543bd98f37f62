//! Grid helpers: evenly spaced grids, numerical derivatives on non-uniform
//! grids, and piecewise-linear interpolation.

use crate::error::{CurveError, Result};

/// `n` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n as f64 - 1.0);
            let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            // Pin the endpoint exactly.
            out[n - 1] = end;
            out
        }
    }
}

/// Derivative of samples `f` with respect to the strictly increasing grid `x`.
///
/// Interior points use second-order central differences for uneven spacing.
/// With three or more points the edges use second-order one-sided stencils;
/// with exactly two points both edges fall back to the first-order slope.
pub fn gradient(f: &[f64], x: &[f64]) -> Result<Vec<f64>> {
    let n = x.len();
    if f.len() != n {
        return Err(CurveError::data(format!(
            "gradient needs equal lengths, got {} values on {} grid points",
            f.len(),
            n
        )));
    }
    if n < 2 {
        return Err(CurveError::data("gradient needs at least two grid points"));
    }
    if x.windows(2).any(|w| w[1] <= w[0]) {
        return Err(CurveError::data("gradient grid must be strictly increasing"));
    }

    let mut out = vec![0.0; n];

    for i in 1..n - 1 {
        let hs = x[i] - x[i - 1];
        let hd = x[i + 1] - x[i];
        out[i] = (hs * hs * f[i + 1] + (hd * hd - hs * hs) * f[i] - hd * hd * f[i - 1])
            / (hs * hd * (hd + hs));
    }

    if n >= 3 {
        let d1 = x[1] - x[0];
        let d2 = x[2] - x[1];
        let a = -(2.0 * d1 + d2) / (d1 * (d1 + d2));
        let b = (d1 + d2) / (d1 * d2);
        let c = -d1 / (d2 * (d1 + d2));
        out[0] = a * f[0] + b * f[1] + c * f[2];

        let d1 = x[n - 2] - x[n - 3];
        let d2 = x[n - 1] - x[n - 2];
        let a = d2 / (d1 * (d1 + d2));
        let b = -(d2 + d1) / (d1 * d2);
        let c = (2.0 * d2 + d1) / (d2 * (d1 + d2));
        out[n - 1] = a * f[n - 3] + b * f[n - 2] + c * f[n - 1];
    } else {
        let slope = (f[1] - f[0]) / (x[1] - x[0]);
        out[0] = slope;
        out[1] = slope;
    }

    Ok(out)
}

/// Linear interpolation of `(xp, fp)` at `x`, flat beyond either end.
///
/// `xp` must be non-decreasing and non-empty; callers validate that.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len();
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    // First index with xp[idx] > x; x lies in [xp[idx-1], xp[idx]).
    let idx = xp.partition_point(|&v| v <= x);
    let (x0, x1) = (xp[idx - 1], xp[idx]);
    let (y0, y1) = (fp[idx - 1], fp[idx]);
    if x1 == x0 {
        return y1;
    }
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}
