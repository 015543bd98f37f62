//! Discount-function models.
//!
//! - `spline`: McCulloch cubic-spline basis (additive discount function)
//! - `nss`: Nelson–Siegel–Svensson spot curve (exponential discount function)
//!
//! Both sit behind [`CurveParams::discount`] so downstream code (converters,
//! reports) can evaluate any fitted curve without knowing how it was fitted.

pub mod nss;
pub mod spline;

use crate::domain::{Curve, CurveParams};
use crate::error::{CurveError, Result};

impl CurveParams {
    /// Discount factor at a single maturity.
    pub fn discount(&self, t: f64) -> Result<f64> {
        if !t.is_finite() || t < 0.0 {
            return Err(CurveError::data(format!("maturity must be finite and >= 0, got {t}")));
        }
        match self {
            CurveParams::Nss(p) => Ok(nss::discount(t, p)),
            CurveParams::Spline(p) => {
                let d = spline::discount_factors(&[t], p)?;
                Ok(d[0])
            }
        }
    }

    /// Evaluate the discount function on `grid`.
    pub fn sample(&self, grid: &[f64]) -> Result<Curve> {
        if grid.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err(CurveError::data("curve grid must be finite and non-negative"));
        }
        let discounts = match self {
            CurveParams::Nss(p) => grid.iter().map(|&t| nss::discount(t, p)).collect(),
            CurveParams::Spline(p) => spline::discount_factors(grid, p)?,
        };
        Curve::new(grid, &discounts)
    }
}
