//! Discount curve → rate series.
//!
//! Every transform validates its input, works on a copy sorted by maturity,
//! and returns one value per point of that sorted copy. Rates are decimals.

use crate::domain::{Curve, CurvePoint};
use crate::error::{CurveError, Result};
use crate::math::{gradient, interp};

/// Validated copy of `curve`, sorted ascending by maturity.
pub fn sorted_points(curve: &Curve) -> Result<Vec<CurvePoint>> {
    for p in &curve.points {
        if p.t.is_nan() || p.discount.is_nan() {
            return Err(CurveError::data("curve contains NaN"));
        }
        if p.t < 0.0 {
            return Err(CurveError::data(format!("negative maturity {}", p.t)));
        }
        if !(p.discount > 0.0) {
            return Err(CurveError::data(format!(
                "non-positive discount factor {} at t={}",
                p.discount, p.t
            )));
        }
    }
    let mut points = curve.points.clone();
    points.sort_by(|a, b| a.t.total_cmp(&b.t));
    Ok(points)
}

/// Apply `rate(t, D)` to every positive maturity; `t = 0` rows copy the first
/// positive-maturity rate (0 when there is none).
fn spot_with(curve: &Curve, rate: impl Fn(f64, f64) -> f64) -> Result<Vec<f64>> {
    let points = sorted_points(curve)?;
    let rates: Vec<Option<f64>> = points
        .iter()
        .map(|p| (p.t > 0.0).then(|| rate(p.t, p.discount)))
        .collect();
    let fill = rates.iter().flatten().next().copied().unwrap_or(0.0);
    Ok(rates.into_iter().map(|r| r.unwrap_or(fill)).collect())
}

/// Continuously compounded spot rate `-ln D / T`.
pub fn spot_cc(curve: &Curve) -> Result<Vec<f64>> {
    spot_with(curve, |t, d| -d.ln() / t)
}

/// Annually compounded spot rate `D^(-1/T) - 1`.
pub fn spot_simple(curve: &Curve) -> Result<Vec<f64>> {
    spot_with(curve, |t, d| d.powf(-1.0 / t) - 1.0)
}

/// Instantaneous forward rate `-d ln D / dT`.
pub fn forward_instant_cc(curve: &Curve) -> Result<Vec<f64>> {
    let points = sorted_points(curve)?;
    if points.len() < 2 {
        return Err(CurveError::data("instantaneous forwards need at least two points"));
    }
    let t: Vec<f64> = points.iter().map(|p| p.t).collect();
    let ln_d: Vec<f64> = points.iter().map(|p| p.discount.ln()).collect();
    Ok(gradient(&ln_d, &t)?.into_iter().map(|g| -g).collect())
}

/// Forward rate over `[T, T + dt]`, `(ln D(T) - ln D(T + dt)) / dt`.
///
/// `D(T + dt)` is interpolated linearly in the discount factor and held flat
/// past the last maturity.
pub fn forward_discrete_cc(curve: &Curve, dt: f64) -> Result<Vec<f64>> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(CurveError::config(format!("forward horizon must be positive, got {dt}")));
    }
    let points = sorted_points(curve)?;
    if points.is_empty() {
        return Ok(Vec::new());
    }
    let t: Vec<f64> = points.iter().map(|p| p.t).collect();
    let d: Vec<f64> = points.iter().map(|p| p.discount).collect();
    Ok(points
        .iter()
        .map(|p| (p.discount.ln() - interp(p.t + dt, &t, &d).ln()) / dt)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve(t: &[f64], d: &[f64]) -> Curve {
        Curve::new(t, d).unwrap()
    }

    #[test]
    fn spot_round_trip_and_zero_fill() {
        let c = curve(&[0.0, 1.0, 2.0], &[1.0, (-0.05_f64).exp(), (-0.16_f64).exp()]);
        let s = spot_cc(&c).unwrap();
        assert_relative_eq!(s[0], 0.05, epsilon = 1e-12);
        assert_relative_eq!(s[1], 0.05, epsilon = 1e-12);
        assert_relative_eq!(s[2], 0.08, epsilon = 1e-12);
    }

    #[test]
    fn output_follows_sorted_order() {
        let c = curve(&[2.0, 1.0], &[(-0.16_f64).exp(), (-0.05_f64).exp()]);
        let s = spot_cc(&c).unwrap();
        assert_relative_eq!(s[0], 0.05, epsilon = 1e-12);
        assert_relative_eq!(s[1], 0.08, epsilon = 1e-12);
    }

    #[test]
    fn simple_compounding() {
        let c = curve(&[0.0, 2.0], &[1.0, 1.0 / 1.03_f64.powi(2)]);
        let s = spot_simple(&c).unwrap();
        assert_relative_eq!(s[1], 0.03, epsilon = 1e-12);
        assert_relative_eq!(s[0], 0.03, epsilon = 1e-12);
    }

    #[test]
    fn only_origin_fills_with_zero() {
        let c = curve(&[0.0], &[1.0]);
        assert_eq!(spot_cc(&c).unwrap(), vec![0.0]);
    }

    #[test]
    fn invalid_curves_are_rejected() {
        assert!(matches!(spot_cc(&curve(&[1.0], &[0.0])), Err(CurveError::Data(_))));
        assert!(matches!(spot_cc(&curve(&[-1.0], &[0.9])), Err(CurveError::Data(_))));
        assert!(matches!(spot_cc(&curve(&[f64::NAN], &[0.9])), Err(CurveError::Data(_))));
        assert!(matches!(
            forward_instant_cc(&curve(&[1.0], &[0.9])),
            Err(CurveError::Data(_))
        ));
        assert!(matches!(
            forward_instant_cc(&curve(&[1.0, 1.0], &[0.9, 0.9])),
            Err(CurveError::Data(_))
        ));
    }

    #[test]
    fn non_positive_horizon_is_a_config_error() {
        let c = curve(&[0.0, 1.0], &[1.0, 0.95]);
        assert!(matches!(forward_discrete_cc(&c, 0.0), Err(CurveError::Config(_))));
        assert!(matches!(forward_discrete_cc(&c, -1.0), Err(CurveError::Config(_))));
    }

    #[test]
    fn flat_curve_forwards_equal_the_rate() {
        let t: Vec<f64> = (0..=20).map(|i| i as f64 * 0.5).collect();
        let d: Vec<f64> = t.iter().map(|t| (-0.04 * t).exp()).collect();
        let c = curve(&t, &d);

        for f in forward_instant_cc(&c).unwrap() {
            assert_relative_eq!(f, 0.04, epsilon = 1e-3);
        }
        let fwd = forward_discrete_cc(&c, 1.0).unwrap();
        for (ti, f) in t.iter().zip(&fwd) {
            if ti + 1.0 <= 10.0 {
                assert_relative_eq!(*f, 0.04, epsilon = 1e-12);
            }
        }
        // Flat extrapolation: the last point's forward is zero.
        assert_relative_eq!(*fwd.last().unwrap(), 0.0, epsilon = 1e-15);
    }
}
