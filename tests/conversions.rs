use approx::assert_relative_eq;

use treasury_curves::convert::{decorate, forward_discrete_cc, forward_instant_cc, spot_cc};
use treasury_curves::data::{PanelConfig, synthetic_panel};
use treasury_curves::domain::{Curve, SplineConfig};
use treasury_curves::error::CurveError;
use treasury_curves::fit::fit_mcculloch;

#[test]
fn spot_round_trip() {
    let curve = Curve::new(&[0.0, 1.0, 2.0], &[1.0, (-0.05_f64).exp(), (-0.16_f64).exp()]).unwrap();
    let spot = spot_cc(&curve).unwrap();
    assert_relative_eq!(spot[0], 0.05, epsilon = 1e-12);
    assert_relative_eq!(spot[1], 0.05, epsilon = 1e-12);
    assert_relative_eq!(spot[2], 0.08, epsilon = 1e-12);
}

#[test]
fn flat_curve_has_flat_forwards() {
    let t: Vec<f64> = (0..=60).map(|i| i as f64 * 0.5).collect();
    let d: Vec<f64> = t.iter().map(|t| (-0.035 * t).exp()).collect();
    let curve = Curve::new(&t, &d).unwrap();

    for f in forward_instant_cc(&curve).unwrap() {
        assert_relative_eq!(f, 0.035, epsilon = 1e-9);
    }
    let fwd = forward_discrete_cc(&curve, 1.0).unwrap();
    for (ti, f) in t.iter().zip(fwd) {
        if ti + 1.0 <= 30.0 {
            assert_relative_eq!(f, 0.035, epsilon = 1e-12);
        }
    }
}

#[test]
fn decorated_fitted_curve() {
    let quotes = synthetic_panel(&PanelConfig::default()).unwrap();
    let fit = fit_mcculloch(&quotes, &SplineConfig::default()).unwrap();
    let dc = decorate(&fit.curve, 0.5).unwrap();

    assert_eq!(dc.len(), fit.curve.len());
    let spot = dc.column("spot_cc").unwrap();
    let simple = dc.column("spot_simple").unwrap();
    assert!(dc.column("forward_0.5y_cc").is_some());
    assert!(dc.column("forward_instant_cc").is_some());
    assert_eq!(spot[0], spot[1]);
    for (s, a) in spot.iter().zip(simple).skip(1) {
        assert_relative_eq!(*a, s.exp_m1(), epsilon = 1e-12);
    }
}

#[test]
fn horizon_must_be_positive() {
    let curve = Curve::new(&[0.0, 1.0], &[1.0, 0.96]).unwrap();
    assert!(matches!(decorate(&curve, 0.0), Err(CurveError::Config(_))));
    assert!(matches!(decorate(&curve, f64::NAN), Err(CurveError::Config(_))));
}
