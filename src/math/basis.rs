//! Stable Nelson–Siegel loadings.
//!
//! The Svensson spot curve is built from two loadings per decay parameter `τ`:
//!
//! - slope:     `g(t, τ) = (1 - exp(-t/τ)) / (t/τ)`
//! - curvature: `h(t, τ) = g(t, τ) - exp(-t/τ)`
//!
//! Numerical notes:
//! - For small `x = t/τ`, `1 - exp(-x)` suffers from catastrophic cancellation,
//!   so we use `expm1` and a short series near zero.
//! - At `t = 0` the analytic limits are `g → 1` and `h → 0`, which makes the
//!   spot rate at the origin `β1 + β2`.

/// Threshold below which the series expansions are used.
const SMALL_X: f64 = 1e-6;

/// Slope loading `g(t, τ)`.
pub fn slope_loading(t: f64, tau: f64) -> f64 {
    let x = t.max(0.0) / tau;

    if x < SMALL_X {
        // (1 - e^{-x}) / x ≈ 1 - x/2 + x^2/6
        return 1.0 - x / 2.0 + (x * x) / 6.0;
    }

    -(-x).exp_m1() / x
}

/// Curvature loading `h(t, τ)`.
pub fn curvature_loading(t: f64, tau: f64) -> f64 {
    let x = t.max(0.0) / tau;

    if x < SMALL_X {
        // g ≈ 1 - x/2 + x^2/6 and e^{-x} ≈ 1 - x + x^2/2
        return x / 2.0 - (x * x) / 3.0;
    }

    slope_loading(t, tau) - (-x).exp()
}
