//! Nelson–Siegel–Svensson spot and discount functions.
//!
//! ```text
//! spot(t) = β1 + β2·g(t,τ1) + β3·h(t,τ1) + β4·h(t,τ2)
//! D(t)    = exp(-spot(t)·t)
//! ```
//!
//! where `g` and `h` are the slope and curvature loadings from
//! [`crate::math::basis`]. Rates are continuously compounded decimals.

use crate::domain::{CashflowSchedule, NssParams};
use crate::math::{curvature_loading, slope_loading};

/// Zero-coupon (spot) rate at maturity `t`.
pub fn spot(t: f64, p: &NssParams) -> f64 {
    p.beta1
        + p.beta2 * slope_loading(t, p.tau1)
        + p.beta3 * curvature_loading(t, p.tau1)
        + p.beta4 * curvature_loading(t, p.tau2)
}

/// Discount factor at maturity `t`.
pub fn discount(t: f64, p: &NssParams) -> f64 {
    (-spot(t, p) * t).exp()
}

/// Present value of a schedule (a dirty price when the schedule holds every remaining flow).
pub fn price(schedule: &CashflowSchedule, p: &NssParams) -> f64 {
    schedule.present_value(|t| discount(t, p))
}
