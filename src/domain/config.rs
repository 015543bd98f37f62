//! Named configuration for every fit step.
//!
//! Methodology constants (seeds, cutoffs, date windows) live here rather than in
//! module-level globals so each fit is deterministic given its inputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::InstrumentType;
use crate::math::LmOptions;

/// Number of points on the canonical curve grid `[0, ceil(max ttm)]`.
pub const DEFAULT_GRID_POINTS: usize = 200;

/// NSS seed `(tau1, tau2, beta1, beta2, beta3, beta4)`.
pub const NSS_DEFAULT_SEED: [f64; 6] = [1.0, 10.0, 3.0, 3.0, 3.0, 3.0];

pub(crate) fn calendar_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("static calendar date is valid")
}

/// Cash-flow generation conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowConfig {
    /// Coupon payments per year.
    pub freq: u32,
    /// First coupons whose accrual period differs from a regular one by more
    /// than this many days are pro-rated.
    pub stub_tolerance_days: i64,
}

impl Default for CashflowConfig {
    fn default() -> Self {
        Self {
            freq: 2,
            stub_tolerance_days: 3,
        }
    }
}

/// McCulloch spline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplineConfig {
    pub cashflows: CashflowConfig,
    pub grid_points: usize,
}

impl Default for SplineConfig {
    fn default() -> Self {
        Self {
            cashflows: CashflowConfig::default(),
            grid_points: DEFAULT_GRID_POINTS,
        }
    }
}

/// Nelson–Siegel–Svensson estimation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NssConfig {
    /// Starting point `(tau1, tau2, beta1, beta2, beta3, beta4)`.
    pub initial: [f64; 6],
    /// Lower bound on both decay parameters.
    pub tau_lower_bound: f64,
    pub solver: LmOptions,
    pub grid_points: usize,
}

impl Default for NssConfig {
    fn default() -> Self {
        Self {
            initial: NSS_DEFAULT_SEED,
            tau_lower_bound: 1e-6,
            solver: LmOptions {
                max_iterations: 100_000,
                ..LmOptions::default()
            },
            grid_points: DEFAULT_GRID_POINTS,
        }
    }
}

/// Gürkaynak–Sack–Wright eligibility filters for the NSS sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GswFilterConfig {
    /// Securities must have strictly more than this many days to maturity.
    pub min_days_to_maturity: i64,
    /// On-the-run exclusion applies to quote dates on or after this date.
    pub on_the_run_start: NaiveDate,
    /// Issues with `run < on_the_run_depth` are excluded (2 = on-the-run and first off-the-run).
    pub on_the_run_depth: u32,
    pub instrument_types: Vec<InstrumentType>,
    /// Original maturity (years) of the bonds phased out of the sample.
    pub phase_out_original_maturity: f64,
    /// Weight reaches zero on this date and stays zero afterwards.
    pub phase_out_end: NaiveDate,
    /// Length of the linear decay window ending on `phase_out_end`.
    pub phase_out_days: i64,
    pub exclude_callable: bool,
}

impl Default for GswFilterConfig {
    fn default() -> Self {
        Self {
            min_days_to_maturity: 92,
            on_the_run_start: calendar_date(1980, 1, 1),
            on_the_run_depth: 2,
            instrument_types: vec![InstrumentType::Note, InstrumentType::Bond],
            phase_out_original_maturity: 20.0,
            phase_out_end: calendar_date(1996, 1, 2),
            // 1995-01-02 ..= 1996-01-02
            phase_out_days: 365,
            exclude_callable: true,
        }
    }
}

/// Waggoner (1997) sample selection for the spline model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaggonerConfig {
    /// Bills need at least this many days to maturity.
    pub min_bill_days: i64,
    /// Notes and bonds need at least this many days to maturity.
    pub min_coupon_days: i64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub exclude_flower: bool,
}

impl Default for WaggonerConfig {
    fn default() -> Self {
        Self {
            min_bill_days: 30,
            min_coupon_days: 365,
            start: calendar_date(1970, 1, 1),
            end: calendar_date(1995, 12, 31),
            exclude_flower: true,
        }
    }
}
