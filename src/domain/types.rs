//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built fresh for each estimation date and dropped afterwards
//! - handed back to callers that persist or chart them
//! - compared across the two curve models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, Result};

/// Instrument-type tag carried by every quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    Bill,
    Note,
    Bond,
}

/// Which curve model produced a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// McCulloch (1975) cubic spline on the discount function.
    McCulloch,
    /// Nelson–Siegel–Svensson, estimated the GSW (2006) way.
    Nss,
}

impl ModelKind {
    /// Human-readable label.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::McCulloch => "McCulloch spline",
            ModelKind::Nss => "NSS",
        }
    }
}

/// Static terms of one security as of a quote date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondTerms {
    pub cusip: String,
    /// Quote (settlement) date.
    pub quote_date: NaiveDate,
    pub maturity_date: NaiveDate,
    /// Annual coupon rate in percent (`5.0` means 5%).
    pub coupon: f64,
    /// Face value repaid at maturity.
    pub face: f64,
    /// First coupon date, when the issue's schedule is known.
    ///
    /// When absent the schedule is anchored on maturity instead.
    pub first_coupon_date: Option<NaiveDate>,
    /// Issue (dated) date; used to detect short/long first coupons.
    pub issue_date: Option<NaiveDate>,
    pub itype: InstrumentType,
    pub callable: bool,
}

impl BondTerms {
    /// Terms with face 100 and no optional schedule information.
    pub fn new(
        cusip: impl Into<String>,
        quote_date: NaiveDate,
        maturity_date: NaiveDate,
        coupon: f64,
        itype: InstrumentType,
    ) -> Self {
        Self {
            cusip: cusip.into(),
            quote_date,
            maturity_date,
            coupon,
            face: 100.0,
            first_coupon_date: None,
            issue_date: None,
            itype,
            callable: false,
        }
    }

    pub fn with_first_coupon(mut self, date: NaiveDate) -> Self {
        self.first_coupon_date = Some(date);
        self
    }

    pub fn with_issue_date(mut self, date: NaiveDate) -> Self {
        self.issue_date = Some(date);
        self
    }

    pub fn is_zero_coupon(&self) -> bool {
        self.coupon == 0.0
    }

    /// Calendar days from quote date to maturity.
    pub fn days_to_maturity(&self) -> i64 {
        (self.maturity_date - self.quote_date).num_days()
    }
}

/// One quoted security on one date: static terms plus market observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondQuote {
    pub terms: BondTerms,
    /// Recency rank among issues of the same original maturity (0 = on-the-run).
    pub run: u32,
    /// Original maturity at issue, in years.
    pub original_maturity: f64,
    pub bid: f64,
    pub ask: f64,
    pub accrued_interest: f64,
    pub duration: f64,
    /// Estate-tax ("flower") bond.
    #[serde(default)]
    pub flower: bool,
}

impl BondQuote {
    pub fn quote_date(&self) -> NaiveDate {
        self.terms.quote_date
    }

    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) * 0.5
    }

    pub fn days_to_maturity(&self) -> i64 {
        self.terms.days_to_maturity()
    }

    /// Time to maturity in years on an actual/365 basis.
    pub fn ttm_years(&self) -> f64 {
        self.days_to_maturity() as f64 / 365.0
    }
}

/// A single dated payment, expressed as years from settlement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cashflow {
    pub time: f64,
    pub amount: f64,
}

/// Ordered cash-flow schedule of one bond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowSchedule {
    flows: Vec<Cashflow>,
}

impl CashflowSchedule {
    /// Build a schedule, checking times are finite, non-negative and strictly increasing.
    pub fn new(flows: Vec<Cashflow>) -> Result<Self> {
        if flows.is_empty() {
            return Err(CurveError::data("cash-flow schedule is empty"));
        }
        for cf in &flows {
            if !(cf.time.is_finite() && cf.time >= 0.0 && cf.amount.is_finite()) {
                return Err(CurveError::data(format!(
                    "invalid cash flow (time={}, amount={})",
                    cf.time, cf.amount
                )));
            }
        }
        if flows.windows(2).any(|w| w[1].time <= w[0].time) {
            return Err(CurveError::data("cash-flow times must be strictly increasing"));
        }
        Ok(Self { flows })
    }

    pub fn flows(&self) -> &[Cashflow] {
        &self.flows
    }

    pub fn times(&self) -> Vec<f64> {
        self.flows.iter().map(|cf| cf.time).collect()
    }

    pub fn amounts(&self) -> Vec<f64> {
        self.flows.iter().map(|cf| cf.amount).collect()
    }

    /// Undiscounted sum of all payments.
    pub fn total(&self) -> f64 {
        self.flows.iter().map(|cf| cf.amount).sum()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Present value under a discount function.
    pub fn present_value(&self, discount: impl Fn(f64) -> f64) -> f64 {
        self.flows.iter().map(|cf| cf.amount * discount(cf.time)).sum()
    }
}

/// One `(T, D(T))` node of a discount curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub t: f64,
    pub discount: f64,
}

/// A discount curve as an ordered table of `(maturity, discount)` pairs.
///
/// Construction only checks the two columns line up; value checks (NaN,
/// negative time, non-positive discount) happen in [`crate::convert`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Curve {
    pub points: Vec<CurvePoint>,
}

impl Curve {
    pub fn new(times: &[f64], discounts: &[f64]) -> Result<Self> {
        if times.len() != discounts.len() {
            return Err(CurveError::data(format!(
                "curve columns differ in length: {} times vs {} discount factors",
                times.len(),
                discounts.len()
            )));
        }
        let points = times
            .iter()
            .zip(discounts)
            .map(|(&t, &discount)| CurvePoint { t, discount })
            .collect();
        Ok(Self { points })
    }

    pub fn times(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.t).collect()
    }

    pub fn discounts(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.discount).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Fitted Nelson–Siegel–Svensson parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NssParams {
    pub tau1: f64,
    pub tau2: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub beta3: f64,
    pub beta4: f64,
}

impl NssParams {
    /// From `[tau1, tau2, beta1, beta2, beta3, beta4]`.
    pub fn from_array(p: [f64; 6]) -> Self {
        Self {
            tau1: p[0],
            tau2: p[1],
            beta1: p[2],
            beta2: p[3],
            beta3: p[4],
            beta4: p[5],
        }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [
            self.tau1, self.tau2, self.beta1, self.beta2, self.beta3, self.beta4,
        ]
    }
}

/// Fitted McCulloch spline parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplineParams {
    /// Knot vector `d_1..d_{k-1}` (first is 0, last is the longest maturity).
    pub knots: Vec<f64>,
    /// Basis coefficients `β_1..β_k`.
    pub coefficients: Vec<f64>,
}

/// Parameters of either curve model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum CurveParams {
    Nss(NssParams),
    Spline(SplineParams),
}

impl CurveParams {
    pub fn kind(&self) -> ModelKind {
        match self {
            CurveParams::Nss(_) => ModelKind::Nss,
            CurveParams::Spline(_) => ModelKind::McCulloch,
        }
    }
}

/// Per-bond outcome of a fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondFit {
    pub cusip: String,
    pub maturity_date: NaiveDate,
    /// Years to maturity (actual/365).
    pub ttm: f64,
    pub bid: f64,
    pub ask: f64,
    pub duration: f64,
    /// Observed clean mid price.
    pub observed_price: f64,
    /// Model clean price.
    pub model_price: f64,
    /// `model_price - observed_price`.
    pub residual: f64,
}

/// Fit output for one model on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub quote_date: NaiveDate,
    pub params: CurveParams,
    /// Final objective (mean weighted squared error for NSS, sum of squared
    /// regression residuals for the spline).
    pub objective: f64,
    pub bonds: Vec<BondFit>,
    /// Discount curve sampled on the canonical grid.
    pub curve: Curve,
    /// Discount curve on the knot vector (spline fits only).
    pub nodes: Option<Curve>,
}

impl FitResult {
    pub fn model(&self) -> ModelKind {
        self.params.kind()
    }
}

/// Pricing-error score against bid/ask quotes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorScore {
    /// Weighted mean absolute error versus mid (weights `1/duration`).
    pub wmae: f64,
    /// Share of model prices inside the bid/ask band.
    pub hit_rate: f64,
    pub count: usize,
}

/// Score for one maturity band (`None` when the band holds no bonds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketScore {
    pub label: String,
    pub score: Option<ErrorScore>,
}
