//! Synthetic Treasury quote panels priced off a known NSS curve.
//!
//! Each date gets a ladder of bills, notes and bonds. Coupons are set near the
//! curve's par level (rounded to 1/8), prices are the exact model prices plus
//! optional Gaussian noise, and quotes straddle the mid by a fixed half-spread.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::cashflow::dates::{days_between, shift_months};
use crate::cashflow::treasury_schedule;
use crate::domain::config::calendar_date;
use crate::domain::{BondQuote, BondTerms, InstrumentType, NssParams};
use crate::error::{CurveError, Result};
use crate::models::nss;

/// Standard original maturities, in years.
const ISSUE_TENORS: [f64; 7] = [1.0, 2.0, 3.0, 5.0, 7.0, 10.0, 30.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub dates: Vec<NaiveDate>,
    /// Remaining maturities (years) quoted on every date.
    pub maturities: Vec<f64>,
    /// Curve the quotes are priced from.
    pub curve: NssParams,
    /// Distance from mid to bid and to ask.
    pub half_spread: f64,
    /// Standard deviation of the mid-price noise (0 gives exact model prices).
    pub noise_sd: f64,
    /// Recency rank stamped on every quote.
    pub run: u32,
    pub seed: u64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            dates: vec![calendar_date(2015, 6, 30)],
            maturities: vec![
                0.25, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 12.0, 15.0, 20.0, 25.0,
                30.0,
            ],
            curve: NssParams::from_array([1.5, 8.0, 0.045, -0.02, 0.01, 0.015]),
            half_spread: 1.0 / 64.0,
            noise_sd: 0.0,
            run: 3,
            seed: 7,
        }
    }
}

/// Generate one cross-section per configured date.
pub fn synthetic_panel(config: &PanelConfig) -> Result<Vec<BondQuote>> {
    if config.maturities.iter().any(|m| !(m.is_finite() && *m > 0.0)) {
        return Err(CurveError::config("panel maturities must be positive"));
    }
    if !(config.half_spread.is_finite() && config.half_spread >= 0.0) {
        return Err(CurveError::config(format!(
            "half spread must be non-negative, got {}",
            config.half_spread
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise_sd)
        .map_err(|e| CurveError::config(format!("noise distribution error: {e}")))?;

    let mut quotes = Vec::with_capacity(config.dates.len() * config.maturities.len());
    for &date in &config.dates {
        for (i, &years) in config.maturities.iter().enumerate() {
            let mut q = price_quote(date, years, i, config)?;
            let shift = noise.sample(&mut rng);
            q.bid += shift;
            q.ask += shift;
            quotes.push(q);
        }
    }
    log::debug!("generated {} synthetic quotes", quotes.len());
    Ok(quotes)
}

fn price_quote(date: NaiveDate, years: f64, index: usize, config: &PanelConfig) -> Result<BondQuote> {
    let maturity = date + Duration::days((years * 365.25).round() as i64);
    let itype = if years < 1.0 {
        InstrumentType::Bill
    } else if years <= 10.0 {
        InstrumentType::Note
    } else {
        InstrumentType::Bond
    };
    let coupon = match itype {
        InstrumentType::Bill => 0.0,
        _ => (nss::spot(years, &config.curve) * 100.0 * 8.0).round().max(1.0) / 8.0,
    };

    let cusip = format!("SYN{}{index:02}", date.format("%Y%m%d"));
    let terms = BondTerms::new(cusip, date, maturity, coupon, itype);
    let schedule = treasury_schedule(&terms, date)?;
    let dirty = nss::price(&schedule, &config.curve);

    let accrued = accrued_interest(&terms, date, &schedule.times())?;
    let mid = dirty - accrued;

    let duration = schedule
        .flows()
        .iter()
        .map(|cf| cf.time * cf.amount * nss::discount(cf.time, &config.curve))
        .sum::<f64>()
        / dirty;

    let original_maturity = ISSUE_TENORS
        .iter()
        .copied()
        .find(|t| *t >= years)
        .unwrap_or(30.0);

    Ok(BondQuote {
        terms,
        run: config.run,
        original_maturity,
        bid: mid - config.half_spread,
        ask: mid + config.half_spread,
        accrued_interest: accrued,
        duration,
        flower: false,
    })
}

/// Actual/actual accrued interest since the coupon preceding `date`.
fn accrued_interest(terms: &BondTerms, date: NaiveDate, times: &[f64]) -> Result<f64> {
    if terms.coupon <= 0.0 || times.is_empty() {
        return Ok(0.0);
    }
    let next = date + Duration::days((times[0] * 365.25).round() as i64);
    let prev = shift_months(next, -6, false)?;
    let period = days_between(prev, next);
    if period <= 0 || prev > date {
        return Ok(0.0);
    }
    Ok(terms.coupon / 2.0 * days_between(prev, date) as f64 / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noiseless_panel_reprices_exactly() {
        let config = PanelConfig::default();
        let quotes = synthetic_panel(&config).unwrap();
        assert_eq!(quotes.len(), config.maturities.len());

        for q in &quotes {
            let s = treasury_schedule(&q.terms, q.quote_date()).unwrap();
            let model = nss::price(&s, &config.curve);
            assert!((q.mid() + q.accrued_interest - model).abs() < 1e-9, "{}", q.terms.cusip);
            assert!(q.ask > q.bid);
            assert!(q.duration > 0.0 && q.duration <= q.ttm_years() + 0.01);
        }
        assert_eq!(quotes[0].terms.itype, InstrumentType::Bill);
        assert_eq!(quotes.last().unwrap().terms.itype, InstrumentType::Bond);
    }

    #[test]
    fn noise_is_seeded() {
        let config = PanelConfig {
            noise_sd: 0.05,
            ..PanelConfig::default()
        };
        let a = synthetic_panel(&config).unwrap();
        let b = synthetic_panel(&config).unwrap();
        assert_eq!(a, b);

        let other = synthetic_panel(&PanelConfig { seed: 8, ..config }).unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn negative_spread_is_a_config_error() {
        let config = PanelConfig {
            half_spread: -1.0,
            ..PanelConfig::default()
        };
        assert!(matches!(synthetic_panel(&config), Err(CurveError::Config(_))));
    }
}
