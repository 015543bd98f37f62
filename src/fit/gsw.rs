//! Gürkaynak–Sack–Wright (2006) Nelson–Siegel–Svensson fit.
//!
//! Steps for one quote date:
//! - [`gsw_filter`]: eligibility screen producing per-bond objective weights
//! - price every remaining Treasury cash flow off the NSS discount function
//! - minimize the duration-weighted mean squared dirty-price error over
//!   `(τ1, τ2, β1..β4)` with `τ1, τ2` bounded below

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cashflow::treasury_schedule;
use crate::domain::{
    BondFit, BondQuote, CashflowSchedule, CurveParams, FitResult, GswFilterConfig, NssConfig, NssParams,
};
use crate::error::{CurveError, Result};
use crate::fit::{curve_grid, validate_panel};
use crate::math::{BoxBounds, LevenbergMarquardt, NonlinearLeastSquaresSolver};
use crate::models::nss;

/// A quote admitted to the NSS sample, with its objective weight in `(0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedQuote {
    pub quote: BondQuote,
    pub weight: f64,
}

impl From<BondQuote> for WeightedQuote {
    fn from(quote: BondQuote) -> Self {
        Self { quote, weight: 1.0 }
    }
}

/// Apply the GSW eligibility screen.
///
/// Drops short bonds, recent issues (on-the-run and first off-the-run once
/// the market matured), bills, and callables. Twenty-year bonds are phased
/// out linearly over the year before `phase_out_end` and excluded after it.
pub fn gsw_filter(quotes: &[BondQuote], config: &GswFilterConfig) -> Vec<WeightedQuote> {
    let kept: Vec<WeightedQuote> = quotes
        .iter()
        .filter(|q| q.days_to_maturity() > config.min_days_to_maturity)
        .filter(|q| !(q.quote_date() >= config.on_the_run_start && q.run < config.on_the_run_depth))
        .filter(|q| config.instrument_types.contains(&q.terms.itype))
        .filter(|q| !(config.exclude_callable && q.terms.callable))
        .map(|q| WeightedQuote {
            quote: q.clone(),
            weight: phase_out_weight(q, config),
        })
        .filter(|w| w.weight > 0.0)
        .collect();

    log::debug!("gsw filter kept {} of {} quotes", kept.len(), quotes.len());
    kept
}

fn phase_out_weight(q: &BondQuote, config: &GswFilterConfig) -> f64 {
    if (q.original_maturity - config.phase_out_original_maturity).abs() > 1e-9 {
        return 1.0;
    }
    let date = q.quote_date();
    if date > config.phase_out_end {
        return 0.0;
    }
    if config.phase_out_days <= 0 {
        return 1.0;
    }
    let start = config.phase_out_end - chrono::Duration::days(config.phase_out_days);
    if date < start {
        return 1.0;
    }
    1.0 - (date - start).num_days() as f64 / config.phase_out_days as f64
}

/// Fit NSS with the default Levenberg–Marquardt solver.
pub fn fit_nss(quotes: &[WeightedQuote], config: &NssConfig) -> Result<FitResult> {
    fit_nss_with(&LevenbergMarquardt::new(config.solver), quotes, config)
}

/// Fit NSS with any bounded least-squares solver.
pub fn fit_nss_with<S: NonlinearLeastSquaresSolver>(
    solver: &S,
    quotes: &[WeightedQuote],
    config: &NssConfig,
) -> Result<FitResult> {
    if !(config.tau_lower_bound.is_finite() && config.tau_lower_bound > 0.0) {
        return Err(CurveError::config(format!(
            "tau lower bound must be positive, got {}",
            config.tau_lower_bound
        )));
    }
    let panel: Vec<BondQuote> = quotes.iter().map(|w| w.quote.clone()).collect();
    let quote_date = validate_panel(&panel)?;
    if let Some(w) = quotes.iter().find(|w| !(w.weight.is_finite() && w.weight > 0.0)) {
        return Err(CurveError::data(format!(
            "{}: objective weight must be positive, got {}",
            w.quote.terms.cusip, w.weight
        )));
    }

    let prepared = prepare(quotes, quote_date)?;
    let scale = 1.0 / (prepared.len() as f64).sqrt();

    let mut lower = vec![f64::NEG_INFINITY; 6];
    lower[0] = config.tau_lower_bound;
    lower[1] = config.tau_lower_bound;
    let bounds = BoxBounds::new(lower, vec![f64::INFINITY; 6])?;

    log::debug!("{quote_date}: nss fit on {} bonds from {:?}", prepared.len(), config.initial);
    let report = solver.minimize(&config.initial, &bounds, |x| {
        let p = params_from_slice(x);
        prepared
            .iter()
            .map(|b| (b.observed_dirty - nss::price(&b.schedule, &p)) * b.weight * scale)
            .collect()
    })?;

    if !report.converged() {
        log::debug!(
            "{quote_date}: nss fit stopped after {} iterations ({:?})",
            report.iterations,
            report.termination
        );
        return Err(CurveError::fit(
            report.iterations,
            report.objective,
            format!("optimizer stopped with {:?}", report.termination),
        ));
    }

    let params = params_from_slice(&report.x);
    log::debug!(
        "{quote_date}: nss fit converged in {} iterations, objective {:.6e}",
        report.iterations,
        report.objective
    );

    let bonds = prepared
        .iter()
        .map(|b| {
            let q = &b.quote;
            let model_price = nss::price(&b.schedule, &params) - q.accrued_interest;
            let observed = q.mid();
            BondFit {
                cusip: q.terms.cusip.clone(),
                maturity_date: q.terms.maturity_date,
                ttm: q.ttm_years(),
                bid: q.bid,
                ask: q.ask,
                duration: q.duration,
                observed_price: observed,
                model_price,
                residual: model_price - observed,
            }
        })
        .collect();

    let maturities: Vec<f64> = quotes.iter().map(|w| w.quote.ttm_years()).collect();
    let params = CurveParams::Nss(params);
    let curve = params.sample(&curve_grid(&maturities, config.grid_points))?;

    Ok(FitResult {
        quote_date,
        params,
        objective: report.objective,
        bonds,
        curve,
        nodes: None,
    })
}

struct PreparedBond<'a> {
    quote: &'a BondQuote,
    schedule: CashflowSchedule,
    observed_dirty: f64,
    /// `filter_weight / sqrt(duration)`.
    weight: f64,
}

fn prepare(quotes: &[WeightedQuote], quote_date: NaiveDate) -> Result<Vec<PreparedBond<'_>>> {
    quotes
        .iter()
        .map(|w| {
            let q = &w.quote;
            Ok(PreparedBond {
                quote: q,
                schedule: treasury_schedule(&q.terms, quote_date)?,
                observed_dirty: q.mid() + q.accrued_interest,
                weight: w.weight / q.duration.sqrt(),
            })
        })
        .collect()
}

fn params_from_slice(x: &[f64]) -> NssParams {
    NssParams::from_array([x[0], x[1], x[2], x[3], x[4], x[5]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BondTerms, InstrumentType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn quote(quote_date: NaiveDate, years: i64, run: u32, itype: InstrumentType) -> BondQuote {
        let maturity = quote_date + chrono::Duration::days(365 * years);
        BondQuote {
            terms: BondTerms::new(format!("B{years}-{run}"), quote_date, maturity, 4.0, itype),
            run,
            original_maturity: 30.0,
            bid: 99.9,
            ask: 100.1,
            accrued_interest: 0.0,
            duration: years as f64 * 0.9,
            flower: false,
        }
    }

    #[test]
    fn filter_drops_recent_issues_bills_and_callables() {
        let d = date(2005, 3, 1);
        let mut callable = quote(d, 12, 6, InstrumentType::Bond);
        callable.terms.callable = true;
        let short = {
            let mut q = quote(d, 1, 4, InstrumentType::Note);
            q.terms.maturity_date = d + chrono::Duration::days(92);
            q
        };
        let quotes = vec![
            quote(d, 5, 0, InstrumentType::Note),
            quote(d, 5, 1, InstrumentType::Note),
            quote(d, 5, 2, InstrumentType::Note),
            quote(d, 1, 3, InstrumentType::Bill),
            callable,
            short,
        ];
        let kept = gsw_filter(&quotes, &GswFilterConfig::default());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].quote.run, 2);
        assert_eq!(kept[0].weight, 1.0);
    }

    #[test]
    fn recent_issues_are_kept_before_the_cutoff() {
        let d = date(1975, 6, 2);
        let quotes = vec![quote(d, 5, 0, InstrumentType::Note)];
        assert_eq!(gsw_filter(&quotes, &GswFilterConfig::default()).len(), 1);
    }

    #[test]
    fn twenty_year_bonds_phase_out() {
        let cfg = GswFilterConfig::default();
        let twenty = |d: NaiveDate| {
            let mut q = quote(d, 10, 5, InstrumentType::Bond);
            q.original_maturity = 20.0;
            q
        };

        let before = gsw_filter(&[twenty(date(1994, 6, 1))], &cfg);
        assert_eq!(before[0].weight, 1.0);

        let midway = date(1995, 7, 3);
        let w = gsw_filter(&[twenty(midway)], &cfg)[0].weight;
        let start = date(1996, 1, 2) - chrono::Duration::days(365);
        let expected = 1.0 - (midway - start).num_days() as f64 / 365.0;
        assert!((w - expected).abs() < 1e-12);
        assert!(w > 0.0 && w < 1.0);

        assert!(gsw_filter(&[twenty(date(1996, 1, 3))], &cfg).is_empty());
    }

    #[test]
    fn zero_weight_is_rejected_by_the_fit() {
        let d = date(2005, 3, 1);
        let quotes: Vec<WeightedQuote> = (2..10)
            .map(|y| WeightedQuote {
                quote: quote(d, y, 5, InstrumentType::Note),
                weight: 0.0,
            })
            .collect();
        assert!(matches!(
            fit_nss(&quotes, &NssConfig::default()),
            Err(CurveError::Data(_))
        ));
    }

    #[test]
    fn iteration_cap_surfaces_as_fit_error() {
        let d = date(2005, 3, 1);
        let quotes: Vec<WeightedQuote> = (2..10)
            .map(|y| quote(d, y, 5, InstrumentType::Note).into())
            .collect();
        let mut cfg = NssConfig::default();
        cfg.solver.max_iterations = 1;
        match fit_nss(&quotes, &cfg) {
            Err(CurveError::Fit { iterations, .. }) => assert_eq!(iterations, 1),
            other => panic!("expected a fit error, got {other:?}"),
        }
    }
}
