//! Batch estimation over a panel of quote dates.
//!
//! The panel is grouped by quote date and each date is fitted independently on
//! rayon's pool. A failing date is logged and kept as an `Err` entry; it never
//! aborts the rest of the batch.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{BondFit, BondQuote, BucketScore, ErrorScore, FitResult, GswFilterConfig, NssConfig, SplineConfig};
use crate::error::Result;
use crate::fit::{fit_mcculloch, fit_nss, gsw_filter};
use crate::report::{score, score_by_maturity};

/// Which curve to estimate on every date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Estimator {
    /// McCulloch spline on the quotes as given (screen them beforehand).
    McCulloch(SplineConfig),
    /// GSW screen followed by an NSS fit.
    Gsw { filter: GswFilterConfig, nss: NssConfig },
}

impl Default for Estimator {
    fn default() -> Self {
        Estimator::Gsw {
            filter: GswFilterConfig::default(),
            nss: NssConfig::default(),
        }
    }
}

/// Fit and in-sample score for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateFit {
    pub fit: FitResult,
    pub score: ErrorScore,
}

pub type BatchResults = BTreeMap<NaiveDate, Result<DateFit>>;

/// Fit a single date's cross-section.
pub fn fit_date(quotes: &[BondQuote], estimator: &Estimator) -> Result<DateFit> {
    let fit = match estimator {
        Estimator::McCulloch(config) => fit_mcculloch(quotes, config)?,
        Estimator::Gsw { filter, nss } => fit_nss(&gsw_filter(quotes, filter), nss)?,
    };
    let score = score(&fit.bonds)?;
    Ok(DateFit { fit, score })
}

/// Fit every quote date in `quotes`.
pub fn fit_dates(quotes: &[BondQuote], estimator: &Estimator) -> BatchResults {
    let mut by_date: BTreeMap<NaiveDate, Vec<BondQuote>> = BTreeMap::new();
    for q in quotes {
        by_date.entry(q.quote_date()).or_default().push(q.clone());
    }
    log::info!("fitting {} quote dates ({} quotes)", by_date.len(), quotes.len());

    let results: BatchResults = by_date
        .into_par_iter()
        .map(|(date, day)| {
            let result = fit_date(&day, estimator);
            if let Err(e) = &result {
                log::warn!("{date}: {} fit failed: {e}", e.kind());
            }
            (date, result)
        })
        .collect();

    let failed = results.values().filter(|r| r.is_err()).count();
    log::info!("fitted {} of {} dates", results.len() - failed, results.len());
    results
}

/// Maturity-bucketed score over every bond of every successful date.
pub fn pooled_scores(results: &BatchResults) -> Result<Vec<BucketScore>> {
    let rows: Vec<BondFit> = results
        .values()
        .filter_map(|r| r.as_ref().ok())
        .flat_map(|d| d.fit.bonds.iter().cloned())
        .collect();
    score_by_maturity(&rows)
}
