//! Pricing-error metrics against bid/ask quotes (Waggoner 1997).
//!
//! - WMAE: mean absolute distance from the quote mid, weighted by `1/duration`
//! - hit rate: share of model prices inside `[bid, ask]`

use crate::domain::{BondFit, BucketScore, ErrorScore};
use crate::error::{CurveError, Result};

/// Maturity bands (years, half-open) for bucketed scores.
pub const MATURITY_BANDS: [(f64, f64); 5] = [
    (0.0, 1.0),
    (1.0, 3.0),
    (3.0, 5.0),
    (5.0, 10.0),
    (10.0, f64::INFINITY),
];

fn check_lengths(n: usize, others: &[usize]) -> Result<()> {
    if n == 0 {
        return Err(CurveError::data("no prices to score"));
    }
    if others.iter().any(|&m| m != n) {
        return Err(CurveError::data("model, bid, ask and duration series differ in length"));
    }
    Ok(())
}

/// Duration-weighted mean absolute error versus the mid.
pub fn wmae(model: &[f64], bid: &[f64], ask: &[f64], duration: &[f64]) -> Result<f64> {
    check_lengths(model.len(), &[bid.len(), ask.len(), duration.len()])?;
    if let Some(d) = duration.iter().find(|d| !(d.is_finite() && **d > 0.0)) {
        return Err(CurveError::data(format!("duration must be positive, got {d}")));
    }

    let mut num = 0.0;
    let mut den = 0.0;
    for i in 0..model.len() {
        let w = 1.0 / duration[i];
        let mid = (bid[i] + ask[i]) * 0.5;
        num += w * (model[i] - mid).abs();
        den += w;
    }
    Ok(num / den)
}

/// Fraction of model prices with `bid <= model <= ask`.
pub fn hit_rate(model: &[f64], bid: &[f64], ask: &[f64]) -> Result<f64> {
    check_lengths(model.len(), &[bid.len(), ask.len()])?;
    let hits = model
        .iter()
        .zip(bid.iter().zip(ask))
        .filter(|(m, (b, a))| **b <= **m && **m <= **a)
        .count();
    Ok(hits as f64 / model.len() as f64)
}

/// WMAE and hit rate over a set of fitted bonds.
pub fn score(rows: &[BondFit]) -> Result<ErrorScore> {
    let model: Vec<f64> = rows.iter().map(|r| r.model_price).collect();
    let bid: Vec<f64> = rows.iter().map(|r| r.bid).collect();
    let ask: Vec<f64> = rows.iter().map(|r| r.ask).collect();
    let duration: Vec<f64> = rows.iter().map(|r| r.duration).collect();
    Ok(ErrorScore {
        wmae: wmae(&model, &bid, &ask, &duration)?,
        hit_rate: hit_rate(&model, &bid, &ask)?,
        count: rows.len(),
    })
}

fn band_label(lo: f64, hi: f64) -> String {
    if hi.is_finite() { format!("{lo}-{hi}") } else { format!(">{lo}") }
}

/// Scores per maturity band followed by an `All` row.
pub fn score_by_maturity(rows: &[BondFit]) -> Result<Vec<BucketScore>> {
    if rows.is_empty() {
        return Err(CurveError::data("no prices to score"));
    }

    let mut out = Vec::with_capacity(MATURITY_BANDS.len() + 1);
    for (lo, hi) in MATURITY_BANDS {
        let band: Vec<BondFit> = rows.iter().filter(|r| r.ttm >= lo && r.ttm < hi).cloned().collect();
        let band_score = if band.is_empty() { None } else { Some(score(&band)?) };
        out.push(BucketScore {
            label: band_label(lo, hi),
            score: band_score,
        });
    }
    out.push(BucketScore {
        label: "All".to_string(),
        score: Some(score(rows)?),
    });
    Ok(out)
}
