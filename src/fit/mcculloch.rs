//! McCulloch (1975) spline fit for one quote date.
//!
//! Each bond contributes one regression row: the cash-flow-weighted sum of the
//! spline basis rows at its payment times. With `D(t) = 1 + F(t)·β` the clean
//! price identity becomes linear in β:
//!
//! ```text
//! clean_i + accrued_i − Σ cf = Σ cf·F(t)·β
//! ```
//!
//! and β is the unweighted least-squares solution.

use nalgebra::{DMatrix, DVector};

use crate::cashflow;
use crate::domain::{BondFit, BondQuote, CashflowSchedule, CurveParams, FitResult, SplineConfig, SplineParams};
use crate::error::{CurveError, Result};
use crate::fit::{curve_grid, validate_panel};
use crate::math::solve_least_squares;
use crate::models::spline::{discount_factors, node_curve, place_knots, weighted_basis_row};

/// Fit the spline discount function to one date's quotes.
pub fn fit_mcculloch(quotes: &[BondQuote], config: &SplineConfig) -> Result<FitResult> {
    let quote_date = validate_panel(quotes)?;

    let mut bonds: Vec<&BondQuote> = quotes.iter().collect();
    bonds.sort_by(|a, b| a.ttm_years().total_cmp(&b.ttm_years()));

    let maturities: Vec<f64> = bonds.iter().map(|q| q.ttm_years()).collect();
    let (knots, ncoef) = place_knots(&maturities)?;
    log::debug!(
        "{quote_date}: spline fit on {} bonds, {ncoef} coefficients, knots {knots:?}",
        bonds.len()
    );

    let schedules = bonds
        .iter()
        .map(|q| cashflow::build(&q.terms, quote_date, &config.cashflows))
        .collect::<Result<Vec<CashflowSchedule>>>()?;

    let n = bonds.len();
    let mut design = DMatrix::zeros(n, ncoef);
    let mut rhs = DVector::zeros(n);
    for (i, (q, s)) in bonds.iter().zip(&schedules).enumerate() {
        let row = weighted_basis_row(&s.times(), &s.amounts(), &knots, ncoef)?;
        design.set_row(i, &row.transpose());
        rhs[i] = q.mid() - (s.total() - q.accrued_interest);
    }

    let beta = solve_least_squares(&design, &rhs)
        .map_err(|e| CurveError::fit(0, f64::NAN, format!("spline regression failed: {e}")))?;
    let sse = (&design * &beta - &rhs).norm_squared();

    let params = SplineParams {
        knots,
        coefficients: beta.iter().copied().collect(),
    };

    let mut fits = Vec::with_capacity(n);
    for (q, s) in bonds.iter().zip(&schedules) {
        let d = discount_factors(&s.times(), &params)?;
        let dirty: f64 = s.amounts().iter().zip(&d).map(|(cf, df)| cf * df).sum();
        let model_price = dirty - q.accrued_interest;
        let observed = q.mid();
        fits.push(BondFit {
            cusip: q.terms.cusip.clone(),
            maturity_date: q.terms.maturity_date,
            ttm: q.ttm_years(),
            bid: q.bid,
            ask: q.ask,
            duration: q.duration,
            observed_price: observed,
            model_price,
            residual: model_price - observed,
        });
    }

    let nodes = node_curve(&params)?;
    let params = CurveParams::Spline(params);
    let curve = params.sample(&curve_grid(&maturities, config.grid_points))?;
    log::debug!("{quote_date}: spline fit sse {sse:.6e}");

    Ok(FitResult {
        quote_date,
        params,
        objective: sse,
        bonds: fits,
        curve,
        nodes: Some(nodes),
    })
}
