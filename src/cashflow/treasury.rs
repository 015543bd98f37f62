//! Treasury coupon schedule used by the NSS pricer.
//!
//! Coupon dates are counted backward from maturity in six-month steps; only
//! dates strictly after the quote date are kept. Each date pays half the annual
//! coupon and maturity also repays 100. Times are on an actual/365.25 basis.

use chrono::NaiveDate;

use crate::cashflow::dates::{days_between, shift_months};
use crate::domain::{BondTerms, Cashflow, CashflowSchedule};
use crate::error::{CurveError, Result};

const DAYS_PER_YEAR: f64 = 365.25;

/// Upper bound on the look-back: one period per 180 days, rounded up.
const DAYS_PER_PERIOD: i64 = 180;

pub fn treasury_schedule(bond: &BondTerms, quote_date: NaiveDate) -> Result<CashflowSchedule> {
    let days = days_between(quote_date, bond.maturity_date);
    if days <= 0 {
        return Err(CurveError::data(format!(
            "{}: matures on {} which is not after the quote date {}",
            bond.cusip, bond.maturity_date, quote_date
        )));
    }
    if !(bond.coupon.is_finite() && bond.coupon >= 0.0) {
        return Err(CurveError::data(format!(
            "{}: invalid coupon {}",
            bond.cusip, bond.coupon
        )));
    }

    let periods = (days + DAYS_PER_PERIOD - 1) / DAYS_PER_PERIOD;
    let coupon = bond.coupon / 2.0;

    let mut dates = Vec::with_capacity(periods as usize);
    for k in 0..periods {
        let d = shift_months(bond.maturity_date, -6 * k as i32, false)?;
        if d > quote_date {
            dates.push(d);
        }
    }
    dates.reverse();

    let flows = dates
        .into_iter()
        .filter_map(|d| {
            let amount = if d == bond.maturity_date { coupon + 100.0 } else { coupon };
            (amount > 0.0).then(|| Cashflow {
                time: days_between(quote_date, d) as f64 / DAYS_PER_YEAR,
                amount,
            })
        })
        .collect();
    CashflowSchedule::new(flows)
}
