//! Per-date curve estimation.
//!
//! - `mcculloch`: spline discount function by linear least squares
//! - `gsw`: NSS by bounded nonlinear least squares, with the GSW sample screen
//! - `sample`: Waggoner screen and in/out-of-sample split for spline studies
//!
//! Every fit takes the quotes of a single date and an explicit config, and
//! returns a [`FitResult`](crate::domain::FitResult).

pub mod gsw;
pub mod mcculloch;
pub mod sample;

pub use gsw::*;
pub use mcculloch::*;
pub use sample::*;

use chrono::NaiveDate;

use crate::domain::BondQuote;
use crate::error::{CurveError, Result};
use crate::math::linspace;

/// Check that `quotes` form one usable cross-section and return its date.
pub(crate) fn validate_panel(quotes: &[BondQuote]) -> Result<NaiveDate> {
    let Some(first) = quotes.first() else {
        return Err(CurveError::data("no quotes to fit"));
    };
    let quote_date = first.quote_date();

    for q in quotes {
        let id = &q.terms.cusip;
        if q.quote_date() != quote_date {
            return Err(CurveError::data(format!(
                "{id}: quoted on {} but the panel is for {quote_date}",
                q.quote_date()
            )));
        }
        if q.days_to_maturity() <= 0 {
            return Err(CurveError::data(format!(
                "{id}: maturity {} is not after {quote_date}",
                q.terms.maturity_date
            )));
        }
        if !(q.bid.is_finite() && q.ask.is_finite() && q.accrued_interest.is_finite()) {
            return Err(CurveError::data(format!("{id}: non-finite price field")));
        }
        if !(q.duration.is_finite() && q.duration > 0.0) {
            return Err(CurveError::data(format!(
                "{id}: duration must be positive, got {}",
                q.duration
            )));
        }
    }
    Ok(quote_date)
}

/// Canonical curve grid `[0, ceil(max maturity)]`.
pub(crate) fn curve_grid(maturities: &[f64], points: usize) -> Vec<f64> {
    let t_max = maturities.iter().copied().fold(0.0_f64, f64::max).ceil();
    linspace(0.0, t_max, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BondTerms, InstrumentType};

    fn quote(quote_date: NaiveDate) -> BondQuote {
        BondQuote {
            terms: BondTerms::new(
                "X",
                quote_date,
                quote_date + chrono::Duration::days(700),
                2.0,
                InstrumentType::Note,
            ),
            run: 3,
            original_maturity: 5.0,
            bid: 99.0,
            ask: 99.5,
            accrued_interest: 0.3,
            duration: 1.9,
            flower: false,
        }
    }

    #[test]
    fn mixed_dates_are_rejected() {
        let a = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();
        let b = NaiveDate::from_ymd_opt(2020, 2, 28).unwrap();
        assert!(validate_panel(&[quote(a), quote(a)]).is_ok());
        assert!(matches!(validate_panel(&[quote(a), quote(b)]), Err(CurveError::Data(_))));
        assert!(matches!(validate_panel(&[]), Err(CurveError::Data(_))));
    }

    #[test]
    fn grid_spans_ceiled_maturity() {
        let grid = curve_grid(&[0.4, 7.2, 3.0], 200);
        assert_eq!(grid.len(), 200);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[199], 8.0);
    }
}
