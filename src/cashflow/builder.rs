//! Bond terms → discrete cash-flow schedule.
//!
//! Conventions:
//! - times are actual days from settlement over a 365-day year
//! - bills (zero coupon) pay face once at maturity
//! - coupon bonds pay `face · coupon / 100 / freq` on a regular schedule rolled
//!   forward from the first coupon date, with face added to the last payment
//! - a first coupon whose accrual period is irregular (short or long stub) is
//!   pro-rated by actual over regular days

use chrono::NaiveDate;

use crate::cashflow::dates::{days_between, is_end_of_month, shift_months, year_month};
use crate::domain::{BondTerms, Cashflow, CashflowConfig, CashflowSchedule};
use crate::error::{CurveError, Result};

const DAYS_PER_YEAR: f64 = 365.0;

/// Longest schedule walked when inferring a first coupon (100 years of monthly steps).
const MAX_BACKWARD_STEPS: i32 = 1200;

/// Build the schedule of `bond` as seen from `settle`.
pub fn build(bond: &BondTerms, settle: NaiveDate, config: &CashflowConfig) -> Result<CashflowSchedule> {
    let step = period_months(config.freq)?;
    if !(bond.face.is_finite() && bond.face > 0.0) {
        return Err(CurveError::config(format!(
            "{}: face value must be positive, got {}",
            bond.cusip, bond.face
        )));
    }
    if !(bond.coupon.is_finite() && bond.coupon >= 0.0) {
        return Err(CurveError::data(format!(
            "{}: coupon must be a non-negative percentage, got {}",
            bond.cusip, bond.coupon
        )));
    }

    let face = bond.face;
    let coupon_amount = face * bond.coupon / 100.0 / config.freq as f64;

    if coupon_amount <= 0.0 {
        let t = years_between(settle, bond.maturity_date);
        return CashflowSchedule::new(vec![Cashflow { time: t, amount: face }]);
    }

    let first_coupon = match bond.first_coupon_date {
        Some(d) => d,
        None => infer_first_coupon(bond, settle, step)?,
    };
    let month_end = is_end_of_month(first_coupon);

    let mut payment_dates = Vec::new();
    let mut d = first_coupon;
    while year_month(d) <= year_month(bond.maturity_date) {
        if d > settle {
            payment_dates.push(d);
        }
        d = shift_months(d, step, month_end)?;
    }

    let Some(&first_pay) = payment_dates.first() else {
        // Settlement falls inside the final period.
        let t = years_between(settle, bond.maturity_date);
        return CashflowSchedule::new(vec![Cashflow {
            time: t,
            amount: coupon_amount + face,
        }]);
    };

    let mut amounts = vec![coupon_amount; payment_dates.len()];
    if let Some(last) = amounts.last_mut() {
        *last += face;
    }

    // Stub handling: compare the actual first accrual period with a regular one.
    let prev_coupon = shift_months(first_pay, -step, month_end)?;
    let regular_days = days_between(prev_coupon, first_pay);
    let accrual_start = match bond.issue_date {
        Some(issue) => issue.max(prev_coupon),
        None => prev_coupon,
    };
    let stub_days = days_between(accrual_start, first_pay);
    if regular_days != 0 && (stub_days - regular_days).abs() > config.stub_tolerance_days {
        let scaled = coupon_amount * stub_days as f64 / regular_days as f64;
        amounts[0] += scaled - coupon_amount;
    }

    let flows = payment_dates
        .iter()
        .zip(amounts)
        .map(|(&date, amount)| Cashflow {
            time: years_between(settle, date),
            amount,
        })
        .collect();
    CashflowSchedule::new(flows)
}

/// Months between regular coupon dates.
pub fn period_months(freq: u32) -> Result<i32> {
    if freq == 0 || 12 % freq != 0 {
        return Err(CurveError::config(format!(
            "coupon frequency must be a positive divisor of 12, got {freq}"
        )));
    }
    Ok((12 / freq) as i32)
}

/// Earliest date of the maturity-anchored schedule that falls after `settle`.
fn infer_first_coupon(bond: &BondTerms, settle: NaiveDate, step: i32) -> Result<NaiveDate> {
    if bond.maturity_date <= settle {
        return Err(CurveError::data(format!(
            "{}: cannot determine first coupon, maturity {} is not after settlement {}",
            bond.cusip, bond.maturity_date, settle
        )));
    }
    let month_end = is_end_of_month(bond.maturity_date);

    let mut candidate = bond.maturity_date;
    for k in 1..=MAX_BACKWARD_STEPS {
        let earlier = shift_months(bond.maturity_date, -step * k, month_end)?;
        if earlier <= settle {
            return Ok(candidate);
        }
        candidate = earlier;
    }

    Err(CurveError::data(format!(
        "{}: cannot determine first coupon within {} periods of maturity {}",
        bond.cusip, MAX_BACKWARD_STEPS, bond.maturity_date
    )))
}

fn years_between(from: NaiveDate, to: NaiveDate) -> f64 {
    days_between(from, to) as f64 / DAYS_PER_YEAR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InstrumentType;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn note(settle: NaiveDate, maturity: NaiveDate, coupon: f64) -> BondTerms {
        BondTerms::new("TEST", settle, maturity, coupon, InstrumentType::Note)
    }

    #[test]
    fn two_year_note_from_coupon_boundary() {
        let settle = date(2020, 1, 15);
        let bond = note(settle, date(2022, 1, 15), 5.0).with_first_coupon(date(2020, 7, 15));
        let s = build(&bond, settle, &CashflowConfig::default()).unwrap();

        assert_eq!(s.amounts(), vec![2.5, 2.5, 2.5, 102.5]);
        let expected = [0.5, 1.0, 1.5, 2.0];
        for (t, e) in s.times().iter().zip(expected) {
            assert!((t - e).abs() < 0.01, "time {t} vs {e}");
        }
    }

    #[test]
    fn inferred_schedule_matches_explicit_first_coupon() {
        let settle = date(2020, 1, 15);
        let explicit = note(settle, date(2022, 1, 15), 5.0).with_first_coupon(date(2020, 7, 15));
        let inferred = note(settle, date(2022, 1, 15), 5.0);
        let cfg = CashflowConfig::default();
        assert_eq!(
            build(&explicit, settle, &cfg).unwrap(),
            build(&inferred, settle, &cfg).unwrap()
        );
    }

    #[test]
    fn bill_pays_face_once() {
        let settle = date(2021, 3, 1);
        let maturity = settle + chrono::Duration::days(91);
        let bill = BondTerms::new("BILL", settle, maturity, 0.0, InstrumentType::Bill);
        let s = build(&bill, settle, &CashflowConfig::default()).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.amounts(), vec![100.0]);
        assert_relative_eq!(s.times()[0], 91.0 / 365.0, epsilon = 1e-12);
        assert!((s.times()[0] - 0.2493).abs() < 1e-4);
    }

    #[test]
    fn settlement_in_final_period_gives_single_payment() {
        // Coupons fall on the 5th; the last one (2022-01-05) precedes settlement.
        let settle = date(2022, 1, 10);
        let bond = note(settle, date(2022, 1, 20), 4.0).with_first_coupon(date(2020, 7, 5));
        let s = build(&bond, settle, &CashflowConfig::default()).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.amounts(), vec![102.0]);
        assert_relative_eq!(s.times()[0], 10.0 / 365.0, epsilon = 1e-12);
    }

    #[test]
    fn short_first_coupon_is_prorated() {
        // Issued 2019-11-15 with first coupon 2020-07-15.
        let settle = date(2019, 11, 15);
        let bond = note(settle, date(2022, 1, 15), 5.0)
            .with_first_coupon(date(2020, 7, 15))
            .with_issue_date(date(2019, 11, 15));
        let s = build(&bond, settle, &CashflowConfig::default()).unwrap();
        let a = s.amounts();
        // Accrual start is max(issue, synthetic previous coupon 2020-01-15).
        assert_relative_eq!(a[0], 2.5, epsilon = 1e-12);

        // Issue after the synthetic previous coupon: a short stub.
        let short = note(date(2020, 3, 16), date(2022, 1, 15), 5.0)
            .with_first_coupon(date(2020, 7, 15))
            .with_issue_date(date(2020, 3, 16));
        let s = build(&short, date(2020, 3, 16), &CashflowConfig::default()).unwrap();
        let regular = (date(2020, 7, 15) - date(2020, 1, 15)).num_days() as f64;
        let actual = (date(2020, 7, 15) - date(2020, 3, 16)).num_days() as f64;
        assert_relative_eq!(s.amounts()[0], 2.5 * actual / regular, epsilon = 1e-12);
        assert_eq!(*s.amounts().last().unwrap(), 102.5);
    }

    #[test]
    fn stub_within_tolerance_is_left_alone() {
        // 180 accrual days against a 182-day regular period.
        let settle = date(2020, 1, 17);
        let bond = note(settle, date(2022, 1, 15), 5.0)
            .with_first_coupon(date(2020, 7, 15))
            .with_issue_date(date(2020, 1, 17));
        let s = build(&bond, settle, &CashflowConfig::default()).unwrap();
        assert_eq!(s.amounts()[0], 2.5);

        let tight = CashflowConfig {
            stub_tolerance_days: 1,
            ..CashflowConfig::default()
        };
        let s = build(&bond, settle, &tight).unwrap();
        assert_relative_eq!(s.amounts()[0], 2.5 * 180.0 / 182.0, epsilon = 1e-12);
    }

    #[test]
    fn month_end_schedules_stay_on_month_end() {
        let settle = date(2020, 3, 1);
        let bond = note(settle, date(2021, 8, 31), 2.0).with_first_coupon(date(2020, 2, 29));
        let s = build(&bond, settle, &CashflowConfig::default()).unwrap();
        let days: Vec<i64> = s.times().iter().map(|t| (t * 365.0).round() as i64).collect();
        let expected: Vec<i64> = [date(2020, 8, 31), date(2021, 2, 28), date(2021, 8, 31)]
            .iter()
            .map(|d| (*d - settle).num_days())
            .collect();
        assert_eq!(days, expected);
    }

    #[test]
    fn unresolvable_first_coupon_is_a_data_error() {
        let settle = date(2020, 1, 15);
        let bond = note(settle, date(2020, 1, 15), 5.0);
        assert!(matches!(
            build(&bond, settle, &CashflowConfig::default()),
            Err(CurveError::Data(_))
        ));
    }

    #[test]
    fn bad_frequency_is_a_config_error() {
        let settle = date(2020, 1, 15);
        let bond = note(settle, date(2022, 1, 15), 5.0);
        let cfg = CashflowConfig {
            freq: 0,
            ..CashflowConfig::default()
        };
        assert!(matches!(build(&bond, settle, &cfg), Err(CurveError::Config(_))));
        let cfg = CashflowConfig {
            freq: 5,
            ..CashflowConfig::default()
        };
        assert!(matches!(build(&bond, settle, &cfg), Err(CurveError::Config(_))));
    }
}
