//! Calendar arithmetic for coupon schedules.
//!
//! Month shifts clamp to the end of the target month (Aug 31 + 6M = Feb 28/29).
//! When a schedule is month-end aligned every shifted date is snapped to the
//! last day of its month, so Feb 28 + 6M = Aug 31 rather than Aug 28.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::{CurveError, Result};

/// Last calendar day of `date`'s month.
pub fn end_of_month(date: NaiveDate) -> Result<NaiveDate> {
    let first = date.with_day(1).ok_or_else(|| out_of_range(date))?;
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| out_of_range(date))
}

pub fn is_end_of_month(date: NaiveDate) -> bool {
    date.succ_opt().is_some_and(|next| next.month() != date.month())
}

/// Shift `date` by `months` (may be negative), optionally snapping to month end.
pub fn shift_months(date: NaiveDate, months: i32, month_end: bool) -> Result<NaiveDate> {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    }
    .ok_or_else(|| out_of_range(date))?;

    if month_end {
        end_of_month(shifted)
    } else {
        Ok(shifted)
    }
}

/// `(year, month)` ordering key.
pub fn year_month(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

/// Actual day count from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

fn out_of_range(date: NaiveDate) -> CurveError {
    CurveError::data(format!("coupon date arithmetic out of range near {date}"))
}
