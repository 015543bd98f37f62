//! Sample construction for spline fits.
//!
//! - [`waggoner_filter`]: Waggoner (1997) style screen (short bills and
//!   coupon issues inside a year out, flower bonds out, date window)
//! - [`split_in_out_sample`]: alternate bonds by maturity rank on each date,
//!   keeping the longest bond in sample

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{BondQuote, InstrumentType, WaggonerConfig};

pub fn waggoner_filter(quotes: &[BondQuote], config: &WaggonerConfig) -> Vec<BondQuote> {
    quotes
        .iter()
        .filter(|q| {
            let min_days = match q.terms.itype {
                InstrumentType::Bill => config.min_bill_days,
                InstrumentType::Note | InstrumentType::Bond => config.min_coupon_days,
            };
            q.days_to_maturity() >= min_days
        })
        .filter(|q| (config.start..=config.end).contains(&q.quote_date()))
        .filter(|q| !(config.exclude_flower && q.flower))
        .cloned()
        .collect()
}

/// In-sample and out-of-sample halves of a quote panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSplit {
    pub in_sample: Vec<BondQuote>,
    pub out_of_sample: Vec<BondQuote>,
}

/// Split each date's quotes by the parity of their maturity rank.
///
/// Ranks start at 0 for the shortest maturity. If the longest bond would land
/// out of sample, the whole date flips so it stays in.
pub fn split_in_out_sample(quotes: &[BondQuote]) -> SampleSplit {
    let mut by_date: BTreeMap<NaiveDate, Vec<&BondQuote>> = BTreeMap::new();
    for q in quotes {
        by_date.entry(q.quote_date()).or_default().push(q);
    }

    let mut split = SampleSplit::default();
    for (_, mut day) in by_date {
        day.sort_by_key(|q| q.terms.maturity_date);
        let flip = (day.len() - 1) % 2 == 1;
        for (rank, q) in day.into_iter().enumerate() {
            let odd = rank % 2 == 1;
            if odd != flip {
                split.out_of_sample.push(q.clone());
            } else {
                split.in_sample.push(q.clone());
            }
        }
    }
    split
}
