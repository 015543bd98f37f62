//! Cash-flow schedules.
//!
//! - `builder`: general schedule from bond terms (first coupon, stubs, month-end)
//! - `treasury`: semiannual schedule counted back from maturity (NSS pricing)
//! - `dates`: month arithmetic shared by both

pub mod builder;
pub mod dates;
pub mod treasury;

pub use builder::{build, period_months};
pub use treasury::treasury_schedule;
