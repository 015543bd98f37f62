//! Conversions from a discount curve to spot and forward rate series.

pub mod decorated;
pub mod rates;

pub use decorated::*;
pub use rates::*;
