//! Fit quality reporting.

pub mod metrics;

pub use metrics::*;
