//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - bond inputs (`BondTerms`, `BondQuote`) and cash-flow schedules
//! - curve outputs (`Curve`, `CurveParams`, `FitResult`, `ErrorScore`)
//! - named configuration structs for each fit step

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
