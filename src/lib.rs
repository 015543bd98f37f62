//! `treasury-curves` library crate.
//!
//! Estimates riskless discount curves from Treasury quotes and turns them into
//! rate representations:
//!
//! - `cashflow`: bond terms to dated cash-flow schedules
//! - `models` / `fit`: McCulloch (1975) cubic spline and Gürkaynak–Sack–Wright
//!   (2006) Nelson–Siegel–Svensson fits for one quote date
//! - `convert`: discount curve to spot and forward rates
//! - `report`: WMAE and hit-rate scores against bid/ask quotes
//! - `pipeline`: per-date batch estimation over a quote panel
//!
//! The crate logs through the `log` facade and never installs a logger.

pub mod cashflow;
pub mod convert;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;
pub mod pipeline;
pub mod report;
