//! Synthetic inputs for examples and tests.

pub mod panel;

pub use panel::*;
