//! Mathematical utilities: Nelson–Siegel loadings, least squares (linear and
//! bounded nonlinear), and grid helpers.

pub mod basis;
pub mod lm;
pub mod numeric;
pub mod ols;

pub use basis::*;
pub use lm::*;
pub use numeric::*;
pub use ols::*;
