//! Error taxonomy for the curve engine.
//!
//! Every public operation returns [`Result`]. Failures are explicit: the only
//! silent fallback in the crate is the `T = 0` fill of spot-rate series.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CurveError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// Malformed input data: NaN, non-positive discount factor, negative time,
    /// knot/coefficient mismatch, unresolvable coupon schedule, too few bonds.
    #[error("data error: {0}")]
    Data(String),

    /// Invalid parameter to a pure transform or fit (e.g. `dt <= 0`, bad frequency).
    #[error("config error: {0}")]
    Config(String),

    /// The estimation itself failed (optimizer did not converge, singular solve).
    #[error("fit error after {iterations} iterations (objective {objective:.3e}): {reason}")]
    Fit {
        iterations: usize,
        objective: f64,
        reason: String,
    },
}

impl CurveError {
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn fit(iterations: usize, objective: f64, reason: impl Into<String>) -> Self {
        Self::Fit {
            iterations,
            objective,
            reason: reason.into(),
        }
    }

    /// Short category label, useful when tabulating per-date failures.
    pub fn kind(&self) -> &'static str {
        match self {
            CurveError::Data(_) => "data",
            CurveError::Config(_) => "config",
            CurveError::Fit { .. } => "fit",
        }
    }
}
