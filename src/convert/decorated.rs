//! A discount curve together with its derived rate columns.

use serde::{Deserialize, Serialize};

use crate::convert::rates::{forward_discrete_cc, forward_instant_cc, sorted_points, spot_cc, spot_simple};
use crate::domain::Curve;
use crate::error::Result;

/// Sorted `(t, discount)` columns plus named rate series of the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoratedCurve {
    pub t: Vec<f64>,
    pub discount: Vec<f64>,
    pub columns: Vec<(String, Vec<f64>)>,
}

impl DecoratedCurve {
    /// Series by column name (`"t"` and `"discount"` included).
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        match name {
            "t" => Some(self.t.as_slice()),
            "discount" => Some(self.discount.as_slice()),
            _ => self
                .columns
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_slice()),
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        ["t", "discount"]
            .into_iter()
            .chain(self.columns.iter().map(|(n, _)| n.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

/// Name of the discrete forward column for horizon `dt` (`forward_1y_cc`, `forward_0.5y_cc`).
pub fn forward_column_name(dt: f64) -> String {
    format!("forward_{dt}y_cc")
}

/// Attach spot and forward columns to `curve`.
pub fn decorate(curve: &Curve, dt: f64) -> Result<DecoratedCurve> {
    let forward = forward_discrete_cc(curve, dt)?;
    let points = sorted_points(curve)?;
    let columns = vec![
        ("spot_cc".to_string(), spot_cc(curve)?),
        ("spot_simple".to_string(), spot_simple(curve)?),
        ("forward_instant_cc".to_string(), forward_instant_cc(curve)?),
        (forward_column_name(dt), forward),
    ];
    Ok(DecoratedCurve {
        t: points.iter().map(|p| p.t).collect(),
        discount: points.iter().map(|p| p.discount).collect(),
        columns,
    })
}
