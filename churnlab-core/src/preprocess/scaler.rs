//! Per-column standardization for numeric features.

use serde::{Deserialize, Serialize};

/// Fitted standard scaler: per-column mean and standard deviation.
///
/// Transform is `(x - mean) / std`. Constant columns (std of zero) pass
/// through centered but unscaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit means and standard deviations from column-major data.
    pub fn fit(columns: &[Vec<f64>]) -> Self {
        let mut means = Vec::with_capacity(columns.len());
        let mut stds = Vec::with_capacity(columns.len());

        for column in columns {
            let n = column.len().max(1) as f64;
            let mean = column.iter().sum::<f64>() / n;
            let variance = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();

            means.push(mean);
            stds.push(if std > 1e-12 { std } else { 1.0 });
        }

        Self { means, stds }
    }

    /// Standardize one value of column `column`.
    pub fn transform(&self, column: usize, value: f64) -> f64 {
        (value - self.means[column]) / self.stds[column]
    }

    pub fn n_columns(&self) -> usize {
        self.means.len()
    }
}
