//! Column-wise feature preprocessing.
//!
//! Combines the standard scaler (numeric columns) and the one-hot encoder
//! (categorical columns) into one fitted transformer. Output layout follows
//! the schema: the scaled numeric block first, then the indicator blocks in
//! categorical column order. The fitted state is serialized into the model
//! artifact so the inference service applies the exact train-time transform.

pub mod one_hot;
pub mod scaler;

pub use one_hot::OneHotEncoder;
pub use scaler::StandardScaler;

use crate::schema::FeatureRow;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Fitted column preprocessor: scaler + encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPreprocessor {
    scaler: StandardScaler,
    encoder: OneHotEncoder,
}

impl ColumnPreprocessor {
    /// Fit both transformers from a set of feature rows.
    pub fn fit(rows: &[FeatureRow]) -> Self {
        let n_numeric = rows.first().map_or(0, |r| r.numeric.len());
        let n_categorical = rows.first().map_or(0, |r| r.categorical.len());

        let mut numeric_columns: Vec<Vec<f64>> = vec![Vec::with_capacity(rows.len()); n_numeric];
        let mut categorical_columns: Vec<Vec<String>> =
            vec![Vec::with_capacity(rows.len()); n_categorical];

        for row in rows {
            for (column, value) in row.numeric.iter().enumerate() {
                numeric_columns[column].push(*value);
            }
            for (column, value) in row.categorical.iter().enumerate() {
                categorical_columns[column].push(value.clone());
            }
        }

        Self {
            scaler: StandardScaler::fit(&numeric_columns),
            encoder: OneHotEncoder::fit(&categorical_columns),
        }
    }

    /// Width of a transformed row.
    pub fn output_width(&self) -> usize {
        self.scaler.n_columns() + self.encoder.encoded_width()
    }

    /// Transform one row into its encoded feature vector.
    pub fn transform_row(&self, row: &FeatureRow) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.output_width());
        for (column, value) in row.numeric.iter().enumerate() {
            out.push(self.scaler.transform(column, *value));
        }
        for (column, value) in row.categorical.iter().enumerate() {
            self.encoder.encode_into(column, value, &mut out);
        }
        out
    }

    /// Transform a batch of rows into a dense feature matrix.
    pub fn transform(&self, rows: &[FeatureRow]) -> Array2<f64> {
        let width = self.output_width();
        let mut data = Vec::with_capacity(rows.len() * width);
        for row in rows {
            data.extend(self.transform_row(row));
        }
        Array2::from_shape_vec((rows.len(), width), data)
            .expect("transformed rows have the fitted width")
    }
}
