//! One-hot encoding for categorical features.

use serde::{Deserialize, Serialize};

/// Fitted one-hot encoder: sorted category vocabulary per column.
///
/// Transform emits one indicator block per column. A value never seen during
/// fit encodes as an all-zero block rather than an error, so inference on
/// unfamiliar categories degrades gracefully instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    /// Learn the per-column vocabularies from column-major data.
    pub fn fit(columns: &[Vec<String>]) -> Self {
        let categories = columns
            .iter()
            .map(|column| {
                let mut unique: Vec<String> = column.to_vec();
                unique.sort_unstable();
                unique.dedup();
                unique
            })
            .collect();
        Self { categories }
    }

    /// Total width of the encoded block across all columns.
    pub fn encoded_width(&self) -> usize {
        self.categories.iter().map(|c| c.len()).sum()
    }

    pub fn n_columns(&self) -> usize {
        self.categories.len()
    }

    /// Append the indicator block for one value of column `column` to `out`.
    pub fn encode_into(&self, column: usize, value: &str, out: &mut Vec<f64>) {
        let vocabulary = &self.categories[column];
        let start = out.len();
        out.extend(std::iter::repeat(0.0).take(vocabulary.len()));
        if let Ok(slot) = vocabulary.binary_search_by(|c| c.as_str().cmp(value)) {
            out[start + slot] = 1.0;
        }
    }
}
