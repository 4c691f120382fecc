//! Fixed feature schema for the Telco churn dataset.
//!
//! The pipeline consumes exactly 12 columns: 3 numeric, 9 categorical. The
//! column names match the raw CSV headers; every stage (training, artifact,
//! inference) exchanges rows in this schema's order.

use serde::{Deserialize, Serialize};

/// Numeric feature columns, in pipeline order.
pub const NUMERIC_FEATURES: [&str; 3] = ["tenure", "MonthlyCharges", "TotalCharges"];

/// Categorical feature columns, in pipeline order.
pub const CATEGORICAL_FEATURES: [&str; 9] = [
    "gender",
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "PhoneService",
    "PaperlessBilling",
    "InternetService",
    "Contract",
    "PaymentMethod",
];

/// Label column in the raw CSV.
pub const LABEL_COLUMN: &str = "Churn";

/// Label value treated as the positive class.
pub const POSITIVE_LABEL: &str = "Yes";

/// Ordered feature column names, persisted inside the model artifact so the
/// inference service can rebuild rows from arbitrary feature mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl FeatureSchema {
    /// The fixed 12-column Telco schema.
    pub fn telco() -> Self {
        Self {
            numeric: NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect(),
            categorical: CATEGORICAL_FEATURES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Number of raw (pre-encoding) feature columns.
    pub fn column_count(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::telco()
    }
}

/// One customer reduced to the selected features, values in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub numeric: Vec<f64>,
    pub categorical: Vec<String>,
}
