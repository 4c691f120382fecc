//! Raw dataset loading and cleaning.
//!
//! Reads the Telco churn CSV into typed records, coerces the one dirty
//! numeric column (`TotalCharges` contains blanks for brand-new customers),
//! derives the binary label, and reduces each record to the 12-column
//! feature row the pipeline consumes. Rows are never dropped during
//! cleaning.

use crate::schema::{FeatureRow, POSITIVE_LABEL};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the dataset loading layer.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to open dataset at {path}: {source}")]
    Open {
        path: PathBuf,
        source: csv::Error,
    },

    #[error("failed to parse dataset record {row}: {source}")]
    Record { row: usize, source: csv::Error },

    #[error("dataset at {path} contains no records")]
    Empty { path: PathBuf },
}

/// One raw customer record, deserialized by CSV header name.
///
/// Extra columns in the raw file (customerID, the service add-on columns,
/// etc.) are ignored; only the selected features and the label are read.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRecord {
    pub tenure: f64,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges: f64,
    #[serde(rename = "TotalCharges", deserialize_with = "lenient_f64")]
    pub total_charges: f64,
    pub gender: String,
    #[serde(rename = "SeniorCitizen")]
    pub senior_citizen: String,
    #[serde(rename = "Partner")]
    pub partner: String,
    #[serde(rename = "Dependents")]
    pub dependents: String,
    #[serde(rename = "PhoneService")]
    pub phone_service: String,
    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: String,
    #[serde(rename = "InternetService")]
    pub internet_service: String,
    #[serde(rename = "Contract")]
    pub contract: String,
    #[serde(rename = "PaymentMethod")]
    pub payment_method: String,
    #[serde(rename = "Churn")]
    pub churn: String,
}

impl CustomerRecord {
    /// Reduce to the 12 selected features, values in schema order.
    pub fn to_feature_row(&self) -> FeatureRow {
        FeatureRow {
            numeric: vec![self.tenure, self.monthly_charges, self.total_charges],
            categorical: vec![
                self.gender.clone(),
                self.senior_citizen.clone(),
                self.partner.clone(),
                self.dependents.clone(),
                self.phone_service.clone(),
                self.paperless_billing.clone(),
                self.internet_service.clone(),
                self.contract.clone(),
                self.payment_method.clone(),
            ],
        }
    }

    /// Binary label: 1.0 for churned customers, 0.0 otherwise.
    pub fn label(&self) -> f64 {
        if self.churn == POSITIVE_LABEL {
            1.0
        } else {
            0.0
        }
    }
}

/// Coerce a numeric field to f64, falling back to 0.0 on parse failure.
///
/// The Telco file stores `TotalCharges` as text and uses a bare space for
/// customers with zero tenure; those values become 0.0, never a dropped row.
pub fn coerce_numeric(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(0.0)
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(coerce_numeric(&raw))
}

/// Cleaned dataset: feature rows, binary labels, and a content hash.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub rows: Vec<FeatureRow>,
    pub labels: Vec<f64>,
    /// BLAKE3 over all feature values and labels, for run fingerprinting.
    pub hash: String,
}

impl Dataset {
    /// Load and clean a raw CSV file.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| DataError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut records = Vec::new();
        for (i, result) in reader.deserialize::<CustomerRecord>().enumerate() {
            let record = result.map_err(|e| DataError::Record {
                row: i + 1,
                source: e,
            })?;
            records.push(record);
        }

        if records.is_empty() {
            return Err(DataError::Empty {
                path: path.to_path_buf(),
            });
        }

        log::info!("loaded {} records from {}", records.len(), path.display());
        Ok(Self::from_records(&records))
    }

    /// Build a dataset from already-parsed records.
    pub fn from_records(records: &[CustomerRecord]) -> Self {
        let rows: Vec<FeatureRow> = records.iter().map(|r| r.to_feature_row()).collect();
        let labels: Vec<f64> = records.iter().map(|r| r.label()).collect();
        let hash = compute_hash(&rows, &labels);
        Self { rows, labels, hash }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of positive-class (churned) rows.
    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&l| l > 0.5).count()
    }
}

/// Deterministic BLAKE3 hash over feature values and labels in row order.
fn compute_hash(rows: &[FeatureRow], labels: &[f64]) -> String {
    let mut hasher = blake3::Hasher::new();
    for (row, label) in rows.iter().zip(labels) {
        for value in &row.numeric {
            hasher.update(&value.to_le_bytes());
        }
        for value in &row.categorical {
            hasher.update(value.as_bytes());
        }
        hasher.update(&label.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
