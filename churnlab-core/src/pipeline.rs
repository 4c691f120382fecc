//! The fitted pipeline: preprocessor + classifier as one unit.
//!
//! A `ChurnPipeline` is fit once by the trainer and then treated as an
//! opaque, immutable object: the inference service loads it from the JSON
//! artifact and every prediction flows through the same fitted transform
//! that produced the training matrix, so there is no train/serve drift.

use crate::model::{GbdtClassifier, GbdtConfig, ModelError};
use crate::preprocess::ColumnPreprocessor;
use crate::schema::{FeatureRow, FeatureSchema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Algorithm name reported in prediction responses.
pub const ALGORITHM_NAME: &str = "GradientBoostingClassifier";

/// Model artifact file name inside the artifact directory.
pub const MODEL_FILE: &str = "model.json";

/// Metrics artifact file name inside the artifact directory.
pub const METRICS_FILE: &str = "metrics.json";

/// Decision threshold applied to churn probabilities.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Errors from pipeline fitting, prediction-row assembly, and persistence.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("missing feature '{0}'")]
    MissingFeature(String),

    #[error("feature '{name}' must be numeric, got {value}")]
    NonNumericFeature { name: String, value: String },

    #[error("failed to serialize model artifact: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write model artifact to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read model artifact at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("model artifact at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Static model metadata echoed in every prediction response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub algorithm: String,
    pub version: String,
}

impl Default for ModelInfo {
    fn default() -> Self {
        Self {
            algorithm: ALGORITHM_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// The combined preprocessing + classifier pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnPipeline {
    schema: FeatureSchema,
    preprocessor: ColumnPreprocessor,
    classifier: GbdtClassifier,
}

impl ChurnPipeline {
    /// Fit preprocessor and classifier on the training rows.
    pub fn fit(
        schema: FeatureSchema,
        rows: &[FeatureRow],
        labels: &[f64],
        config: GbdtConfig,
    ) -> Result<Self, PipelineError> {
        let preprocessor = ColumnPreprocessor::fit(rows);
        let x = preprocessor.transform(rows);
        let classifier = GbdtClassifier::fit(x.view(), labels, config)?;
        Ok(Self {
            schema,
            preprocessor,
            classifier,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Positive-class probability for one feature row.
    pub fn predict_proba_row(&self, row: &FeatureRow) -> f64 {
        let encoded = self.preprocessor.transform_row(row);
        self.classifier
            .predict_proba_row(ndarray::ArrayView1::from(encoded.as_slice()))
    }

    /// Positive-class probabilities for a batch of feature rows.
    pub fn predict_proba(&self, rows: &[FeatureRow]) -> Vec<f64> {
        let x = self.preprocessor.transform(rows);
        self.classifier.predict_proba(x.view())
    }

    /// Assemble a feature row from an arbitrary name → value mapping.
    ///
    /// Every schema column must be present. Numeric features accept JSON
    /// numbers or numeric strings and fail otherwise; categorical features
    /// accept any value (non-strings are canonicalized to their JSON text,
    /// and values never seen at fit time one-hot encode to all zeros).
    pub fn row_from_features(
        &self,
        features: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<FeatureRow, PipelineError> {
        let mut numeric = Vec::with_capacity(self.schema.numeric.len());
        for name in &self.schema.numeric {
            let value = features
                .get(name)
                .ok_or_else(|| PipelineError::MissingFeature(name.clone()))?;
            numeric.push(numeric_value(name, value)?);
        }

        let mut categorical = Vec::with_capacity(self.schema.categorical.len());
        for name in &self.schema.categorical {
            let value = features
                .get(name)
                .ok_or_else(|| PipelineError::MissingFeature(name.clone()))?;
            categorical.push(categorical_value(value));
        }

        Ok(FeatureRow {
            numeric,
            categorical,
        })
    }
}

fn numeric_value(name: &str, value: &serde_json::Value) -> Result<f64, PipelineError> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| PipelineError::NonNumericFeature {
            name: name.to_string(),
            value: value.to_string(),
        }),
        serde_json::Value::String(s) => {
            s.trim()
                .parse::<f64>()
                .map_err(|_| PipelineError::NonNumericFeature {
                    name: name.to_string(),
                    value: value.to_string(),
                })
        }
        _ => Err(PipelineError::NonNumericFeature {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

fn categorical_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The persisted model artifact: pipeline plus training metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub info: ModelInfo,
    pub trained_at: DateTime<Utc>,
    /// BLAKE3 over the serialized pipeline; identical retrains of identical
    /// data produce identical fingerprints.
    pub fingerprint: String,
    pub pipeline: ChurnPipeline,
}

impl ModelArtifact {
    /// Wrap a fitted pipeline with metadata and a content fingerprint.
    pub fn new(pipeline: ChurnPipeline) -> Result<Self, PipelineError> {
        let serialized = serde_json::to_vec(&pipeline).map_err(PipelineError::Serialize)?;
        let fingerprint = blake3::hash(&serialized).to_hex().to_string();
        Ok(Self {
            info: ModelInfo::default(),
            trained_at: Utc::now(),
            fingerprint,
            pipeline,
        })
    }

    /// Write the artifact as pretty JSON, overwriting any previous artifact.
    pub fn save(&self, path: &Path) -> Result<(), PipelineError> {
        let json = serde_json::to_string_pretty(self).map_err(PipelineError::Serialize)?;
        std::fs::write(path, json).map_err(|e| PipelineError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }

    /// Load a previously saved artifact.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| PipelineError::Corrupt {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn toy_schema() -> FeatureSchema {
        FeatureSchema {
            numeric: vec!["tenure".into()],
            categorical: vec!["Contract".into()],
        }
    }

    fn toy_rows() -> (Vec<FeatureRow>, Vec<f64>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            let churned = i % 3 == 0;
            rows.push(FeatureRow {
                numeric: vec![if churned { 2.0 } else { 40.0 } + i as f64 * 0.1],
                categorical: vec![if churned {
                    "Month-to-month".into()
                } else {
                    "Two year".into()
                }],
            });
            labels.push(if churned { 1.0 } else { 0.0 });
        }
        (rows, labels)
    }

    fn toy_pipeline() -> ChurnPipeline {
        let (rows, labels) = toy_rows();
        let config = GbdtConfig {
            n_trees: 10,
            ..GbdtConfig::default()
        };
        ChurnPipeline::fit(toy_schema(), &rows, &labels, config).unwrap()
    }

    #[test]
    fn batch_and_row_predictions_agree() {
        let pipeline = toy_pipeline();
        let (rows, _) = toy_rows();

        let batch = pipeline.predict_proba(&rows);
        for (row, expected) in rows.iter().zip(&batch) {
            assert_eq!(pipeline.predict_proba_row(row), *expected);
        }
    }

    #[test]
    fn row_from_features_accepts_numbers_and_numeric_strings() {
        let pipeline = toy_pipeline();

        let from_number = pipeline
            .row_from_features(json!({"tenure": 12, "Contract": "Two year"}).as_object().unwrap())
            .unwrap();
        let from_string = pipeline
            .row_from_features(
                json!({"tenure": "12", "Contract": "Two year"})
                    .as_object()
                    .unwrap(),
            )
            .unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_number.numeric, vec![12.0]);
    }

    #[test]
    fn row_from_features_rejects_missing_columns() {
        let pipeline = toy_pipeline();
        let err = pipeline
            .row_from_features(json!({"tenure": 12}).as_object().unwrap())
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingFeature(name) if name == "Contract"));
    }

    #[test]
    fn row_from_features_rejects_non_numeric_numerics() {
        let pipeline = toy_pipeline();
        let err = pipeline
            .row_from_features(
                json!({"tenure": "a lot", "Contract": "Two year"})
                    .as_object()
                    .unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, PipelineError::NonNumericFeature { name, .. } if name == "tenure"));
    }

    #[test]
    fn unknown_category_still_produces_a_probability() {
        let pipeline = toy_pipeline();
        let row = pipeline
            .row_from_features(
                json!({"tenure": 12, "Contract": "Decade plan"})
                    .as_object()
                    .unwrap(),
            )
            .unwrap();
        let p = pipeline.predict_proba_row(&row);
        assert!(p.is_finite());
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn extra_features_are_ignored() {
        let pipeline = toy_pipeline();
        let with_extra = pipeline
            .row_from_features(
                json!({"tenure": 12, "Contract": "Two year", "customerID": "0001"})
                    .as_object()
                    .unwrap(),
            )
            .unwrap();
        let without = pipeline
            .row_from_features(json!({"tenure": 12, "Contract": "Two year"}).as_object().unwrap())
            .unwrap();
        assert_eq!(with_extra, without);
    }

    #[test]
    fn artifact_round_trip_preserves_predictions() {
        let pipeline = toy_pipeline();
        let (rows, _) = toy_rows();
        let expected = pipeline.predict_proba(&rows);

        let artifact = ModelArtifact::new(pipeline).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MODEL_FILE);
        artifact.save(&path).unwrap();

        let loaded = ModelArtifact::load(&path).unwrap();
        assert_eq!(loaded.fingerprint, artifact.fingerprint);
        assert_eq!(loaded.pipeline.predict_proba(&rows), expected);
    }

    #[test]
    fn corrupt_artifact_is_reported_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MODEL_FILE);
        std::fs::write(&path, "{not json").unwrap();

        let err = ModelArtifact::load(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Corrupt { .. }));
    }

    #[test]
    fn missing_artifact_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelArtifact::load(&dir.path().join(MODEL_FILE)).unwrap_err();
        assert!(matches!(err, PipelineError::Read { .. }));
    }

    #[test]
    fn fingerprint_is_stable_for_identical_pipelines() {
        let a = ModelArtifact::new(toy_pipeline()).unwrap();
        let b = ModelArtifact::new(toy_pipeline()).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
    }
}
