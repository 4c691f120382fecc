//! ChurnLab Core — dataset acquisition, preprocessing, boosted trees,
//! metrics, and artifacts.
//!
//! This crate contains the whole churn pipeline behind the CLI and the
//! inference service:
//! - Fixed 12-column feature schema and typed dataset loading/cleaning
//! - One-shot dataset download
//! - Seeded stratified train/test split
//! - Column preprocessing (standard scaler + one-hot encoder)
//! - Gradient-boosted tree classifier with logistic loss
//! - ROC-AUC / accuracy / F1 evaluation metrics
//! - Fitted-pipeline artifact with fingerprinted persistence
//! - End-to-end trainer producing `model.json` and `metrics.json`

pub mod data;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod preprocess;
pub mod schema;
pub mod train;

pub use data::dataset::{DataError, Dataset};
pub use data::fetch::{fetch_dataset, FetchError, DATASET_PATH, DATASET_URL};
pub use data::split::{stratified_split, SplitIndices};
pub use metrics::EvaluationMetrics;
pub use model::{GbdtClassifier, GbdtConfig, ModelError};
pub use pipeline::{
    ChurnPipeline, ModelArtifact, ModelInfo, PipelineError, ALGORITHM_NAME, DEFAULT_THRESHOLD,
    METRICS_FILE, MODEL_FILE,
};
pub use preprocess::ColumnPreprocessor;
pub use schema::{FeatureRow, FeatureSchema};
pub use train::{train, TrainConfig, TrainError, TrainReport};
