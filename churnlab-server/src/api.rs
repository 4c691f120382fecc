//! Request handling for the inference API.
//!
//! Handlers are pure functions from app state + request parts to a status
//! and JSON body, so routing and endpoint behavior are testable without a
//! socket. The HTTP listener in `lib.rs` is a thin shell around `handle`.

use crate::config::ServerConfig;
use churnlab_core::pipeline::{ModelArtifact, PipelineError};
use churnlab_core::{ChurnPipeline, ModelInfo, DEFAULT_THRESHOLD};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that prevent the service from starting.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("model artifact not found at {path}; train first to create it")]
    ModelMissing { path: PathBuf },

    #[error(transparent)]
    Artifact(#[from] PipelineError),

    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },
}

/// Process-wide service state: the one pipeline loaded at startup and held
/// read-only for the process lifetime.
#[derive(Debug)]
pub struct AppState {
    pub pipeline: ChurnPipeline,
    pub model_info: ModelInfo,
    pub metrics_path: PathBuf,
}

impl AppState {
    /// Load the model artifact; fails fatally when it is absent so the
    /// service never comes up without a model.
    pub fn load(config: &ServerConfig) -> Result<Self, ServeError> {
        let model_path = config.model_path();
        if !model_path.exists() {
            return Err(ServeError::ModelMissing { path: model_path });
        }
        let artifact = ModelArtifact::load(&model_path)?;
        log::info!(
            "loaded model {} (trained {})",
            artifact.fingerprint,
            artifact.trained_at
        );
        Ok(Self {
            pipeline: artifact.pipeline,
            model_info: artifact.info,
            metrics_path: config.metrics_path(),
        })
    }
}

/// Body of `POST /predict`.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub features: serde_json::Map<String, serde_json::Value>,
}

/// Body of a successful `POST /predict` response.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub input_features: serde_json::Map<String, serde_json::Value>,
    pub churn_probability: f64,
    pub prediction: String,
    pub threshold_used: f64,
    pub model_info: ModelInfo,
}

/// Status code plus rendered JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    fn json<T: Serialize>(status: u16, value: &T, pretty: bool) -> Self {
        let body = if pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .expect("response values always serialize");
        Self { status, body }
    }

    fn error(status: u16, message: String, pretty: bool) -> Self {
        Self::json(status, &json!({ "error": message }), pretty)
    }
}

/// Route a request to its handler.
pub fn handle(state: &AppState, method: &str, url: &str, body: &str) -> ApiResponse {
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    };
    let pretty = pretty_flag(query);

    match (method, path) {
        ("GET", "/") => health(pretty),
        ("POST", "/predict") => predict(state, body, pretty),
        ("GET", "/metrics") => metrics(state, pretty),
        _ => ApiResponse::error(404, format!("no route for {method} {path}"), pretty),
    }
}

/// `pretty=1` switches responses to indented JSON.
fn pretty_flag(query: &str) -> bool {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .any(|(key, value)| key == "pretty" && value == "1")
}

fn health(pretty: bool) -> ApiResponse {
    ApiResponse::json(
        200,
        &json!({ "status": "ok", "message": "Churn API running" }),
        pretty,
    )
}

fn predict(state: &AppState, body: &str, pretty: bool) -> ApiResponse {
    let request: PredictRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => return ApiResponse::error(400, format!("invalid request body: {e}"), pretty),
    };

    let row = match state.pipeline.row_from_features(&request.features) {
        Ok(row) => row,
        Err(e @ (PipelineError::MissingFeature(_) | PipelineError::NonNumericFeature { .. })) => {
            return ApiResponse::error(400, e.to_string(), pretty);
        }
        Err(e) => return ApiResponse::error(500, e.to_string(), pretty),
    };

    let probability = state.pipeline.predict_proba_row(&row);
    let churn_probability = round4(probability);
    let prediction = if churn_probability > DEFAULT_THRESHOLD {
        "Yes"
    } else {
        "No"
    };

    ApiResponse::json(
        200,
        &PredictResponse {
            input_features: request.features,
            churn_probability,
            prediction: prediction.to_string(),
            threshold_used: DEFAULT_THRESHOLD,
            model_info: state.model_info.clone(),
        },
        pretty,
    )
}

fn metrics(state: &AppState, pretty: bool) -> ApiResponse {
    let text = match std::fs::read_to_string(&state.metrics_path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return ApiResponse::error(
                404,
                "metrics.json not found; train the model first".to_string(),
                pretty,
            );
        }
        Err(e) => return ApiResponse::error(500, format!("failed to read metrics: {e}"), pretty),
    };

    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => ApiResponse::json(200, &value, pretty),
        Err(e) => ApiResponse::error(500, format!("failed to read metrics: {e}"), pretty),
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
