//! Dataset download.
//!
//! One-shot fetch of the public IBM Telco churn CSV: GET the fixed URL,
//! parse the body as CSV, and rewrite it to the fixed local path. The local
//! copy is therefore always well-formed CSV. No retry, no integrity check,
//! no schema validation; failures propagate to the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Public IBM Telco customer churn dataset.
pub const DATASET_URL: &str =
    "https://raw.githubusercontent.com/IBM/telco-customer-churn-on-icp4d/master/data/Telco-Customer-Churn.csv";

/// Fixed destination path for the raw dataset.
pub const DATASET_PATH: &str = "data/WA_Fn-UseC_-Telco-Customer-Churn.csv";

/// Errors from the download path.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },

    #[error("HTTP {status} fetching {url}")]
    BadStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("response is not valid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write dataset to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Fetch the dataset CSV from `url` and rewrite it to `dest`.
///
/// Creates parent directories as needed. Returns the number of data rows
/// written (excluding the header).
pub fn fetch_dataset(url: &str, dest: &Path) -> Result<usize, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("churnlab/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })?;

    let response = client.get(url).send().map_err(|e| FetchError::Request {
        url: url.to_string(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::BadStatus {
            url: url.to_string(),
            status,
        });
    }

    let body = response.text().map_err(|e| FetchError::Request {
        url: url.to_string(),
        source: e,
    })?;

    let rows = rewrite_csv(&body, dest)?;
    log::info!("saved {rows} rows to {}", dest.display());
    Ok(rows)
}

/// Parse `body` as CSV and write it back out to `dest`.
pub fn rewrite_csv(body: &str, dest: &Path) -> Result<usize, FetchError> {
    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?);
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| FetchError::Write {
            path: dest.to_path_buf(),
            source: e,
        })?;
    }

    let mut writer = csv::Writer::from_path(dest)?;
    writer.write_record(&headers)?;
    for record in &records {
        writer.write_record(record)?;
    }
    writer.flush().map_err(|e| FetchError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(records.len())
}
