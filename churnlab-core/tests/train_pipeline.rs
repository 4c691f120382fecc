//! End-to-end trainer tests on a synthetic churn dataset.

use churnlab_core::data::dataset::Dataset;
use churnlab_core::data::split::stratified_split;
use churnlab_core::metrics::EvaluationMetrics;
use churnlab_core::pipeline::ModelArtifact;
use churnlab_core::train::{train, TrainConfig};
use churnlab_core::{GbdtConfig, METRICS_FILE, MODEL_FILE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};

const HEADER: &str = "customerID,gender,SeniorCitizen,Partner,Dependents,tenure,\
PhoneService,PaperlessBilling,InternetService,Contract,PaymentMethod,\
MonthlyCharges,TotalCharges,Churn";

/// Write a deterministic synthetic churn CSV with a learnable signal:
/// month-to-month customers with short tenure churn far more often.
fn write_synthetic_csv(path: &Path, rows: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "{HEADER}").unwrap();

    let genders = ["Female", "Male"];
    let yes_no = ["Yes", "No"];
    let internet = ["DSL", "Fiber optic", "No"];
    let contracts = ["Month-to-month", "One year", "Two year"];
    let payments = [
        "Electronic check",
        "Mailed check",
        "Bank transfer (automatic)",
        "Credit card (automatic)",
    ];

    for i in 0..rows {
        let tenure: u32 = rng.gen_range(0..72);
        let monthly: f64 = rng.gen_range(20.0..120.0);
        let contract = contracts[rng.gen_range(0..contracts.len())];

        let churn_probability = if contract == "Month-to-month" && tenure < 24 {
            0.85
        } else if contract == "Month-to-month" {
            0.35
        } else {
            0.05
        };
        let churn = if rng.gen_bool(churn_probability) {
            "Yes"
        } else {
            "No"
        };

        // A few brand-new customers carry the raw file's blank TotalCharges.
        let total_charges = if tenure == 0 {
            " ".to_string()
        } else {
            format!("{:.2}", monthly * tenure as f64)
        };

        writeln!(
            file,
            "{id:04},{gender},{senior},{partner},{dependents},{tenure},{phone},{paperless},{internet},{contract},{payment},{monthly:.2},{total},{churn}",
            id = i,
            gender = genders[rng.gen_range(0..genders.len())],
            senior = rng.gen_range(0..2),
            partner = yes_no[rng.gen_range(0..yes_no.len())],
            dependents = yes_no[rng.gen_range(0..yes_no.len())],
            tenure = tenure,
            phone = yes_no[rng.gen_range(0..yes_no.len())],
            paperless = yes_no[rng.gen_range(0..yes_no.len())],
            internet = internet[rng.gen_range(0..internet.len())],
            contract = contract,
            payment = payments[rng.gen_range(0..payments.len())],
            monthly = monthly,
            total = total_charges,
            churn = churn,
        )
        .unwrap();
    }
}

fn quick_config() -> TrainConfig {
    TrainConfig {
        gbdt: GbdtConfig {
            n_trees: 30,
            ..GbdtConfig::default()
        },
        ..TrainConfig::default()
    }
}

fn setup(dir: &Path) -> PathBuf {
    let data_path = dir.join("churn.csv");
    write_synthetic_csv(&data_path, 300, 7);
    data_path
}

#[test]
fn train_writes_both_artifacts_with_valid_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = setup(dir.path());
    let out_dir = dir.path().join("artifacts");

    let report = train(&data_path, &out_dir, &quick_config()).unwrap();

    assert!(out_dir.join(MODEL_FILE).exists());
    assert!(out_dir.join(METRICS_FILE).exists());
    assert_eq!(report.model_path, out_dir.join(MODEL_FILE));
    assert_eq!(report.train_rows + report.test_rows, 300);

    for value in [
        report.metrics.roc_auc,
        report.metrics.accuracy,
        report.metrics.f1,
    ] {
        assert!((0.0..=1.0).contains(&value), "metric out of range: {value}");
    }
    // The synthetic signal is strong; the model must actually learn it.
    assert!(
        report.metrics.roc_auc > 0.8,
        "roc_auc too low: {}",
        report.metrics.roc_auc
    );
}

#[test]
fn persisted_metrics_match_the_report_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = setup(dir.path());
    let out_dir = dir.path().join("artifacts");

    let report = train(&data_path, &out_dir, &quick_config()).unwrap();

    let text = std::fs::read_to_string(&report.metrics_path).unwrap();
    let persisted: EvaluationMetrics = serde_json::from_str(&text).unwrap();
    assert_eq!(persisted, report.metrics);
}

#[test]
fn training_is_deterministic_for_a_fixed_seed() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = setup(dir.path());

    let first = train(&data_path, &dir.path().join("run1"), &quick_config()).unwrap();
    let second = train(&data_path, &dir.path().join("run2"), &quick_config()).unwrap();

    assert_eq!(first.metrics, second.metrics);
    assert_eq!(first.dataset_hash, second.dataset_hash);
    assert_eq!(first.fingerprint, second.fingerprint);

    // Byte-identical metrics artifacts across re-runs.
    let a = std::fs::read_to_string(&first.metrics_path).unwrap();
    let b = std::fs::read_to_string(&second.metrics_path).unwrap();
    assert_eq!(a, b);
}

#[test]
fn retraining_overwrites_previous_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = setup(dir.path());
    let out_dir = dir.path().join("artifacts");

    let first = train(&data_path, &out_dir, &quick_config()).unwrap();

    // Retrain on different data into the same directory.
    let other_data = dir.path().join("other.csv");
    write_synthetic_csv(&other_data, 300, 11);
    let second = train(&other_data, &out_dir, &quick_config()).unwrap();

    assert_eq!(first.model_path, second.model_path);
    assert_ne!(first.fingerprint, second.fingerprint);

    let loaded = ModelArtifact::load(&second.model_path).unwrap();
    assert_eq!(loaded.fingerprint, second.fingerprint);
}

#[test]
fn no_drift_between_train_time_and_serve_time_transforms() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = setup(dir.path());
    let out_dir = dir.path().join("artifacts");
    let config = quick_config();

    let report = train(&data_path, &out_dir, &config).unwrap();

    // Reload the artifact the way the server does and re-evaluate the same
    // held-out rows: the metrics must reproduce exactly.
    let artifact = ModelArtifact::load(&report.model_path).unwrap();
    let dataset = Dataset::load(&data_path).unwrap();
    let split = stratified_split(&dataset.labels, config.test_fraction, config.seed);

    let test_rows: Vec<_> = split.test.iter().map(|&i| dataset.rows[i].clone()).collect();
    let test_labels: Vec<f64> = split.test.iter().map(|&i| dataset.labels[i]).collect();

    let probabilities = artifact.pipeline.predict_proba(&test_rows);
    let recomputed = EvaluationMetrics::compute(&test_labels, &probabilities, config.threshold);
    assert_eq!(recomputed, report.metrics);

    // Single-row prediction through the feature-map path agrees too.
    let row = &test_rows[0];
    let features = json!({
        "tenure": row.numeric[0],
        "MonthlyCharges": row.numeric[1],
        "TotalCharges": row.numeric[2],
        "gender": row.categorical[0],
        "SeniorCitizen": row.categorical[1],
        "Partner": row.categorical[2],
        "Dependents": row.categorical[3],
        "PhoneService": row.categorical[4],
        "PaperlessBilling": row.categorical[5],
        "InternetService": row.categorical[6],
        "Contract": row.categorical[7],
        "PaymentMethod": row.categorical[8],
    });
    let rebuilt = artifact
        .pipeline
        .row_from_features(features.as_object().unwrap())
        .unwrap();
    assert_eq!(
        artifact.pipeline.predict_proba_row(&rebuilt),
        probabilities[0]
    );
}

#[test]
fn unknown_categories_at_inference_do_not_fail() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = setup(dir.path());
    let out_dir = dir.path().join("artifacts");

    let report = train(&data_path, &out_dir, &quick_config()).unwrap();
    let artifact = ModelArtifact::load(&report.model_path).unwrap();

    let features = json!({
        "tenure": 5,
        "MonthlyCharges": 70.0,
        "TotalCharges": 350.0,
        "gender": "Female",
        "SeniorCitizen": "0",
        "Partner": "Yes",
        "Dependents": "No",
        "PhoneService": "Yes",
        "PaperlessBilling": "Yes",
        "InternetService": "Quantum uplink",
        "Contract": "Decade plan",
        "PaymentMethod": "Barter",
    });
    let row = artifact
        .pipeline
        .row_from_features(features.as_object().unwrap())
        .unwrap();
    let p = artifact.pipeline.predict_proba_row(&row);
    assert!(p.is_finite());
    assert!((0.0..=1.0).contains(&p));
}

#[test]
fn missing_input_file_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = train(
        &dir.path().join("nope.csv"),
        &dir.path().join("artifacts"),
        &quick_config(),
    );
    assert!(result.is_err());
}
