//! Fit/predict throughput for the churn pipeline.

use churnlab_core::model::GbdtConfig;
use churnlab_core::pipeline::ChurnPipeline;
use churnlab_core::schema::{FeatureRow, FeatureSchema};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn synthetic_rows(n: usize) -> (Vec<FeatureRow>, Vec<f64>) {
    let contracts = ["Month-to-month", "One year", "Two year"];
    let mut rows = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let tenure = (i * 13 % 72) as f64;
        let monthly = 20.0 + (i * 7 % 100) as f64;
        let contract = contracts[i % 3];
        let churned = contract == "Month-to-month" && tenure < 24.0;
        rows.push(FeatureRow {
            numeric: vec![tenure, monthly, tenure * monthly],
            categorical: vec![
                if i % 2 == 0 { "Female" } else { "Male" }.to_string(),
                (i % 2).to_string(),
                contract.to_string(),
            ],
        });
        labels.push(if churned { 1.0 } else { 0.0 });
    }
    (rows, labels)
}

fn schema() -> FeatureSchema {
    FeatureSchema {
        numeric: vec![
            "tenure".into(),
            "MonthlyCharges".into(),
            "TotalCharges".into(),
        ],
        categorical: vec!["gender".into(), "SeniorCitizen".into(), "Contract".into()],
    }
}

fn bench_fit(c: &mut Criterion) {
    let (rows, labels) = synthetic_rows(500);
    let config = GbdtConfig {
        n_trees: 10,
        ..GbdtConfig::default()
    };

    c.bench_function("pipeline_fit_500x10", |b| {
        b.iter(|| {
            ChurnPipeline::fit(
                black_box(schema()),
                black_box(&rows),
                black_box(&labels),
                config,
            )
            .unwrap()
        })
    });
}

fn bench_predict(c: &mut Criterion) {
    let (rows, labels) = synthetic_rows(500);
    let config = GbdtConfig {
        n_trees: 50,
        ..GbdtConfig::default()
    };
    let pipeline = ChurnPipeline::fit(schema(), &rows, &labels, config).unwrap();

    c.bench_function("pipeline_predict_500", |b| {
        b.iter(|| pipeline.predict_proba(black_box(&rows)))
    });

    c.bench_function("pipeline_predict_single", |b| {
        b.iter(|| pipeline.predict_proba_row(black_box(&rows[0])))
    });
}

criterion_group!(benches, bench_fit, bench_predict);
criterion_main!(benches);
