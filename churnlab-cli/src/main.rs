//! ChurnLab CLI — dataset download and model training commands.
//!
//! Commands:
//! - `download` — fetch the public Telco churn CSV to its fixed local path
//! - `train` — fit the pipeline from a raw CSV and write the artifacts

use anyhow::Result;
use churnlab_core::train::{train, TrainConfig, TrainReport};
use churnlab_core::{fetch_dataset, DATASET_PATH, DATASET_URL};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "churnlab", about = "ChurnLab CLI — churn prediction pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the public Telco churn dataset to data/.
    Download,

    /// Train the churn pipeline and write model and metrics artifacts.
    Train {
        /// Path to the raw dataset CSV.
        #[arg(long)]
        data_path: PathBuf,

        /// Output directory for the artifacts.
        #[arg(long, default_value = "artifacts")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Download => run_download(),
        Commands::Train { data_path, out_dir } => run_train(&data_path, &out_dir),
    }
}

fn run_download() -> Result<()> {
    let dest = Path::new(DATASET_PATH);
    let rows = fetch_dataset(DATASET_URL, dest)?;
    println!("Saved {rows} rows to {}", dest.display());
    Ok(())
}

fn run_train(data_path: &Path, out_dir: &Path) -> Result<()> {
    let report = train(data_path, out_dir, &TrainConfig::default())?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &TrainReport) {
    println!();
    println!("=== Training Result ===");
    println!("Train rows:     {}", report.train_rows);
    println!("Test rows:      {}", report.test_rows);
    println!("Dataset hash:   {}", report.dataset_hash);
    println!("Model:          {}", report.fingerprint);
    println!();
    println!("--- Held-out Metrics ---");
    println!("ROC-AUC:        {:.4}", report.metrics.roc_auc);
    println!("Accuracy:       {:.4}", report.metrics.accuracy);
    println!("F1:             {:.4}", report.metrics.f1);
    println!();
    println!("Model saved to:   {}", report.model_path.display());
    println!("Metrics saved to: {}", report.metrics_path.display());
}
