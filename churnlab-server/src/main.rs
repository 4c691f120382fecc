//! Inference service entrypoint.

use anyhow::{Context, Result};
use churnlab_server::{AppState, ChurnServer, ServerConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "churnlab-server",
    about = "Churn prediction inference service"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind address (host:port). Overrides the config file.
    #[arg(long)]
    addr: Option<String>,

    /// Artifact directory holding model.json and metrics.json. Overrides
    /// the config file.
    #[arg(long)]
    artifact_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(addr) = cli.addr {
        config.bind_addr = addr;
    }
    if let Some(dir) = cli.artifact_dir {
        config.artifact_dir = dir;
    }

    let state = AppState::load(&config).context("model load failed; run `churnlab train` first")?;
    let server = ChurnServer::bind(&config.bind_addr, state)?;

    log::info!("listening on {}", server.local_addr());
    println!("Churn API listening on http://{}", server.local_addr());
    server.run();
    Ok(())
}
