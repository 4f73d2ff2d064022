//! resumedrop entry point.

mod app;
mod config;
mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "resumedrop")]
#[command(about = "Upload a resume and show the metadata extracted by the backend")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Upload endpoint, overriding the configuration file
    #[arg(long)]
    endpoint: Option<String>,

    /// Delay before the closing hint after a success, in milliseconds
    #[arg(long)]
    follow_up_delay_ms: Option<u64>,

    /// File to upload
    file: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr; stdout carries the upload panel.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(delay) = cli.follow_up_delay_ms {
        config.follow_up_delay_ms = delay;
    }
    tracing::debug!(?config, "configuration loaded");

    let rt = tokio::runtime::Runtime::new()?;
    let code = rt.block_on(app::run(config, cli.file))?;
    Ok(code)
}
