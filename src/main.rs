use anyhow::{Context, Result};
use clap::Parser;
use restojob::cli::{handle_command, Cli};
use restojob::ClientConfig;
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "/tmp/restojob.log";

fn init_logging() -> Result<()> {
    let path = std::env::var("RESTOJOB_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("restojob=debug"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(filter)
        .try_init()
        .context("Failed to initialise logging")?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let config = ClientConfig::load()?;
    info!(
        "Environment: {}",
        std::env::var("RESTOJOB_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    );
    info!("Backend: {}", config.api_base_url);

    handle_command(cli, config).await
}
