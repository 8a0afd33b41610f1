mod cli;
mod commands;
mod display;
mod files;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use intake_client::{ApiClient, ClientConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("intake v{}", env!("CARGO_PKG_VERSION"));

    let config = ClientConfig::new(cli.base_url.as_str())
        .with_poll_interval(Duration::from_millis(cli.poll_interval_ms))
        .with_request_timeout(Duration::from_secs(cli.request_timeout_secs));
    let client = ApiClient::new(&config).context("building HTTP client")?;

    match cli.command {
        Command::Submit(args) => commands::submit(client, config.poll_interval, args).await,
        Command::Status { patient_id } => commands::status(client, &patient_id).await,
        Command::Watch(args) => commands::watch(client, config.poll_interval, args).await,
        Command::Retry(args) => commands::retry(client, config.poll_interval, args).await,
        Command::List(args) => commands::list(client, args).await,
        Command::CheckActive { phone } => commands::check_active(client, &phone).await,
    }
}
