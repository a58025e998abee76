//! Magnus approvals console
//!
//! ```bash
//! magnus-tui --endpoint http://localhost:8000
//! ```

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use magnus_client::{ClientConfig, MagnusClient};
use magnus_tui::run_approvals_tui;

/// Terminal console for the vendor-payments approval queue
#[derive(Parser)]
#[command(name = "magnus-tui")]
#[command(version)]
#[command(about = "Approve, reject and track vendor payments from the terminal", long_about = None)]
struct Cli {
    /// Orchestration backend URL
    #[arg(long, default_value = "http://localhost:8000")]
    endpoint: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// API key for the backend, if it requires one
    #[arg(long)]
    api_key: Option<String>,

    /// Override the refresh cadence in seconds
    #[arg(long)]
    poll_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let client = MagnusClient::new(ClientConfig {
        endpoint: cli.endpoint,
        timeout: Duration::from_secs(cli.timeout_secs),
        api_key: cli.api_key,
    })?;

    run_approvals_tui(client, cli.poll_secs.map(Duration::from_secs)).await?;
    Ok(())
}
