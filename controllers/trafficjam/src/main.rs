//! TrafficJam Reconciler
//!
//! Reconciles one YAML resource descriptor against a TrafficJam instance and
//! prints the outcome as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use trafficjam_client::TrafficJamClient;
use trafficjam_reconciler::{Config, Reconciler};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting TrafficJam Reconciler");

    // Load configuration from environment variables
    let config = Config::from_env(std::env::args().nth(1))?;
    let descriptor = config
        .load_descriptor()
        .with_context(|| format!("loading {}", config.descriptor_path.display()))?;

    info!("Configuration:");
    info!("  Descriptor: {}", config.descriptor_path.display());
    info!("  TrafficJam API: {}", descriptor.connection.api_url());
    info!("  Payload encoding: {:?}", config.payload_encoding);

    let client = TrafficJamClient::with_encoding(config.payload_encoding)
        .context("building HTTP client")?;
    let reconciler = Reconciler::new(client);

    let outcome = reconciler.reconcile(&descriptor).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if outcome.failed {
        std::process::exit(1);
    }

    Ok(())
}
