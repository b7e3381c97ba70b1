use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leadsub_cli::{ProgressReadout, Reconciler};
use leadsub_core::{
    load_config, load_ids, validate_config, CallsFeed, LeadTracker, LeadspediaCallsClient,
    LeadspediaTrackingClient, SanitizedConfig,
};

/// Reconcile Leadspedia calls and leads into a tracking CSV.
#[derive(Debug, Parser)]
#[command(name = "leadsub", version)]
struct Cli {
    /// Configuration file
    #[arg(long, env = "LEADSUB_CONFIG", default_value = "leadsub.toml")]
    config: PathBuf,

    /// File with one lead ID or call UUID per line
    #[arg(long)]
    ids: PathBuf,

    /// Output CSV (overrides `output.path`)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    info!("Loading configuration from {:?}", cli.config);
    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(output) = cli.output {
        config.output.path = output;
    }

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        "Configuration loaded: {}",
        serde_json::to_string(&sanitized).unwrap_or_default()
    );

    let ids = load_ids(&cli.ids)
        .with_context(|| format!("Failed to load identifiers from {:?}", cli.ids))?;
    info!("Loaded {} identifiers", ids.len());

    let feed: Arc<dyn CallsFeed> = Arc::new(
        LeadspediaCallsClient::new(config.calls.clone())
            .context("Failed to create calls client")?,
    );
    let tracker: Arc<dyn LeadTracker> = Arc::new(
        LeadspediaTrackingClient::new(config.tracking.clone())
            .context("Failed to create tracking client")?,
    );

    let title = config.output.path.display().to_string();
    let readout = ProgressReadout::new(&title, ids.len());
    let reconciler =
        Reconciler::new(config, feed, tracker).with_progress_callback(readout.callback(&title));

    let result = reconciler.run(&ids, shutdown_signal()).await;
    readout.finish();
    let outcome = result?;

    info!(
        path = %outcome.output_path.display(),
        calls = outcome.calls_indexed,
        "Report complete"
    );
    println!("\n{}", outcome.summary());

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
