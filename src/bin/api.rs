//! SmartCare API Server
//!
//! Run with: cargo run --bin smartcare-api
//!
//! # Configuration
//!
//! Settings come from `--config`, otherwise the first config file found in
//! the default locations, otherwise built-in defaults. `SMARTCARE_*`
//! environment variables override either. `RUST_LOG` overrides the log level.

use anyhow::Context;
use clap::Parser;
use smartcare::api::{serve, AppState};
use smartcare::config::{Config, LoggingConfig};
use smartcare::seed::seed_store;
use smartcare::storage::SqliteStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "smartcare-api")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "SmartCare insight API server")]
struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Load the demo subject before serving
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {:?}", path))?,
        None => Config::load_default(),
    };

    init_tracing(&config.logging);

    tracing::info!("Starting SmartCare API server v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = config.storage.data_path();
    tracing::info!("Data directory: {:?}", data_dir);

    let store = Arc::new(
        SqliteStore::open(&data_dir)
            .with_context(|| format!("opening store in {:?}", data_dir))?,
    );

    if args.seed {
        let written = seed_store(&store, chrono::Utc::now()).context("seeding demo data")?;
        tracing::info!("Seeded {} demo events", written);
    }

    let state = AppState::new(Arc::clone(&store), &config.insights, config.api.clone());

    let sweep_every = Duration::from_secs(config.insights.sweep_interval_secs.max(1));
    let sweeper = state.insights.cache().start_sweeper(sweep_every);
    tracing::info!(
        ttl_secs = config.insights.cache_ttl_secs,
        sweep_secs = sweep_every.as_secs(),
        "Insight cache sweeper started"
    );

    serve(state, &config.api).await?;

    sweeper.abort();
    tracing::info!("SmartCare API server stopped");

    Ok(())
}

/// Pretty or JSON output; `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("smartcare={},tower_http=debug", logging.level).into()
    });

    let json = logging.is_json();

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}
