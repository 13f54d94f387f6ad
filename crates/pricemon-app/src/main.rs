//! Price monitor entry point.

use anyhow::Result;
use clap::Parser;
use pricemon_app::{AppConfig, Application};
use std::path::Path;
use tracing::info;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Live bid/ask price monitor with manual order entry
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via PRICEMON_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Start in test mode with the feed paused
    #[arg(long)]
    test_mode: bool,

    /// Override the refresh period (ms)
    #[arg(long)]
    refresh_period_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    pricemon_telemetry::init_logging()?;

    info!("Starting price monitor v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > PRICEMON_CONFIG env var > default
    let explicit_path = args
        .config
        .or_else(|| std::env::var("PRICEMON_CONFIG").ok());

    let mut config = match explicit_path {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            AppConfig::from_file(&path)?
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            info!(config_path = DEFAULT_CONFIG_PATH, "Loading configuration");
            AppConfig::from_file(DEFAULT_CONFIG_PATH)?
        }
        None => {
            info!("No configuration file found, using defaults");
            AppConfig::default()
        }
    };

    if args.test_mode {
        config.test_mode = true;
    }
    if let Some(ms) = args.refresh_period_ms {
        config.refresh_period_ms = ms;
    }

    info!(
        instruments = config.instrument_count,
        refresh_period_ms = config.refresh_period_ms,
        test_mode = config.test_mode,
        "Configuration loaded"
    );

    let app = Application::new(config)?;
    app.run().await?;

    Ok(())
}
