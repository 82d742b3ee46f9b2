//! Ashare Screener - turnover rate and volume ratio screen over Tushare Pro data.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use ashare_common::config::{config_path, Config};
use ashare_common::logging::init_logging;
use ashare_screener::{
    progress_line, ScreenerConfig, ScreenerEngine, ScreenerReport, TushareAdapter,
};
use clap::Parser;

/// Screen listed A-shares by turnover rate and volume ratio.
#[derive(Parser, Debug)]
#[command(name = "ashare-screener")]
#[command(version)]
#[command(about = "Screen A-shares by turnover rate and volume ratio", long_about = None)]
struct Cli {
    /// Config file (default: ~/.ashare-screener/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV output path (default: screener.output_path)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_file = cli.config.clone().unwrap_or_else(config_path);

    // Load configuration
    let config = Config::load_with_env(cli.config.as_deref())
        .with_context(|| format!("Failed to load config from {}", config_file.display()))?;

    // Initialize logging
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Ashare Screener v{}", env!("CARGO_PKG_VERSION"));
    if !config_file.exists() {
        tracing::info!(path = %config_file.display(), "Config file not found, using defaults");
    }

    let provider = Arc::new(TushareAdapter::from_config(&config.tushare)?);
    let engine = ScreenerEngine::new(ScreenerConfig::from(&config.screener), provider);

    let result = engine
        .run(|event| println!("{}", progress_line(&event)))
        .await?;
    let report = ScreenerReport::new(&result);

    print!("{}", report.to_console());
    let output = cli
        .output
        .unwrap_or_else(|| config.screener.expanded_output_path());
    if let Some(saved) = report.export_if_any(&output)? {
        print!("{}", report.saved_notice(&saved));
    }

    Ok(())
}
