//! Load-Cell Rig Telemetry Logger
//!
//! Reads ASCII telemetry lines from the rig over a serial port, parses the
//! selected wire format, and appends timestamped rows to a CSV file.

mod config;
mod pipeline;
mod sink;

use anyhow::{Context, Result};
use clap::Parser;
use loadcell_telemetry::{LineParser, SensorFormat, SerialLineSource};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use sink::CsvSink;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Parser)]
#[command(name = "loadcell-logger")]
#[command(about = "Serial telemetry logger for the dual load-cell / INA219 test rig")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device path (overrides the configuration file)
    #[arg(long)]
    device: Option<String>,

    /// Baud rate (overrides the configuration file)
    #[arg(long)]
    baud: Option<u32>,

    /// CSV output path (overrides the configuration file)
    #[arg(long)]
    output: Option<String>,

    /// Sensor wire format: dual-load-cell, dual-load-cell-mn, load-cell-power
    #[arg(short, long)]
    format: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.parse()?))
        .init();

    // Load configuration; CLI flags win over the file
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => {
            Config::load(DEFAULT_CONFIG_PATH).context("Failed to load configuration")?
        }
        None => Config::default(),
    };
    if let Some(device) = cli.device {
        config.serial.device = device;
    }
    if let Some(baud) = cli.baud {
        config.serial.baud = baud;
    }
    if let Some(output) = cli.output {
        config.output.path = output;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    let format: SensorFormat = config
        .format
        .parse()
        .context("Invalid sensor format in configuration")?;
    let parser = LineParser::new(format);

    let mut source = SerialLineSource::open(
        &config.serial.device,
        config.serial.baud,
        Duration::from_millis(config.serial.read_timeout_ms),
    )
    .with_context(|| format!("Failed to open serial port {}", config.serial.device))?;

    let mut sink = CsvSink::create(&config.output.path, format).await?;

    // Setup Unix signal handlers
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    tokio::select! {
        result = pipeline::run(&mut source, &parser, &mut sink, config.max_transport_failures) => {
            result?;
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
    }

    Ok(())
}
