//! Binary entrypoint for the room preview viewer.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "room-preview", about = "In-situ room preview renderer")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    /// Override the physical artwork dimensions, e.g. "96 x 80 cm"
    #[arg(long, value_name = "DIMS")]
    dimensions: Option<String>,

    /// Start with the debug overlay enabled
    #[arg(long)]
    debug: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("room_preview={}", level).parse()?)
        .add_directive("wgpu=warn".parse()?)
        .add_directive("winit=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    // Use the library crate only.
    let mut cfg = room_preview::config::from_yaml_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(dims) = cli.dimensions {
        cfg.dimensions = Some(dims);
    }
    if cli.debug {
        cfg.debug_overlay = true;
    }
    cfg.validate().context("validating configuration")?;

    match cfg.dimensions_cm() {
        Some(d) => info!(width_cm = d.width_cm, height_cm = d.height_cm, "artwork dimensions"),
        None => info!("no artwork dimensions; using reference anchors"),
    }

    room_preview::render::viewer::run_viewer(&cfg)?;
    Ok(())
}
