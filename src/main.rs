//! Entry point for the `mini-scope` GUI.
//!
//! # Usage
//!
//! ```bash
//! mini-scope
//! mini-scope --config lab.toml --backend visa --log-level debug
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use mini_scope::config::{Settings, DEFAULT_CONFIG_PATH};
use mini_scope::{gui, instrument, logging};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "mini-scope")]
#[command(about = "List lab instruments and download oscilloscope waveforms", long_about = None)]
struct Cli {
    /// Configuration file (TOML); missing files fall back to defaults
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Instrument directory backend (mock or visa)
    #[arg(long)]
    backend: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::extract_from(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?
        .with_overrides(cli.backend, cli.log_level)?;

    logging::init_from_settings(&settings)?;
    info!(
        name = %settings.application.name,
        backend = %settings.directory.backend,
        "Configuration loaded"
    );

    let directory = instrument::open_directory(&settings.directory)?;
    gui::run(&settings, directory)?;
    Ok(())
}
