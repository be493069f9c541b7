//! HandFlow - hand landmark telemetry
//!
//! Replays recorded hand landmarks through the tracking pipeline and reports
//! gestures, orientation and activity heatmaps.

#![warn(missing_docs)]

mod logging_setup;
mod replay;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use handflow_core::HandflowConfig;
use handflow_io::{load_config, save_config};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "handflow", version, about = "Hand landmark telemetry")]
struct Args {
    /// Configuration file (.toml, .ron or .json)
    #[arg(short, long, global = true, env = "HANDFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a JSON Lines landmark recording through the pipeline
    Replay {
        /// Recording to replay
        recording: PathBuf,
        /// Write one telemetry report per frame to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Include full heatmap intensities in every report
        #[arg(long)]
        with_cells: bool,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Destination; the extension picks the format
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn load(path: Option<&Path>) -> Result<HandflowConfig> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(HandflowConfig::default()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load(args.config.as_deref())?;
    if let Some(level) = args.log_level {
        config.log.level = level;
    }
    let _log_guard = logging_setup::init(&config.log)?;

    info!("=== HandFlow Session Started ===");

    match args.command {
        Command::Replay {
            recording,
            output,
            with_cells,
        } => {
            if with_cells && output.is_none() {
                warn!("--with-cells has no effect without --output");
            }
            let summary =
                replay::replay_file(&config.tracking, &recording, output.as_deref(), with_cells)?;
            print!("{summary}");
        }
        Command::InitConfig { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            save_config(&config, &path)
                .with_context(|| format!("Failed to write config: {}", path.display()))?;
            println!("Wrote configuration to {}", path.display());
        }
    }

    Ok(())
}
