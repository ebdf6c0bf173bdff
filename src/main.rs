//! sdl_deploy - SDL2 runtime deployer for the simulator build
//!
//! Copies the SDL2 shared library into `.pio/build/simulator` so the simulator
//! executable finds it at startup. The paths are fixed; the only option is the
//! log level.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::io;

mod deploy;
mod util;

use deploy::{DeployConfig, DeployOutcome};

/// Command line arguments for sdl_deploy
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout carries only the status line
    if args.debug {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let config = DeployConfig::default();
    let stdout = io::stdout();

    let outcome = deploy::deploy(&config, &mut stdout.lock())
        .with_context(|| format!("Failed to deploy {}", config.source_path.display()))?;

    // A missing library is reported on stdout but still exits cleanly
    match outcome {
        DeployOutcome::Copied { bytes, .. } => info!("Deployment finished, {} bytes written", bytes),
        DeployOutcome::SourceMissing { .. } => info!("Deployment skipped"),
    }
    Ok(())
}
