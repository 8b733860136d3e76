//! Command-line interface for Cards of Wizardry
//!
//! The combat core only runs headless, so a config file is required.

use clap::Parser;
use std::path::PathBuf;

/// Headless combat simulator for Cards of Wizardry
#[derive(Parser, Debug)]
#[command(name = "cards-of-wizardry")]
#[command(about = "Headless combat simulator for Cards of Wizardry")]
#[command(version)]
pub struct Args {
    /// Run in headless mode with the specified JSON config file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub headless: PathBuf,

    /// Output path for the combat log (overrides the config)
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum run duration in seconds (overrides the config)
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Random seed (overrides the config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Suppress log output
    #[arg(long)]
    pub quiet: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}
