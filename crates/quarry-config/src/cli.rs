//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Quarry command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "quarry", about = "Headless voxel world simulation")]
pub struct CliArgs {
    /// World width in cells.
    #[arg(long)]
    pub size_x: Option<u32>,

    /// World height in cells.
    #[arg(long)]
    pub size_y: Option<u32>,

    /// World depth in cells.
    #[arg(long)]
    pub size_z: Option<u32>,

    /// Terrain generation seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of simulated updates to run.
    #[arg(long, default_value_t = 600)]
    pub updates: u32,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(x) = args.size_x {
            self.world.size_x = x;
        }
        if let Some(y) = args.size_y {
            self.world.size_y = y;
        }
        if let Some(z) = args.size_z {
            self.world.size_z = z;
        }
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
