//! Command-line argument parsing for the strata compiler.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Compiles planet manifests into host worldgen documents.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Procedural planet terrain compiler")]
pub struct CliArgs {
    /// Planet manifest (RON list of planet definitions).
    #[arg(long)]
    pub planets: Option<PathBuf>,

    /// Output directory.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Worker threads (0 = one per CPU).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Indent written JSON.
    #[arg(long)]
    pub pretty: Option<bool>,

    /// Seed for the preview noise table.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref planets) = args.planets {
            self.generation.planets = Some(planets.clone());
        }
        if let Some(ref dir) = args.output {
            self.output.dir = dir.clone();
        }
        if let Some(threads) = args.threads {
            self.generation.threads = threads;
        }
        if let Some(pretty) = args.pretty {
            self.output.pretty = pretty;
        }
        if let Some(seed) = args.seed {
            self.generation.world_seed = seed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
