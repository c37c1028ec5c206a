//! `strata`: compiles a RON planet manifest into host worldgen documents.

mod writer;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use strata_config::{CliArgs, Config, default_config_dir, read_ron};
use strata_density::{DensityContext, DensityEvaluator, SimplexNoiseTable, SubgraphName};
use strata_terrain::{CompiledPlanet, PlanetDefinition, PlanetRegistry, compile_all};
use tracing::{error, info, warn};

/// Columns sampled when previewing a compiled planet.
const PREVIEW_COLUMNS: [(i32, i32); 4] = [(0, 0), (512, -512), (-2048, 1024), (8192, 8192)];
const PREVIEW_HEIGHTS: [i32; 3] = [-32, 64, 160];

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = Config::log_dir(&config_dir);
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let Some(manifest) = config.generation.planets.clone() else {
        error!("No planet manifest given (use --planets or generation.planets in config.ron)");
        return ExitCode::FAILURE;
    };

    match run(&manifest, &config) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            error!(failed, "Some planets failed to compile");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Compiles and writes every planet in `manifest`. Returns the number of
/// planets that failed.
fn run(manifest: &Path, config: &Config) -> Result<usize, Box<dyn std::error::Error>> {
    let definitions: Vec<PlanetDefinition> = read_ron(manifest)?;
    info!(
        manifest = %manifest.display(),
        planets = definitions.len(),
        "Loaded planet manifest"
    );

    let registry = PlanetRegistry::from_definitions(definitions)?;
    for (a, b) in registry.shift_collisions() {
        warn!("Planets {a} and {b} share a coordinate shift and will generate identical terrain");
    }

    let output: &PathBuf = &config.output.dir;
    let mut failed = 0;
    for outcome in compile_all(&registry, config.generation.threads) {
        let planet = match outcome.result {
            Ok(planet) => planet,
            Err(_) => {
                // Already logged by the pipeline.
                failed += 1;
                continue;
            }
        };
        preview(&planet, config.generation.world_seed);
        match writer::write_planet(output, &planet, config.output.pretty) {
            Ok(written) => info!(
                planet = %planet.id,
                dir = %written.dir.display(),
                files = written.files.len(),
                compile_time_us = outcome.compile_time_us,
                "Wrote planet"
            ),
            Err(e) => {
                error!(planet = %planet.id, "{e}");
                failed += 1;
            }
        }
    }
    Ok(failed)
}

/// Evaluates `final_density` at a few fixed points and logs the result.
fn preview(planet: &CompiledPlanet, seed: u64) {
    let table = SimplexNoiseTable::for_graph(seed, &planet.density);
    let eval = DensityEvaluator::new(&planet.density, &table);

    let mut solid = 0;
    let mut samples = 0;
    for (x, z) in PREVIEW_COLUMNS {
        for y in PREVIEW_HEIGHTS {
            let Some(d) = eval.evaluate_named(SubgraphName::FinalDensity, DensityContext::new(x, y, z))
            else {
                continue;
            };
            if !d.is_finite() {
                warn!(planet = %planet.id, x, y, z, "final_density is not finite");
                continue;
            }
            samples += 1;
            if d > 0.0 {
                solid += 1;
            }
        }
    }
    tracing::debug!(planet = %planet.id, solid, samples, "Preview of final_density");
}
