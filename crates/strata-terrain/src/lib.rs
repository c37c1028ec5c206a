//! Planet terrain compilation: coordinate shifts, spline terrain, caves, surface rules and ores.
//!
//! A [`PlanetDefinition`] compiles into a [`DensityGraph`](strata_density::DensityGraph)
//! of named sub-graphs, a [`SurfaceRule`] sequence and a list of [`OrePlacement`]s.

mod block;
mod cave;
mod composer;
mod config;
mod error;
mod ore;
mod pipeline;
mod planet;
mod reference;
mod registry;
mod shift;

pub mod surface;

pub use block::BlockId;
pub use cave::{
    CaveConfig, CaveParts, CaveTypes, NO_CAVE, build_cave_subgraph, cave_threshold, compose_caves,
};
pub use composer::build_planet_density;
pub use config::{
    Base3dNoise, FlatTerrain, HeightVariation, JaggednessNoise, NoiseScales, PlanetTerrainConfig,
    TerrainTweaks, VerticalGradient, WorldDimensions,
};
pub use error::TerrainError;
pub use ore::{OreId, OrePlacement, OreSettings, OreVeinSpec, ore_placement, ore_threshold};
pub use pipeline::{PlanetOutcome, compile_all, worker_count};
pub use planet::{
    BlockState, CompiledPlanet, NoiseSettings, NoiseSettingsDocument, NoiseShape,
    PlanetDefinition, compile_planet,
};
pub use reference::{
    REFERENCE_NAMESPACE, ReferenceSplines, build_reference_splines, peaks_and_valleys,
    reference_splines,
};
pub use registry::PlanetRegistry;
pub use shift::{Axis, CoordinateShift, derive_salt, derive_shift, stable_hash};
pub use surface::{SurfaceConfig, SurfaceRule, build_surface_rules, build_surface_rules_for};
