//! Planet definitions and single-planet compilation.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use strata_density::{DensityGraph, Identifier, SubgraphName};

use crate::block::BlockId;
use crate::cave::CaveConfig;
use crate::composer::build_planet_density;
use crate::config::PlanetTerrainConfig;
use crate::error::TerrainError;
use crate::ore::{OrePlacement, OreSettings};
use crate::shift::CoordinateShift;
use crate::surface::{SurfaceConfig, SurfaceRule, build_surface_rules_for};

/// Everything needed to compile one planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetDefinition {
    /// Planet identifier. Also the namespace of its density sub-graphs.
    pub id: String,
    /// Explicit coordinate shift. Derived from `id` when unset.
    #[serde(default)]
    pub shift: Option<CoordinateShift>,
    #[serde(default)]
    pub terrain: PlanetTerrainConfig,
    #[serde(default)]
    pub caves: CaveConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub ores: OreSettings,
}

impl PlanetDefinition {
    /// A planet with default settings everywhere.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            shift: None,
            terrain: PlanetTerrainConfig::default(),
            caves: CaveConfig::default(),
            surface: SurfaceConfig::default(),
            ores: OreSettings::default(),
        }
    }

    /// Checks every section. Nothing is clamped.
    pub fn validate(&self) -> Result<(), TerrainError> {
        Identifier::new(&self.id, SubgraphName::FinalDensity.as_str())
            .map_err(|err| TerrainError::config("id", err.to_string()))?;
        self.terrain.validate()?;
        self.caves.validate()?;
        self.ores.validate()?;
        self.fluid()?;
        Ok(())
    }

    /// The shift this planet compiles with.
    pub fn effective_shift(&self) -> CoordinateShift {
        self.shift.unwrap_or_else(|| CoordinateShift::derive(&self.id))
    }

    fn fluid(&self) -> Result<BlockId, TerrainError> {
        let fluid = &self.terrain.dimensions.default_fluid;
        fluid
            .parse()
            .map_err(|err| TerrainError::config("terrain.dimensions.default_fluid", format!("{err}")))
    }
}

/// A `{"Name": ...}` block state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockState {
    #[serde(rename = "Name")]
    pub name: BlockId,
}

/// Vertical extent and cell size of the noise grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoiseShape {
    pub min_y: i32,
    pub height: i32,
    pub size_horizontal: u8,
    pub size_vertical: u8,
}

/// World-level settings written next to the density graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoiseSettings {
    pub sea_level: i32,
    pub disable_mob_generation: bool,
    pub aquifers_enabled: bool,
    pub ore_veins_enabled: bool,
    pub legacy_random_source: bool,
    pub default_block: BlockState,
    pub default_fluid: BlockState,
    pub noise: NoiseShape,
}

/// A compiled planet, ready for serialization.
#[derive(Debug, Clone)]
pub struct CompiledPlanet {
    pub id: String,
    pub shift: CoordinateShift,
    pub density: DensityGraph,
    pub surface_rule: SurfaceRule,
    pub ores: Vec<OrePlacement>,
    pub settings: NoiseSettings,
}

impl CompiledPlanet {
    /// The host noise-settings document: settings, router and surface rule.
    pub fn noise_settings_document(&self) -> NoiseSettingsDocument<'_> {
        NoiseSettingsDocument {
            settings: &self.settings,
            noise_router: NoiseRouter {
                namespace: self.density.namespace(),
            },
            surface_rule: &self.surface_rule,
        }
    }
}

#[derive(Serialize)]
pub struct NoiseSettingsDocument<'a> {
    #[serde(flatten)]
    settings: &'a NoiseSettings,
    noise_router: NoiseRouter<'a>,
    surface_rule: &'a SurfaceRule,
}

/// Router slots and the sub-graph each one reads. Unlisted slots are `0`.
const ROUTER: &[(&str, Option<SubgraphName>)] = &[
    ("barrier", None),
    ("fluid_level_floodedness", None),
    ("fluid_level_spread", None),
    ("lava", None),
    ("temperature", None),
    ("vegetation", None),
    ("continents", Some(SubgraphName::Continents)),
    ("erosion", Some(SubgraphName::Erosion)),
    ("depth", Some(SubgraphName::Depth)),
    ("ridges", Some(SubgraphName::Ridges)),
    ("initial_density_without_jaggedness", Some(SubgraphName::SlopedCheese)),
    ("final_density", Some(SubgraphName::FinalDensity)),
    ("vein_toggle", None),
    ("vein_ridged", None),
    ("vein_gap", None),
];

struct NoiseRouter<'a> {
    namespace: &'a str,
}

impl Serialize for NoiseRouter<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ROUTER.len()))?;
        for (slot, name) in ROUTER {
            match name {
                Some(name) => map.serialize_entry(slot, &format!("{}:{name}", self.namespace))?,
                None => map.serialize_entry(slot, &0.0)?,
            }
        }
        map.end()
    }
}

/// Compiles one planet: density graph, surface rule and ore placements.
///
/// # Errors
///
/// Any [`TerrainError`] from validation or graph construction. Nothing is
/// returned for a planet that fails.
pub fn compile_planet(def: &PlanetDefinition) -> Result<CompiledPlanet, TerrainError> {
    def.validate()?;
    let shift = def.effective_shift();
    let dims = &def.terrain.dimensions;

    let density = build_planet_density(&def.terrain, &def.caves, shift, &def.id)?;
    let surface_rule = build_surface_rules_for(&def.surface, dims.min_y, &def.ores)?;
    let ores = def.ores.placements(dims.min_y)?;
    let settings = NoiseSettings {
        sea_level: dims.sea_level,
        disable_mob_generation: false,
        aquifers_enabled: dims.aquifers_enabled,
        ore_veins_enabled: dims.ore_veins_enabled,
        legacy_random_source: false,
        default_block: BlockState {
            name: def.surface.default_block.clone(),
        },
        default_fluid: BlockState { name: def.fluid()? },
        noise: NoiseShape {
            min_y: dims.min_y,
            height: dims.height,
            size_horizontal: dims.size_horizontal,
            size_vertical: dims.size_vertical,
        },
    };

    tracing::info!(
        planet = %def.id,
        shift_x = shift.shift_x,
        shift_z = shift.shift_z,
        ores = ores.len(),
        "compiled planet"
    );
    Ok(CompiledPlanet {
        id: def.id.clone(),
        shift,
        density,
        surface_rule,
        ores,
        settings,
    })
}
