//! Ore vein rarity and depth model.
//!
//! Each ore type has a fixed base threshold on the shared ore-gap noise and a
//! fixed stone-depth offset. The planet's density multiplier lowers every
//! threshold by the same amount, so rarity stays ordered between ores while
//! depth placement is unaffected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strata_density::{DensityError, Identifier};

use crate::block::{BlockId, vanilla};
use crate::error::{TerrainError, check_range};
use crate::surface::{SurfaceCondition, SurfaceRule};

/// Lowest and highest ore-gap threshold a vein may use.
pub const MIN_THRESHOLD: f64 = 0.1;
pub const MAX_THRESHOLD: f64 = 1.0;

/// Threshold of ores without a listed base.
const DEFAULT_THRESHOLD: f64 = 0.9;

/// Highest Y for deep ores.
const DEEP_MAX_Y: i32 = 16;
/// Highest Y for every other ore.
const SHALLOW_MAX_Y: i32 = 48;

/// Secondary depth range of a vein at `vein_size` 1.0.
const VEIN_DEPTH_RANGE: f64 = 16.0;

/// World floor assumed by [`ore_placement`].
const DEFAULT_FLOOR: i32 = -64;

/// Known ore types. Anything else is carried as a validated identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OreId {
    Coal,
    Iron,
    Copper,
    Gold,
    Redstone,
    Lapis,
    Diamond,
    Emerald,
    AncientDebris,
    Osmium,
    Tin,
    Uranium,
    Fluorite,
    Lead,
    Aluminum,
    Bauxite,
    Silver,
    Nickel,
    Zinc,
    Platinum,
    Tungsten,
    Other(Identifier),
}

/// Name, default veins per chunk and block of every known ore.
const KNOWN_ORES: &[(OreId, &str, u32, &str)] = &[
    (OreId::Coal, "coal", 12, "minecraft:coal_ore"),
    (OreId::Iron, "iron", 10, "minecraft:iron_ore"),
    (OreId::Copper, "copper", 8, "minecraft:copper_ore"),
    (OreId::Gold, "gold", 2, "minecraft:gold_ore"),
    (OreId::Redstone, "redstone", 4, "minecraft:redstone_ore"),
    (OreId::Lapis, "lapis", 2, "minecraft:lapis_ore"),
    (OreId::Diamond, "diamond", 1, "minecraft:diamond_ore"),
    (OreId::Emerald, "emerald", 1, "minecraft:emerald_ore"),
    (OreId::AncientDebris, "ancient_debris", 1, "minecraft:ancient_debris"),
    (OreId::Osmium, "osmium", 8, "mekanism:osmium_ore"),
    (OreId::Tin, "tin", 6, "mekanism:tin_ore"),
    (OreId::Uranium, "uranium", 2, "mekanism:uranium_ore"),
    (OreId::Fluorite, "fluorite", 4, "mekanism:fluorite_ore"),
    (OreId::Lead, "lead", 5, "mekanism:lead_ore"),
    // No native blocks for these; nearest vanilla ore stands in.
    (OreId::Aluminum, "aluminum", 7, "minecraft:iron_ore"),
    (OreId::Bauxite, "bauxite", 7, "minecraft:iron_ore"),
    (OreId::Silver, "silver", 3, "minecraft:gold_ore"),
    (OreId::Nickel, "nickel", 5, "minecraft:copper_ore"),
    (OreId::Zinc, "zinc", 5, "minecraft:iron_ore"),
    (OreId::Platinum, "platinum", 5, "minecraft:diamond_ore"),
    (OreId::Tungsten, "tungsten", 5, "minecraft:iron_ore"),
];

/// Veins per chunk for ores outside the table.
const DEFAULT_VEINS: u32 = 5;

impl OreId {
    /// Every known ore, in table order.
    pub fn known() -> impl Iterator<Item = &'static OreId> {
        KNOWN_ORES.iter().map(|(ore, ..)| ore)
    }

    fn entry(&self) -> Option<&'static (OreId, &'static str, u32, &'static str)> {
        KNOWN_ORES.iter().find(|(ore, ..)| ore == self)
    }

    /// Ore-gap threshold at density multiplier 1.0.
    pub fn base_threshold(&self) -> f64 {
        match self {
            Self::Diamond => 0.92,
            Self::Emerald => 0.94,
            Self::AncientDebris => 0.96,
            Self::Gold => 0.85,
            Self::Redstone => 0.75,
            Self::Lapis => 0.80,
            Self::Iron => 0.70,
            Self::Copper => 0.65,
            _ => DEFAULT_THRESHOLD,
        }
    }

    /// Stone-depth offset veins of this ore require.
    pub fn depth_offset(&self) -> i32 {
        match self {
            Self::Diamond | Self::AncientDebris => 16,
            Self::Emerald | Self::Gold => 12,
            Self::Redstone | Self::Lapis => 10,
            _ => 8,
        }
    }

    pub fn is_deep(&self) -> bool {
        matches!(self, Self::Diamond | Self::AncientDebris)
    }

    pub fn default_veins_per_chunk(&self) -> u32 {
        self.entry().map_or(DEFAULT_VEINS, |(_, _, veins, _)| *veins)
    }

    /// The block a vein of this ore places.
    pub fn block(&self) -> Result<BlockId, DensityError> {
        match (self, self.entry()) {
            (_, Some((_, _, _, block))) => block.parse(),
            (Self::Other(id), None) => BlockId::new(id.namespace(), &format!("{}_ore", id.path())),
            (_, None) => Ok(vanilla("stone")),
        }
    }
}

impl FromStr for OreId {
    type Err = DensityError;

    /// Accepts known names (`"diamond"`, `"minecraft:diamond"`) or any valid
    /// identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: Identifier = s.to_ascii_lowercase().parse()?;
        if id.namespace() == "minecraft" {
            if let Some((ore, ..)) = KNOWN_ORES.iter().find(|(_, name, ..)| *name == id.path()) {
                return Ok(ore.clone());
            }
        }
        Ok(Self::Other(id))
    }
}

impl fmt::Display for OreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.entry()) {
            (_, Some((_, name, ..))) => f.write_str(name),
            (Self::Other(id), None) => fmt::Display::fmt(id, f),
            (_, None) => Ok(()),
        }
    }
}

impl Serialize for OreId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OreId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// `clamp(base - (density_multiplier - 1) * 0.1, 0.1, 1.0)`.
pub fn ore_threshold(ore: &OreId, density_multiplier: f64) -> f64 {
    (ore.base_threshold() - (density_multiplier - 1.0) * 0.1).clamp(MIN_THRESHOLD, MAX_THRESHOLD)
}

/// Where and how often an ore generates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrePlacement {
    pub ore: OreId,
    pub block: BlockId,
    /// Minimum ore-gap noise for a vein to fire.
    pub threshold: f64,
    pub depth_offset: i32,
    /// Inclusive `(min_y, max_y)`.
    pub y_band: (i32, i32),
    pub veins_per_chunk: u32,
}

impl OrePlacement {
    pub fn min_y(&self) -> i32 {
        self.y_band.0
    }

    pub fn max_y(&self) -> i32 {
        self.y_band.1
    }
}

/// Placement of `ore` at density multiplier 1.0 on a world whose floor is
/// Y -64.
///
/// # Errors
///
/// [`TerrainError::Configuration`] when an unknown ore's block id would be
/// invalid.
pub fn ore_placement(ore: &OreId, vein_count: u32) -> Result<OrePlacement, TerrainError> {
    let spec = OreVeinSpec {
        ore: ore.clone(),
        veins_per_chunk: vein_count,
        min_y: None,
        max_y: None,
    };
    spec.placement(1.0, DEFAULT_FLOOR)
}

/// One configured ore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OreVeinSpec {
    pub ore: OreId,
    pub veins_per_chunk: u32,
    /// Overrides the band floor, which is otherwise the world floor.
    #[serde(default)]
    pub min_y: Option<i32>,
    /// Overrides the band ceiling (16 for deep ores, 48 otherwise).
    #[serde(default)]
    pub max_y: Option<i32>,
}

impl OreVeinSpec {
    /// `ore` with its default vein count and band.
    pub fn new(ore: OreId) -> Self {
        Self {
            veins_per_chunk: ore.default_veins_per_chunk(),
            ore,
            min_y: None,
            max_y: None,
        }
    }

    fn placement(&self, density_multiplier: f64, world_min_y: i32) -> Result<OrePlacement, TerrainError> {
        let min_y = self.min_y.unwrap_or(world_min_y);
        let max_y = self.max_y.unwrap_or(if self.ore.is_deep() {
            DEEP_MAX_Y
        } else {
            SHALLOW_MAX_Y
        });
        if min_y > max_y {
            return Err(TerrainError::config(
                format!("ores.{}.min_y", self.ore),
                format!("{min_y} is above max_y {max_y}"),
            ));
        }
        let block = self
            .ore
            .block()
            .map_err(|err| TerrainError::config(format!("ores.{}", self.ore), err.to_string()))?;
        Ok(OrePlacement {
            ore: self.ore.clone(),
            block,
            threshold: ore_threshold(&self.ore, density_multiplier),
            depth_offset: self.ore.depth_offset(),
            y_band: (min_y, max_y),
            veins_per_chunk: self.veins_per_chunk,
        })
    }
}

/// A planet's ore configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OreSettings {
    pub veins: Vec<OreVeinSpec>,
    /// Lowers every threshold by 0.1 per unit above 1.0. Range: \[0.1, 5.0\].
    pub density_multiplier: f64,
    /// Scales the vertical extent of veins. Range: \[0.1, 4.0\].
    pub vein_size: f64,
}

impl Default for OreSettings {
    fn default() -> Self {
        Self {
            veins: Vec::new(),
            density_multiplier: 1.0,
            vein_size: 1.0,
        }
    }
}

impl OreSettings {
    /// Every known ore at its default vein count.
    pub fn all_known() -> Self {
        Self {
            veins: OreId::known().cloned().map(OreVeinSpec::new).collect(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), TerrainError> {
        check_range("ores.density_multiplier", self.density_multiplier, 0.1, 5.0)?;
        check_range("ores.vein_size", self.vein_size, 0.1, 4.0)?;
        for (i, vein) in self.veins.iter().enumerate() {
            if self.veins[..i].iter().any(|other| other.ore == vein.ore) {
                return Err(TerrainError::config(
                    format!("ores.{}", vein.ore),
                    "configured more than once",
                ));
            }
        }
        Ok(())
    }

    /// Placements of every ore with at least one vein per chunk.
    pub fn placements(&self, world_min_y: i32) -> Result<Vec<OrePlacement>, TerrainError> {
        self.veins
            .iter()
            .filter(|vein| vein.veins_per_chunk > 0)
            .map(|vein| vein.placement(self.density_multiplier, world_min_y))
            .collect()
    }

    /// Surface rules placing each ore, in configuration order.
    pub fn ore_rules(&self, world_min_y: i32) -> Result<Vec<SurfaceRule>, TerrainError> {
        let secondary = (VEIN_DEPTH_RANGE * self.vein_size) as i32;
        let gap = Identifier::minecraft("ore_gap")?;
        Ok(self
            .placements(world_min_y)?
            .iter()
            .map(|placement| {
                SurfaceRule::when_all(
                    vec![
                        SurfaceCondition::NoiseThreshold {
                            noise: gap.clone(),
                            min_threshold: placement.threshold,
                            max_threshold: MAX_THRESHOLD,
                        },
                        SurfaceCondition::y_above(placement.min_y()),
                        SurfaceCondition::y_above(placement.max_y() + 1).negate(),
                        SurfaceCondition::stone_depth(placement.depth_offset, false, secondary),
                    ],
                    SurfaceRule::block(&placement.block),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SurfaceContext;

    #[test]
    fn test_bases_at_unit_multiplier() {
        let expected = [
            (OreId::Diamond, 0.92),
            (OreId::Emerald, 0.94),
            (OreId::AncientDebris, 0.96),
            (OreId::Gold, 0.85),
            (OreId::Redstone, 0.75),
            (OreId::Lapis, 0.80),
            (OreId::Iron, 0.70),
            (OreId::Copper, 0.65),
            (OreId::Coal, 0.90),
            (OreId::Osmium, 0.90),
        ];
        for (ore, base) in expected {
            assert_eq!(ore_threshold(&ore, 1.0), base, "base threshold of {ore}");
        }
    }

    #[test]
    fn test_threshold_bounds() {
        for ore in OreId::known() {
            for step in 1..=50 {
                let m = f64::from(step) * 0.1;
                let t = ore_threshold(ore, m);
                assert!(
                    (MIN_THRESHOLD..=MAX_THRESHOLD).contains(&t),
                    "{ore} at multiplier {m}: {t}"
                );
            }
        }
        assert!((ore_threshold(&OreId::Copper, 5.0) - 0.25).abs() < 1e-12);
        assert_eq!(ore_threshold(&OreId::AncientDebris, 0.1), 1.0);
    }

    #[test]
    fn test_diamond_placement() {
        let p = ore_placement(&OreId::Diamond, 1).unwrap();
        assert_eq!(p.threshold, 0.92);
        assert_eq!(p.depth_offset, 16);
        assert_eq!(p.max_y(), 16);
        assert_eq!(p.min_y(), -64);
        assert_eq!(p.block, vanilla("diamond_ore"));

        let iron = ore_placement(&OreId::Iron, 10).unwrap();
        assert_eq!(iron.max_y(), 48);
        assert_eq!(iron.depth_offset, 8);
    }

    #[test]
    fn test_parse_and_blocks() {
        assert_eq!("Diamond".parse::<OreId>().unwrap(), OreId::Diamond);
        assert_eq!("minecraft:tin".parse::<OreId>().unwrap(), OreId::Tin);
        let cobalt: OreId = "tconstruct:cobalt".parse().unwrap();
        assert_eq!(cobalt.to_string(), "tconstruct:cobalt");
        assert_eq!(cobalt.block().unwrap().as_str(), "tconstruct:cobalt_ore");
        assert_eq!(OreId::Silver.block().unwrap(), vanilla("gold_ore"));
        assert_eq!(OreId::Osmium.block().unwrap().as_str(), "mekanism:osmium_ore");
        assert!("bad ore".parse::<OreId>().is_err());
    }

    #[test]
    fn test_default_vein_counts() {
        assert_eq!(OreId::Coal.default_veins_per_chunk(), 12);
        assert_eq!(OreId::Bauxite.default_veins_per_chunk(), 7);
        assert_eq!(OreId::Other(Identifier::minecraft("ruby").unwrap()).default_veins_per_chunk(), 5);
        assert_eq!(OreSettings::all_known().veins.len(), OreId::known().count());
    }

    #[test]
    fn test_settings_reject_duplicates_and_range() {
        let mut settings = OreSettings {
            veins: vec![OreVeinSpec::new(OreId::Iron), OreVeinSpec::new(OreId::Iron)],
            ..OreSettings::default()
        };
        assert!(settings.validate().is_err(), "duplicate ore must be rejected");
        settings.veins.pop();
        assert!(settings.validate().is_ok());
        settings.density_multiplier = 6.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_ore_rule_fires_inside_band_only() {
        let settings = OreSettings {
            veins: vec![OreVeinSpec::new(OreId::Diamond)],
            ..OreSettings::default()
        };
        let rules = settings.ore_rules(-64).unwrap();
        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        let table = |_: &strata_density::NoiseSource, _: f64, _: f64, _: f64| 0.95;
        let at = |y| SurfaceContext {
            noise: &table,
            ..SurfaceContext::at_depth(y, 10, 3)
        };
        assert_eq!(at(0).apply(rule), Some(&vanilla("diamond_ore")));
        assert_eq!(at(16).apply(rule), Some(&vanilla("diamond_ore")));
        assert_eq!(at(17).apply(rule), None);
        assert_eq!(SurfaceContext::at_depth(0, 10, 3).apply(rule), None, "noise below threshold");
    }

    #[test]
    fn test_zero_veins_emit_no_rule() {
        let settings = OreSettings {
            veins: vec![OreVeinSpec {
                veins_per_chunk: 0,
                ..OreVeinSpec::new(OreId::Coal)
            }],
            ..OreSettings::default()
        };
        assert!(settings.ore_rules(-64).unwrap().is_empty());
    }

    #[test]
    fn test_serde_names() {
        let spec: OreVeinSpec = ron::from_str("(ore: \"ancient_debris\", veins_per_chunk: 2)").unwrap();
        assert_eq!(spec.ore, OreId::AncientDebris);
        assert_eq!(spec.max_y, None);
        assert_eq!(serde_json::to_string(&OreId::Lapis).unwrap(), "\"lapis\"");
    }
}
