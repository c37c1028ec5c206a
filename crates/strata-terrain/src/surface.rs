//! Surface rule sequencing.
//!
//! A planet's surface rule is one ordered [`SurfaceRule::Sequence`]. The host
//! walks it top to bottom for every solid position and uses the first block
//! any rule yields; positions no rule claims keep the density-derived
//! material.

mod context;
mod encode;
mod rule;

pub use context::SurfaceContext;
pub use rule::{CaveSurface, SurfaceCondition, SurfaceRule};

use serde::{Deserialize, Serialize};
use strata_density::Identifier;

use crate::block::{BlockId, vanilla};
use crate::error::TerrainError;
use crate::ore::OreSettings;

/// Surface blocks that only look right as a single top layer.
const SINGLE_LAYER_BLOCKS: &[&str] = &[
    "minecraft:grass_block",
    "minecraft:moss_block",
    "minecraft:mycelium",
    "minecraft:podzol",
    "minecraft:crimson_nylium",
    "minecraft:warped_nylium",
];

/// Top of the deepslate band is at this Y; full deepslate from `-8` down.
const DEEPSLATE_BAND: (i32, i32) = (-8, 0);
const DEEP_LAYER_BAND: (i32, i32) = (0, 8);
/// Bedrock thins out over this many blocks above the world floor.
const BEDROCK_FADE: i32 = 5;

/// Surface materials for one planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Top block of dry columns.
    pub surface_block: BlockId,
    /// Block below the surface layer.
    pub subsurface_block: BlockId,
    /// Top block of submerged columns. Defaults to the subsurface block.
    pub underwater_block: Option<BlockId>,
    /// Bulk stone the density graph fills with.
    pub default_block: BlockId,
    /// Replaces the default block below Y 0..8.
    pub deep_block: BlockId,
    /// Replaces the default block below Y -8..0 when set.
    pub deepslate_block: Option<BlockId>,
    pub bedrock_block: BlockId,
    /// Forces single- (`true`) or multi-layer (`false`) mode. When unset
    /// the mode follows the surface block.
    pub single_layer: Option<bool>,
    /// Places the underwater block on submerged floors.
    pub water_rule: bool,
    /// Restricts surface materials to positions above the preliminary
    /// surface, so cave floors keep the default block.
    pub above_surface_wrapper: bool,
    pub prevent_grass: bool,
    pub prevent_gravel: bool,
    pub prevent_sand: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            surface_block: vanilla("stone"),
            subsurface_block: vanilla("cobblestone"),
            underwater_block: None,
            default_block: vanilla("stone"),
            deep_block: vanilla("stone"),
            deepslate_block: None,
            bedrock_block: vanilla("bedrock"),
            single_layer: None,
            water_rule: true,
            above_surface_wrapper: true,
            prevent_grass: false,
            prevent_gravel: false,
            prevent_sand: false,
        }
    }
}

impl SurfaceConfig {
    pub fn is_single_layer(&self) -> bool {
        self.single_layer
            .unwrap_or_else(|| SINGLE_LAYER_BLOCKS.contains(&self.surface_block.as_str()))
    }

    pub fn underwater_block(&self) -> &BlockId {
        self.underwater_block.as_ref().unwrap_or(&self.subsurface_block)
    }
}

/// Builds the surface rule for a world whose floor is Y -64, without ores.
///
/// # Errors
///
/// Never fails for built-in rule names; the `Result` covers invalid ore
/// identifiers in [`build_surface_rules_for`].
pub fn build_surface_rules(config: &SurfaceConfig) -> Result<SurfaceRule, TerrainError> {
    build_surface_rules_for(config, -64, &OreSettings::default())
}

/// Builds the full surface rule for a world whose floor is `min_y`.
pub fn build_surface_rules_for(
    config: &SurfaceConfig,
    min_y: i32,
    ores: &OreSettings,
) -> Result<SurfaceRule, TerrainError> {
    let mut sequence = Vec::new();

    sequence.push(SurfaceRule::when(
        SurfaceCondition::vertical_gradient(
            Identifier::minecraft("bedrock_floor")?,
            min_y,
            min_y + BEDROCK_FADE,
        ),
        SurfaceRule::block(&config.bedrock_block),
    ));

    let on_floor = || SurfaceCondition::stone_depth(0, false, 0);
    if config.prevent_grass {
        sequence.push(SurfaceRule::when(on_floor(), SurfaceRule::block(&config.surface_block)));
    }
    if config.prevent_gravel {
        sequence.push(SurfaceRule::when(on_floor(), SurfaceRule::block(&config.subsurface_block)));
    }
    if config.prevent_sand {
        sequence.push(SurfaceRule::when(on_floor(), SurfaceRule::block(&config.surface_block)));
    }

    let mut near_surface = Vec::new();
    if config.water_rule {
        near_surface.push(SurfaceRule::when_all(
            vec![
                SurfaceCondition::stone_depth(0, true, 0),
                SurfaceCondition::water(-1).negate(),
            ],
            SurfaceRule::block(config.underwater_block()),
        ));
    }
    let surface = SurfaceRule::block(&config.surface_block);
    let subsurface = SurfaceRule::block(&config.subsurface_block);
    if config.is_single_layer() {
        near_surface.push(SurfaceRule::when(
            on_floor(),
            SurfaceRule::Sequence(vec![
                SurfaceRule::when(SurfaceCondition::water(-1), surface),
                subsurface.clone(),
            ]),
        ));
        near_surface.push(SurfaceRule::when(
            SurfaceCondition::stone_depth(0, true, 3),
            subsurface,
        ));
    } else {
        near_surface.push(SurfaceRule::when(on_floor(), surface.clone()));
        near_surface.push(SurfaceRule::when(SurfaceCondition::stone_depth(0, true, 6), surface));
        near_surface.push(SurfaceRule::when(
            SurfaceCondition::stone_depth(0, true, 12),
            subsurface,
        ));
    }
    if config.above_surface_wrapper {
        sequence.push(SurfaceRule::when(
            SurfaceCondition::AbovePreliminarySurface,
            SurfaceRule::Sequence(near_surface),
        ));
    } else {
        sequence.extend(near_surface);
    }

    sequence.extend(ores.ore_rules(min_y)?);

    if let Some(deepslate) = config
        .deepslate_block
        .as_ref()
        .filter(|block| **block != config.default_block)
    {
        sequence.push(SurfaceRule::when(
            SurfaceCondition::vertical_gradient(
                Identifier::minecraft("deepslate")?,
                DEEPSLATE_BAND.0,
                DEEPSLATE_BAND.1,
            ),
            SurfaceRule::block(deepslate),
        ));
    }
    if config.deep_block != config.default_block {
        sequence.push(SurfaceRule::when(
            SurfaceCondition::vertical_gradient(
                Identifier::minecraft("deep_layer")?,
                DEEP_LAYER_BAND.0,
                DEEP_LAYER_BAND.1,
            ),
            SurfaceRule::block(&config.deep_block),
        ));
    }

    tracing::debug!(
        rules = sequence.len(),
        single_layer = config.is_single_layer(),
        surface = %config.surface_block,
        "built surface rules"
    );
    Ok(SurfaceRule::Sequence(sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ore::{OreId, OreVeinSpec};

    fn block(id: &str) -> BlockId {
        id.parse().unwrap()
    }

    fn top_level(rule: &SurfaceRule) -> &[SurfaceRule] {
        match rule {
            SurfaceRule::Sequence(rules) => rules,
            other => panic!("expected a sequence, got {other:?}"),
        }
    }

    #[test]
    fn test_default_is_multi_layer() {
        let config = SurfaceConfig::default();
        assert!(!config.is_single_layer());
        assert_eq!(config.underwater_block(), &vanilla("cobblestone"));
        let rule = build_surface_rules(&config).unwrap();
        // bedrock + wrapper; deep and deepslate equal the default block
        assert_eq!(top_level(&rule).len(), 2);
    }

    #[test]
    fn test_grass_selects_single_layer() {
        let config = SurfaceConfig {
            surface_block: vanilla("grass_block"),
            ..SurfaceConfig::default()
        };
        assert!(config.is_single_layer());
        let forced = SurfaceConfig {
            single_layer: Some(false),
            ..config
        };
        assert!(!forced.is_single_layer());
    }

    #[test]
    fn test_single_layer_depths() {
        let config = SurfaceConfig {
            surface_block: block("test:x"),
            subsurface_block: block("test:y"),
            single_layer: Some(true),
            ..SurfaceConfig::default()
        };
        let rule = build_surface_rules(&config).unwrap();
        let at = |depth| SurfaceContext::at_depth(70 - depth, depth, 3).apply(&rule).cloned();
        assert_eq!(at(0), Some(block("test:x")));
        for depth in 1..=3 {
            assert_eq!(at(depth), Some(block("test:y")), "stone depth {depth}");
        }
        assert_eq!(at(4), None, "below the subsurface layer");
    }

    #[test]
    fn test_multi_layer_stacks_surface() {
        let config = SurfaceConfig {
            surface_block: vanilla("sand"),
            subsurface_block: vanilla("sandstone"),
            ..SurfaceConfig::default()
        };
        let rule = build_surface_rules(&config).unwrap();
        let at = |depth| SurfaceContext::at_depth(70 - depth, depth, 3).apply(&rule).cloned();
        assert_eq!(at(0), Some(vanilla("sand")));
        assert_eq!(at(3), Some(vanilla("sand")));
        assert_eq!(at(4), None);
        let deep = SurfaceContext {
            secondary_depth: 1.0,
            ..SurfaceContext::at_depth(61, 9, 3)
        };
        assert_eq!(deep.apply(&rule), Some(&vanilla("sand")));
        let deeper = SurfaceContext {
            secondary_depth: 1.0,
            ..SurfaceContext::at_depth(55, 14, 3)
        };
        assert_eq!(deeper.apply(&rule), Some(&vanilla("sandstone")));
    }

    #[test]
    fn test_underwater_override() {
        let config = SurfaceConfig {
            surface_block: vanilla("grass_block"),
            subsurface_block: vanilla("dirt"),
            underwater_block: Some(vanilla("gravel")),
            ..SurfaceConfig::default()
        };
        let rule = build_surface_rules(&config).unwrap();
        let submerged = SurfaceContext {
            water_height: Some(63),
            ..SurfaceContext::at_depth(50, 0, 3)
        };
        assert_eq!(submerged.apply(&rule), Some(&vanilla("gravel")));

        let without = SurfaceConfig {
            water_rule: false,
            ..config
        };
        let rule = build_surface_rules(&without).unwrap();
        assert_eq!(submerged.apply(&rule), Some(&vanilla("dirt")), "submerged floor falls back");
    }

    #[test]
    fn test_underwater_rule_leads_wrapper_in_both_modes() {
        for single_layer in [true, false] {
            let config = SurfaceConfig {
                surface_block: vanilla("sand"),
                subsurface_block: vanilla("sandstone"),
                underwater_block: Some(vanilla("clay")),
                single_layer: Some(single_layer),
                ..SurfaceConfig::default()
            };
            let rule = build_surface_rules(&config).unwrap();
            let SurfaceRule::Condition {
                if_true: SurfaceCondition::AbovePreliminarySurface,
                then_run,
            } = &top_level(&rule)[1]
            else {
                panic!("expected the wrapper second");
            };
            let children = top_level(then_run);
            assert_eq!(children[0].blocks(), [&vanilla("clay")], "single_layer={single_layer}");

            for depth in 0..=3 {
                let submerged = SurfaceContext {
                    water_height: Some(63),
                    ..SurfaceContext::at_depth(50 - depth, depth, 3)
                };
                assert_eq!(submerged.apply(&rule), Some(&vanilla("clay")), "depth {depth}");
            }
            let dry = SurfaceContext::at_depth(70, 0, 3);
            assert_eq!(dry.apply(&rule), Some(&vanilla("sand")));
        }
    }

    #[test]
    fn test_wrapper_excludes_cave_floors() {
        let rule = build_surface_rules(&SurfaceConfig::default()).unwrap();
        let cave_floor = SurfaceContext {
            above_preliminary_surface: false,
            ..SurfaceContext::at_depth(10, 0, 3)
        };
        assert_eq!(cave_floor.apply(&rule), None);

        let unwrapped = SurfaceConfig {
            above_surface_wrapper: false,
            ..SurfaceConfig::default()
        };
        let rule = build_surface_rules(&unwrapped).unwrap();
        assert_eq!(cave_floor.apply(&rule), Some(&vanilla("stone")));
    }

    #[test]
    fn test_bedrock_and_bands_order() {
        let config = SurfaceConfig {
            deep_block: vanilla("tuff"),
            deepslate_block: Some(vanilla("deepslate")),
            prevent_gravel: true,
            ..SurfaceConfig::default()
        };
        let ores = OreSettings {
            veins: vec![OreVeinSpec::new(OreId::Iron)],
            ..OreSettings::default()
        };
        let rule = build_surface_rules_for(&config, -32, &ores).unwrap();
        let rules = top_level(&rule);
        // bedrock, gravel prevention, wrapper, iron, deepslate, deep layer
        assert_eq!(rules.len(), 6);
        assert!(matches!(
            &rules[0],
            SurfaceRule::Condition {
                if_true: SurfaceCondition::VerticalGradient {
                    true_at_and_below: -32,
                    false_at_and_above: -27,
                    ..
                },
                ..
            }
        ));
        assert_eq!(rules[4].blocks(), [&vanilla("deepslate")]);
        assert_eq!(rules[5].blocks(), [&vanilla("tuff")]);

        let bottom = SurfaceContext {
            above_preliminary_surface: false,
            ..SurfaceContext::at_depth(-32, 90, 3)
        };
        assert_eq!(bottom.apply(&rule), Some(&vanilla("bedrock")));
        let band = SurfaceContext {
            above_preliminary_surface: false,
            ..SurfaceContext::at_depth(-10, 90, 3)
        };
        assert_eq!(band.apply(&rule), Some(&vanilla("deepslate")));
    }

    #[test]
    fn test_deepslate_equal_to_default_is_skipped() {
        let config = SurfaceConfig {
            deepslate_block: Some(vanilla("stone")),
            ..SurfaceConfig::default()
        };
        let rule = build_surface_rules(&config).unwrap();
        assert_eq!(top_level(&rule).len(), 2);
    }

    #[test]
    fn test_config_from_partial_ron() {
        let config: SurfaceConfig =
            ron::from_str("(surface_block: \"strata:moon_sand\", prevent_sand: true)").unwrap();
        assert_eq!(config.surface_block.as_str(), "strata:moon_sand");
        assert!(config.prevent_sand);
        assert_eq!(config.bedrock_block, vanilla("bedrock"));
    }
}
