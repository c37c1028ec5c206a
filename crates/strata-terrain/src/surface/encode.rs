//! Host document encoding for surface rules.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::rule::{CaveSurface, SurfaceCondition, SurfaceRule};

/// `{"absolute": y}` anchor.
struct Absolute(i32);

impl Serialize for Absolute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("absolute", &self.0)?;
        map.end()
    }
}

/// `{"Name": id}` block state.
struct BlockState<'a>(&'a str);

impl Serialize for BlockState<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("Name", self.0)?;
        map.end()
    }
}

impl Serialize for CaveSurface {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            Self::Floor => "floor",
            Self::Ceiling => "ceiling",
        })
    }
}

impl Serialize for SurfaceRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Block(block) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "minecraft:block")?;
                map.serialize_entry("result_state", &BlockState(block.as_str()))?;
                map.end()
            }
            Self::Sequence(rules) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "minecraft:sequence")?;
                map.serialize_entry("sequence", rules)?;
                map.end()
            }
            Self::Condition { if_true, then_run } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "minecraft:condition")?;
                map.serialize_entry("if_true", if_true)?;
                map.serialize_entry("then_run", &**then_run)?;
                map.end()
            }
        }
    }
}

impl Serialize for SurfaceCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            Self::VerticalGradient {
                random_name,
                true_at_and_below,
                false_at_and_above,
            } => {
                map.serialize_entry("type", "minecraft:vertical_gradient")?;
                map.serialize_entry("random_name", random_name.as_str())?;
                map.serialize_entry("true_at_and_below", &Absolute(*true_at_and_below))?;
                map.serialize_entry("false_at_and_above", &Absolute(*false_at_and_above))?;
            }
            Self::AbovePreliminarySurface => {
                map.serialize_entry("type", "minecraft:above_preliminary_surface")?;
            }
            Self::StoneDepth {
                offset,
                add_surface_depth,
                secondary_depth_range,
                surface_type,
            } => {
                map.serialize_entry("type", "minecraft:stone_depth")?;
                map.serialize_entry("offset", offset)?;
                map.serialize_entry("add_surface_depth", add_surface_depth)?;
                map.serialize_entry("secondary_depth_range", secondary_depth_range)?;
                map.serialize_entry("surface_type", surface_type)?;
            }
            Self::Water {
                offset,
                surface_depth_multiplier,
                add_stone_depth,
            } => {
                map.serialize_entry("type", "minecraft:water")?;
                map.serialize_entry("offset", offset)?;
                map.serialize_entry("surface_depth_multiplier", surface_depth_multiplier)?;
                map.serialize_entry("add_stone_depth", add_stone_depth)?;
            }
            Self::YAbove {
                anchor,
                surface_depth_multiplier,
                add_stone_depth,
            } => {
                map.serialize_entry("type", "minecraft:y_above")?;
                map.serialize_entry("anchor", &Absolute(*anchor))?;
                map.serialize_entry("surface_depth_multiplier", surface_depth_multiplier)?;
                map.serialize_entry("add_stone_depth", add_stone_depth)?;
            }
            Self::NoiseThreshold {
                noise,
                min_threshold,
                max_threshold,
            } => {
                map.serialize_entry("type", "minecraft:noise_threshold")?;
                map.serialize_entry("noise", noise.as_str())?;
                map.serialize_entry("min_threshold", min_threshold)?;
                map.serialize_entry("max_threshold", max_threshold)?;
            }
            Self::Not(inner) => {
                map.serialize_entry("type", "minecraft:not")?;
                map.serialize_entry("invert", &**inner)?;
            }
        }
        map.end()
    }
}
