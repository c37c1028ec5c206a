//! Per-planet terrain shaping configuration.
//!
//! All structs use `#[serde(default)]` so planet manifests only name what they
//! change. Values are checked by [`PlanetTerrainConfig::validate`] before any
//! graph is built.

use serde::{Deserialize, Serialize};
use strata_density::BlendedNoiseParams;

use crate::error::{TerrainError, check_finite, check_positive};

/// Horizontal frequency and amplitude multipliers for the climate noises.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseScales {
    /// Horizontal frequency of the continentalness noise.
    pub continental: f64,
    /// Horizontal frequency of the erosion noise.
    pub erosion: f64,
    /// Horizontal frequency of the ridge noise.
    pub ridge: f64,
    /// Amplitude multipliers applied to the three climate sub-graphs.
    pub height_variation: HeightVariation,
}

impl Default for NoiseScales {
    fn default() -> Self {
        Self {
            continental: 1.0,
            erosion: 1.0,
            ridge: 1.0,
            height_variation: HeightVariation::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightVariation {
    pub continental: f64,
    pub erosion: f64,
    pub ridge: f64,
}

impl Default for HeightVariation {
    fn default() -> Self {
        Self {
            continental: 1.0,
            erosion: 1.0,
            ridge: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JaggednessNoise {
    /// Horizontal scale of the jagged peak noise.
    pub noise_scale: f64,
}

impl Default for JaggednessNoise {
    fn default() -> Self {
        Self {
            noise_scale: 1500.0,
        }
    }
}

/// Parameters of the blended 3D base noise added to sloped cheese.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Base3dNoise {
    pub xz_scale: f64,
    pub y_scale: f64,
    pub xz_factor: f64,
    pub y_factor: f64,
    pub smear_scale_multiplier: f64,
}

impl Default for Base3dNoise {
    fn default() -> Self {
        let p = BlendedNoiseParams::default();
        Self {
            xz_scale: p.xz_scale,
            y_scale: p.y_scale,
            xz_factor: p.xz_factor,
            y_factor: p.y_factor,
            smear_scale_multiplier: p.smear_scale_multiplier,
        }
    }
}

impl From<Base3dNoise> for BlendedNoiseParams {
    fn from(b: Base3dNoise) -> Self {
        Self {
            xz_scale: b.xz_scale,
            y_scale: b.y_scale,
            xz_factor: b.xz_factor,
            y_factor: b.y_factor,
            smear_scale_multiplier: b.smear_scale_multiplier,
        }
    }
}

/// The vertical ramp that makes low positions solid and high positions air.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerticalGradient {
    pub from_y: i32,
    pub to_y: i32,
    pub from_value: f64,
    pub to_value: f64,
    /// Scales the whole ramp. `1.0` leaves it untouched.
    pub multiplier: f64,
}

impl Default for VerticalGradient {
    fn default() -> Self {
        Self {
            from_y: -64,
            to_y: 320,
            from_value: 1.5,
            to_value: -1.5,
            multiplier: 1.0,
        }
    }
}

/// Multipliers on individual operands of the terrain splines.
///
/// Each tweak touches only its own operand; a tweak of exactly `1.0` adds no
/// node to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainTweaks {
    /// Scales the jaggedness output.
    pub jaggedness: f64,
    /// Scales the erosion coordinate inside the factor spline.
    pub erosion_intensity: f64,
    /// Scales the spline term of the offset.
    pub height_variation: f64,
    /// Scales the ridge coordinate inside the offset and jaggedness splines.
    pub ridge_strength: f64,
    /// Scales the factor output.
    pub factor_scale: f64,
}

impl Default for TerrainTweaks {
    fn default() -> Self {
        Self {
            jaggedness: 1.0,
            erosion_intensity: 1.0,
            height_variation: 1.0,
            ridge_strength: 1.0,
            factor_scale: 1.0,
        }
    }
}

/// Constant terrain shape used instead of the spline tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatTerrain {
    pub offset: f64,
    pub factor: f64,
}

impl Default for FlatTerrain {
    fn default() -> Self {
        Self {
            offset: -0.5,
            factor: 4.0,
        }
    }
}

/// Vertical extent and host noise settings of a planet dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldDimensions {
    pub min_y: i32,
    pub height: i32,
    pub sea_level: i32,
    /// Horizontal noise cell size, in units of four blocks.
    pub size_horizontal: u8,
    /// Vertical noise cell size, in units of four blocks.
    pub size_vertical: u8,
    pub aquifers_enabled: bool,
    pub ore_veins_enabled: bool,
    pub default_fluid: String,
}

impl Default for WorldDimensions {
    fn default() -> Self {
        Self {
            min_y: -64,
            height: 384,
            sea_level: 63,
            size_horizontal: 1,
            size_vertical: 2,
            aquifers_enabled: false,
            ore_veins_enabled: true,
            default_fluid: "minecraft:air".into(),
        }
    }
}

impl WorldDimensions {
    /// Highest buildable Y, exclusive.
    pub fn max_y(&self) -> i32 {
        self.min_y + self.height
    }
}

/// Everything that shapes a planet's density graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetTerrainConfig {
    pub noise_scales: NoiseScales,
    pub jaggedness: JaggednessNoise,
    pub base_3d: Base3dNoise,
    pub vertical_gradient: VerticalGradient,
    /// Multiplier applied to sloped cheese before it is squashed.
    pub terrain_factor: f64,
    pub tweaks: TerrainTweaks,
    /// When set, the spline tables are replaced by constants.
    pub flat: Option<FlatTerrain>,
    pub dimensions: WorldDimensions,
}

impl Default for PlanetTerrainConfig {
    fn default() -> Self {
        Self {
            noise_scales: NoiseScales::default(),
            jaggedness: JaggednessNoise::default(),
            base_3d: Base3dNoise::default(),
            vertical_gradient: VerticalGradient::default(),
            terrain_factor: 4.0,
            tweaks: TerrainTweaks::default(),
            flat: None,
            dimensions: WorldDimensions::default(),
        }
    }
}

impl PlanetTerrainConfig {
    /// Checks every scalar, scale and dimension.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::Configuration`] naming the first bad field.
    pub fn validate(&self) -> Result<(), TerrainError> {
        let s = &self.noise_scales;
        check_positive("noise_scales.continental", s.continental)?;
        check_positive("noise_scales.erosion", s.erosion)?;
        check_positive("noise_scales.ridge", s.ridge)?;
        check_finite(
            "noise_scales.height_variation.continental",
            s.height_variation.continental,
        )?;
        check_finite("noise_scales.height_variation.erosion", s.height_variation.erosion)?;
        check_finite("noise_scales.height_variation.ridge", s.height_variation.ridge)?;

        check_positive("jaggedness.noise_scale", self.jaggedness.noise_scale)?;

        let b = &self.base_3d;
        check_positive("base_3d.xz_scale", b.xz_scale)?;
        check_positive("base_3d.y_scale", b.y_scale)?;
        check_positive("base_3d.xz_factor", b.xz_factor)?;
        check_positive("base_3d.y_factor", b.y_factor)?;
        check_positive("base_3d.smear_scale_multiplier", b.smear_scale_multiplier)?;

        let g = &self.vertical_gradient;
        if g.from_y >= g.to_y {
            return Err(TerrainError::config(
                "vertical_gradient",
                format!("from_y {} must be below to_y {}", g.from_y, g.to_y),
            ));
        }
        check_finite("vertical_gradient.from_value", g.from_value)?;
        check_finite("vertical_gradient.to_value", g.to_value)?;
        check_finite("vertical_gradient.multiplier", g.multiplier)?;

        check_positive("terrain_factor", self.terrain_factor)?;

        let t = &self.tweaks;
        check_finite("tweaks.jaggedness", t.jaggedness)?;
        check_finite("tweaks.erosion_intensity", t.erosion_intensity)?;
        check_finite("tweaks.height_variation", t.height_variation)?;
        check_finite("tweaks.ridge_strength", t.ridge_strength)?;
        check_finite("tweaks.factor_scale", t.factor_scale)?;

        if let Some(flat) = &self.flat {
            check_finite("flat.offset", flat.offset)?;
            check_positive("flat.factor", flat.factor)?;
        }

        let d = &self.dimensions;
        if d.height <= 0 || d.height % 16 != 0 {
            return Err(TerrainError::config(
                "dimensions.height",
                format!("{} must be a positive multiple of 16", d.height),
            ));
        }
        if d.min_y % 16 != 0 {
            return Err(TerrainError::config(
                "dimensions.min_y",
                format!("{} must be a multiple of 16", d.min_y),
            ));
        }
        for (field, size) in [
            ("dimensions.size_horizontal", d.size_horizontal),
            ("dimensions.size_vertical", d.size_vertical),
        ] {
            if !(1..=4).contains(&size) {
                return Err(TerrainError::config(field, format!("{size} is outside 1..=4")));
            }
        }
        Ok(())
    }
}
