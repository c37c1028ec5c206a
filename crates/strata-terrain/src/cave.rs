//! Cave carving sub-graphs.
//!
//! Three independent cave systems each produce a density that goes negative
//! where they carve. One `frequency` knob lowers all three thresholds at once;
//! the systems are combined with `min`, so a position is air when any of them
//! carves it.

use serde::{Deserialize, Serialize};
use strata_density::builder::{
    abs, add, cache_once, clamp, constant, min, mul, noise, range_choice, scale, y_gradient,
};
use strata_density::{Density, Identifier, NoiseSource};

use crate::error::{TerrainError, check_range};

/// Density returned where no cave may carve. Always solid.
pub const NO_CAVE: f64 = 64.0;

/// `base + (1 - frequency) * spread` per cave system.
const CHEESE_THRESHOLD: (f64, f64) = (0.27, 0.7);
const SPAGHETTI_THRESHOLD: (f64, f64) = (-0.05, 0.15);
const NOODLE_THRESHOLD: (f64, f64) = (-0.075, 0.15);

/// Noise scales at cave size 1.0 and `y_scale` 0.5.
const CHEESE_Y_SCALE: f64 = 2.0 / 3.0;
const SPAGHETTI_Y_SCALE: f64 = 2.0;
const NOODLE_XZ_SCALE: f64 = 8.0 / 3.0;
const NOODLE_Y_SCALE: f64 = 16.0 / 3.0;

/// Bounds of the identity Y ramp used for band checks.
const Y_IDENTITY: i32 = 4064;

/// Which cave systems a planet uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveTypes {
    /// Large open caverns.
    pub cheese: bool,
    /// Long winding tunnels.
    pub spaghetti: bool,
    /// Thin, twisting passages.
    pub noodle: bool,
}

impl Default for CaveTypes {
    fn default() -> Self {
        Self {
            cheese: true,
            spaghetti: true,
            noodle: true,
        }
    }
}

impl CaveTypes {
    pub fn any(&self) -> bool {
        self.cheese || self.spaghetti || self.noodle
    }
}

/// Cave carving configuration for one planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveConfig {
    /// How much carving happens. `0.0` disables caves, `1.0` is the reference
    /// amount, `2.0` is the maximum. Range: \[0.0, 2.0\].
    pub frequency: f64,
    /// Cave size. Larger values stretch the cave noises. Range: \[0.5, 3.0\].
    pub size: f64,
    /// Vertical stretch of every cave noise; `0.5` is the reference. Range: \[0.1, 2.0\].
    pub y_scale: f64,
    pub enabled: CaveTypes,
    /// Lowest Y where caves may carve, inclusive.
    pub min_y: i32,
    /// Highest Y where caves may carve, inclusive.
    pub max_y: i32,
}

impl Default for CaveConfig {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            size: 1.0,
            y_scale: 0.5,
            enabled: CaveTypes::default(),
            min_y: -64,
            max_y: 256,
        }
    }
}

impl CaveConfig {
    /// Checks ranges. Out-of-range values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), TerrainError> {
        check_range("caves.frequency", self.frequency, 0.0, 2.0)?;
        check_range("caves.size", self.size, 0.5, 3.0)?;
        check_range("caves.y_scale", self.y_scale, 0.1, 2.0)?;
        if self.min_y >= self.max_y {
            return Err(TerrainError::config(
                "caves.min_y",
                format!("{} must be below max_y {}", self.min_y, self.max_y),
            ));
        }
        Ok(())
    }

    /// `true` when the configuration carves nothing.
    pub fn is_disabled(&self) -> bool {
        self.frequency == 0.0 || !self.enabled.any()
    }
}

/// Threshold for one cave system at a given frequency.
pub fn cave_threshold(base: f64, spread: f64, frequency: f64) -> f64 {
    base + (1.0 - frequency) * spread
}

/// Cave parts as the terrain composer consumes them.
#[derive(Debug, Clone)]
pub struct CaveParts {
    /// Cheese and spaghetti, band-restricted. `None` when neither carves.
    pub carve: Option<Density>,
    /// Noodles, band-restricted. `None` when noodles are off.
    pub noodle: Option<Density>,
    /// Cavern pillars, present with cheese caves.
    pub pillars: Option<Density>,
}

/// Builds the combined carve sub-graph with unsalted noises.
///
/// Returns the constant [`NO_CAVE`] when `frequency` is zero or every cave
/// system is disabled.
///
/// # Errors
///
/// [`TerrainError::Configuration`] for out-of-range settings.
pub fn build_cave_subgraph(config: &CaveConfig) -> Result<Density, TerrainError> {
    let parts = compose_caves(config, &mut |_| 0)?;
    let combined = match (parts.carve, parts.noodle) {
        (Some(carve), Some(noodle)) => min(carve, noodle),
        (Some(part), None) | (None, Some(part)) => part,
        (None, None) => constant(NO_CAVE)?,
    };
    Ok(combined)
}

/// Builds the cave parts, salting the `i`-th cave noise with `salt(i)`.
pub fn compose_caves(
    config: &CaveConfig,
    salt: &mut impl FnMut(u32) -> i32,
) -> Result<CaveParts, TerrainError> {
    config.validate()?;
    if config.is_disabled() {
        tracing::debug!(frequency = config.frequency, "caves disabled");
        return Ok(CaveParts {
            carve: None,
            noodle: None,
            pillars: None,
        });
    }

    let mut source = |path: &str, index: u32| -> Result<NoiseSource, TerrainError> {
        Ok(NoiseSource::new(Identifier::minecraft(path)?, salt(index)))
    };
    let f = config.frequency;
    let size = config.size;
    let stretch = config.y_scale / 0.5;
    let enabled = config.enabled;

    let cheese = if enabled.cheese {
        let thr = cave_threshold(CHEESE_THRESHOLD.0, CHEESE_THRESHOLD.1, f);
        let n = noise(source("cave_cheese", 0)?, 1.0 / size, CHEESE_Y_SCALE / size * stretch)?;
        Some(clamp(add(constant(thr)?, n), -1.0, 1.0)?)
    } else {
        None
    };

    let spaghetti = if enabled.spaghetti {
        let thr = cave_threshold(SPAGHETTI_THRESHOLD.0, SPAGHETTI_THRESHOLD.1, f);
        let (xz, y) = (1.0 / size, SPAGHETTI_Y_SCALE / size * stretch);
        let tunnel = noise(source("spaghetti_2d", 1)?, xz, y)?;
        let roughness = noise(source("spaghetti_roughness", 2)?, xz, y)?;
        Some(add(add(constant(thr)?, tunnel), roughness))
    } else {
        None
    };

    let noodle = if enabled.noodle {
        let thr = cave_threshold(NOODLE_THRESHOLD.0, NOODLE_THRESHOLD.1, f);
        let n = noise(
            source("noodle", 3)?,
            NOODLE_XZ_SCALE / size,
            NOODLE_Y_SCALE / size * stretch,
        )?;
        Some(restrict_to_band(
            add(constant(thr)?, scale(abs(n), 1.5)?),
            config,
        )?)
    } else {
        None
    };

    let pillars = if enabled.cheese {
        Some(pillars(&mut source)?)
    } else {
        None
    };

    let carve = match (cheese, spaghetti) {
        (Some(a), Some(b)) => Some(min(a, b)),
        (Some(part), None) | (None, Some(part)) => Some(part),
        (None, None) => None,
    };
    let carve = carve.map(|c| restrict_to_band(c, config)).transpose()?;

    tracing::debug!(
        frequency = f,
        size,
        cheese = enabled.cheese,
        spaghetti = enabled.spaghetti,
        noodle = enabled.noodle,
        "composed caves"
    );
    Ok(CaveParts {
        carve,
        noodle,
        pillars,
    })
}

/// `carve` between `min_y` and `max_y` inclusive, [`NO_CAVE`] elsewhere.
fn restrict_to_band(carve: Density, config: &CaveConfig) -> Result<Density, TerrainError> {
    let y = y_gradient(
        -Y_IDENTITY,
        Y_IDENTITY,
        f64::from(-Y_IDENTITY),
        f64::from(Y_IDENTITY),
    )?;
    Ok(range_choice(
        y,
        f64::from(config.min_y),
        f64::from(config.max_y) + 1.0,
        carve,
        constant(NO_CAVE)?,
    )?)
}

/// Stone columns left standing inside caverns; `-1e6` where there is none.
fn pillars(
    source: &mut impl FnMut(&str, u32) -> Result<NoiseSource, TerrainError>,
) -> Result<Density, TerrainError> {
    let pillar = noise(source("pillar", 4)?, 25.0, 0.3)?;
    let rareness = mapped(noise(source("pillar_rareness", 5)?, 1.0, 1.0)?, 0.0, -2.0)?;
    let thickness = mapped(noise(source("pillar_thickness", 6)?, 1.0, 1.0)?, 0.0, 1.1)?;
    let cubed = mul(thickness.clone(), mul(thickness.clone(), thickness));
    let body = cache_once(mul(add(scale(pillar, 2.0)?, rareness), cubed));
    Ok(range_choice(
        body.clone(),
        -1_000_000.0,
        0.03,
        constant(-1_000_000.0)?,
        body,
    )?)
}

/// Maps a noise in `[-1, 1]` linearly onto `[from, to]`.
fn mapped(n: Density, from: f64, to: f64) -> Result<Density, TerrainError> {
    let half = (to - from) / 2.0;
    Ok(add(scale(n, half)?, constant(from + half)?))
}
