//! Reference evaluation of surface rules at a single position.
//!
//! The host applies surface rules itself. This evaluator follows the same
//! semantics so rule ordering can be checked without the host.

use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;
use strata_density::{Identifier, NoiseSource, NoiseTable};

use super::rule::{CaveSurface, SurfaceCondition, SurfaceRule};
use crate::block::BlockId;

/// The column state at one block position.
pub struct SurfaceContext<'a> {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// Blocks between this position and the top solid block of its run;
    /// `0` on the top block itself.
    pub stone_depth_above: i32,
    /// Blocks between this position and the bottom solid block of its run.
    pub stone_depth_below: i32,
    /// Local surface depth, usually a few blocks.
    pub surface_depth: i32,
    /// Secondary depth noise, mapped to `[0, 1]`.
    pub secondary_depth: f64,
    /// Y of the water surface above this column, if any.
    pub water_height: Option<i32>,
    /// Whether the position lies above the preliminary surface.
    pub above_preliminary_surface: bool,
    /// Seed for the positional randomness of vertical gradients.
    pub seed: u64,
    pub noise: &'a dyn NoiseTable,
}

fn no_noise(_: &NoiseSource, _: f64, _: f64, _: f64) -> f64 {
    0.0
}

impl SurfaceContext<'static> {
    /// A dry, near-surface position at the given stone depth.
    pub fn at_depth(y: i32, stone_depth_above: i32, surface_depth: i32) -> Self {
        Self {
            x: 0,
            y,
            z: 0,
            stone_depth_above,
            stone_depth_below: i32::MAX,
            surface_depth,
            secondary_depth: 0.0,
            water_height: None,
            above_preliminary_surface: true,
            seed: 0,
            noise: &no_noise,
        }
    }
}

impl SurfaceContext<'_> {
    /// Evaluates `condition` at this position.
    pub fn test(&self, condition: &SurfaceCondition) -> bool {
        match condition {
            SurfaceCondition::VerticalGradient {
                random_name,
                true_at_and_below,
                false_at_and_above,
            } => self.vertical_gradient(random_name, *true_at_and_below, *false_at_and_above),
            SurfaceCondition::AbovePreliminarySurface => self.above_preliminary_surface,
            SurfaceCondition::StoneDepth {
                offset,
                add_surface_depth,
                secondary_depth_range,
                surface_type,
            } => {
                let depth = match surface_type {
                    CaveSurface::Floor => self.stone_depth_above,
                    CaveSurface::Ceiling => self.stone_depth_below,
                };
                let surface = if *add_surface_depth { self.surface_depth } else { 0 };
                let secondary = (self.secondary_depth * f64::from(*secondary_depth_range)) as i32;
                depth <= offset + surface + secondary
            }
            SurfaceCondition::Water {
                offset,
                surface_depth_multiplier,
                add_stone_depth,
            } => match self.water_height {
                None => true,
                Some(water) => {
                    let stone = if *add_stone_depth { self.stone_depth_above } else { 0 };
                    self.y + stone >= water + offset + self.surface_depth * surface_depth_multiplier
                }
            },
            SurfaceCondition::YAbove {
                anchor,
                surface_depth_multiplier,
                add_stone_depth,
            } => {
                let stone = if *add_stone_depth { self.stone_depth_above } else { 0 };
                self.y + stone >= anchor + self.surface_depth * surface_depth_multiplier
            }
            SurfaceCondition::NoiseThreshold {
                noise,
                min_threshold,
                max_threshold,
            } => {
                let source = NoiseSource::plain(noise.clone());
                let v = self
                    .noise
                    .sample(&source, f64::from(self.x), 0.0, f64::from(self.z));
                v >= *min_threshold && v <= *max_threshold
            }
            SurfaceCondition::Not(inner) => !self.test(inner),
        }
    }

    fn vertical_gradient(&self, name: &Identifier, true_below: i32, false_above: i32) -> bool {
        if self.y <= true_below {
            return true;
        }
        if self.y >= false_above {
            return false;
        }
        let probability =
            f64::from(false_above - self.y) / f64::from(false_above - true_below);
        let mut rng = ChaCha8Rng::seed_from_u64(self.gradient_seed(name));
        rng.random::<f64>() < probability
    }

    /// Seed of the gradient roll at this position. Stable across builds.
    fn gradient_seed(&self, name: &Identifier) -> u64 {
        let mut hasher = FxHasher::default();
        self.seed.hash(&mut hasher);
        name.as_str().hash(&mut hasher);
        (self.x, self.y, self.z).hash(&mut hasher);
        hasher.finish()
    }

    /// The block `rule` places here, or `None` to keep the default material.
    pub fn apply<'r>(&self, rule: &'r SurfaceRule) -> Option<&'r BlockId> {
        match rule {
            SurfaceRule::Block(block) => Some(block),
            SurfaceRule::Sequence(rules) => rules.iter().find_map(|r| self.apply(r)),
            SurfaceRule::Condition { if_true, then_run } => {
                if self.test(if_true) {
                    self.apply(then_run)
                } else {
                    None
                }
            }
        }
    }
}
