//! Assembles a planet's named density sub-graphs.
//!
//! The climate noises are displaced by the planet's [`CoordinateShift`]; the
//! offset, factor and jaggedness shapes are copies of the reference spline
//! tables re-pointed at the planet's own climate sub-graphs.

use strata_density::builder::{
    add, blend_density, cache_2d, constant, flat_cache, half_negative, interpolated, lerp_from,
    max, min, mul, named, noise, quarter_negative, range_choice, scale, shifted_noise, spline,
    squeeze, y_gradient,
};
use strata_density::{
    CubicSpline, Density, DensityGraph, Identifier, NoiseSource, SubgraphName, SubgraphRef,
    rewrite_refs,
};

use crate::cave::{CaveConfig, CaveParts, compose_caves};
use crate::config::PlanetTerrainConfig;
use crate::error::TerrainError;
use crate::reference::{OFFSET_BIAS, reference_splines};
use crate::shift::{CoordinateShift, derive_salt};

/// Salt indices of the terrain noises.
const CONTINENTS_SALT: u32 = 0;
const EROSION_SALT: u32 = 1;
const JAGGED_SALT: u32 = 2;
const RIDGES_SALT: u32 = 3;

/// Sloped cheese below this value is used without cave carving.
const SURFACE_CUTOFF: f64 = 1.5625;

/// Builds every named sub-graph of a planet into `namespace`.
///
/// The returned graph is complete: all of [`SubgraphName::ALL`] are defined
/// and every reference resolves inside `namespace`.
///
/// # Errors
///
/// [`TerrainError::Configuration`] for invalid terrain or cave settings.
pub fn build_planet_density(
    config: &PlanetTerrainConfig,
    caves: &CaveConfig,
    shift: CoordinateShift,
    namespace: &str,
) -> Result<DensityGraph, TerrainError> {
    config.validate()?;
    let cave_parts = compose_caves(caves, &mut |i| derive_salt(namespace, "cave", i))?;

    let composer = Composer {
        config,
        shift,
        namespace,
    };
    let mut graph = DensityGraph::new(namespace);
    let scales = &config.noise_scales;
    let variation = &scales.height_variation;

    graph.define(
        SubgraphName::Continents,
        composer.climate("continentalness", CONTINENTS_SALT, scales.continental, variation.continental)?,
    )?;
    graph.define(
        SubgraphName::Erosion,
        composer.climate("erosion", EROSION_SALT, scales.erosion, variation.erosion)?,
    )?;
    graph.define(
        SubgraphName::Ridges,
        composer.climate("ridge", RIDGES_SALT, scales.ridge, variation.ridge)?,
    )?;

    let offset = composer.offset()?;
    graph.define(SubgraphName::Depth, composer.depth(offset.clone())?)?;
    graph.define(SubgraphName::Offset, offset)?;
    graph.define(SubgraphName::Factor, composer.factor()?)?;
    graph.define(SubgraphName::Jaggedness, composer.jaggedness()?)?;
    graph.define(SubgraphName::SlopedCheese, composer.sloped_cheese()?)?;
    graph.define(SubgraphName::FinalDensity, composer.final_density(cave_parts)?)?;

    tracing::debug!(
        namespace,
        shift_x = shift.shift_x,
        shift_z = shift.shift_z,
        flat = config.flat.is_some(),
        "built planet density graph"
    );
    Ok(graph)
}

struct Composer<'a> {
    config: &'a PlanetTerrainConfig,
    shift: CoordinateShift,
    namespace: &'a str,
}

impl Composer<'_> {
    fn named(&self, name: SubgraphName) -> Density {
        named(self.namespace, name)
    }

    /// `named(name) * k`, or the bare reference when `k` is 1.
    fn scaled_ref(&self, name: SubgraphName, k: f64) -> Result<Density, TerrainError> {
        let r = self.named(name);
        Ok(if k == 1.0 { r } else { scale(r, k)? })
    }

    // ---- Climate ----

    fn climate(
        &self,
        path: &str,
        salt_index: u32,
        frequency: f64,
        amplitude: f64,
    ) -> Result<Density, TerrainError> {
        let source = NoiseSource::new(
            Identifier::minecraft(path)?,
            self.shift.noise_salt(salt_index),
        );
        let node = flat_cache(shifted_noise(
            source,
            constant(f64::from(self.shift.shift_x))?,
            constant(0.0)?,
            constant(f64::from(self.shift.shift_z))?,
            0.25 * frequency,
            0.0,
        )?);
        Ok(if amplitude == 1.0 {
            node
        } else {
            scale(node, amplitude)?
        })
    }

    // ---- Shape splines ----

    /// Deep copy of a reference spline with its references re-pointed here.
    ///
    /// `erosion` and `ridges` multiply the matching coordinates.
    fn copy_spline(
        &self,
        reference: &std::sync::Arc<CubicSpline>,
        erosion: f64,
        ridges: f64,
    ) -> Result<Density, TerrainError> {
        let mut failure = None;
        let mut replace = |r: &SubgraphRef| {
            let k = match r.name {
                SubgraphName::Erosion => erosion,
                SubgraphName::Ridges => ridges,
                _ => 1.0,
            };
            match self.scaled_ref(r.name, k) {
                Ok(node) => Some(node),
                Err(err) => {
                    failure = Some(err);
                    None
                }
            }
        };
        let copy = rewrite_refs(&spline(std::sync::Arc::clone(reference)), &mut replace);
        match failure {
            Some(err) => Err(err),
            None => Ok(copy),
        }
    }

    fn offset(&self) -> Result<Density, TerrainError> {
        if let Some(flat) = &self.config.flat {
            return Ok(constant(flat.offset)?);
        }
        let tweaks = &self.config.tweaks;
        let reference = reference_splines()?;
        let mut term = self.copy_spline(&reference.offset, 1.0, tweaks.ridge_strength)?;
        if tweaks.height_variation != 1.0 {
            term = scale(term, tweaks.height_variation)?;
        }
        Ok(flat_cache(cache_2d(add(constant(OFFSET_BIAS)?, term))))
    }

    fn factor(&self) -> Result<Density, TerrainError> {
        if let Some(flat) = &self.config.flat {
            return Ok(constant(flat.factor)?);
        }
        let tweaks = &self.config.tweaks;
        let reference = reference_splines()?;
        let mut node = self.copy_spline(&reference.factor, tweaks.erosion_intensity, 1.0)?;
        if tweaks.factor_scale != 1.0 {
            node = scale(node, tweaks.factor_scale)?;
        }
        Ok(flat_cache(cache_2d(node)))
    }

    fn jaggedness(&self) -> Result<Density, TerrainError> {
        if self.config.flat.is_some() {
            return Ok(constant(0.0)?);
        }
        let tweaks = &self.config.tweaks;
        let reference = reference_splines()?;
        let mut node = self.copy_spline(&reference.jaggedness, 1.0, tweaks.ridge_strength)?;
        if tweaks.jaggedness != 1.0 {
            node = scale(node, tweaks.jaggedness)?;
        }
        Ok(flat_cache(cache_2d(node)))
    }

    // ---- Terrain body ----

    /// Vertical ramp plus the offset expression, shared with `offset`.
    fn depth(&self, offset: Density) -> Result<Density, TerrainError> {
        let g = &self.config.vertical_gradient;
        let mut ramp = y_gradient(g.from_y, g.to_y, g.from_value, g.to_value)?;
        if g.multiplier != 1.0 {
            ramp = scale(ramp, g.multiplier)?;
        }
        Ok(add(ramp, offset))
    }

    fn sloped_cheese(&self) -> Result<Density, TerrainError> {
        let jagged = noise(
            NoiseSource::new(
                Identifier::minecraft("jagged")?,
                self.shift.noise_salt(JAGGED_SALT),
            ),
            self.config.jaggedness.noise_scale,
            0.0,
        )?;
        let peaks = mul(self.named(SubgraphName::Jaggedness), half_negative(jagged));
        let shaped = mul(
            add(self.named(SubgraphName::Depth), peaks),
            self.named(SubgraphName::Factor),
        );
        let gradient = scale(quarter_negative(shaped), self.config.terrain_factor)?;
        let base = strata_density::builder::blended_noise(self.config.base_3d.into())?;
        Ok(add(gradient, base))
    }

    fn final_density(&self, caves: CaveParts) -> Result<Density, TerrainError> {
        let cheese = self.named(SubgraphName::SlopedCheese);
        let shaped = match caves.carve {
            Some(carve) => {
                let mut carved = min(cheese.clone(), carve);
                if let Some(pillars) = caves.pillars {
                    carved = max(carved, pillars);
                }
                range_choice(cheese.clone(), -1_000_000.0, SURFACE_CUTOFF, cheese, carved)?
            }
            None => cheese,
        };
        let processed = squeeze(scale(
            interpolated(blend_density(self.slide(shaped)?)),
            0.64,
        )?);
        Ok(match caves.noodle {
            Some(noodle) => min(processed, noodle),
            None => processed,
        })
    }

    /// Fades density towards air at the top of the world and towards solid
    /// at the bottom.
    fn slide(&self, density: Density) -> Result<Density, TerrainError> {
        let d = &self.config.dimensions;
        let top = y_gradient(d.max_y() - 80, d.max_y() - 64, 1.0, 0.0)?;
        let density = lerp_from(top, -0.078125, density)?;
        let bottom = y_gradient(d.min_y, d.min_y + 24, 0.0, 1.0)?;
        Ok(lerp_from(bottom, 0.1171875, density)?)
    }
}

#[cfg(test)]
mod tests {
    use strata_density::{DensityContext, DensityEvaluator, DensityNode, SimplexNoiseTable};

    use super::*;
    use crate::cave::CaveTypes;
    use crate::config::{FlatTerrain, TerrainTweaks};

    fn moon() -> DensityGraph {
        build_planet_density(
            &PlanetTerrainConfig::default(),
            &CaveConfig::default(),
            CoordinateShift::derive("moon"),
            "moon",
        )
        .unwrap()
    }

    #[test]
    fn test_graph_is_complete_and_local() {
        let graph = moon();
        assert!(graph.is_complete());
        assert!(graph.validate().is_ok());
        for (name, node) in graph.iter() {
            for r in node.references() {
                assert_eq!(r.namespace, "moon", "{name} references {}:{}", r.namespace, r.name);
                assert!(r.name < name, "{name} references later {}", r.name);
            }
        }
    }

    #[test]
    fn test_climate_noises_use_planet_shift_and_salts() {
        let graph = moon();
        let shift = CoordinateShift::derive("moon");
        let continents = graph.get(SubgraphName::Continents).unwrap();
        let DensityNode::Unary { arg, .. } = &**continents else {
            panic!("continents should be flat-cached");
        };
        let DensityNode::ShiftedNoise {
            source,
            shift_x,
            shift_z,
            xz_scale,
            ..
        } = &**arg
        else {
            panic!("continents should be a shifted noise");
        };
        assert_eq!(source.salt, shift.noise_salt(0));
        assert_eq!(shift_x.as_constant(), Some(f64::from(shift.shift_x)));
        assert_eq!(shift_z.as_constant(), Some(f64::from(shift.shift_z)));
        assert_eq!(*xz_scale, 0.25);
    }

    #[test]
    fn test_planets_share_no_nodes() {
        let moon = moon();
        let mars = build_planet_density(
            &PlanetTerrainConfig::default(),
            &CaveConfig::default(),
            CoordinateShift::derive("mars"),
            "mars",
        )
        .unwrap();
        let a = moon.get(SubgraphName::Offset).unwrap();
        let b = mars.get(SubgraphName::Offset).unwrap();
        assert!(!std::sync::Arc::ptr_eq(a, b));
        assert!(b.references().iter().all(|r| r.namespace == "mars"));
    }

    #[test]
    fn test_unit_tweaks_add_no_nodes() {
        let plain = moon();
        let tweaked = build_planet_density(
            &PlanetTerrainConfig {
                tweaks: TerrainTweaks {
                    factor_scale: 1.5,
                    ..Default::default()
                },
                ..Default::default()
            },
            &CaveConfig::default(),
            CoordinateShift::derive("moon"),
            "moon",
        )
        .unwrap();
        let count = |g: &DensityGraph, name| g.get(name).unwrap().node_count();
        assert_eq!(
            count(&plain, SubgraphName::Offset),
            count(&tweaked, SubgraphName::Offset),
            "factor_scale must not touch offset"
        );
        assert_eq!(
            count(&plain, SubgraphName::Factor) + 2,
            count(&tweaked, SubgraphName::Factor),
            "factor_scale adds one multiply and one constant"
        );
    }

    #[test]
    fn test_flat_terrain_uses_constants() {
        let graph = build_planet_density(
            &PlanetTerrainConfig {
                flat: Some(FlatTerrain::default()),
                ..Default::default()
            },
            &CaveConfig::default(),
            CoordinateShift::ZERO,
            "flatland",
        )
        .unwrap();
        assert_eq!(graph.get(SubgraphName::Offset).unwrap().as_constant(), Some(-0.5));
        assert_eq!(graph.get(SubgraphName::Factor).unwrap().as_constant(), Some(4.0));
        assert_eq!(graph.get(SubgraphName::Jaggedness).unwrap().as_constant(), Some(0.0));
    }

    #[test]
    fn test_depth_embeds_offset() {
        let graph = moon();
        let offset = graph.get(SubgraphName::Offset).unwrap();
        let DensityNode::Binary { rhs, .. } = &**graph.get(SubgraphName::Depth).unwrap() else {
            panic!("depth should be a sum");
        };
        assert!(std::sync::Arc::ptr_eq(rhs, offset));
    }

    #[test]
    fn test_final_density_bounds() {
        let graph = build_planet_density(
            &PlanetTerrainConfig::default(),
            &CaveConfig {
                enabled: CaveTypes {
                    noodle: false,
                    ..Default::default()
                },
                ..Default::default()
            },
            CoordinateShift::derive("moon"),
            "moon",
        )
        .unwrap();
        let table = SimplexNoiseTable::for_graph(11, &graph);
        let eval = DensityEvaluator::new(&graph, &table);
        for (x, z) in [(0, 0), (200, -300), (-4000, 1234)] {
            for y in [-64, 0, 64, 200, 319] {
                let v = eval
                    .evaluate_named(SubgraphName::FinalDensity, DensityContext::new(x, y, z))
                    .unwrap();
                // squeeze(0.64 * v) is bounded by squeeze(±1).
                assert!(v.abs() <= 0.5 - 1.0 / 24.0 + 1e-9, "({x},{y},{z}) -> {v}");
            }
        }
    }

    #[test]
    fn test_top_of_world_is_air() {
        let graph = moon();
        let table = SimplexNoiseTable::for_graph(5, &graph);
        let eval = DensityEvaluator::new(&graph, &table);
        let v = eval
            .evaluate_named(SubgraphName::FinalDensity, DensityContext::new(10, 319, 10))
            .unwrap();
        assert!(v < 0.0, "top slide forces air, got {v}");
    }
}
