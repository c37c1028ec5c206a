//! Reference interpreter for density graphs.
//!
//! The host engine evaluates graphs itself; this interpreter exists so graphs
//! can be sampled in tests, benchmarks and previews with exactly the semantics
//! the host documents describe.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::graph::{DensityGraph, SubgraphName};
use crate::ident::Identifier;
use crate::node::{DensityNode, NoiseSource, UnaryOp};
use crate::noise_table::NoiseTable;
use crate::spline::{CubicSpline, SplineValue, interpolate};

/// Block position at which a graph is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DensityContext {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl DensityContext {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Column-local memo for `Cache2D` and `FlatCache` nodes.
///
/// Owned by one caller at a time; never shared between threads. Keys are the
/// node's address plus the column, so one cache can serve a whole chunk.
#[derive(Debug, Default)]
pub struct EvalCache {
    columns: FxHashMap<(usize, i32, i32), f64>,
}

impl EvalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Noise id sampled by [`DensityNode::BlendedNoise`] leaves.
pub(crate) fn blended_noise_source() -> NoiseSource {
    NoiseSource::plain(Identifier::new_unchecked("minecraft", "blended"))
}

/// Evaluates density nodes against an injected noise table.
///
/// Named references resolve through the optional graph. A reference that
/// cannot be resolved evaluates to `0.0`; graphs built through
/// [`DensityGraph::define`] never contain one.
pub struct DensityEvaluator<'a, N: ?Sized> {
    graph: Option<&'a DensityGraph>,
    noise: &'a N,
}

impl<'a, N: NoiseTable + ?Sized> DensityEvaluator<'a, N> {
    pub fn new(graph: &'a DensityGraph, noise: &'a N) -> Self {
        Self {
            graph: Some(graph),
            noise,
        }
    }

    /// An evaluator for self-contained nodes with no named references.
    pub fn standalone(noise: &'a N) -> Self {
        Self { graph: None, noise }
    }

    /// Evaluates `node` with a fresh cache.
    pub fn evaluate(&self, node: &DensityNode, ctx: DensityContext) -> f64 {
        let mut cache = EvalCache::new();
        self.evaluate_cached(node, ctx, &mut cache)
    }

    /// Evaluates a named sub-graph of the attached graph.
    pub fn evaluate_named(&self, name: SubgraphName, ctx: DensityContext) -> Option<f64> {
        let node = self.graph?.get(name)?;
        Some(self.evaluate(node, ctx))
    }

    pub fn evaluate_cached(
        &self,
        node: &DensityNode,
        ctx: DensityContext,
        cache: &mut EvalCache,
    ) -> f64 {
        match node {
            DensityNode::Constant(v) => *v,
            DensityNode::Noise {
                source,
                xz_scale,
                y_scale,
            } => self.noise.sample(
                source,
                f64::from(ctx.x) * xz_scale,
                f64::from(ctx.y) * y_scale,
                f64::from(ctx.z) * xz_scale,
            ),
            DensityNode::ShiftedNoise {
                source,
                shift_x,
                shift_y,
                shift_z,
                xz_scale,
                y_scale,
            } => {
                let dx = self.evaluate_cached(shift_x, ctx, cache);
                let dy = self.evaluate_cached(shift_y, ctx, cache);
                let dz = self.evaluate_cached(shift_z, ctx, cache);
                self.noise.sample(
                    source,
                    f64::from(ctx.x) * xz_scale + dx,
                    f64::from(ctx.y) * y_scale + dy,
                    f64::from(ctx.z) * xz_scale + dz,
                )
            }
            DensityNode::Unary {
                op: UnaryOp::Cache2D | UnaryOp::FlatCache,
                arg,
            } => {
                let key = (Arc::as_ptr(arg) as usize, ctx.x, ctx.z);
                if let Some(&v) = cache.columns.get(&key) {
                    return v;
                }
                let v = self.evaluate_cached(arg, ctx, cache);
                cache.columns.insert(key, v);
                v
            }
            DensityNode::Unary { op, arg } => op.apply(self.evaluate_cached(arg, ctx, cache)),
            DensityNode::Binary { op, lhs, rhs } => {
                let l = self.evaluate_cached(lhs, ctx, cache);
                let r = self.evaluate_cached(rhs, ctx, cache);
                op.apply(l, r)
            }
            DensityNode::YGradient {
                from_y,
                to_y,
                from_value,
                to_value,
            } => map_clamped(
                f64::from(ctx.y),
                f64::from(*from_y),
                f64::from(*to_y),
                *from_value,
                *to_value,
            ),
            DensityNode::RangeChoice {
                input,
                min,
                max,
                in_range,
                out_of_range,
            } => {
                let v = self.evaluate_cached(input, ctx, cache);
                if v >= *min && v < *max {
                    self.evaluate_cached(in_range, ctx, cache)
                } else {
                    self.evaluate_cached(out_of_range, ctx, cache)
                }
            }
            DensityNode::NamedRef(r) => match self.graph.and_then(|g| g.resolve(r)) {
                Some(target) => self.evaluate_cached(target, ctx, cache),
                None => 0.0,
            },
            DensityNode::Spline(spline) => f64::from(self.spline(spline, ctx, cache)),
            DensityNode::BlendedNoise(p) => {
                let xz = p.xz_scale / p.xz_factor;
                let y = p.y_scale / p.y_factor;
                self.noise.sample(
                    &blended_noise_source(),
                    f64::from(ctx.x) * xz,
                    f64::from(ctx.y) * y,
                    f64::from(ctx.z) * xz,
                )
            }
        }
    }

    fn spline(&self, spline: &CubicSpline, ctx: DensityContext, cache: &mut EvalCache) -> f32 {
        let input = self.evaluate_cached(&spline.coordinate, ctx, cache) as f32;
        let start = spline.interval_start(input);
        interpolate(&spline.points, start, input, &mut |value| match value {
            SplineValue::Constant(v) => *v,
            SplineValue::Spline(nested) => self.spline(nested, ctx, cache),
        })
    }
}

/// Maps `v` from `[from, to]` onto `[from_value, to_value]`, clamping outside.
fn map_clamped(v: f64, from: f64, to: f64, from_value: f64, to_value: f64) -> f64 {
    let t = ((v - from) / (to - from)).clamp(0.0, 1.0);
    from_value + t * (to_value - from_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{
        add, cache_2d, clamp, constant, named, noise, range_choice, spline, y_gradient,
    };
    use crate::node::NoiseSource;
    use crate::spline::SplineBuilder;
    use std::cell::Cell;

    fn flat_noise(value: f64) -> impl Fn(&NoiseSource, f64, f64, f64) -> f64 {
        move |_, _, _, _| value
    }

    #[test]
    fn test_gradient_clamps_outside_range() {
        let table = flat_noise(0.0);
        let eval = DensityEvaluator::standalone(&table);
        let gradient = y_gradient(-64, 320, 1.5, -1.5).unwrap();
        assert_eq!(eval.evaluate(&gradient, DensityContext::new(0, -100, 0)), 1.5);
        assert_eq!(eval.evaluate(&gradient, DensityContext::new(0, 400, 0)), -1.5);
        let mid = eval.evaluate(&gradient, DensityContext::new(0, 128, 0));
        assert!(mid.abs() < 1e-12, "midpoint of symmetric gradient is 0, got {mid}");
    }

    #[test]
    fn test_range_choice_is_half_open() {
        let table = flat_noise(0.0);
        let eval = DensityEvaluator::standalone(&table);
        let choose = |v: f64| {
            range_choice(
                constant(v).unwrap(),
                0.0,
                1.0,
                constant(10.0).unwrap(),
                constant(20.0).unwrap(),
            )
            .unwrap()
        };
        let ctx = DensityContext::new(0, 0, 0);
        assert_eq!(eval.evaluate(&choose(0.0), ctx), 10.0);
        assert_eq!(eval.evaluate(&choose(0.999), ctx), 10.0);
        assert_eq!(eval.evaluate(&choose(1.0), ctx), 20.0);
        assert_eq!(eval.evaluate(&choose(-0.1), ctx), 20.0);
    }

    #[test]
    fn test_noise_coordinates_are_scaled() {
        let table = |_: &NoiseSource, x: f64, y: f64, z: f64| x + 10.0 * y + 100.0 * z;
        let eval = DensityEvaluator::standalone(&table);
        let source = NoiseSource::plain(Identifier::minecraft("jagged").unwrap());
        let node = noise(source, 0.5, 2.0).unwrap();
        let v = eval.evaluate(&node, DensityContext::new(4, 1, 2));
        assert_eq!(v, 2.0 + 20.0 + 100.0);
    }

    #[test]
    fn test_named_ref_resolves_through_graph() {
        let table = flat_noise(0.0);
        let mut graph = DensityGraph::new("moon");
        graph
            .define(SubgraphName::Continents, constant(0.25).unwrap())
            .unwrap();
        graph
            .define(
                SubgraphName::Erosion,
                add(named("moon", SubgraphName::Continents), constant(1.0).unwrap()),
            )
            .unwrap();
        let eval = DensityEvaluator::new(&graph, &table);
        let ctx = DensityContext::new(0, 0, 0);
        assert_eq!(eval.evaluate_named(SubgraphName::Erosion, ctx), Some(1.25));
        assert_eq!(eval.evaluate_named(SubgraphName::Ridges, ctx), None);
    }

    #[test]
    fn test_cache_2d_samples_each_column_once() {
        let calls = Cell::new(0);
        let table = |_: &NoiseSource, _: f64, _: f64, _: f64| {
            calls.set(calls.get() + 1);
            0.5
        };
        let eval = DensityEvaluator::standalone(&table);
        let source = NoiseSource::plain(Identifier::minecraft("continentalness").unwrap());
        let node = cache_2d(noise(source, 0.25, 0.0).unwrap());
        let mut cache = EvalCache::new();
        for y in -64..64 {
            eval.evaluate_cached(&node, DensityContext::new(3, y, 7), &mut cache);
        }
        assert_eq!(calls.get(), 1, "one column should sample once");
        eval.evaluate_cached(&node, DensityContext::new(4, 0, 7), &mut cache);
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_spline_follows_coordinate() {
        let table = flat_noise(0.0);
        let eval = DensityEvaluator::standalone(&table);
        let coordinate = clamp(y_gradient(0, 10, 0.0, 1.0).unwrap(), 0.0, 1.0).unwrap();
        let s = SplineBuilder::new(coordinate)
            .point(0.0, 2.0)
            .point(1.0, 4.0)
            .build()
            .unwrap();
        let node = spline(s);
        assert_eq!(eval.evaluate(&node, DensityContext::new(0, 0, 0)), 2.0);
        assert_eq!(eval.evaluate(&node, DensityContext::new(0, 10, 0)), 4.0);
    }

    #[test]
    fn test_evaluation_identical_across_threads() {
        let source = NoiseSource::new(Identifier::minecraft("erosion").unwrap(), 1000);
        let mut table = crate::SimplexNoiseTable::new(7);
        table.register(&source);
        let node = noise(source, 0.25, 0.0).unwrap();
        let eval = DensityEvaluator::standalone(&table);
        let expected: Vec<f64> = (0..64)
            .map(|i| eval.evaluate(&node, DensityContext::new(i * 13, 0, -i * 7)))
            .collect();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let eval = DensityEvaluator::standalone(&table);
                    for (i, want) in expected.iter().enumerate() {
                        let i = i as i32;
                        let got = eval.evaluate(&node, DensityContext::new(i * 13, 0, -i * 7));
                        assert_eq!(got, *want, "thread result differs at index {i}");
                    }
                });
            }
        });
    }
}
