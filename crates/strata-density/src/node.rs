//! The density expression node model.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::graph::SubgraphName;
use crate::ident::Identifier;
use crate::spline::{CubicSpline, SplineValue};

/// Shared handle to an immutable node.
pub type Density = Arc<DensityNode>;

/// A noise field lookup: which noise, and which salt perturbs its hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoiseSource {
    pub id: Identifier,
    pub salt: i32,
}

impl NoiseSource {
    pub fn new(id: Identifier, salt: i32) -> Self {
        Self { id, salt }
    }

    /// An unsalted source.
    pub fn plain(id: Identifier) -> Self {
        Self { id, salt: 0 }
    }
}

/// A reference to a named sub-graph in some namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubgraphRef {
    pub namespace: String,
    pub name: SubgraphName,
}

/// Single-argument operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Abs,
    Square,
    Clamp { min: f64, max: f64 },
    /// `c / 2 - c³ / 24` with `c = clamp(v, -1, 1)`.
    Squeeze,
    /// Halves negative values.
    HalfNegative,
    /// Quarters negative values.
    QuarterNegative,
    /// Memoized per column.
    Cache2D,
    // Host-side caching and interpolation hints. Identity when evaluated here.
    FlatCache,
    CacheOnce,
    Interpolated,
    BlendDensity,
}

impl UnaryOp {
    /// Applies the operator to an already evaluated argument.
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Self::Abs => v.abs(),
            Self::Square => v * v,
            Self::Clamp { min, max } => v.clamp(min, max),
            Self::Squeeze => {
                let c = v.clamp(-1.0, 1.0);
                c / 2.0 - c * c * c / 24.0
            }
            Self::HalfNegative => {
                if v > 0.0 {
                    v
                } else {
                    v * 0.5
                }
            }
            Self::QuarterNegative => {
                if v > 0.0 {
                    v
                } else {
                    v * 0.25
                }
            }
            Self::Cache2D
            | Self::FlatCache
            | Self::CacheOnce
            | Self::Interpolated
            | Self::BlendDensity => v,
        }
    }

    /// Host document type name, without namespace.
    pub fn name(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Square => "square",
            Self::Clamp { .. } => "clamp",
            Self::Squeeze => "squeeze",
            Self::HalfNegative => "half_negative",
            Self::QuarterNegative => "quarter_negative",
            Self::Cache2D => "cache_2d",
            Self::FlatCache => "flat_cache",
            Self::CacheOnce => "cache_once",
            Self::Interpolated => "interpolated",
            Self::BlendDensity => "blend_density",
        }
    }
}

/// Two-argument operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Mul,
    Min,
    Max,
}

impl BinaryOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Mul => lhs * rhs,
            Self::Min => lhs.min(rhs),
            Self::Max => lhs.max(rhs),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Mul => "mul",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

/// Parameters of the legacy blended 3D base noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendedNoiseParams {
    pub xz_scale: f64,
    pub y_scale: f64,
    pub xz_factor: f64,
    pub y_factor: f64,
    pub smear_scale_multiplier: f64,
}

impl Default for BlendedNoiseParams {
    fn default() -> Self {
        Self {
            xz_scale: 0.25,
            y_scale: 0.125,
            xz_factor: 80.0,
            y_factor: 160.0,
            smear_scale_multiplier: 8.0,
        }
    }
}

/// One node of a scalar expression graph over world coordinates.
///
/// Nodes are immutable and shared through [`Density`] handles. Build them with
/// the functions in [`crate::builder`], which reject non-finite parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum DensityNode {
    Constant(f64),
    Noise {
        source: NoiseSource,
        xz_scale: f64,
        y_scale: f64,
    },
    ShiftedNoise {
        source: NoiseSource,
        shift_x: Density,
        shift_y: Density,
        shift_z: Density,
        xz_scale: f64,
        y_scale: f64,
    },
    Unary {
        op: UnaryOp,
        arg: Density,
    },
    Binary {
        op: BinaryOp,
        lhs: Density,
        rhs: Density,
    },
    /// Linear ramp over world Y, clamped to the end values outside the range.
    YGradient {
        from_y: i32,
        to_y: i32,
        from_value: f64,
        to_value: f64,
    },
    /// `in_range` when `min <= input < max`, otherwise `out_of_range`.
    RangeChoice {
        input: Density,
        min: f64,
        max: f64,
        in_range: Density,
        out_of_range: Density,
    },
    NamedRef(SubgraphRef),
    Spline(Arc<CubicSpline>),
    BlendedNoise(BlendedNoiseParams),
}

impl DensityNode {
    /// Returns the constant value if this node is a constant.
    pub fn as_constant(&self) -> Option<f64> {
        match self {
            Self::Constant(v) => Some(*v),
            _ => None,
        }
    }

    /// Visits every distinct node reachable from `self`, including spline
    /// coordinates. Shared nodes are visited once.
    pub fn walk(&self, visit: &mut impl FnMut(&DensityNode)) {
        let mut seen = FxHashSet::default();
        let mut seen_splines = FxHashSet::default();
        walk_inner(self, visit, &mut seen, &mut seen_splines);
    }

    /// All named references reachable from this node.
    pub fn references(&self) -> Vec<SubgraphRef> {
        let mut refs = Vec::new();
        self.walk(&mut |node| {
            if let DensityNode::NamedRef(r) = node
                && !refs.contains(r)
            {
                refs.push(r.clone());
            }
        });
        refs
    }

    /// All noise sources sampled by this node, including blended noise.
    pub fn noise_sources(&self) -> Vec<NoiseSource> {
        let mut sources = Vec::new();
        self.walk(&mut |node| {
            let source = match node {
                DensityNode::Noise { source, .. } | DensityNode::ShiftedNoise { source, .. } => {
                    source.clone()
                }
                DensityNode::BlendedNoise(_) => crate::eval::blended_noise_source(),
                _ => return,
            };
            if !sources.contains(&source) {
                sources.push(source);
            }
        });
        sources
    }

    /// Counts distinct nodes reachable from this node.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}

fn walk_inner(
    node: &DensityNode,
    visit: &mut impl FnMut(&DensityNode),
    seen: &mut FxHashSet<*const DensityNode>,
    seen_splines: &mut FxHashSet<*const CubicSpline>,
) {
    if !seen.insert(node as *const DensityNode) {
        return;
    }
    visit(node);
    match node {
        DensityNode::Constant(_)
        | DensityNode::Noise { .. }
        | DensityNode::YGradient { .. }
        | DensityNode::NamedRef(_)
        | DensityNode::BlendedNoise(_) => {}
        DensityNode::ShiftedNoise {
            shift_x,
            shift_y,
            shift_z,
            ..
        } => {
            walk_inner(shift_x, visit, seen, seen_splines);
            walk_inner(shift_y, visit, seen, seen_splines);
            walk_inner(shift_z, visit, seen, seen_splines);
        }
        DensityNode::Unary { arg, .. } => walk_inner(arg, visit, seen, seen_splines),
        DensityNode::Binary { lhs, rhs, .. } => {
            walk_inner(lhs, visit, seen, seen_splines);
            walk_inner(rhs, visit, seen, seen_splines);
        }
        DensityNode::RangeChoice {
            input,
            in_range,
            out_of_range,
            ..
        } => {
            walk_inner(input, visit, seen, seen_splines);
            walk_inner(in_range, visit, seen, seen_splines);
            walk_inner(out_of_range, visit, seen, seen_splines);
        }
        DensityNode::Spline(spline) => walk_spline(spline, visit, seen, seen_splines),
    }
}

fn walk_spline(
    spline: &Arc<CubicSpline>,
    visit: &mut impl FnMut(&DensityNode),
    seen: &mut FxHashSet<*const DensityNode>,
    seen_splines: &mut FxHashSet<*const CubicSpline>,
) {
    if !seen_splines.insert(Arc::as_ptr(spline)) {
        return;
    }
    walk_inner(&spline.coordinate, visit, seen, seen_splines);
    for point in &spline.points {
        if let SplineValue::Spline(nested) = &point.value {
            walk_spline(nested, visit, seen, seen_splines);
        }
    }
}
