//! Named sub-graphs, their fixed dependency order, and reference rewriting.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::node::{Density, DensityNode, SubgraphRef};
use crate::spline::{CubicSpline, SplinePoint, SplineValue};
use crate::DensityError;

/// Names of the terrain sub-graphs, declared in dependency order.
///
/// A sub-graph may only reference names that come strictly before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubgraphName {
    Continents,
    Erosion,
    Ridges,
    Depth,
    Offset,
    Factor,
    Jaggedness,
    SlopedCheese,
    FinalDensity,
}

impl SubgraphName {
    /// Every name, in dependency order.
    pub const ALL: [SubgraphName; 9] = [
        Self::Continents,
        Self::Erosion,
        Self::Ridges,
        Self::Depth,
        Self::Offset,
        Self::Factor,
        Self::Jaggedness,
        Self::SlopedCheese,
        Self::FinalDensity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Continents => "continents",
            Self::Erosion => "erosion",
            Self::Ridges => "ridges",
            Self::Depth => "depth",
            Self::Offset => "offset",
            Self::Factor => "factor",
            Self::Jaggedness => "jaggedness",
            Self::SlopedCheese => "sloped_cheese",
            Self::FinalDensity => "final_density",
        }
    }
}

impl fmt::Display for SubgraphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubgraphName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown sub-graph name: {s}"))
    }
}

/// The named sub-graphs of one namespace (one planet).
///
/// Definitions are checked as they are added, so a graph held by a caller
/// never contains a reference to something undefined.
#[derive(Debug, Clone)]
pub struct DensityGraph {
    namespace: String,
    subgraphs: BTreeMap<SubgraphName, Density>,
}

impl DensityGraph {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            subgraphs: BTreeMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Adds a named sub-graph.
    ///
    /// # Errors
    ///
    /// - [`DensityError::DuplicateDefinition`] if `name` is already defined.
    /// - [`DensityError::OutOfOrder`] if a later name is already defined.
    /// - [`DensityError::UnresolvedReference`] if `node` references a foreign
    ///   namespace or a name that is not defined strictly earlier.
    pub fn define(&mut self, name: SubgraphName, node: Density) -> Result<(), DensityError> {
        if self.subgraphs.contains_key(&name) {
            return Err(DensityError::DuplicateDefinition(name));
        }
        if let Some((&after, _)) = self.subgraphs.last_key_value()
            && after > name
        {
            return Err(DensityError::OutOfOrder { name, after });
        }
        self.check_references(name, &node)?;
        tracing::trace!(namespace = %self.namespace, %name, nodes = node.node_count(), "defined sub-graph");
        self.subgraphs.insert(name, node);
        Ok(())
    }

    fn check_references(&self, name: SubgraphName, node: &DensityNode) -> Result<(), DensityError> {
        for r in node.references() {
            let resolvable =
                r.namespace == self.namespace && r.name < name && self.subgraphs.contains_key(&r.name);
            if !resolvable {
                return Err(DensityError::UnresolvedReference {
                    namespace: r.namespace,
                    name: r.name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Re-checks every definition; useful after deserializing or merging.
    pub fn validate(&self) -> Result<(), DensityError> {
        for (&name, node) in &self.subgraphs {
            self.check_references(name, node)?;
        }
        Ok(())
    }

    pub fn get(&self, name: SubgraphName) -> Option<&Density> {
        self.subgraphs.get(&name)
    }

    /// Looks up the target of a reference; foreign namespaces never resolve.
    pub fn resolve(&self, r: &SubgraphRef) -> Option<&Density> {
        if r.namespace != self.namespace {
            return None;
        }
        self.subgraphs.get(&r.name)
    }

    /// Sub-graphs in dependency order.
    pub fn iter(&self) -> impl Iterator<Item = (SubgraphName, &Density)> {
        self.subgraphs.iter().map(|(&name, node)| (name, node))
    }

    /// `true` when all names in [`SubgraphName::ALL`] are defined.
    pub fn is_complete(&self) -> bool {
        self.subgraphs.len() == SubgraphName::ALL.len()
    }

    pub fn len(&self) -> usize {
        self.subgraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subgraphs.is_empty()
    }
}

/// Deep-copies `node`, replacing every named reference for which `replace`
/// returns a node. References it leaves alone are copied as-is.
///
/// The copy shares no `Arc` with the input, while nodes shared inside the
/// input stay shared inside the copy.
pub fn rewrite_refs(
    node: &Density,
    replace: &mut impl FnMut(&SubgraphRef) -> Option<Density>,
) -> Density {
    let mut rewriter = Rewriter {
        replace,
        nodes: FxHashMap::default(),
        splines: FxHashMap::default(),
    };
    rewriter.node(node)
}

struct Rewriter<'f, F> {
    replace: &'f mut F,
    nodes: FxHashMap<*const DensityNode, Density>,
    splines: FxHashMap<*const CubicSpline, Arc<CubicSpline>>,
}

impl<F: FnMut(&SubgraphRef) -> Option<Density>> Rewriter<'_, F> {
    fn node(&mut self, node: &Density) -> Density {
        let key = Arc::as_ptr(node);
        if let Some(done) = self.nodes.get(&key) {
            return Arc::clone(done);
        }
        let copied = match &**node {
            DensityNode::NamedRef(r) => match (self.replace)(r) {
                Some(replacement) => replacement,
                None => Arc::new(DensityNode::NamedRef(r.clone())),
            },
            DensityNode::ShiftedNoise {
                source,
                shift_x,
                shift_y,
                shift_z,
                xz_scale,
                y_scale,
            } => Arc::new(DensityNode::ShiftedNoise {
                source: source.clone(),
                shift_x: self.node(shift_x),
                shift_y: self.node(shift_y),
                shift_z: self.node(shift_z),
                xz_scale: *xz_scale,
                y_scale: *y_scale,
            }),
            DensityNode::Unary { op, arg } => Arc::new(DensityNode::Unary {
                op: *op,
                arg: self.node(arg),
            }),
            DensityNode::Binary { op, lhs, rhs } => Arc::new(DensityNode::Binary {
                op: *op,
                lhs: self.node(lhs),
                rhs: self.node(rhs),
            }),
            DensityNode::RangeChoice {
                input,
                min,
                max,
                in_range,
                out_of_range,
            } => Arc::new(DensityNode::RangeChoice {
                input: self.node(input),
                min: *min,
                max: *max,
                in_range: self.node(in_range),
                out_of_range: self.node(out_of_range),
            }),
            DensityNode::Spline(spline) => Arc::new(DensityNode::Spline(self.spline(spline))),
            leaf @ (DensityNode::Constant(_)
            | DensityNode::Noise { .. }
            | DensityNode::YGradient { .. }
            | DensityNode::BlendedNoise(_)) => Arc::new(leaf.clone()),
        };
        self.nodes.insert(key, Arc::clone(&copied));
        copied
    }

    fn spline(&mut self, spline: &Arc<CubicSpline>) -> Arc<CubicSpline> {
        let key = Arc::as_ptr(spline);
        if let Some(done) = self.splines.get(&key) {
            return Arc::clone(done);
        }
        let coordinate = self.node(&spline.coordinate);
        let points = spline
            .points
            .iter()
            .map(|p| SplinePoint {
                location: p.location,
                value: match &p.value {
                    SplineValue::Constant(v) => SplineValue::Constant(*v),
                    SplineValue::Spline(nested) => SplineValue::Spline(self.spline(nested)),
                },
                derivative: p.derivative,
            })
            .collect();
        let copied = Arc::new(CubicSpline { coordinate, points });
        self.splines.insert(key, Arc::clone(&copied));
        copied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{add, constant, named};

    #[test]
    fn test_define_in_order() {
        let mut graph = DensityGraph::new("moon");
        graph
            .define(SubgraphName::Continents, constant(0.1).unwrap())
            .unwrap();
        graph
            .define(
                SubgraphName::Offset,
                add(named("moon", SubgraphName::Continents), constant(1.0).unwrap()),
            )
            .unwrap();
        assert_eq!(graph.len(), 2);
        assert!(!graph.is_complete());
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_undefined_reference_rejected() {
        let mut graph = DensityGraph::new("moon");
        let err = graph
            .define(SubgraphName::Depth, named("moon", SubgraphName::Erosion))
            .unwrap_err();
        assert_eq!(
            err,
            DensityError::UnresolvedReference {
                namespace: "moon".into(),
                name: "erosion".into()
            }
        );
        assert!(graph.is_empty(), "failed definitions must not be stored");
    }

    #[test]
    fn test_forward_reference_rejected() {
        let mut graph = DensityGraph::new("moon");
        let err = graph
            .define(SubgraphName::Continents, named("moon", SubgraphName::Ridges))
            .unwrap_err();
        assert!(matches!(err, DensityError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_self_reference_rejected() {
        let mut graph = DensityGraph::new("moon");
        let err = graph
            .define(SubgraphName::Erosion, named("moon", SubgraphName::Erosion))
            .unwrap_err();
        assert!(matches!(err, DensityError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_foreign_namespace_rejected() {
        let mut graph = DensityGraph::new("mars");
        graph
            .define(SubgraphName::Continents, constant(0.0).unwrap())
            .unwrap();
        let err = graph
            .define(SubgraphName::Erosion, named("moon", SubgraphName::Continents))
            .unwrap_err();
        assert!(matches!(err, DensityError::UnresolvedReference { namespace, .. } if namespace == "moon"));
    }

    #[test]
    fn test_duplicate_and_out_of_order() {
        let mut graph = DensityGraph::new("moon");
        graph
            .define(SubgraphName::Factor, constant(4.0).unwrap())
            .unwrap();
        assert_eq!(
            graph.define(SubgraphName::Factor, constant(4.0).unwrap()),
            Err(DensityError::DuplicateDefinition(SubgraphName::Factor))
        );
        assert_eq!(
            graph.define(SubgraphName::Offset, constant(0.0).unwrap()),
            Err(DensityError::OutOfOrder {
                name: SubgraphName::Offset,
                after: SubgraphName::Factor
            })
        );
    }

    #[test]
    fn test_names_round_trip_through_strings() {
        for name in SubgraphName::ALL {
            assert_eq!(name.as_str().parse::<SubgraphName>(), Ok(name));
        }
        assert!("surface".parse::<SubgraphName>().is_err());
    }

    #[test]
    fn test_rewrite_replaces_namespace_and_keeps_sharing() {
        let shared = named("minecraft", SubgraphName::Erosion);
        let original = add(shared.clone(), shared);
        let copy = rewrite_refs(&original, &mut |r| {
            Some(named("moon", r.name))
        });

        let refs = copy.references();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].namespace, "moon");
        let DensityNode::Binary { lhs, rhs, .. } = &*copy else {
            panic!("expected binary node");
        };
        assert!(Arc::ptr_eq(lhs, rhs), "shared children stay shared");
        assert!(!Arc::ptr_eq(&copy, &original));
    }

    #[test]
    fn test_rewrite_copies_untouched_nodes() {
        let leaf = constant(3.0).unwrap();
        let copy = rewrite_refs(&leaf, &mut |_| None);
        assert_eq!(*copy, *leaf);
        assert!(!Arc::ptr_eq(&copy, &leaf), "copies never alias the input");
    }
}
