//! Construction errors for density graphs.

use crate::graph::SubgraphName;

/// Errors raised while building or validating a density graph.
///
/// All of these are construction-time failures; a graph that was built
/// successfully never fails during evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DensityError {
    /// A constant, bound or scale was NaN or infinite.
    #[error("non-finite {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    /// A lower bound was not below its upper bound.
    #[error("invalid {what} bounds: {min} must be below {max}")]
    InvalidBounds {
        what: &'static str,
        min: f64,
        max: f64,
    },

    /// An operator received the wrong number of children.
    #[error("{op} expects {expected} argument(s), got {found}")]
    Arity {
        op: &'static str,
        expected: usize,
        found: usize,
    },

    /// A named reference points at a sub-graph that is not defined earlier.
    #[error("unresolved reference {namespace}:{name}")]
    UnresolvedReference { namespace: String, name: String },

    /// The same sub-graph name was defined twice.
    #[error("sub-graph {0} is already defined")]
    DuplicateDefinition(SubgraphName),

    /// A sub-graph was defined after one that comes later in dependency order.
    #[error("sub-graph {name} cannot be defined after {after}")]
    OutOfOrder {
        name: SubgraphName,
        after: SubgraphName,
    },

    /// A namespaced identifier failed validation.
    #[error("invalid identifier {value:?}: {reason}")]
    InvalidIdentifier { value: String, reason: &'static str },

    /// A spline had no points or unordered locations.
    #[error("invalid spline: {0}")]
    InvalidSpline(&'static str),
}

/// Rejects NaN and infinities.
pub(crate) fn finite(what: &'static str, value: f64) -> Result<f64, DensityError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DensityError::NonFinite { what, value })
    }
}
