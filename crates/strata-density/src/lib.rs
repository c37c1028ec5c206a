//! Density expression graphs: the immutable node model, validating constructors,
//! cubic splines, named sub-graph validation, and a reference interpreter.
//!
//! Everything that shapes terrain is expressed as a [`DensityNode`] tree. Trees are
//! built once, never mutated, and handed to the host engine through the `serde`
//! encoding in this crate.

mod encode;
mod error;
mod eval;
mod graph;
mod ident;
mod node;
mod noise_table;
mod spline;

pub mod builder;

pub use error::DensityError;
pub use eval::{DensityContext, DensityEvaluator, EvalCache};
pub use graph::{DensityGraph, SubgraphName, rewrite_refs};
pub use ident::Identifier;
pub use node::{
    BinaryOp, BlendedNoiseParams, Density, DensityNode, NoiseSource, SubgraphRef, UnaryOp,
};
pub use noise_table::{NoiseTable, SimplexNoiseTable};
pub use spline::{CubicSpline, SplineBuilder, SplinePoint, SplineValue};
