//! Host document encoding.
//!
//! Nodes serialize to the host's density-function JSON shape: constants are
//! bare numbers, references are `"namespace:name"` strings and everything
//! else is an object tagged with a `"type"` field.

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::node::{DensityNode, NoiseSource, SubgraphRef, UnaryOp};
use crate::spline::{CubicSpline, SplinePoint, SplineValue};

fn host_type(name: &str) -> String {
    format!("minecraft:{name}")
}

impl Serialize for SubgraphRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{}:{}", self.namespace, self.name))
    }
}

impl Serialize for DensityNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Constant(v) => serializer.serialize_f64(*v),
            Self::NamedRef(r) => r.serialize(serializer),
            Self::Noise {
                source,
                xz_scale,
                y_scale,
            } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", &host_type("noise"))?;
                noise_entries::<S>(&mut map, source)?;
                map.serialize_entry("xz_scale", xz_scale)?;
                map.serialize_entry("y_scale", y_scale)?;
                map.end()
            }
            Self::ShiftedNoise {
                source,
                shift_x,
                shift_y,
                shift_z,
                xz_scale,
                y_scale,
            } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", &host_type("shifted_noise"))?;
                noise_entries::<S>(&mut map, source)?;
                map.serialize_entry("xz_scale", xz_scale)?;
                map.serialize_entry("y_scale", y_scale)?;
                map.serialize_entry("shift_x", &**shift_x)?;
                map.serialize_entry("shift_y", &**shift_y)?;
                map.serialize_entry("shift_z", &**shift_z)?;
                map.end()
            }
            Self::Unary {
                op: UnaryOp::Clamp { min, max },
                arg,
            } => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("type", &host_type("clamp"))?;
                map.serialize_entry("input", &**arg)?;
                map.serialize_entry("min", min)?;
                map.serialize_entry("max", max)?;
                map.end()
            }
            Self::Unary { op, arg } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", &host_type(op.name()))?;
                map.serialize_entry("argument", &**arg)?;
                map.end()
            }
            Self::Binary { op, lhs, rhs } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", &host_type(op.name()))?;
                map.serialize_entry("argument1", &**lhs)?;
                map.serialize_entry("argument2", &**rhs)?;
                map.end()
            }
            Self::YGradient {
                from_y,
                to_y,
                from_value,
                to_value,
            } => {
                let mut map = serializer.serialize_map(Some(5))?;
                map.serialize_entry("type", &host_type("y_clamped_gradient"))?;
                map.serialize_entry("from_y", from_y)?;
                map.serialize_entry("to_y", to_y)?;
                map.serialize_entry("from_value", from_value)?;
                map.serialize_entry("to_value", to_value)?;
                map.end()
            }
            Self::RangeChoice {
                input,
                min,
                max,
                in_range,
                out_of_range,
            } => {
                let mut map = serializer.serialize_map(Some(6))?;
                map.serialize_entry("type", &host_type("range_choice"))?;
                map.serialize_entry("input", &**input)?;
                map.serialize_entry("min_inclusive", min)?;
                map.serialize_entry("max_exclusive", max)?;
                map.serialize_entry("when_in_range", &**in_range)?;
                map.serialize_entry("when_out_of_range", &**out_of_range)?;
                map.end()
            }
            Self::Spline(spline) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", &host_type("spline"))?;
                map.serialize_entry("spline", &**spline)?;
                map.end()
            }
            Self::BlendedNoise(p) => {
                let mut map = serializer.serialize_map(Some(6))?;
                map.serialize_entry("type", &host_type("old_blended_noise"))?;
                map.serialize_entry("xz_scale", &p.xz_scale)?;
                map.serialize_entry("y_scale", &p.y_scale)?;
                map.serialize_entry("xz_factor", &p.xz_factor)?;
                map.serialize_entry("y_factor", &p.y_factor)?;
                map.serialize_entry("smear_scale_multiplier", &p.smear_scale_multiplier)?;
                map.end()
            }
        }
    }
}

/// Writes `noise` and, when salted, `salt`.
fn noise_entries<S: Serializer>(
    map: &mut S::SerializeMap,
    source: &NoiseSource,
) -> Result<(), S::Error> {
    map.serialize_entry("noise", source.id.as_str())?;
    if source.salt != 0 {
        map.serialize_entry("salt", &source.salt)?;
    }
    Ok(())
}

impl Serialize for CubicSpline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("CubicSpline", 2)?;
        s.serialize_field("coordinate", &*self.coordinate)?;
        s.serialize_field("points", &self.points)?;
        s.end()
    }
}

impl Serialize for SplinePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("SplinePoint", 3)?;
        s.serialize_field("location", &self.location)?;
        s.serialize_field("value", &self.value)?;
        s.serialize_field("derivative", &self.derivative)?;
        s.end()
    }
}

impl Serialize for SplineValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Constant(v) => serializer.serialize_f32(*v),
            Self::Spline(spline) => spline.serialize(serializer),
        }
    }
}
