//! Validating constructors for [`DensityNode`] graphs.
//!
//! Arity is enforced by the function signatures; parameters that could be NaN
//! or infinite are checked and rejected with [`DensityError::NonFinite`].
//! [`build`] offers the same constructors behind a run-time arity check for
//! callers that assemble nodes generically.

use std::sync::Arc;

use crate::error::finite;
use crate::graph::SubgraphName;
use crate::node::{
    BinaryOp, BlendedNoiseParams, Density, DensityNode, NoiseSource, SubgraphRef, UnaryOp,
};
use crate::spline::CubicSpline;
use crate::DensityError;

pub fn constant(value: f64) -> Result<Density, DensityError> {
    Ok(Arc::new(DensityNode::Constant(finite("constant", value)?)))
}

pub fn noise(source: NoiseSource, xz_scale: f64, y_scale: f64) -> Result<Density, DensityError> {
    Ok(Arc::new(DensityNode::Noise {
        source,
        xz_scale: finite("xz_scale", xz_scale)?,
        y_scale: finite("y_scale", y_scale)?,
    }))
}

pub fn shifted_noise(
    source: NoiseSource,
    shift_x: Density,
    shift_y: Density,
    shift_z: Density,
    xz_scale: f64,
    y_scale: f64,
) -> Result<Density, DensityError> {
    Ok(Arc::new(DensityNode::ShiftedNoise {
        source,
        shift_x,
        shift_y,
        shift_z,
        xz_scale: finite("xz_scale", xz_scale)?,
        y_scale: finite("y_scale", y_scale)?,
    }))
}

pub fn unary(op: UnaryOp, arg: Density) -> Result<Density, DensityError> {
    if let UnaryOp::Clamp { min, max } = op {
        finite("clamp min", min)?;
        finite("clamp max", max)?;
        if min > max {
            return Err(DensityError::InvalidBounds {
                what: "clamp",
                min,
                max,
            });
        }
    }
    Ok(Arc::new(DensityNode::Unary { op, arg }))
}

fn wrap(op: UnaryOp, arg: Density) -> Density {
    Arc::new(DensityNode::Unary { op, arg })
}

pub fn abs(arg: Density) -> Density {
    wrap(UnaryOp::Abs, arg)
}

pub fn square(arg: Density) -> Density {
    wrap(UnaryOp::Square, arg)
}

pub fn squeeze(arg: Density) -> Density {
    wrap(UnaryOp::Squeeze, arg)
}

pub fn half_negative(arg: Density) -> Density {
    wrap(UnaryOp::HalfNegative, arg)
}

pub fn quarter_negative(arg: Density) -> Density {
    wrap(UnaryOp::QuarterNegative, arg)
}

pub fn cache_2d(arg: Density) -> Density {
    wrap(UnaryOp::Cache2D, arg)
}

pub fn flat_cache(arg: Density) -> Density {
    wrap(UnaryOp::FlatCache, arg)
}

pub fn cache_once(arg: Density) -> Density {
    wrap(UnaryOp::CacheOnce, arg)
}

pub fn interpolated(arg: Density) -> Density {
    wrap(UnaryOp::Interpolated, arg)
}

pub fn blend_density(arg: Density) -> Density {
    wrap(UnaryOp::BlendDensity, arg)
}

pub fn clamp(arg: Density, min: f64, max: f64) -> Result<Density, DensityError> {
    unary(UnaryOp::Clamp { min, max }, arg)
}

pub fn binary(op: BinaryOp, lhs: Density, rhs: Density) -> Density {
    Arc::new(DensityNode::Binary { op, lhs, rhs })
}

pub fn add(lhs: Density, rhs: Density) -> Density {
    binary(BinaryOp::Add, lhs, rhs)
}

pub fn mul(lhs: Density, rhs: Density) -> Density {
    binary(BinaryOp::Mul, lhs, rhs)
}

pub fn min(lhs: Density, rhs: Density) -> Density {
    binary(BinaryOp::Min, lhs, rhs)
}

pub fn max(lhs: Density, rhs: Density) -> Density {
    binary(BinaryOp::Max, lhs, rhs)
}

/// `arg * factor`, as a constant multiplication node.
pub fn scale(arg: Density, factor: f64) -> Result<Density, DensityError> {
    Ok(mul(constant(factor)?, arg))
}

/// `arg + amount`, as a constant addition node.
pub fn shift(arg: Density, amount: f64) -> Result<Density, DensityError> {
    Ok(add(constant(amount)?, arg))
}

/// `from + alpha * (to - from)` with a constant `from`.
pub fn lerp_from(alpha: Density, from: f64, to: Density) -> Result<Density, DensityError> {
    Ok(add(mul(alpha, shift(to, -from)?), constant(from)?))
}

pub fn y_gradient(
    from_y: i32,
    to_y: i32,
    from_value: f64,
    to_value: f64,
) -> Result<Density, DensityError> {
    if from_y >= to_y {
        return Err(DensityError::InvalidBounds {
            what: "y gradient",
            min: f64::from(from_y),
            max: f64::from(to_y),
        });
    }
    Ok(Arc::new(DensityNode::YGradient {
        from_y,
        to_y,
        from_value: finite("gradient from_value", from_value)?,
        to_value: finite("gradient to_value", to_value)?,
    }))
}

pub fn range_choice(
    input: Density,
    min: f64,
    max: f64,
    in_range: Density,
    out_of_range: Density,
) -> Result<Density, DensityError> {
    finite("range min", min)?;
    finite("range max", max)?;
    if min >= max {
        return Err(DensityError::InvalidBounds {
            what: "range choice",
            min,
            max,
        });
    }
    Ok(Arc::new(DensityNode::RangeChoice {
        input,
        min,
        max,
        in_range,
        out_of_range,
    }))
}

pub fn named(namespace: &str, name: SubgraphName) -> Density {
    Arc::new(DensityNode::NamedRef(SubgraphRef {
        namespace: namespace.to_string(),
        name,
    }))
}

pub fn spline(spline: Arc<CubicSpline>) -> Density {
    Arc::new(DensityNode::Spline(spline))
}

pub fn blended_noise(params: BlendedNoiseParams) -> Result<Density, DensityError> {
    finite("blended xz_scale", params.xz_scale)?;
    finite("blended y_scale", params.y_scale)?;
    finite("blended xz_factor", params.xz_factor)?;
    finite("blended y_factor", params.y_factor)?;
    finite("blended smear", params.smear_scale_multiplier)?;
    if params.xz_factor <= 0.0 || params.y_factor <= 0.0 {
        return Err(DensityError::InvalidBounds {
            what: "blended noise factor",
            min: 0.0,
            max: params.xz_factor.min(params.y_factor),
        });
    }
    Ok(Arc::new(DensityNode::BlendedNoise(params)))
}

/// Operator tags for [`build`].
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Constant(f64),
    Noise {
        source: NoiseSource,
        xz_scale: f64,
        y_scale: f64,
    },
    ShiftedNoise {
        source: NoiseSource,
        xz_scale: f64,
        y_scale: f64,
    },
    Unary(UnaryOp),
    Binary(BinaryOp),
    YGradient {
        from_y: i32,
        to_y: i32,
        from_value: f64,
        to_value: f64,
    },
    RangeChoice {
        min: f64,
        max: f64,
    },
    NamedRef(SubgraphRef),
    BlendedNoise(BlendedNoiseParams),
}

impl Op {
    fn name(&self) -> &'static str {
        match self {
            Self::Constant(_) => "constant",
            Self::Noise { .. } => "noise",
            Self::ShiftedNoise { .. } => "shifted_noise",
            Self::Unary(op) => op.name(),
            Self::Binary(op) => op.name(),
            Self::YGradient { .. } => "y_clamped_gradient",
            Self::RangeChoice { .. } => "range_choice",
            Self::NamedRef(_) => "reference",
            Self::BlendedNoise(_) => "old_blended_noise",
        }
    }

    /// Number of child nodes the operator takes.
    pub fn arity(&self) -> usize {
        match self {
            Self::Constant(_)
            | Self::Noise { .. }
            | Self::YGradient { .. }
            | Self::NamedRef(_)
            | Self::BlendedNoise(_) => 0,
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
            Self::ShiftedNoise { .. } | Self::RangeChoice { .. } => 3,
        }
    }
}

/// Builds a node from an operator and its children.
///
/// Children are taken in document order: shifted noise takes `shift_x,
/// shift_y, shift_z`; range choice takes `input, in_range, out_of_range`.
///
/// # Errors
///
/// [`DensityError::Arity`] when `children` does not match [`Op::arity`], plus
/// whatever the specific constructor rejects.
pub fn build(op: Op, children: Vec<Density>) -> Result<Density, DensityError> {
    let expected = op.arity();
    if children.len() != expected {
        return Err(DensityError::Arity {
            op: op.name(),
            expected,
            found: children.len(),
        });
    }
    let mut children = children.into_iter();
    let mut next = || {
        children.next().ok_or(DensityError::Arity {
            op: "build",
            expected,
            found: 0,
        })
    };
    match op {
        Op::Constant(v) => constant(v),
        Op::Noise {
            source,
            xz_scale,
            y_scale,
        } => noise(source, xz_scale, y_scale),
        Op::ShiftedNoise {
            source,
            xz_scale,
            y_scale,
        } => {
            let (x, y, z) = (next()?, next()?, next()?);
            shifted_noise(source, x, y, z, xz_scale, y_scale)
        }
        Op::Unary(op) => unary(op, next()?),
        Op::Binary(op) => Ok(binary(op, next()?, next()?)),
        Op::YGradient {
            from_y,
            to_y,
            from_value,
            to_value,
        } => y_gradient(from_y, to_y, from_value, to_value),
        Op::RangeChoice { min, max } => {
            let (input, inside, outside) = (next()?, next()?, next()?);
            range_choice(input, min, max, inside, outside)
        }
        Op::NamedRef(r) => Ok(Arc::new(DensityNode::NamedRef(r))),
        Op::BlendedNoise(params) => blended_noise(params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Identifier;

    #[test]
    fn test_constant_rejects_non_finite() {
        assert!(constant(1.5).is_ok());
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(
                matches!(constant(bad), Err(DensityError::NonFinite { .. })),
                "{bad} must be rejected"
            );
        }
    }

    #[test]
    fn test_clamp_bounds_checked() {
        let arg = constant(0.0).unwrap();
        assert!(clamp(arg.clone(), -1.0, 1.0).is_ok());
        assert!(matches!(
            clamp(arg.clone(), 1.0, -1.0),
            Err(DensityError::InvalidBounds { .. })
        ));
        assert!(clamp(arg, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_noise_scale_must_be_finite() {
        let source = NoiseSource::plain(Identifier::minecraft("erosion").unwrap());
        assert!(noise(source.clone(), 0.25, 0.0).is_ok());
        assert!(noise(source, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_gradient_requires_increasing_y() {
        assert!(y_gradient(-64, 320, 1.5, -1.5).is_ok());
        assert!(y_gradient(10, 10, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_build_enforces_arity() {
        let one = constant(1.0).unwrap();
        let err = build(Op::Binary(BinaryOp::Add), vec![one.clone()]).unwrap_err();
        assert_eq!(
            err,
            DensityError::Arity {
                op: "add",
                expected: 2,
                found: 1
            }
        );
        assert!(build(Op::Constant(2.0), vec![one.clone()]).is_err());
        let sum = build(Op::Binary(BinaryOp::Add), vec![one.clone(), one]).unwrap();
        assert!(matches!(
            &*sum,
            DensityNode::Binary {
                op: BinaryOp::Add,
                ..
            }
        ));
    }

    #[test]
    fn test_build_range_choice_child_order() {
        let input = constant(0.5).unwrap();
        let inside = constant(1.0).unwrap();
        let outside = constant(2.0).unwrap();
        let node = build(
            Op::RangeChoice { min: 0.0, max: 1.0 },
            vec![input, inside.clone(), outside.clone()],
        )
        .unwrap();
        let DensityNode::RangeChoice {
            in_range,
            out_of_range,
            ..
        } = &*node
        else {
            panic!("expected range choice");
        };
        assert!(Arc::ptr_eq(in_range, &inside));
        assert!(Arc::ptr_eq(out_of_range, &outside));
    }
}
