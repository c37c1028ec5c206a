//! Cubic Hermite splines driven by a density coordinate.

use std::sync::Arc;

use crate::node::Density;
use crate::DensityError;

/// A multipoint cubic spline whose input is another density node.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    pub coordinate: Density,
    pub points: Vec<SplinePoint>,
}

/// One control point. Locations are strictly increasing within a spline.
#[derive(Debug, Clone, PartialEq)]
pub struct SplinePoint {
    pub location: f32,
    pub value: SplineValue,
    pub derivative: f32,
}

/// Value at a control point: a constant or a nested spline.
#[derive(Debug, Clone, PartialEq)]
pub enum SplineValue {
    Constant(f32),
    Spline(Arc<CubicSpline>),
}

impl From<f32> for SplineValue {
    fn from(v: f32) -> Self {
        Self::Constant(v)
    }
}

impl From<f64> for SplineValue {
    fn from(v: f64) -> Self {
        Self::Constant(v as f32)
    }
}

impl From<Arc<CubicSpline>> for SplineValue {
    fn from(s: Arc<CubicSpline>) -> Self {
        Self::Spline(s)
    }
}

impl From<&Arc<CubicSpline>> for SplineValue {
    fn from(s: &Arc<CubicSpline>) -> Self {
        Self::Spline(Arc::clone(s))
    }
}

impl CubicSpline {
    /// Index of the last point whose location is `<= input`, or `None` when
    /// `input` lies before the first point.
    pub fn interval_start(&self, input: f32) -> Option<usize> {
        let end = self.points.partition_point(|p| p.location <= input);
        end.checked_sub(1)
    }
}

/// Evaluates one spline step given already resolved point values.
///
/// Outside the point range the spline extrapolates linearly with the end
/// point's derivative.
pub(crate) fn interpolate(
    points: &[SplinePoint],
    start: Option<usize>,
    input: f32,
    value_at: &mut impl FnMut(&SplineValue) -> f32,
) -> f32 {
    let Some(last) = points.len().checked_sub(1) else {
        return 0.0;
    };
    let start = match start {
        None => {
            let p = &points[0];
            return value_at(&p.value) + p.derivative * (input - p.location);
        }
        Some(i) if i == last => {
            let p = &points[last];
            return value_at(&p.value) + p.derivative * (input - p.location);
        }
        Some(i) => i,
    };

    let p0 = &points[start];
    let p1 = &points[start + 1];
    let (x1, x2) = (p0.location, p1.location);
    let t = (input - x1) / (x2 - x1);
    let y1 = value_at(&p0.value);
    let y2 = value_at(&p1.value);
    let h = x2 - x1;
    let a = p0.derivative * h - (y2 - y1);
    let b = -p1.derivative * h + (y2 - y1);
    lerp(t, y1, y2) + t * (1.0 - t) * lerp(t, a, b)
}

fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

/// Incremental spline construction with validation on [`build`](Self::build).
pub struct SplineBuilder {
    coordinate: Density,
    points: Vec<SplinePoint>,
}

impl SplineBuilder {
    pub fn new(coordinate: Density) -> Self {
        Self {
            coordinate,
            points: Vec::new(),
        }
    }

    /// Adds a point with zero derivative.
    pub fn point(self, location: f32, value: impl Into<SplineValue>) -> Self {
        self.point_with_derivative(location, value, 0.0)
    }

    pub fn point_with_derivative(
        mut self,
        location: f32,
        value: impl Into<SplineValue>,
        derivative: f32,
    ) -> Self {
        self.points.push(SplinePoint {
            location,
            value: value.into(),
            derivative,
        });
        self
    }

    /// Finishes the spline.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError::InvalidSpline`] for an empty spline or unordered
    /// locations, and [`DensityError::NonFinite`] for NaN/infinite parameters.
    pub fn build(self) -> Result<Arc<CubicSpline>, DensityError> {
        if self.points.is_empty() {
            return Err(DensityError::InvalidSpline("no points"));
        }
        for point in &self.points {
            crate::error::finite("spline location", f64::from(point.location))?;
            crate::error::finite("spline derivative", f64::from(point.derivative))?;
            if let SplineValue::Constant(v) = point.value {
                crate::error::finite("spline value", f64::from(v))?;
            }
        }
        if self
            .points
            .windows(2)
            .any(|w| w[0].location >= w[1].location)
        {
            return Err(DensityError::InvalidSpline(
                "locations must be strictly increasing",
            ));
        }
        Ok(Arc::new(CubicSpline {
            coordinate: self.coordinate,
            points: self.points,
        }))
    }
}
