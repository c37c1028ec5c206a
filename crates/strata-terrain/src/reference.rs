//! Reference overworld spline tables.
//!
//! Offset, factor and jaggedness are nested cubic splines over the climate
//! coordinates. The tables are built once, over named references into the
//! `minecraft` namespace, and each planet takes a deep copy with its own
//! references swapped in.

use std::sync::{Arc, LazyLock};

use strata_density::builder::{abs, add, constant, mul, named};
use strata_density::{CubicSpline, Density, DensityError, SplineBuilder, SubgraphName};

use crate::error::TerrainError;

/// Namespace the reference tables refer into.
pub const REFERENCE_NAMESPACE: &str = "minecraft";

/// The three terrain shape splines.
#[derive(Debug, Clone)]
pub struct ReferenceSplines {
    /// Surface height offset, before the constant `-0.50375` bias.
    pub offset: Arc<CubicSpline>,
    /// Steepness of the density ramp around the surface.
    pub factor: Arc<CubicSpline>,
    /// Amplitude of jagged mountain peaks.
    pub jaggedness: Arc<CubicSpline>,
}

/// Constant added to the offset spline.
pub const OFFSET_BIAS: f64 = -0.50375;

static REFERENCE: LazyLock<Result<ReferenceSplines, DensityError>> =
    LazyLock::new(|| build_reference_splines(REFERENCE_NAMESPACE));

/// The process-wide reference tables.
pub fn reference_splines() -> Result<&'static ReferenceSplines, TerrainError> {
    REFERENCE.as_ref().map_err(|err| TerrainError::from(err.clone()))
}

/// `-3 * (-1/3 + |-2/3 + |ridges||)`: folds ridges into peaks and valleys.
pub fn peaks_and_valleys(ridges: Density) -> Result<Density, DensityError> {
    let inner = add(abs(ridges), constant(-2.0 / 3.0)?);
    let outer = add(abs(inner), constant(-1.0 / 3.0)?);
    Ok(mul(outer, constant(-3.0)?))
}

fn pv(x: f32) -> f32 {
    -((x.abs() - 0.666_666_7).abs() - 0.333_333_34) * 3.0
}

fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

/// Builds the tables over references into `namespace`.
pub fn build_reference_splines(namespace: &str) -> Result<ReferenceSplines, DensityError> {
    let c = Coordinates {
        continents: named(namespace, SubgraphName::Continents),
        erosion: named(namespace, SubgraphName::Erosion),
        ridges: named(namespace, SubgraphName::Ridges),
        ridges_folded: peaks_and_valleys(named(namespace, SubgraphName::Ridges))?,
    };
    let splines = ReferenceSplines {
        offset: c.offset()?,
        factor: c.factor()?,
        jaggedness: c.jaggedness()?,
    };
    tracing::debug!(namespace, "built reference spline tables");
    Ok(splines)
}

struct Coordinates {
    continents: Density,
    erosion: Density,
    ridges: Density,
    ridges_folded: Density,
}

type Spline = Result<Arc<CubicSpline>, DensityError>;

impl Coordinates {
    // ---- Offset ----

    fn offset(&self) -> Spline {
        let s1 = self.erosion_offset(-0.15, 0.0, 0.0, 0.1, 0.0, -0.03, false, false)?;
        let s2 = self.erosion_offset(-0.1, 0.03, 0.1, 0.1, 0.01, -0.03, false, false)?;
        let s3 = self.erosion_offset(-0.1, 0.03, 0.1, 0.7, 0.01, -0.03, true, true)?;
        let s4 = self.erosion_offset(-0.05, 0.03, 0.1, 1.0, 0.01, 0.01, true, true)?;
        SplineBuilder::new(self.continents.clone())
            .point(-1.1, 0.044)
            .point(-1.02, -0.2222)
            .point(-0.51, -0.2222)
            .point(-0.44, -0.12)
            .point(-0.18, -0.12)
            .point(-0.16, &s1)
            .point(-0.15, &s1)
            .point(-0.1, &s2)
            .point(0.25, &s3)
            .point(1.0, &s4)
            .build()
    }

    #[allow(clippy::too_many_arguments)]
    fn erosion_offset(
        &self,
        f: f32,
        g: f32,
        h: f32,
        i: f32,
        j: f32,
        k: f32,
        extended: bool,
        saddle: bool,
    ) -> Spline {
        let c1 = self.mountain_ridge(lerp(i, 0.6, 1.5), saddle)?;
        let c2 = self.mountain_ridge(lerp(i, 0.6, 1.0), saddle)?;
        let c3 = self.mountain_ridge(i, saddle)?;
        let c4 = self.ridge(f - 0.15, 0.5 * i, 0.5 * i, 0.5 * i, 0.6 * i, 0.5)?;
        let c5 = self.ridge(f, j * i, g * i, 0.5 * i, 0.6 * i, 0.5)?;
        let c6 = self.ridge(f, j, j, g, h, 0.5)?;
        let c7 = self.ridge(f, j, j, g, h, 0.5)?;
        let c8 = SplineBuilder::new(self.ridges_folded.clone())
            .point(-1.0, f)
            .point(-0.4, &c6)
            .point(0.0, h + 0.07)
            .build()?;
        let c9 = self.ridge(-0.02, k, k, g, h, 0.0)?;

        let mut builder = SplineBuilder::new(self.erosion.clone())
            .point(-0.85, &c1)
            .point(-0.7, &c2)
            .point(-0.4, &c3)
            .point(-0.35, &c4)
            .point(-0.1, &c5)
            .point(0.2, &c6);
        if extended {
            builder = builder
                .point(0.4, &c7)
                .point(0.45, &c8)
                .point(0.55, &c8)
                .point(0.58, &c7);
        }
        builder.point(0.7, &c9).build()
    }

    fn ridge(&self, f: f32, g: f32, h: f32, i: f32, j: f32, k: f32) -> Spline {
        let l = (0.5 * (g - f)).max(k);
        let m = 5.0 * (h - g);
        SplineBuilder::new(self.ridges_folded.clone())
            .point_with_derivative(-1.0, f, l)
            .point_with_derivative(-0.4, g, l.min(m))
            .point_with_derivative(0.0, h, m)
            .point_with_derivative(0.4, i, 2.0 * (i - h))
            .point_with_derivative(1.0, j, 0.7 * (j - i))
            .build()
    }

    fn mountain_ridge(&self, f: f32, saddle: bool) -> Spline {
        let low = mountain_continentalness(-1.0, f, -0.7);
        let high = mountain_continentalness(1.0, f, -0.7);
        let zero = mountain_zero_point(f);
        let builder = SplineBuilder::new(self.ridges_folded.clone());
        if -0.65 < zero && zero < 1.0 {
            let n = mountain_continentalness(-0.65, f, -0.7);
            let p = mountain_continentalness(-0.75, f, -0.7);
            let q = slope(low, p, -1.0, -0.75);
            let r = mountain_continentalness(zero, f, -0.7);
            let s = slope(r, high, zero, 1.0);
            builder
                .point_with_derivative(-1.0, low, q)
                .point(-0.75, p)
                .point(-0.65, n)
                .point(zero - 0.01, r)
                .point_with_derivative(zero, r, s)
                .point_with_derivative(1.0, high, s)
                .build()
        } else {
            let n = slope(low, high, -1.0, 1.0);
            let builder = if saddle {
                builder
                    .point(-1.0, low.max(0.2))
                    .point_with_derivative(0.0, lerp(0.5, low, high), n)
            } else {
                builder.point_with_derivative(-1.0, low, n)
            };
            builder.point_with_derivative(1.0, high, n).build()
        }
    }

    // ---- Factor ----

    fn factor(&self) -> Spline {
        SplineBuilder::new(self.continents.clone())
            .point(-0.19, 3.95)
            .point(-0.15, &self.erosion_factor(6.25, true)?)
            .point(-0.1, &self.erosion_factor(5.47, true)?)
            .point(0.03, &self.erosion_factor(5.08, true)?)
            .point(0.06, &self.erosion_factor(4.69, false)?)
            .build()
    }

    fn erosion_factor(&self, f: f32, plateau: bool) -> Spline {
        let base = SplineBuilder::new(self.ridges.clone())
            .point(-0.2, 6.3)
            .point(0.2, f)
            .build()?;
        let rising = SplineBuilder::new(self.ridges.clone())
            .point(-0.05, 6.3)
            .point(0.05, 2.67)
            .build()?;
        let falling = SplineBuilder::new(self.ridges.clone())
            .point(-0.05, 2.67)
            .point(0.05, 6.3)
            .build()?;
        let builder = SplineBuilder::new(self.erosion.clone())
            .point(-0.6, &base)
            .point(-0.5, &rising)
            .point(-0.35, &base)
            .point(-0.25, &base)
            .point(-0.1, &falling)
            .point(0.03, &base);
        if plateau {
            let ridged = SplineBuilder::new(self.ridges.clone())
                .point(0.0, f)
                .point(0.1, 0.625)
                .build()?;
            let folded = SplineBuilder::new(self.ridges_folded.clone())
                .point(-0.9, f)
                .point(-0.69, &ridged)
                .build()?;
            builder
                .point(0.35, f)
                .point(0.45, &folded)
                .point(0.55, &folded)
                .point(0.62, f)
                .build()
        } else {
            let valley = SplineBuilder::new(self.ridges_folded.clone())
                .point(-0.7, &base)
                .point(-0.15, 1.37)
                .build()?;
            let peak = SplineBuilder::new(self.ridges_folded.clone())
                .point(0.45, &base)
                .point(0.7, 1.56)
                .build()?;
            builder
                .point(0.05, &peak)
                .point(0.4, &peak)
                .point(0.45, &valley)
                .point(0.55, &valley)
                .point(0.58, f)
                .build()
        }
    }

    // ---- Jaggedness ----

    fn jaggedness(&self) -> Spline {
        SplineBuilder::new(self.continents.clone())
            .point(-0.11, 0.0)
            .point(0.03, &self.erosion_jaggedness(1.0, 0.5, 0.0, 0.0)?)
            .point(0.65, &self.erosion_jaggedness(1.0, 1.0, 1.0, 0.0)?)
            .build()
    }

    fn erosion_jaggedness(&self, f: f32, g: f32, h: f32, i: f32) -> Spline {
        let a = self.ridge_jaggedness(f, h)?;
        let b = self.ridge_jaggedness(g, i)?;
        SplineBuilder::new(self.erosion.clone())
            .point(-1.0, &a)
            .point(-0.78, &b)
            .point(-0.5775, &b)
            .point(-0.375, 0.0)
            .build()
    }

    fn ridge_jaggedness(&self, high: f32, mid: f32) -> Spline {
        let start = pv(0.4);
        let end = pv(0.566_666_66);
        let middle = (start + end) / 2.0;
        let mut builder = SplineBuilder::new(self.ridges_folded.clone()).point(start, 0.0);
        builder = if mid > 0.0 {
            builder.point(middle, &self.weirdness_jaggedness(mid)?)
        } else {
            builder.point(middle, 0.0)
        };
        builder = if high > 0.0 {
            builder.point(1.0, &self.weirdness_jaggedness(high)?)
        } else {
            builder.point(1.0, 0.0)
        };
        builder.build()
    }

    fn weirdness_jaggedness(&self, f: f32) -> Spline {
        SplineBuilder::new(self.ridges.clone())
            .point(-0.01, 0.63 * f)
            .point(0.01, 0.3 * f)
            .build()
    }
}

fn mountain_continentalness(f: f32, g: f32, h: f32) -> f32 {
    let k = 1.0 - (1.0 - g) * 0.5;
    let l = 0.5 * (1.0 - g);
    let n = (f + 1.17) * 0.460_829_47 * k - l;
    if f < h { n.max(-0.2222) } else { n.max(0.0) }
}

fn mountain_zero_point(f: f32) -> f32 {
    let i = 1.0 - (1.0 - f) * 0.5;
    let j = 0.5 * (1.0 - f);
    j / (0.460_829_47 * i) - 1.17
}

fn slope(f: f32, g: f32, h: f32, i: f32) -> f32 {
    (g - f) / (i - h)
}
