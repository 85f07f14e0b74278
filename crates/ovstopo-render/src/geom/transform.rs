use super::{Point, point};
use crate::error::{Error, Result};
use nalgebra as na;
use std::str::FromStr;

/// 2D affine map stored as a 3×3 homogeneous matrix (column vectors).
///
/// `translate`, `rotate`, `scale` and `skew` left-multiply their elementary matrix, so a chain
/// of calls acts on a point in call order:
///
/// ```
/// use ovstopo_render::geom::AffineTransform;
///
/// let mut t = AffineTransform::identity();
/// t.scale(2.0, 2.0).translate(10.0, 0.0);
/// let p = t.transform_point(1.0, 1.0);
/// assert_eq!((p.x, p.y), (12.0, 2.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    matrix: na::Matrix3<f64>,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    pub fn identity() -> Self {
        Self {
            matrix: na::Matrix3::identity(),
        }
    }

    /// SVG `matrix(a b c d e f)` order.
    pub fn from_svg(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self {
            matrix: na::Matrix3::new(a, c, e, b, d, f, 0.0, 0.0, 1.0),
        }
    }

    pub fn from_matrix(matrix: na::Matrix3<f64>) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &na::Matrix3<f64> {
        &self.matrix
    }

    /// The six SVG coefficients `[a, b, c, d, e, f]`.
    pub fn to_svg_components(&self) -> [f64; 6] {
        let m = &self.matrix;
        [
            m[(0, 0)],
            m[(1, 0)],
            m[(0, 1)],
            m[(1, 1)],
            m[(0, 2)],
            m[(1, 2)],
        ]
    }

    pub fn translate(&mut self, tx: f64, ty: f64) -> &mut Self {
        self.apply(na::Matrix3::new(1.0, 0.0, tx, 0.0, 1.0, ty, 0.0, 0.0, 1.0))
    }

    /// Counter-clockwise in a y-up frame (clockwise on screen), in degrees.
    pub fn rotate(&mut self, degrees: f64) -> &mut Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        self.apply(na::Matrix3::new(cos, -sin, 0.0, sin, cos, 0.0, 0.0, 0.0, 1.0))
    }

    pub fn scale(&mut self, sx: f64, sy: f64) -> &mut Self {
        self.apply(na::Matrix3::new(sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0))
    }

    pub fn scale_uniform(&mut self, s: f64) -> &mut Self {
        self.scale(s, s)
    }

    /// Skew angles in degrees, matching SVG `skewX`/`skewY`.
    pub fn skew(&mut self, degrees_x: f64, degrees_y: f64) -> &mut Self {
        let tx = degrees_x.to_radians().tan();
        let ty = degrees_y.to_radians().tan();
        self.apply(na::Matrix3::new(1.0, tx, 0.0, ty, 1.0, 0.0, 0.0, 0.0, 1.0))
    }

    fn apply(&mut self, elementary: na::Matrix3<f64>) -> &mut Self {
        self.matrix = elementary * self.matrix;
        self
    }

    /// `a × b`: `b` acts first on a point, then `a`.
    pub fn combine(a: &Self, b: &Self) -> Self {
        Self {
            matrix: a.matrix * b.matrix,
        }
    }

    /// Matrix inverse.
    ///
    /// # Panics
    ///
    /// Callers must never invert a degenerate transform; a singular matrix panics. Use
    /// [`AffineTransform::try_invert`] when the input is not under the caller's control.
    pub fn invert(&self) -> Self {
        match self.try_invert() {
            Ok(inv) => inv,
            Err(err) => panic!("AffineTransform::invert precondition violated: {err}"),
        }
    }

    pub fn try_invert(&self) -> Result<Self> {
        self.matrix
            .try_inverse()
            .map(Self::from_matrix)
            .ok_or_else(|| Error::SingularTransform {
                determinant: self.matrix.determinant(),
            })
    }

    pub fn transform_point(&self, x: f64, y: f64) -> Point {
        let v = self.matrix * na::Vector3::new(x, y, 1.0);
        // Affine maps keep w = 1; divide anyway so a hand-built projective matrix still works.
        if v.z != 0.0 && v.z != 1.0 {
            point(v.x / v.z, v.y / v.z)
        } else {
            point(v.x, v.y)
        }
    }

    pub fn transform(&self, p: Point) -> Point {
        self.transform_point(p.x, p.y)
    }

    /// Parses an SVG `transform` attribute (`translate(…) scale(…) matrix(…)`, …). An empty
    /// string is the identity.
    pub fn from_svg_str(input: &str) -> Result<Self> {
        let ts = svgtypes::Transform::from_str(input).map_err(|err| Error::InvalidTransform {
            input: input.to_string(),
            message: err.to_string(),
        })?;
        Ok(Self::from_svg(ts.a, ts.b, ts.c, ts.d, ts.e, ts.f))
    }

    pub fn to_svg_string(&self) -> String {
        let [a, b, c, d, e, f] = self.to_svg_components().map(fmt_number);
        format!("matrix({a} {b} {c} {d} {e} {f})")
    }

    pub fn is_identity(&self, eps: f64) -> bool {
        self.approx_eq(&Self::identity(), eps)
    }

    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        self.matrix
            .iter()
            .zip(other.matrix.iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl FromStr for AffineTransform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_svg_str(s)
    }
}

/// Compact decimal form for SVG attributes: no `-0`, no float noise below 1e-9.
pub(crate) fn fmt_number(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-9 {
        v = nearest;
    }
    let s = format!("{}", (v * 1e6).round() / 1e6);
    if s == "-0" { "0".to_string() } else { s }
}
