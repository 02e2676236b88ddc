use nalgebra::{Matrix3, Point2};

use crate::cartesian::{Point2d, Rect};
use crate::geo::projection::Projection;

/// 2d affine transformation stored as a homogeneous 3x3 matrix.
///
/// Used as the world-to-device transform of a render: it maps projected map coordinates into
/// pixels with `y` axis pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    matrix: Matrix3<f64>,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    /// Creates a transform from the homogeneous matrix. The last row is expected to be `0 0 1`.
    pub fn new(matrix: Matrix3<f64>) -> Self {
        Self { matrix }
    }

    /// Identity transform.
    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    /// Creates a transform `x' = sx * x + kx * y + tx`, `y' = ky * x + sy * y + ty`.
    pub fn from_coefficients(sx: f64, kx: f64, tx: f64, ky: f64, sy: f64, ty: f64) -> Self {
        Self::new(Matrix3::new(sx, kx, tx, ky, sy, ty, 0.0, 0.0, 1.0))
    }

    /// Transform that maps `extent` onto a screen of `width x height` pixels, with the top-left
    /// corner of the extent at pixel `(0, 0)`.
    ///
    /// Returns `None` if either the extent or the screen has zero area.
    pub fn world_to_screen(extent: &Rect, width: f64, height: f64) -> Option<Self> {
        if extent.is_empty() || !(width > 0.0 && height > 0.0) {
            return None;
        }

        let sx = width / extent.width();
        let sy = height / extent.height();
        Some(Self::from_coefficients(
            sx,
            0.0,
            -extent.x_min() * sx,
            0.0,
            -sy,
            extent.y_max() * sy,
        ))
    }

    /// The homogeneous matrix.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Scale factor along the `x` axis.
    pub fn scale_x(&self) -> f64 {
        self.matrix[(0, 0)]
    }

    /// Scale factor along the `y` axis.
    pub fn scale_y(&self) -> f64 {
        self.matrix[(1, 1)]
    }

    /// Determinant of the linear part.
    pub fn determinant(&self) -> f64 {
        self.matrix[(0, 0)] * self.matrix[(1, 1)] - self.matrix[(0, 1)] * self.matrix[(1, 0)]
    }

    /// Returns true if the transform has an inverse.
    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det.abs() > f64::EPSILON * f64::EPSILON
    }

    /// Inverse transform, `None` if the transform is singular.
    pub fn inverse(&self) -> Option<Self> {
        if !self.is_invertible() {
            return None;
        }

        self.matrix.try_inverse().map(Self::new)
    }

    /// Transform equal to applying `self` first and `next` after it.
    pub fn then(&self, next: &AffineTransform) -> Self {
        Self::new(next.matrix * self.matrix)
    }

    /// Applies the transform to the point.
    pub fn apply(&self, point: &Point2d) -> Point2d {
        self.matrix.transform_point(&Point2::new(point.x, point.y))
    }
}

impl Projection for AffineTransform {
    fn project(&self, input: &Point2d) -> Option<Point2d> {
        let projected = self.apply(input);
        if projected.x.is_finite() && projected.y.is_finite() {
            Some(projected)
        } else {
            None
        }
    }

    fn unproject(&self, input: &Point2d) -> Option<Point2d> {
        self.inverse()?.project(input)
    }
}
