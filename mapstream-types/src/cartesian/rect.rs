use serde::{Deserialize, Serialize};

use crate::cartesian::Point2d;

/// Axis-aligned rectangle. Used both for geographic envelopes and for screen areas.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum x coordinate.
    pub x_min: f64,
    /// Minimum y coordinate.
    pub y_min: f64,
    /// Maximum x coordinate.
    pub x_max: f64,
    /// Maximum y coordinate.
    pub y_max: f64,
}

impl Rect {
    /// Creates a new rectangle. Coordinates are normalized so that `min <= max`.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x_min: x1.min(x2),
            y_min: y1.min(y2),
            x_max: x1.max(x2),
            y_max: y1.max(y2),
        }
    }

    /// Rectangle with the top-left corner at `(0, 0)` of the given size.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Minimum x coordinate.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Maximum x coordinate.
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Minimum y coordinate.
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Maximum y coordinate.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Returns true if the rectangle has zero (or non-finite) area.
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
            || !self.width().is_finite()
            || !self.height().is_finite()
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn merge(&self, other: Self) -> Self {
        Self {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Extends the rectangle to contain the point.
    pub fn merge_point(&self, point: &Point2d) -> Self {
        Self {
            x_min: self.x_min.min(point.x),
            y_min: self.y_min.min(point.y),
            x_max: self.x_max.max(point.x),
            y_max: self.y_max.max(point.y),
        }
    }

    /// Zero-size rectangle at the point.
    pub fn from_point(p: &Point2d) -> Self {
        Self {
            x_min: p.x,
            x_max: p.x,
            y_min: p.y,
            y_max: p.y,
        }
    }

    /// Bounding rectangle of the points. Returns `None` if the iterator is empty.
    pub fn from_points<'a>(mut points: impl Iterator<Item = &'a Point2d>) -> Option<Self> {
        let first = points.next()?;
        Some(points.fold(Self::from_point(first), |rect, p| rect.merge_point(p)))
    }

    /// Returns true if the point is inside the rectangle or on its border.
    pub fn contains(&self, point: &Point2d) -> bool {
        self.x_min <= point.x
            && self.x_max >= point.x
            && self.y_min <= point.y
            && self.y_max >= point.y
    }

    /// Returns true if the rectangles share at least one point.
    pub fn intersects(&self, other: &Self) -> bool {
        self.x_min <= other.x_max
            && self.x_max >= other.x_min
            && self.y_min <= other.y_max
            && self.y_max >= other.y_min
    }

    /// Intersection of two rectangles, or `None` if they do not intersect.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }

        Some(Self {
            x_min: self.x_min.max(other.x_min),
            y_min: self.y_min.max(other.y_min),
            x_max: self.x_max.min(other.x_max),
            y_max: self.y_max.min(other.y_max),
        })
    }

    /// Grows the rectangle by `amount` in every direction. Negative amount shrinks it.
    pub fn expand(&self, amount: f64) -> Self {
        Self {
            x_min: self.x_min - amount,
            x_max: self.x_max + amount,
            y_min: self.y_min - amount,
            y_max: self.y_max + amount,
        }
    }

    /// Scales the rectangle around its center.
    pub fn magnify(&self, factor: f64) -> Self {
        let center = self.center();
        let half_width = self.width() / 2.0 * factor;
        let half_height = self.height() / 2.0 * factor;
        Self {
            x_min: center.x - half_width,
            x_max: center.x + half_width,
            y_min: center.y - half_height,
            y_max: center.y + half_height,
        }
    }

    /// Center point.
    pub fn center(&self) -> Point2d {
        Point2d::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Corner points in counterclockwise order starting from `(x_min, y_min)`.
    pub fn into_quadrangle(self) -> [Point2d; 4] {
        [
            Point2d::new(self.x_min, self.y_min),
            Point2d::new(self.x_max, self.y_min),
            Point2d::new(self.x_max, self.y_max),
            Point2d::new(self.x_min, self.y_max),
        ]
    }

    /// Points along the border of the rectangle: the corners plus `segments - 1` evenly spaced
    /// points on every edge.
    ///
    /// Reprojecting these instead of only the corners gives a valid envelope for projections
    /// that bend straight lines.
    pub fn boundary_points(&self, segments: usize) -> Vec<Point2d> {
        let segments = segments.max(1);
        let corners = self.into_quadrangle();
        let mut points = Vec::with_capacity(segments * 4);
        for i in 0..4 {
            let from = corners[i];
            let to = corners[(i + 1) % 4];
            for step in 0..segments {
                let k = step as f64 / segments as f64;
                points.push(from + (to - from) * k);
            }
        }

        points
    }

    /// Smallest rectangle containing all the given ones, or `None` for an empty iterator.
    pub fn merge_all(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
        let mut iter = rects.into_iter();
        let first = iter.next()?;
        Some(iter.fold(first, |curr, rect| curr.merge(rect)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_coordinates() {
        let rect = Rect::new(10.0, 5.0, 0.0, -5.0);
        assert_eq!(rect, Rect::new(0.0, -5.0, 10.0, 5.0));
        assert_eq!(rect.width(), 10.0);
        assert_eq!(rect.height(), 10.0);
    }

    #[test]
    fn intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 15.0, 15.0);
        let c = Rect::new(20.0, 20.0, 30.0, 30.0);

        assert_eq!(a.intersection(&b), Some(Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(a.intersection(&c).is_none());
        assert!(!c.intersects(&b));
    }

    #[test]
    fn boundary_points_cover_all_edges() {
        let rect = Rect::new(0.0, 0.0, 4.0, 2.0);
        let points = rect.boundary_points(4);
        assert_eq!(points.len(), 16);
        assert!(points.iter().all(|p| {
            p.x == 0.0 || p.x == 4.0 || p.y == 0.0 || p.y == 2.0
        }));
        assert_eq!(Rect::from_points(points.iter()), Some(rect));
    }

    #[test]
    fn merge_all_rects() {
        let merged = Rect::merge_all([
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Rect::new(-1.0, 2.0, 0.5, 3.0),
        ]);
        assert_eq!(merged, Some(Rect::new(-1.0, 0.0, 1.0, 3.0)));
        assert!(Rect::merge_all(Vec::new()).is_none());
    }
}
