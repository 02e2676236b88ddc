//! Concrete geometry types.

use crate::cartesian::{Point2d, Rect};
use crate::geo::Projection;

/// Sequence of points connected with straight segments. A closed contour has an implicit segment
/// between the last and the first points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    points: Vec<Point2d>,
    is_closed: bool,
}

impl Contour {
    /// Creates a new contour.
    pub fn new(points: Vec<Point2d>, is_closed: bool) -> Self {
        Self { points, is_closed }
    }

    /// Creates a new open contour (line string).
    pub fn open(points: Vec<Point2d>) -> Self {
        Self::new(points, false)
    }

    /// Creates a new closed contour (ring). The last point should not repeat the first one.
    pub fn closed(points: Vec<Point2d>) -> Self {
        Self::new(points, true)
    }

    /// Points of the contour.
    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    /// Consumes the contour returning its points.
    pub fn into_points(self) -> Vec<Point2d> {
        self.points
    }

    /// Whether the contour is closed.
    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    /// Number of points in the contour.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the contour has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over the segments of the contour, including the closing one.
    pub fn iter_segments(&self) -> impl Iterator<Item = (Point2d, Point2d)> + '_ {
        let closing = if self.is_closed && self.points.len() > 1 {
            Some((self.points[self.points.len() - 1], self.points[0]))
        } else {
            None
        };

        self.points
            .windows(2)
            .map(|w| (w[0], w[1]))
            .chain(closing)
    }

    /// Total length of the contour.
    pub fn length(&self) -> f64 {
        self.iter_segments().map(|(a, b)| (b - a).norm()).sum()
    }

    /// Bounding rectangle of the contour.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::from_points(self.points.iter())
    }

    /// Length-weighted center of the contour segments. Degenerates to the mean of the points for
    /// zero-length contours.
    pub fn centroid(&self) -> Option<Point2d> {
        let (sum, length) = self.weighted_midpoints();
        if length > 0.0 {
            Some(Point2d::from(sum / length))
        } else {
            mean_point(&self.points)
        }
    }

    fn weighted_midpoints(&self) -> (nalgebra::Vector2<f64>, f64) {
        self.iter_segments().fold(
            (nalgebra::Vector2::zeros(), 0.0),
            |(sum, length), (a, b)| {
                let segment_length = (b - a).norm();
                let mid = (a.coords + b.coords) / 2.0;
                (sum + mid * segment_length, length + segment_length)
            },
        )
    }

    /// Signed area of the ring formed by the contour (positive for counterclockwise rings).
    pub fn signed_area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }

        let mut area = 0.0;
        for i in 0..self.points.len() {
            let a = self.points[i];
            let b = self.points[(i + 1) % self.points.len()];
            area += a.x * b.y - b.x * a.y;
        }

        area / 2.0
    }

    fn try_map_points<E>(
        &self,
        f: &mut impl FnMut(&Point2d) -> Result<Point2d, E>,
    ) -> Result<Self, E> {
        Ok(Self {
            points: self.points.iter().map(&mut *f).collect::<Result<_, _>>()?,
            is_closed: self.is_closed,
        })
    }
}

/// Polygon with an outer ring and zero or more holes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    outer_contour: Contour,
    inner_contours: Vec<Contour>,
}

impl Polygon {
    /// Creates a new polygon. Contours are closed if they are not already.
    pub fn new(outer_contour: Contour, inner_contours: Vec<Contour>) -> Self {
        let close = |c: Contour| Contour::closed(c.into_points());
        Self {
            outer_contour: close(outer_contour),
            inner_contours: inner_contours.into_iter().map(close).collect(),
        }
    }

    /// Outer ring of the polygon.
    pub fn outer_contour(&self) -> &Contour {
        &self.outer_contour
    }

    /// Holes of the polygon.
    pub fn inner_contours(&self) -> &[Contour] {
        &self.inner_contours
    }

    /// Iterates over all the rings, outer first.
    pub fn iter_contours(&self) -> impl Iterator<Item = &Contour> {
        std::iter::once(&self.outer_contour).chain(self.inner_contours.iter())
    }

    /// Area of the polygon excluding holes.
    pub fn area(&self) -> f64 {
        self.outer_contour.signed_area().abs()
            - self
                .inner_contours
                .iter()
                .map(|c| c.signed_area().abs())
                .sum::<f64>()
    }

    /// Area-weighted centroid of the polygon.
    pub fn centroid(&self) -> Option<Point2d> {
        let (sum, area) = self.iter_contours().enumerate().fold(
            (nalgebra::Vector2::zeros(), 0.0),
            |(sum, area), (index, contour)| {
                let (ring_sum, ring_area) = ring_moment(contour.points());
                // holes subtract regardless of their orientation
                let sign = if index == 0 { 1.0 } else { -1.0 };
                (
                    sum + ring_sum * ring_area.signum() * sign,
                    area + ring_area.abs() * sign,
                )
            },
        );

        if area.abs() > f64::EPSILON {
            Some(Point2d::from(sum / area))
        } else {
            self.outer_contour.centroid()
        }
    }

    /// Bounding rectangle of the outer ring.
    pub fn bounding_rect(&self) -> Option<Rect> {
        self.outer_contour.bounding_rect()
    }

    fn try_map_points<E>(
        &self,
        f: &mut impl FnMut(&Point2d) -> Result<Point2d, E>,
    ) -> Result<Self, E> {
        Ok(Self {
            outer_contour: self.outer_contour.try_map_points(&mut *f)?,
            inner_contours: self
                .inner_contours
                .iter()
                .map(|c| c.try_map_points(&mut *f))
                .collect::<Result<_, _>>()?,
        })
    }
}

// Returns (sum of centroid * area, signed area) for a ring.
fn ring_moment(points: &[Point2d]) -> (nalgebra::Vector2<f64>, f64) {
    if points.len() < 3 {
        return (nalgebra::Vector2::zeros(), 0.0);
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut area = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        let cross = a.x * b.y - b.x * a.y;
        area += cross;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }

    area /= 2.0;
    (nalgebra::Vector2::new(cx / 6.0, cy / 6.0), area)
}

fn mean_point(points: &[Point2d]) -> Option<Point2d> {
    if points.is_empty() {
        return None;
    }

    let sum = points
        .iter()
        .fold(nalgebra::Vector2::zeros(), |sum, p| sum + p.coords);
    Some(Point2d::from(sum / points.len() as f64))
}

/// Any geometry supported by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Geom {
    /// Single point.
    Point(Point2d),
    /// Set of points.
    MultiPoint(Vec<Point2d>),
    /// Line string or ring.
    Contour(Contour),
    /// Set of contours.
    MultiContour(Vec<Contour>),
    /// Polygon.
    Polygon(Polygon),
    /// Set of polygons.
    MultiPolygon(Vec<Polygon>),
    /// Heterogeneous set of geometries.
    Collection(Vec<Geom>),
}

impl Geom {
    /// Returns true for the multi-part variants.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Geom::MultiPoint(_)
                | Geom::MultiContour(_)
                | Geom::MultiPolygon(_)
                | Geom::Collection(_)
        )
    }

    /// Total number of vertices in the geometry.
    pub fn vertex_count(&self) -> usize {
        match self {
            Geom::Point(_) => 1,
            Geom::MultiPoint(points) => points.len(),
            Geom::Contour(contour) => contour.len(),
            Geom::MultiContour(contours) => contours.iter().map(Contour::len).sum(),
            Geom::Polygon(polygon) => polygon.iter_contours().map(Contour::len).sum(),
            Geom::MultiPolygon(polygons) => polygons
                .iter()
                .flat_map(Polygon::iter_contours)
                .map(Contour::len)
                .sum(),
            Geom::Collection(members) => members.iter().map(Geom::vertex_count).sum(),
        }
    }

    /// Returns true if the geometry has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    /// Bounding rectangle of the geometry, `None` for empty geometries.
    pub fn bounding_rect(&self) -> Option<Rect> {
        match self {
            Geom::Point(p) => Some(Rect::from_point(p)),
            Geom::MultiPoint(points) => Rect::from_points(points.iter()),
            Geom::Contour(contour) => contour.bounding_rect(),
            Geom::MultiContour(contours) => {
                Rect::merge_all(contours.iter().filter_map(Contour::bounding_rect))
            }
            Geom::Polygon(polygon) => polygon.bounding_rect(),
            Geom::MultiPolygon(polygons) => {
                Rect::merge_all(polygons.iter().filter_map(Polygon::bounding_rect))
            }
            Geom::Collection(members) => {
                Rect::merge_all(members.iter().filter_map(Geom::bounding_rect))
            }
        }
    }

    /// Centroid of the geometry.
    ///
    /// Multi-part geometries use the weighting of their members: area for polygons, length for
    /// contours and count for points. Members of a collection are weighted equally.
    pub fn centroid(&self) -> Option<Point2d> {
        match self {
            Geom::Point(p) => Some(*p),
            Geom::MultiPoint(points) => mean_point(points),
            Geom::Contour(contour) => contour.centroid(),
            Geom::MultiContour(contours) => {
                let (sum, length) = contours.iter().map(Contour::weighted_midpoints).fold(
                    (nalgebra::Vector2::zeros(), 0.0),
                    |(sum, length), (s, l)| (sum + s, length + l),
                );
                if length > 0.0 {
                    Some(Point2d::from(sum / length))
                } else {
                    let points: Vec<_> = contours
                        .iter()
                        .flat_map(|c| c.points().iter().copied())
                        .collect();
                    mean_point(&points)
                }
            }
            Geom::Polygon(polygon) => polygon.centroid(),
            Geom::MultiPolygon(polygons) => {
                let (sum, area) = polygons
                    .iter()
                    .filter_map(|p| Some((p.centroid()?, p.area())))
                    .fold((nalgebra::Vector2::zeros(), 0.0), |(sum, area), (c, a)| {
                        (sum + c.coords * a, area + a)
                    });
                if area > f64::EPSILON {
                    Some(Point2d::from(sum / area))
                } else {
                    let centroids: Vec<_> = polygons.iter().filter_map(Polygon::centroid).collect();
                    mean_point(&centroids)
                }
            }
            Geom::Collection(members) => {
                let centroids: Vec<_> = members.iter().filter_map(Geom::centroid).collect();
                mean_point(&centroids)
            }
        }
    }

    /// Members of a multi-part geometry as separate geometries. A single geometry returns itself.
    pub fn members(&self) -> Vec<Geom> {
        match self {
            Geom::MultiPoint(points) => points.iter().copied().map(Geom::Point).collect(),
            Geom::MultiContour(contours) => contours.iter().cloned().map(Geom::Contour).collect(),
            Geom::MultiPolygon(polygons) => polygons.iter().cloned().map(Geom::Polygon).collect(),
            Geom::Collection(members) => members.clone(),
            single => vec![single.clone()],
        }
    }

    /// Applies the fallible function to every vertex of the geometry, keeping its structure.
    pub fn try_map_points<E>(
        &self,
        mut f: impl FnMut(&Point2d) -> Result<Point2d, E>,
    ) -> Result<Geom, E> {
        self.try_map_points_inner(&mut f)
    }

    fn try_map_points_inner<E>(
        &self,
        f: &mut impl FnMut(&Point2d) -> Result<Point2d, E>,
    ) -> Result<Geom, E> {
        Ok(match self {
            Geom::Point(p) => Geom::Point(f(p)?),
            Geom::MultiPoint(points) => {
                Geom::MultiPoint(points.iter().map(&mut *f).collect::<Result<_, _>>()?)
            }
            Geom::Contour(contour) => Geom::Contour(contour.try_map_points(&mut *f)?),
            Geom::MultiContour(contours) => Geom::MultiContour(
                contours
                    .iter()
                    .map(|c| c.try_map_points(&mut *f))
                    .collect::<Result<_, _>>()?,
            ),
            Geom::Polygon(polygon) => Geom::Polygon(polygon.try_map_points(&mut *f)?),
            Geom::MultiPolygon(polygons) => Geom::MultiPolygon(
                polygons
                    .iter()
                    .map(|p| p.try_map_points(&mut *f))
                    .collect::<Result<_, _>>()?,
            ),
            Geom::Collection(members) => Geom::Collection(
                members
                    .iter()
                    .map(|m| m.try_map_points_inner(&mut *f))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    /// Projects every vertex of the geometry. Returns `None` if any of the vertices cannot be
    /// projected.
    pub fn project<P: Projection + ?Sized>(&self, projection: &P) -> Option<Geom> {
        self.try_map_points(|p| projection.project(p).ok_or(())).ok()
    }
}

impl From<Point2d> for Geom {
    fn from(value: Point2d) -> Self {
        Self::Point(value)
    }
}

impl From<Contour> for Geom {
    fn from(value: Contour) -> Self {
        Self::Contour(value)
    }
}

impl From<Polygon> for Geom {
    fn from(value: Polygon) -> Self {
        Self::Polygon(value)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        Polygon::new(
            Contour::closed(vec![
                Point2d::new(x, y),
                Point2d::new(x + size, y),
                Point2d::new(x + size, y + size),
                Point2d::new(x, y + size),
            ]),
            vec![],
        )
    }

    #[test]
    fn polygon_centroid() {
        let centroid = square(0.0, 0.0, 2.0).centroid().unwrap();
        assert_relative_eq!(centroid.x, 1.0);
        assert_relative_eq!(centroid.y, 1.0);
    }

    #[test]
    fn polygon_with_hole_centroid_shifts_away_from_hole() {
        let hole = square(0.0, 0.0, 1.0).outer_contour().clone();
        let polygon = Polygon::new(square(0.0, 0.0, 4.0).outer_contour().clone(), vec![hole]);
        assert_relative_eq!(polygon.area(), 15.0);

        let centroid = polygon.centroid().unwrap();
        assert!(centroid.x > 2.0);
        assert!(centroid.y > 2.0);
    }

    #[test]
    fn contour_centroid_is_length_weighted() {
        let contour = Contour::open(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(10.0, 0.0),
            Point2d::new(10.0, 1.0),
        ]);
        let centroid = contour.centroid().unwrap();
        assert_relative_eq!(centroid.x, (5.0 * 10.0 + 10.0 * 1.0) / 11.0);
        assert_relative_eq!(centroid.y, 0.5 / 11.0);
    }

    #[test]
    fn multipolygon_centroid_is_area_weighted() {
        let geom = Geom::MultiPolygon(vec![square(0.0, 0.0, 1.0), square(10.0, 0.0, 3.0)]);
        let centroid = geom.centroid().unwrap();
        let expected_x = (0.5 * 1.0 + 11.5 * 9.0) / 10.0;
        assert_relative_eq!(centroid.x, expected_x);
    }

    #[test]
    fn vertex_count_and_bbox() {
        let geom = Geom::Collection(vec![
            Geom::Point(Point2d::new(-1.0, -1.0)),
            Geom::Polygon(square(0.0, 0.0, 2.0)),
        ]);
        assert_eq!(geom.vertex_count(), 5);
        assert_eq!(geom.bounding_rect(), Some(Rect::new(-1.0, -1.0, 2.0, 2.0)));
        assert_eq!(geom.members().len(), 2);
    }

    #[test]
    fn try_map_points_stops_on_error() {
        let geom = Geom::Contour(Contour::open(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(f64::NAN, 0.0),
        ]));
        let result = geom.try_map_points(|p| if p.x.is_finite() { Ok(*p) } else { Err(()) });
        assert!(result.is_err());
    }
}
