use mapstream_types::geo::Projection;
use mapstream_types::{Contour, Geom, Point2d, Polygon, Rect, TypesError, Vector2d};

use crate::error::RenderError;

/// Converts source geometries into device space, dropping the vertices that do not change the
/// rendered image.
///
/// Consecutive vertices closer than the generalization distance (in pixels) are merged, and
/// vertices that lie far outside the screen together with both their neighbours are removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Decimator {
    span: Option<Vector2d>,
    clip: Rect,
}

impl Decimator {
    /// Creates a decimator for the source to device `transform`.
    ///
    /// The source space size of a `distance` pixels step is measured at the center of `screen`
    /// through the inverse of the transform. A zero distance disables decimation.
    pub fn new(transform: &dyn Projection, screen: &Rect, distance: f64) -> Self {
        let margin = screen.width().max(screen.height());
        let clip = screen.expand(margin);

        if distance.is_nan() || distance <= 0.0 {
            return Self { span: None, clip };
        }

        let span = source_span(transform, &screen.center(), distance).unwrap_or_else(|| {
            log::debug!("Transform cannot be inverted at the screen center, using pixel spans");
            Vector2d::new(distance, distance)
        });

        Self {
            span: Some(span),
            clip,
        }
    }

    /// Returns true if the decimator merges vertices.
    pub fn is_enabled(&self) -> bool {
        self.span.is_some()
    }

    /// Source space distances below which consecutive vertices are merged.
    pub fn span(&self) -> Option<Vector2d> {
        self.span
    }

    /// Decimates the geometry and projects it into device space.
    pub fn decimate(&self, geometry: &Geom, transform: &dyn Projection) -> Result<Geom, RenderError> {
        if geometry.is_empty() {
            return Err(RenderError::DegenerateGeometry("geometry has no vertices".into()));
        }

        Ok(match geometry {
            Geom::Point(p) => Geom::Point(project(transform, p)?),
            Geom::MultiPoint(points) => Geom::MultiPoint(
                points
                    .iter()
                    .map(|p| project(transform, p))
                    .collect::<Result<_, _>>()?,
            ),
            Geom::Contour(contour) => Geom::Contour(self.contour(contour, transform)?),
            Geom::MultiContour(contours) => Geom::MultiContour(
                contours
                    .iter()
                    .filter(|c| !c.is_empty())
                    .map(|c| self.contour(c, transform))
                    .collect::<Result<_, _>>()?,
            ),
            Geom::Polygon(polygon) => Geom::Polygon(self.polygon(polygon, transform)?),
            Geom::MultiPolygon(polygons) => Geom::MultiPolygon(
                polygons
                    .iter()
                    .map(|p| self.polygon(p, transform))
                    .collect::<Result<_, _>>()?,
            ),
            Geom::Collection(members) => Geom::Collection(
                members
                    .iter()
                    .filter(|m| !m.is_empty())
                    .map(|m| self.decimate(m, transform))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    fn polygon(&self, polygon: &Polygon, transform: &dyn Projection) -> Result<Polygon, RenderError> {
        let outer = self.contour(polygon.outer_contour(), transform)?;
        let inner = polygon
            .inner_contours()
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| self.contour(c, transform))
            .collect::<Result<_, _>>()?;
        Ok(Polygon::new(outer, inner))
    }

    fn contour(&self, contour: &Contour, transform: &dyn Projection) -> Result<Contour, RenderError> {
        let min_points = if contour.is_closed() { 3 } else { 2 };
        let source = contour.points();
        if source.len() < min_points {
            return Err(RenderError::DegenerateGeometry(format!(
                "contour with {} points",
                source.len()
            )));
        }

        let merged = match self.span {
            Some(span) => {
                let merged = merge_close(source, &span);
                if merged.len() < min_points {
                    source.to_vec()
                } else {
                    merged
                }
            }
            None => source.to_vec(),
        };

        let projected = merged
            .iter()
            .map(|p| project(transform, p))
            .collect::<Result<Vec<_>, _>>()?;

        let points = if self.is_enabled() {
            let clipped = self.clip_far(&projected);
            if clipped.len() < min_points {
                projected
            } else {
                clipped
            }
        } else {
            projected
        };

        Ok(Contour::new(points, contour.is_closed()))
    }

    fn clip_far(&self, points: &[Point2d]) -> Vec<Point2d> {
        let last = points.len() - 1;
        points
            .iter()
            .enumerate()
            .filter(|(i, p)| {
                if *i == 0 || *i == last {
                    return true;
                }

                let side = outside_side(&self.clip, p);
                side == 0
                    || side != outside_side(&self.clip, &points[i - 1])
                    || side != outside_side(&self.clip, &points[i + 1])
            })
            .map(|(_, p)| *p)
            .collect()
    }
}

fn source_span(transform: &dyn Projection, center: &Point2d, distance: f64) -> Option<Vector2d> {
    let origin = transform.unproject(center)?;
    let dx = transform.unproject(&(center + Vector2d::new(distance, 0.0)))? - origin;
    let dy = transform.unproject(&(center + Vector2d::new(0.0, distance)))? - origin;
    let span = Vector2d::new(dx.x.hypot(dy.x), dx.y.hypot(dy.y));
    (span.x.is_finite() && span.y.is_finite()).then_some(span)
}

/// Keeps the first point, every point farther than `span` from the last kept one, and the last
/// point.
fn merge_close(points: &[Point2d], span: &Vector2d) -> Vec<Point2d> {
    let mut result = Vec::with_capacity(points.len());
    let Some((first, rest)) = points.split_first() else {
        return result;
    };

    result.push(*first);
    let mut last_kept = *first;
    for (i, p) in rest.iter().enumerate() {
        let is_last = i == rest.len() - 1;
        let d = *p - last_kept;
        if is_last || d.x.abs() >= span.x || d.y.abs() >= span.y {
            result.push(*p);
            last_kept = *p;
        }
    }

    result
}

/// Bit mask of the sides of `rect` the point is outside of. `0` for points inside.
fn outside_side(rect: &Rect, p: &Point2d) -> u8 {
    let mut side = 0;
    if p.x < rect.x_min() {
        side |= 1;
    }
    if p.x > rect.x_max() {
        side |= 2;
    }
    if p.y < rect.y_min() {
        side |= 4;
    }
    if p.y > rect.y_max() {
        side |= 8;
    }
    side
}

fn project(transform: &dyn Projection, point: &Point2d) -> Result<Point2d, RenderError> {
    transform
        .project(point)
        .ok_or(RenderError::Transform(TypesError::Projection(point.x, point.y)))
}
