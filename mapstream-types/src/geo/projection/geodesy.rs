use geodesy::prelude::*;

use crate::cartesian::Point2d;
use crate::geo::projection::Projection;

/// Projection defined with the `geodesy` crate operator syntax. Input points are `(lon, lat)`
/// in degrees.
pub struct GeodesyProjection {
    context: Minimal,
    op: OpHandle,
}

impl GeodesyProjection {
    /// Creates a new projection from the definition, e.g.
    /// `laea lon_0=10 lat_0=52 x_0=4321000 y_0=3210000`. Returns `None` if the definition is
    /// invalid.
    pub fn new(definition: &str) -> Option<Self> {
        let mut context = Minimal::new();
        let op = context.op(definition).ok()?;
        Some(Self { context, op })
    }
}

impl Projection for GeodesyProjection {
    fn project(&self, input: &Point2d) -> Option<Point2d> {
        let mut data = [Coor2D::geo(input.y, input.x)];
        self.context.apply(self.op, Fwd, &mut data).ok()?;

        if !data[0].0[0].is_finite() || !data[0].0[1].is_finite() {
            return None;
        }

        Some(Point2d::new(data[0].0[0], data[0].0[1]))
    }

    fn unproject(&self, input: &Point2d) -> Option<Point2d> {
        let mut data = [Coor2D([input.x, input.y])];
        self.context.apply(self.op, Inv, &mut data).ok()?;

        let (lon, lat) = (data[0].0[0].to_degrees(), data[0].0[1].to_degrees());
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }

        Some(Point2d::new(lon, lat))
    }
}
