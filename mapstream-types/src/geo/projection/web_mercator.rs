use crate::cartesian::Point2d;
use crate::geo::datum::Datum;
use crate::geo::projection::Projection;

/// Spherical mercator. Input points are `(lon, lat)` in degrees.
#[derive(Debug, Copy, Clone, Default)]
pub struct WebMercator {
    datum: Datum,
}

impl WebMercator {
    /// Creates a new instance.
    pub fn new(datum: Datum) -> Self {
        Self { datum }
    }
}

impl Projection for WebMercator {
    fn project(&self, input: &Point2d) -> Option<Point2d> {
        if input.y.abs() >= 90.0 {
            return None;
        }

        let x = self.datum.semimajor() * input.x.to_radians();
        let y = self.datum.semimajor()
            * (std::f64::consts::FRAC_PI_4 + input.y.to_radians() / 2.0)
                .tan()
                .ln();

        if x.is_finite() && y.is_finite() {
            Some(Point2d::new(x, y))
        } else {
            None
        }
    }

    fn unproject(&self, input: &Point2d) -> Option<Point2d> {
        let lat = 2.0 * (input.y / self.datum.semimajor()).exp().atan()
            - std::f64::consts::FRAC_PI_2;
        let lon = input.x / self.datum.semimajor();

        if lat.is_finite() && lon.is_finite() {
            Some(Point2d::new(lon.to_degrees(), lat.to_degrees()))
        } else {
            None
        }
    }
}
