use crate::cartesian::Point2d;
use crate::geo::projection::Projection;

/// Projection that returns the input points unchanged.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct IdentityProjection;

impl Projection for IdentityProjection {
    fn project(&self, input: &Point2d) -> Option<Point2d> {
        Some(*input)
    }

    fn unproject(&self, input: &Point2d) -> Option<Point2d> {
        Some(*input)
    }
}
