//! Implementations for some of the common projections and their compositions.

mod affine;
mod chain;
mod identity;
mod web_mercator;

pub use affine::AffineTransform;
pub use chain::{ChainProjection, InvertedProjection};
pub use identity::IdentityProjection;
pub use web_mercator::WebMercator;

#[cfg(feature = "geodesy")]
mod geodesy;
#[cfg(feature = "geodesy")]
pub use geodesy::GeodesyProjection;

use crate::cartesian::Point2d;

/// Converts points from one coordinate space into another.
pub trait Projection {
    /// Projects a point. Returns `None` if the point cannot be projected.
    fn project(&self, input: &Point2d) -> Option<Point2d>;
    /// Applies the reverse transformation to a point.
    fn unproject(&self, input: &Point2d) -> Option<Point2d>;
}

impl<T: Projection + ?Sized> Projection for Box<T> {
    fn project(&self, input: &Point2d) -> Option<Point2d> {
        (**self).project(input)
    }

    fn unproject(&self, input: &Point2d) -> Option<Point2d> {
        (**self).unproject(input)
    }
}

impl<T: Projection + ?Sized> Projection for std::rc::Rc<T> {
    fn project(&self, input: &Point2d) -> Option<Point2d> {
        (**self).project(input)
    }

    fn unproject(&self, input: &Point2d) -> Option<Point2d> {
        (**self).unproject(input)
    }
}
