//! Geometry primitives, coordinate reference systems and coordinate transforms used by the
//! [`mapstream`](https://docs.rs/mapstream) renderer.
//!
//! Geometries are always two-dimensional and store `f64` coordinates. Geographic coordinates are
//! stored with longitude as `x` and latitude as `y`, independently of the axis order declared by
//! the [`Crs`](geo::Crs).

pub mod cartesian;
pub mod error;
pub mod geo;
pub mod geometry;

pub use cartesian::{Point2d, Rect, Size, Vector2d};
pub use error::TypesError;
pub use geometry::{Contour, Geom, Polygon};
