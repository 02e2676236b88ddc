//! Coordinate reference systems and conversion of coordinates between them (see [`Projection`]).

mod crs;
mod datum;
pub mod projection;
mod scale;
mod transform;

pub use crs::{AxisOrder, Crs, ProjectionType};
pub use datum::Datum;
pub use projection::{
    AffineTransform, ChainProjection, IdentityProjection, InvertedProjection, Projection,
    WebMercator,
};
pub use scale::{compute_scale, OGC_DPI};
pub use transform::find_transform;
