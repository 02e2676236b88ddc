use std::fmt::{Display, Formatter};

use crate::geo::datum::Datum;
use crate::geo::projection::{IdentityProjection, Projection, WebMercator};

/// Coordinate reference system.
///
/// Geographic systems store longitude in `x` and latitude in `y` in degrees. Projected systems
/// store easting and northing in meters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Crs {
    datum: Datum,
    projection_type: ProjectionType,
    axis_order: AxisOrder,
}

/// Method used to project geographic coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ProjectionType {
    /// Geographic coordinates without projection.
    None,
    /// Spherical mercator (EPSG:3857).
    WebMercator,
    /// Any projection in the `geodesy` (PROJ-like) definition syntax.
    Other(String),
    /// Projection cannot be determined. Coordinates cannot be converted to or from this system.
    Unknown,
}

/// Declared order of coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AxisOrder {
    /// Easting (longitude) first.
    #[default]
    EastNorth,
    /// Northing (latitude) first, as in the formal EPSG:4326 definition.
    NorthEast,
}

impl Crs {
    /// Geographic WGS84 with longitude first.
    pub const WGS84: Crs = Crs {
        datum: Datum::WGS84,
        projection_type: ProjectionType::None,
        axis_order: AxisOrder::EastNorth,
    };

    /// Geographic WGS84 with the EPSG-declared latitude-first axis order.
    pub const EPSG4326: Crs = Crs {
        datum: Datum::WGS84,
        projection_type: ProjectionType::None,
        axis_order: AxisOrder::NorthEast,
    };

    /// Web mercator.
    pub const EPSG3857: Crs = Crs {
        datum: Datum::WGS84,
        projection_type: ProjectionType::WebMercator,
        axis_order: AxisOrder::EastNorth,
    };

    /// Creates a new CRS.
    pub fn new(datum: Datum, projection_type: ProjectionType) -> Self {
        Self {
            datum,
            projection_type,
            axis_order: AxisOrder::EastNorth,
        }
    }

    /// Returns a copy of the CRS with the given axis order.
    pub fn with_axis_order(&self, axis_order: AxisOrder) -> Self {
        Self {
            axis_order,
            ..self.clone()
        }
    }

    /// Datum of the CRS.
    pub fn datum(&self) -> Datum {
        self.datum
    }

    /// Projection type.
    pub fn projection_type(&self) -> &ProjectionType {
        &self.projection_type
    }

    /// Declared axis order.
    pub fn axis_order(&self) -> AxisOrder {
        self.axis_order
    }

    /// Returns true for geographic (not projected) systems.
    pub fn is_geographic(&self) -> bool {
        self.projection_type == ProjectionType::None
    }

    /// Returns the projection from geographic coordinates `(lon, lat)` into this CRS, if such
    /// projection is known.
    pub fn get_projection(&self) -> Option<Box<dyn Projection>> {
        match &self.projection_type {
            ProjectionType::None => Some(Box::new(IdentityProjection)),
            ProjectionType::WebMercator => Some(Box::new(WebMercator::new(self.datum))),
            #[cfg(feature = "geodesy")]
            ProjectionType::Other(definition) => Some(Box::new(
                crate::geo::projection::GeodesyProjection::new(definition)?,
            )),
            _ => None,
        }
    }
}

impl Display for Crs {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.projection_type {
            ProjectionType::None => write!(f, "geographic({:?})", self.axis_order),
            ProjectionType::WebMercator => write!(f, "web mercator"),
            ProjectionType::Other(definition) => write!(f, "{definition}"),
            ProjectionType::Unknown => write!(f, "unknown"),
        }
    }
}
