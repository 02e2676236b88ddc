use crate::error::TypesError;
use crate::geo::crs::Crs;
use crate::geo::projection::{ChainProjection, IdentityProjection, InvertedProjection, Projection};

/// Finds a transform converting coordinates from `source` into `target` CRS.
///
/// The transform goes through geographic coordinates: it unprojects points with the source
/// projection and projects them with the target one. Datum shifts are not applied.
pub fn find_transform(source: &Crs, target: &Crs) -> Result<Box<dyn Projection>, TypesError> {
    if source == target {
        return Ok(Box::new(IdentityProjection));
    }

    let unsupported = || TypesError::UnsupportedTransform {
        from: source.to_string(),
        to: target.to_string(),
    };

    let source_projection = source.get_projection().ok_or_else(unsupported)?;
    let target_projection = target.get_projection().ok_or_else(unsupported)?;

    if source.is_geographic() {
        return Ok(target_projection);
    }

    if target.is_geographic() {
        return Ok(Box::new(InvertedProjection::new(source_projection)));
    }

    Ok(Box::new(ChainProjection::new(
        Box::new(InvertedProjection::new(source_projection)),
        target_projection,
    )))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::cartesian::Point2d;
    use crate::geo::crs::ProjectionType;
    use crate::geo::Datum;

    #[test]
    fn same_crs_is_identity() {
        let transform = find_transform(&Crs::EPSG3857, &Crs::EPSG3857).unwrap();
        let point = Point2d::new(123.0, 456.0);
        assert_eq!(transform.project(&point), Some(point));
    }

    #[test]
    fn geographic_to_mercator_and_back() {
        let forward = find_transform(&Crs::WGS84, &Crs::EPSG3857).unwrap();
        let backward = find_transform(&Crs::EPSG3857, &Crs::WGS84).unwrap();

        let point = Point2d::new(10.0, 50.0);
        let projected = forward.project(&point).unwrap();
        let back = backward.project(&projected).unwrap();
        assert_relative_eq!(back.x, point.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, point.y, epsilon = 1e-9);
    }

    #[test]
    fn unknown_projection_is_an_error() {
        let unknown = Crs::new(Datum::WGS84, ProjectionType::Unknown);
        assert!(matches!(
            find_transform(&unknown, &Crs::WGS84),
            Err(TypesError::UnsupportedTransform { .. })
        ));
    }
}
