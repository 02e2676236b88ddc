use crate::cartesian::{Point2d, Rect};
use crate::error::TypesError;
use crate::geo::crs::Crs;

/// Screen resolution assumed by the OGC Symbology Encoding standard (0.28 mm pixel), rounded to
/// the value used by most SLD renderers.
pub const OGC_DPI: f64 = 90.0;

const METERS_PER_INCH: f64 = 0.0254;

/// Calculates the scale denominator of a map showing `envelope` on a `width x height` pixels
/// screen with the given `dpi`.
///
/// The ground distance is the great-circle length of the envelope diagonal, the screen distance
/// is the length of the screen diagonal in meters.
pub fn compute_scale(
    envelope: &Rect,
    crs: &Crs,
    width: f64,
    height: f64,
    dpi: f64,
) -> Result<f64, TypesError> {
    if !(width > 0.0 && height > 0.0 && dpi > 0.0) {
        return Err(TypesError::Degenerate(format!(
            "screen {width}x{height} at {dpi} dpi"
        )));
    }

    if envelope.is_empty() {
        return Err(TypesError::Degenerate(format!("envelope {envelope:?}")));
    }

    let projection = crs
        .get_projection()
        .ok_or_else(|| TypesError::UnsupportedTransform {
            from: crs.to_string(),
            to: "geographic".into(),
        })?;

    let unproject = |p: Point2d| projection.unproject(&p).ok_or(TypesError::Projection(p.x, p.y));
    let lower_left = unproject(Point2d::new(envelope.x_min(), envelope.y_min()))?;
    let upper_right = unproject(Point2d::new(envelope.x_max(), envelope.y_max()))?;

    let ground = crs
        .datum()
        .distance(lower_left.x, lower_left.y, upper_right.x, upper_right.y);
    let screen = width.hypot(height) / dpi * METERS_PER_INCH;

    let scale = ground / screen;
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(TypesError::Degenerate(format!("scale {scale}")))
    }
}
