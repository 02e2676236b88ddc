//! See [`CoverageRenderer`].

use mapstream_types::geo::AffineTransform;
use mapstream_types::{Rect, Size};

use crate::config::RenderingHints;
use crate::data::Feature;
use crate::error::RenderError;
use crate::style::RasterSymbolizer;
use crate::surface::Surface;

/// Parameters of the render a coverage is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterContext {
    /// Map extent in the render CRS.
    pub extent: Rect,
    /// Size of the screen in pixels.
    pub screen_size: Size<u32>,
    /// Transform from the render CRS into pixels.
    pub world_to_device: AffineTransform,
    /// Rendering hints.
    pub hints: RenderingHints,
}

/// Draws grid coverages for raster symbolizers.
pub trait CoverageRenderer: Send + Sync {
    /// Draws the coverage of the feature onto the surface.
    fn render(
        &self,
        surface: &mut Surface,
        feature: &Feature,
        symbolizer: &RasterSymbolizer,
        context: &RasterContext,
    ) -> Result<(), RenderError>;
}
