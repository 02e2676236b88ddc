//! Declarative cartographic styles: layers, feature type styles, rules and symbolizers.

mod layer;
mod rule;
mod scale;
mod symbolizer;

pub use layer::MapLayer;
pub use rule::{FeatureTypeStyle, Rule, SCALE_TOLERANCE};
pub use scale::ScaleRange;
pub use symbolizer::{
    LineSymbolizer, MarkShape, PointSymbolizer, PolygonSymbolizer, RasterSymbolizer, Stroke,
    Symbolizer, TextSymbolizer,
};
