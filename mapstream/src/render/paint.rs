use std::sync::Arc;

use mapstream_types::Geom;
use quick_cache::unsync::Cache;

use crate::color::Color;
use crate::data::{Expression, Feature, Value};
use crate::style::{MarkShape, ScaleRange, Stroke, Symbolizer};
use crate::surface::Surface;

const PAINT_CACHE_CAPACITY: usize = 10_000;

/// Line paint in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceStroke {
    /// Line color.
    pub color: Color,
    /// Line width in pixels.
    pub width: f64,
}

/// Paint of a symbolizer resolved for one feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceStyle {
    /// Mark drawn at every point.
    Mark {
        /// Shape of the mark.
        shape: MarkShape,
        /// Size in pixels.
        size: f64,
        /// Fill color.
        fill: Color,
        /// Outline.
        stroke: Option<DeviceStroke>,
    },
    /// Stroke of every contour and polygon ring.
    Line(DeviceStroke),
    /// Fill of every polygon with optional outline.
    Area {
        /// Fill color.
        fill: Option<Color>,
        /// Outline.
        stroke: Option<DeviceStroke>,
    },
}

impl DeviceStyle {
    /// Paints the device space geometry onto the surface.
    pub fn paint(&self, surface: &mut Surface, geometry: &Geom, antialias: bool) {
        match geometry {
            Geom::Collection(members) => {
                for member in members {
                    self.paint(surface, member, antialias);
                }
            }
            Geom::MultiPoint(_) | Geom::MultiContour(_) | Geom::MultiPolygon(_) => {
                for member in geometry.members() {
                    self.paint(surface, &member, antialias);
                }
            }
            Geom::Point(point) => {
                if let DeviceStyle::Mark {
                    shape,
                    size,
                    fill,
                    stroke,
                } = self
                {
                    let stroke = stroke.map(|s| (s.color, s.width));
                    surface.draw_mark(point, *shape, *size, *fill, stroke, antialias);
                }
            }
            Geom::Contour(contour) => match self {
                DeviceStyle::Line(stroke) | DeviceStyle::Area { stroke: Some(stroke), .. } => {
                    surface.draw_contour(contour, stroke.color, stroke.width, antialias)
                }
                DeviceStyle::Mark { .. } => self.paint_points(surface, geometry, antialias),
                DeviceStyle::Area { stroke: None, .. } => {}
            },
            Geom::Polygon(polygon) => match self {
                DeviceStyle::Line(stroke) => {
                    for ring in polygon.iter_contours() {
                        surface.draw_contour(ring, stroke.color, stroke.width, antialias);
                    }
                }
                DeviceStyle::Area { fill, stroke } => surface.draw_polygon(
                    polygon,
                    *fill,
                    stroke.map(|s| (s.color, s.width)),
                    antialias,
                ),
                DeviceStyle::Mark { .. } => self.paint_points(surface, geometry, antialias),
            },
        }
    }

    fn paint_points(&self, surface: &mut Surface, geometry: &Geom, antialias: bool) {
        if let Some(centroid) = geometry.centroid() {
            self.paint(surface, &Geom::Point(centroid), antialias);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PaintKey {
    symbolizer: usize,
    attributes: Vec<AttributeKey>,
    scale: (u64, u64),
}

/// Hashable form of an attribute value the paint of a symbolizer depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum AttributeKey {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    String(String),
}

impl From<&Value> for AttributeKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => AttributeKey::Null,
            Value::Bool(v) => AttributeKey::Bool(*v),
            Value::Int(v) => AttributeKey::Int(*v),
            Value::Float(v) => AttributeKey::Float(v.to_bits()),
            Value::String(v) => AttributeKey::String(v.clone()),
        }
    }
}

/// Values of the attributes the symbolizer reads, in the order the symbolizer references them.
fn attribute_key(feature: &Feature, symbolizer: &Symbolizer) -> Vec<AttributeKey> {
    if !symbolizer.is_dynamic() {
        return vec![];
    }

    let mut names = vec![];
    symbolizer.collect_attributes(&mut names);
    names
        .iter()
        .map(|name| feature.property(name).map_or(AttributeKey::Null, AttributeKey::from))
        .collect()
}

/// Resolves symbolizers into device styles, caching the results.
///
/// Symbolizers that do not depend on feature attributes are resolved once per scale, others once
/// per distinct combination of the attribute values they read.
pub struct PaintResolver {
    cache: Cache<PaintKey, Option<DeviceStyle>>,
    hits: usize,
    misses: usize,
}

impl Default for PaintResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PaintResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self {
            cache: Cache::new(PAINT_CACHE_CAPACITY),
            hits: 0,
            misses: 0,
        }
    }

    /// Device style of the symbolizer for the feature. Returns `None` for symbolizers that are not
    /// painted directly (text and raster).
    pub fn resolve(
        &mut self,
        feature: &Feature,
        symbolizer: &Arc<Symbolizer>,
        scale: ScaleRange,
    ) -> Option<DeviceStyle> {
        let key = PaintKey {
            symbolizer: Arc::as_ptr(symbolizer) as usize,
            attributes: attribute_key(feature, symbolizer),
            scale: (scale.min().to_bits(), scale.max().to_bits()),
        };

        if let Some(style) = self.cache.get(&key) {
            self.hits += 1;
            return *style;
        }

        self.misses += 1;
        let style = device_style(feature, symbolizer);
        self.cache.insert(key, style);
        style
    }

    /// Number of cache hits and misses.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    /// Logs the cache hit ratio.
    pub fn log_stats(&self) {
        let total = self.hits + self.misses;
        if total > 0 {
            log::debug!(
                "Paint cache: {} hits, {} misses, hit ratio {:.2}",
                self.hits,
                self.misses,
                self.hits as f64 / total as f64
            );
        }
    }
}

fn device_style(feature: &Feature, symbolizer: &Symbolizer) -> Option<DeviceStyle> {
    match symbolizer {
        Symbolizer::Point(point) => Some(DeviceStyle::Mark {
            shape: point.mark,
            size: non_negative(&point.size, feature, 6.0),
            fill: point.fill,
            stroke: point.stroke.as_ref().map(|s| device_stroke(s, feature)),
        }),
        Symbolizer::Line(line) => Some(DeviceStyle::Line(device_stroke(&line.stroke, feature))),
        Symbolizer::Polygon(polygon) => Some(DeviceStyle::Area {
            fill: polygon.fill,
            stroke: polygon.stroke.as_ref().map(|s| device_stroke(s, feature)),
        }),
        Symbolizer::Text(_) | Symbolizer::Raster(_) => None,
    }
}

fn device_stroke(stroke: &Stroke, feature: &Feature) -> DeviceStroke {
    DeviceStroke {
        color: stroke.color,
        width: non_negative(&stroke.width, feature, 1.0),
    }
}

fn non_negative(expression: &Expression, feature: &Feature, default: f64) -> f64 {
    expression
        .evaluate_f64(feature)
        .filter(|v| v.is_finite())
        .unwrap_or(default)
        .max(0.0)
}
