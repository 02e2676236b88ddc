#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::data::Expression;

/// Declarative paint instruction bound to a geometry of a feature.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Symbolizer {
    /// Draws a mark at the centroid of the geometry.
    Point(PointSymbolizer),
    /// Strokes the geometry.
    Line(LineSymbolizer),
    /// Fills and strokes the geometry.
    Polygon(PolygonSymbolizer),
    /// Places a text label. Labels are handed to the [`LabelCache`](crate::LabelCache).
    Text(TextSymbolizer),
    /// Renders a grid coverage through the [`CoverageRenderer`](crate::CoverageRenderer).
    Raster(RasterSymbolizer),
}

impl Symbolizer {
    /// Name of the geometry attribute the symbolizer draws. `None` stands for the default geometry.
    pub fn geometry_name(&self) -> Option<&str> {
        match self {
            Symbolizer::Point(s) => s.geometry.as_deref(),
            Symbolizer::Line(s) => s.geometry.as_deref(),
            Symbolizer::Polygon(s) => s.geometry.as_deref(),
            Symbolizer::Text(s) => s.geometry.as_deref(),
            Symbolizer::Raster(s) => s.geometry.as_deref(),
        }
    }

    /// Expressions evaluated against a feature when the symbolizer is resolved.
    pub fn expressions(&self) -> Vec<&Expression> {
        fn stroke_width(stroke: &Option<Stroke>) -> Option<&Expression> {
            stroke.as_ref().map(|s| &s.width)
        }

        match self {
            Symbolizer::Point(s) => std::iter::once(&s.size)
                .chain(stroke_width(&s.stroke))
                .collect(),
            Symbolizer::Line(s) => vec![&s.stroke.width],
            Symbolizer::Polygon(s) => stroke_width(&s.stroke).into_iter().collect(),
            Symbolizer::Text(s) => std::iter::once(&s.label)
                .chain(s.priority.as_ref())
                .collect(),
            Symbolizer::Raster(_) => vec![],
        }
    }

    /// Returns true if the paint of the symbolizer depends on feature attributes.
    pub fn is_dynamic(&self) -> bool {
        self.expressions().iter().any(|e| !e.is_literal())
    }

    pub(crate) fn collect_attributes(&self, out: &mut Vec<String>) {
        for expression in self.expressions() {
            expression.collect_attributes(out);
        }
    }
}

/// Shape of a point mark.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MarkShape {
    /// Circle with the diameter of the mark size.
    #[default]
    Circle,
    /// Axis aligned square with the side of the mark size.
    Square,
}

/// Line paint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stroke {
    /// Color of the line.
    pub color: Color,
    /// Width of the line in pixels.
    #[cfg_attr(feature = "serde", serde(default = "default_stroke_width"))]
    pub width: Expression,
}

impl Stroke {
    /// Stroke with constant width.
    pub fn new(color: Color, width: f64) -> Self {
        Self {
            color,
            width: Expression::literal(width),
        }
    }
}

/// Point symbolizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointSymbolizer {
    /// Geometry attribute to draw.
    #[cfg_attr(feature = "serde", serde(default))]
    pub geometry: Option<String>,
    /// Shape of the mark.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mark: MarkShape,
    /// Size of the mark in pixels.
    #[cfg_attr(feature = "serde", serde(default = "default_mark_size"))]
    pub size: Expression,
    /// Fill color of the mark.
    #[cfg_attr(feature = "serde", serde(default = "default_fill"))]
    pub fill: Color,
    /// Outline of the mark.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stroke: Option<Stroke>,
}

impl PointSymbolizer {
    /// Filled mark of constant size.
    pub fn new(mark: MarkShape, size: f64, fill: Color) -> Self {
        Self {
            geometry: None,
            mark,
            size: Expression::literal(size),
            fill,
            stroke: None,
        }
    }
}

/// Line symbolizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineSymbolizer {
    /// Geometry attribute to draw.
    #[cfg_attr(feature = "serde", serde(default))]
    pub geometry: Option<String>,
    /// Line paint.
    pub stroke: Stroke,
}

impl LineSymbolizer {
    /// Line of constant width.
    pub fn new(color: Color, width: f64) -> Self {
        Self {
            geometry: None,
            stroke: Stroke::new(color, width),
        }
    }
}

/// Polygon symbolizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolygonSymbolizer {
    /// Geometry attribute to draw.
    #[cfg_attr(feature = "serde", serde(default))]
    pub geometry: Option<String>,
    /// Fill color. `None` draws only the outline.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fill: Option<Color>,
    /// Outline.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stroke: Option<Stroke>,
}

impl PolygonSymbolizer {
    /// Filled polygon without outline.
    pub fn new(fill: Color) -> Self {
        Self {
            geometry: None,
            fill: Some(fill),
            stroke: None,
        }
    }
}

/// Text symbolizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextSymbolizer {
    /// Geometry attribute the label is anchored to.
    #[cfg_attr(feature = "serde", serde(default))]
    pub geometry: Option<String>,
    /// Text of the label.
    pub label: Expression,
    /// Font size in pixels.
    #[cfg_attr(feature = "serde", serde(default = "default_font_size"))]
    pub font_size: f64,
    /// Text color.
    #[cfg_attr(feature = "serde", serde(default = "default_text_color"))]
    pub color: Color,
    /// Labels with higher priority win placement conflicts.
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: Option<Expression>,
}

impl TextSymbolizer {
    /// Label with the value of the given attribute.
    pub fn new(property: &str) -> Self {
        Self {
            geometry: None,
            label: Expression::property(property),
            font_size: 10.0,
            color: Color::BLACK,
            priority: None,
        }
    }
}

/// Raster symbolizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RasterSymbolizer {
    /// Coverage attribute to draw.
    #[cfg_attr(feature = "serde", serde(default))]
    pub geometry: Option<String>,
    /// Opacity of the coverage.
    #[cfg_attr(feature = "serde", serde(default = "default_opacity"))]
    pub opacity: f64,
}

impl Default for RasterSymbolizer {
    fn default() -> Self {
        Self {
            geometry: None,
            opacity: 1.0,
        }
    }
}

#[cfg(feature = "serde")]
fn default_stroke_width() -> Expression {
    Expression::literal(1.0)
}

#[cfg(feature = "serde")]
fn default_mark_size() -> Expression {
    Expression::literal(6.0)
}

#[cfg(feature = "serde")]
fn default_fill() -> Color {
    Color::GRAY
}

#[cfg(feature = "serde")]
fn default_font_size() -> f64 {
    10.0
}

#[cfg(feature = "serde")]
fn default_text_color() -> Color {
    Color::BLACK
}

#[cfg(feature = "serde")]
fn default_opacity() -> f64 {
    1.0
}
