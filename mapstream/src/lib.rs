//! Mapstream is a streaming map renderer. It draws a list of styled vector layers onto a raster
//! surface in one pass over the features of every layer, keeping only the features being drawn in
//! memory.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use mapstream::data::{AttributeDescriptor, Feature, FeatureType, Filter, MemoryFeatureSource};
//! use mapstream::style::{FeatureTypeStyle, LineSymbolizer, MapLayer, Rule, Symbolizer};
//! use mapstream::{Color, StreamingRenderer, Surface};
//! use mapstream_types::geo::Crs;
//! use mapstream_types::{Contour, Point2d, Rect};
//!
//! let schema = FeatureType::new("roads", vec![AttributeDescriptor::geometry("geom")]);
//! let road = Feature::new("1")
//!     .with_property("kind", "primary")
//!     .with_geometry("geom", Contour::open(vec![Point2d::new(0.0, 0.0), Point2d::new(100.0, 100.0)]));
//! let source = MemoryFeatureSource::new(schema, Crs::EPSG3857, vec![road]);
//!
//! let style = FeatureTypeStyle::new(vec![
//!     Rule::new([Symbolizer::Line(LineSymbolizer::new(Color::RED, 2.0))])
//!         .with_predicate(Filter::equals("kind", "primary")),
//! ]);
//!
//! let mut renderer = StreamingRenderer::new(Crs::EPSG3857);
//! renderer.set_layers(vec![MapLayer::new("roads", Arc::new(source), [style])]);
//!
//! let mut surface = Surface::new(256, 256)?;
//! renderer.paint(&mut surface, Rect::new(0.0, 0.0, 256.0, 256.0), Rect::new(0.0, 0.0, 100.0, 100.0));
//! ```
//!
//! # Pipeline
//!
//! For every visible [`MapLayer`](style::MapLayer) the renderer
//!
//! * selects the rules of the layer styles that apply at the current scale
//!   ([`compile_styles`](render::compile_styles)),
//! * builds a [`Query`](data::Query) loading only the attributes the rules use, restricted to
//!   the rendered extent and, when possible, to the features the rules accept
//!   ([`plan_query`](render::plan_query)),
//! * streams the features from the [`FeatureSource`](data::FeatureSource), transforming and
//!   [decimating](render::Decimator) their geometries into pixels, and paints every symbolizer
//!   of the matching rules. Text is handed to the [`LabelCache`] and drawn after all layers.
//!
//! Each style of a layer after the first one is painted onto its own surface, composited onto the
//! destination once the layer is processed, so styles are stacked over each other in order.
//!
//! Failures of a layer, a feature or a symbolizer are reported to [`RenderListener`]s and do not
//! stop the render. A render can be stopped from another thread with a [`StopHandle`].

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

mod color;
pub mod config;
mod coverage;
pub mod data;
pub mod error;
mod label;
mod listener;
pub mod render;
pub mod style;
mod surface;

pub use color::Color;
pub use config::{RendererConfig, RenderingHints};
pub use coverage::{CoverageRenderer, RasterContext};
pub use data::{FeatureSource, Query};
pub use error::RenderError;
pub use label::{LabelCache, LabelCollector, PlacedLabel};
pub use listener::RenderListener;
pub use render::{CancelToken, RenderStatus, StopHandle, StreamingRenderer};
pub use surface::Surface;

// Reexport mapstream_types
pub use mapstream_types;
