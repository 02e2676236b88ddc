//! Deferred label placement. See [`LabelCache`].

use mapstream_types::{Geom, Point2d, Rect};
use parking_lot::Mutex;

use crate::color::Color;
use crate::data::Feature;
use crate::style::{ScaleRange, TextSymbolizer};
use crate::surface::Surface;

/// Collects labels during a render and places them once all geometries are drawn.
///
/// The renderer calls `start` once per render, `start_layer`/`end_layer` around every layer and
/// `end` after the last layer. `stop` may be called from any thread while a render is in progress.
pub trait LabelCache: Send + Sync {
    /// A new render begins.
    fn start(&self);
    /// Processing of a layer begins.
    fn start_layer(&self, layer: &str);
    /// Adds a label of the feature anchored to the device space shape.
    fn put(&self, symbolizer: &TextSymbolizer, feature: &Feature, shape: &Geom, scale: ScaleRange);
    /// All features of the layer are processed.
    fn end_layer(&self, surface: &mut Surface, area: &Rect);
    /// The render is complete. Pending labels are placed within `area`.
    fn end(&self, surface: &mut Surface, area: &Rect);
    /// The render is cancelled. Labels put after this call are ignored.
    fn stop(&self);
}

/// Label with a resolved text and its approximate device space extent.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    /// Text of the label.
    pub text: String,
    /// Id of the labelled feature.
    pub feature_id: String,
    /// Layer of the feature.
    pub layer: String,
    /// Anchor point in pixels.
    pub anchor: Point2d,
    /// Box occupied by the text in pixels.
    pub bbox: Rect,
    /// Text color.
    pub color: Color,
    /// Labels with higher priority are placed first.
    pub priority: f64,
}

#[derive(Debug, Default)]
struct CollectorState {
    layer: String,
    pending: Vec<PlacedLabel>,
    placed: Vec<PlacedLabel>,
    put_count: usize,
    is_stopped: bool,
}

/// [`LabelCache`] that places labels greedily by priority, dropping labels that overlap an
/// already placed one.
///
/// Text boxes are approximated from the font size since glyphs are not shaped. The collector does
/// not paint the text: placed labels are available through [`LabelCollector::placed`].
#[derive(Debug, Default)]
pub struct LabelCollector {
    state: Mutex<CollectorState>,
}

const CHAR_WIDTH_FACTOR: f64 = 0.6;

impl LabelCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels placed by the last completed render.
    pub fn placed(&self) -> Vec<PlacedLabel> {
        self.state.lock().placed.clone()
    }

    /// Number of labels put since the last `start`.
    pub fn put_count(&self) -> usize {
        self.state.lock().put_count
    }

    /// Returns true if the current render was stopped.
    pub fn is_stopped(&self) -> bool {
        self.state.lock().is_stopped
    }
}

impl LabelCache for LabelCollector {
    fn start(&self) {
        *self.state.lock() = CollectorState::default();
    }

    fn start_layer(&self, layer: &str) {
        self.state.lock().layer = layer.to_string();
    }

    fn put(&self, symbolizer: &TextSymbolizer, feature: &Feature, shape: &Geom, _scale: ScaleRange) {
        let mut state = self.state.lock();
        if state.is_stopped {
            return;
        }

        state.put_count += 1;

        let text = symbolizer.label.evaluate(feature);
        if text.is_null() {
            return;
        }

        let text = text.to_string();
        let Some(anchor) = shape.centroid() else {
            return;
        };

        let half_width = text.chars().count() as f64 * symbolizer.font_size * CHAR_WIDTH_FACTOR / 2.0;
        let half_height = symbolizer.font_size / 2.0;
        let priority = symbolizer
            .priority
            .as_ref()
            .and_then(|p| p.evaluate_f64(feature))
            .unwrap_or(0.0);

        let label = PlacedLabel {
            text,
            feature_id: feature.id().to_string(),
            layer: state.layer.clone(),
            anchor,
            bbox: Rect::new(
                anchor.x - half_width,
                anchor.y - half_height,
                anchor.x + half_width,
                anchor.y + half_height,
            ),
            color: symbolizer.color,
            priority,
        };
        state.pending.push(label);
    }

    fn end_layer(&self, _surface: &mut Surface, _area: &Rect) {}

    fn end(&self, _surface: &mut Surface, area: &Rect) {
        let mut state = self.state.lock();
        let mut pending = std::mem::take(&mut state.pending);
        pending.sort_by(|a, b| b.priority.total_cmp(&a.priority));

        let mut placed: Vec<PlacedLabel> = vec![];
        for label in pending {
            if !area.intersects(&label.bbox) {
                continue;
            }

            if placed.iter().any(|p| overlaps(&p.bbox, &label.bbox)) {
                continue;
            }

            placed.push(label);
        }

        log::debug!("Placed {} labels", placed.len());
        state.placed = placed;
    }

    fn stop(&self) {
        let mut state = self.state.lock();
        state.is_stopped = true;
        state.pending.clear();
    }
}

fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.intersection(b)
        .is_some_and(|i| i.width() > 0.0 && i.height() > 0.0)
}
