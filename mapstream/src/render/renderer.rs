use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ahash::HashMap;
use mapstream_types::geo::{compute_scale, AffineTransform, AxisOrder, Crs};
use mapstream_types::Rect;
use parking_lot::Mutex;

use crate::config::{RendererConfig, RenderingHints};
use crate::coverage::CoverageRenderer;
use crate::data::PreloadedIndex;
use crate::error::RenderError;
use crate::label::{LabelCache, LabelCollector};
use crate::listener::{Listeners, RenderListener};
use crate::render::cancel::{CancelToken, StopHandle};
use crate::render::session::{RenderArea, RenderContext, RenderSession};
use crate::render::RenderStatus;
use crate::style::MapLayer;
use crate::surface::Surface;

/// Renders styled layers onto a surface in a single pass over the features of every layer.
///
/// ```ignore
/// let mut renderer = StreamingRenderer::new(Crs::EPSG3857);
/// renderer.set_layers(vec![layer]);
///
/// let mut surface = Surface::new(256, 256)?;
/// let status = renderer.paint(&mut surface, Rect::new(0.0, 0.0, 256.0, 256.0), extent);
/// ```
///
/// Failures of single layers, features or symbolizers do not stop the render. They are reported
/// to the registered [`RenderListener`]s.
pub struct StreamingRenderer {
    render_crs: Crs,
    layers: Vec<MapLayer>,
    config: RendererConfig,
    listeners: Listeners,
    labels: Arc<dyn LabelCache>,
    coverage: Option<Arc<dyn CoverageRenderer>>,
    cancel: CancelToken,
    is_rendering: AtomicBool,
    preloaded: Mutex<HashMap<usize, Arc<PreloadedIndex>>>,
}

impl StreamingRenderer {
    /// Creates a renderer drawing maps in the given CRS, with default configuration and a
    /// [`LabelCollector`].
    pub fn new(render_crs: Crs) -> Self {
        Self {
            render_crs,
            layers: vec![],
            config: RendererConfig::default(),
            listeners: Listeners::default(),
            labels: Arc::new(LabelCollector::new()),
            coverage: None,
            cancel: CancelToken::new(),
            is_rendering: AtomicBool::new(false),
            preloaded: Mutex::new(HashMap::default()),
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: RendererConfig) -> Self {
        self.set_config(config);
        self
    }

    /// Sets the label cache.
    pub fn with_label_cache(mut self, labels: Arc<dyn LabelCache>) -> Self {
        self.labels = labels;
        self
    }

    /// Sets the renderer used for raster symbolizers.
    pub fn with_coverage_renderer(mut self, coverage: Arc<dyn CoverageRenderer>) -> Self {
        self.coverage = Some(coverage);
        self
    }

    /// CRS maps are drawn in.
    pub fn render_crs(&self) -> &Crs {
        &self.render_crs
    }

    /// Layers in paint order.
    pub fn layers(&self) -> &[MapLayer] {
        &self.layers
    }

    /// Replaces the layers. Preloaded features of the previous layers are dropped.
    pub fn set_layers(&mut self, layers: Vec<MapLayer>) {
        self.layers = layers;
        self.preloaded.lock().clear();
    }

    /// Current configuration.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Replaces the configuration.
    pub fn set_config(&mut self, config: RendererConfig) {
        if !config.memory_preloading() {
            self.preloaded.lock().clear();
        }
        self.config = config;
    }

    /// Sets one of the named options of [`RendererConfig::set_option`].
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), RenderError> {
        let mut config = self.config.clone();
        config.set_option(name, value)?;
        self.set_config(config);
        Ok(())
    }

    /// Sets the generalization distance in pixels.
    pub fn set_generalization_distance(&mut self, pixels: f64) {
        self.config.set_generalization_distance(pixels);
    }

    /// Sets the rendering hints.
    pub fn set_rendering_hints(&mut self, hints: RenderingHints) {
        self.config.set_hints(hints);
    }

    /// Label cache of the renderer.
    pub fn label_cache(&self) -> &Arc<dyn LabelCache> {
        &self.labels
    }

    /// Registers a listener.
    pub fn add_render_listener(&self, listener: Arc<dyn RenderListener>) {
        self.listeners.add(listener);
    }

    /// Removes a listener registered with [`StreamingRenderer::add_render_listener`]. Returns
    /// true if the listener was registered.
    pub fn remove_render_listener(&self, listener: &Arc<dyn RenderListener>) -> bool {
        self.listeners.remove(listener)
    }

    /// Requests the render in progress to stop.
    pub fn stop_rendering(&self) {
        self.stop_handle().stop();
    }

    /// Handle that stops the render in progress from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle::new(self.cancel.clone(), self.labels.clone())
    }

    /// Renders the layers showing `extent` (in the render CRS) into the `screen` area of the
    /// surface (in pixels).
    pub fn paint(&self, surface: &mut Surface, screen: Rect, extent: Rect) -> RenderStatus {
        let Some(world_to_screen) =
            AffineTransform::world_to_screen(&extent, screen.width(), screen.height())
        else {
            log::warn!("Cannot render extent {extent:?} into screen {screen:?}");
            return RenderStatus::Skipped;
        };

        let offset =
            AffineTransform::from_coefficients(1.0, 0.0, screen.x_min(), 0.0, 1.0, screen.y_min());
        self.paint_with_transform(surface, screen, extent, world_to_screen.then(&offset))
    }

    /// Same as [`StreamingRenderer::paint`] with an explicit transform from the render CRS into
    /// surface pixels.
    pub fn paint_with_transform(
        &self,
        surface: &mut Surface,
        screen: Rect,
        extent: Rect,
        world_to_screen: AffineTransform,
    ) -> RenderStatus {
        if let Err(err) = validate(surface, &screen, &extent) {
            log::warn!("{err}");
            return RenderStatus::Skipped;
        }

        if self
            .is_rendering
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("Renderer is already rendering, paint request is ignored");
            return RenderStatus::Busy;
        }
        let _rendering = RenderingFlag(&self.is_rendering);

        let Some(scale) = self.scale(&screen, &extent, &world_to_screen) else {
            log::warn!("Cannot compute scale of extent {extent:?}");
            return RenderStatus::Skipped;
        };

        self.cancel.reset();

        let ctx = RenderContext {
            config: &self.config,
            listeners: &self.listeners,
            labels: &*self.labels,
            coverage: self.coverage.as_deref(),
            cancel: &self.cancel,
            preloaded: &self.preloaded,
        };
        let area = RenderArea {
            extent,
            screen,
            world_to_device: world_to_screen,
            render_crs: self.render_crs.clone(),
            scale,
        };

        let mut session = RenderSession::new(ctx, area, surface.size());
        session.render(surface, &self.layers)
    }

    fn scale(&self, screen: &Rect, extent: &Rect, world_to_screen: &AffineTransform) -> Option<f64> {
        let scale = match compute_scale(
            extent,
            &self.render_crs,
            screen.width(),
            screen.height(),
            self.config.dpi(),
        ) {
            Ok(scale) => scale,
            Err(err) => {
                log::warn!("Failed to compute scale, using transform scale: {err}");
                let factor = match self.render_crs.axis_order() {
                    AxisOrder::NorthEast => world_to_screen.scale_y(),
                    AxisOrder::EastNorth => world_to_screen.scale_x(),
                };
                1.0 / factor.abs()
            }
        };

        (scale.is_finite() && scale > 0.0).then_some(scale)
    }
}

struct RenderingFlag<'a>(&'a AtomicBool);

impl Drop for RenderingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn validate(surface: &Surface, screen: &Rect, extent: &Rect) -> Result<(), RenderError> {
    if extent.is_empty() || !extent.width().is_finite() || !extent.height().is_finite() {
        return Err(RenderError::InvalidArguments(format!(
            "map extent {extent:?} is empty"
        )));
    }

    let bounds = Rect::new(0.0, 0.0, surface.width() as f64, surface.height() as f64);
    if screen.is_empty()
        || screen.x_min() < bounds.x_min()
        || screen.y_min() < bounds.y_min()
        || screen.x_max() > bounds.x_max()
        || screen.y_max() > bounds.y_max()
    {
        return Err(RenderError::InvalidArguments(format!(
            "screen area {screen:?} does not fit surface {}x{}",
            surface.width(),
            surface.height()
        )));
    }

    Ok(())
}
