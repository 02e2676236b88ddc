use std::sync::Arc;

use ahash::HashMap;
use mapstream_types::geo::{AffineTransform, Crs};
use mapstream_types::{Rect, Size};
use parking_lot::Mutex;

use crate::config::{RendererConfig, RenderingHints};
use crate::coverage::{CoverageRenderer, RasterContext};
use crate::data::{CursorGuard, FeatureCursor, PreloadedIndex, Query};
use crate::error::RenderError;
use crate::label::LabelCache;
use crate::listener::Listeners;
use crate::render::cancel::CancelToken;
use crate::render::paint::PaintResolver;
use crate::render::processor::FeatureProcessor;
use crate::render::query_planner::{plan_query, source_envelope};
use crate::render::style_compiler::{compile_styles, CompiledStyle, StyleTarget};
use crate::render::transform_cache::TransformCache;
use crate::render::RenderStatus;
use crate::style::MapLayer;
use crate::surface::Surface;

/// Collaborators of a render owned by the renderer.
pub(crate) struct RenderContext<'r> {
    pub(crate) config: &'r RendererConfig,
    pub(crate) listeners: &'r Listeners,
    pub(crate) labels: &'r dyn LabelCache,
    pub(crate) coverage: Option<&'r dyn CoverageRenderer>,
    pub(crate) cancel: &'r CancelToken,
    pub(crate) preloaded: &'r Mutex<HashMap<usize, Arc<PreloadedIndex>>>,
}

/// Geometry of one render.
#[derive(Debug, Clone)]
pub(crate) struct RenderArea {
    pub(crate) extent: Rect,
    pub(crate) screen: Rect,
    pub(crate) world_to_device: AffineTransform,
    pub(crate) render_crs: Crs,
    pub(crate) scale: f64,
}

/// State of one render call. Caches live only as long as the session.
pub(crate) struct RenderSession<'r> {
    pub(crate) ctx: RenderContext<'r>,
    pub(crate) area: RenderArea,
    pub(crate) surface_size: Size<u32>,
    pub(crate) hints: RenderingHints,
    pub(crate) transforms: TransformCache,
    pub(crate) paints: PaintResolver,
}

impl<'r> RenderSession<'r> {
    pub(crate) fn new(ctx: RenderContext<'r>, area: RenderArea, surface_size: Size<u32>) -> Self {
        let transforms = TransformCache::new(
            area.render_crs.clone(),
            area.world_to_device,
            area.screen,
            ctx.config.generalization_distance(),
        );

        Self {
            hints: ctx.config.hints(),
            ctx,
            area,
            surface_size,
            transforms,
            paints: PaintResolver::new(),
        }
    }

    /// Renders the visible layers in order.
    pub(crate) fn render(&mut self, surface: &mut Surface, layers: &[MapLayer]) -> RenderStatus {
        log::debug!(
            "Rendering {} layers at scale 1:{:.0}",
            layers.len(),
            self.area.scale
        );

        self.ctx.labels.start();
        for (index, layer) in layers.iter().enumerate() {
            if self.ctx.cancel.is_cancelled() {
                break;
            }

            if !layer.is_visible() {
                continue;
            }

            log::debug!("Rendering layer {}", layer.name());
            self.ctx.labels.start_layer(layer.name());

            if let Err(err) = self.render_layer(surface, layer, index) {
                let err = err.in_layer(layer.name());
                self.ctx.listeners.error_occurred(&err);
                if err.is_fatal() {
                    self.paints.log_stats();
                    return RenderStatus::Aborted;
                }
            }

            self.ctx.labels.end_layer(surface, &self.area.screen);
            log::debug!("Finished layer {}", layer.name());
        }

        self.paints.log_stats();

        if self.ctx.cancel.is_cancelled() {
            log::info!("Rendering stopped");
            return RenderStatus::Cancelled;
        }

        self.ctx.labels.end(surface, &self.area.screen);
        RenderStatus::Completed
    }

    pub(crate) fn raster_context(&self) -> RasterContext {
        RasterContext {
            extent: self.area.extent,
            screen_size: self.surface_size,
            world_to_device: self.area.world_to_device,
            hints: self.hints,
        }
    }

    fn render_layer(
        &mut self,
        surface: &mut Surface,
        layer: &MapLayer,
        index: usize,
    ) -> Result<(), RenderError> {
        let source = layer.source();
        let mut styles = compile_styles(
            layer.styles(),
            source.schema(),
            self.area.scale,
            self.surface_size,
        )?;

        if styles.is_empty() {
            log::debug!("No rules of layer {} apply at this scale", layer.name());
            return Ok(());
        }

        let preloading = self.ctx.config.memory_preloading();
        let plan = plan_query(
            layer,
            &styles,
            &self.area.extent,
            &self.area.render_crs,
            self.ctx.config,
            preloading,
        );
        log::debug!("Query for layer {}: {:?}", layer.name(), plan.query);

        let cursor: Box<dyn FeatureCursor + '_> = if preloading {
            self.preloaded_cursor(layer, index, &plan.query)?
        } else {
            source.get_features(&plan.query)?
        };
        let mut cursor = CursorGuard::new(cursor);

        let query_crs = plan.query.crs.unwrap_or_else(|| source.crs().clone());
        let mut processor = FeatureProcessor::new(self, layer, query_crs);
        while !processor.is_cancelled() {
            let Some(result) = cursor.next() else {
                break;
            };

            match result {
                Ok(feature) => processor.process(surface, &mut styles, &feature)?,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => processor.report(err),
            }
        }

        cursor.close();
        composite(surface, styles);

        Ok(())
    }

    fn preloaded_cursor(
        &self,
        layer: &MapLayer,
        index: usize,
        query: &Query,
    ) -> Result<Box<dyn FeatureCursor>, RenderError> {
        let source = layer.source();
        let preloaded = {
            let mut indexes = self.ctx.preloaded.lock();
            match indexes.get(&index) {
                Some(preloaded) if preloaded.serves(query) => preloaded.clone(),
                _ => {
                    let (preloaded, errors) = PreloadedIndex::load(source, query)?;
                    for err in errors {
                        self.ctx.listeners.error_occurred(&err.in_layer(layer.name()));
                    }

                    let preloaded = Arc::new(preloaded);
                    indexes.insert(index, preloaded.clone());
                    preloaded
                }
            }
        };

        let envelope = source_envelope(
            source,
            &self.area.extent,
            &self.area.render_crs,
            source.crs(),
        );
        Ok(preloaded.cursor(envelope, query.max_features))
    }
}

/// Paints the offscreen surfaces of the styles onto the destination in style order.
fn composite(surface: &mut Surface, styles: Vec<CompiledStyle<'_>>) {
    for style in styles {
        if let StyleTarget::Offscreen(offscreen) = style.target {
            surface.composite(&offscreen);
        }
    }
}
