use std::borrow::Cow;
use std::sync::Arc;

use mapstream_types::geo::Crs;
use mapstream_types::Geom;

use crate::data::{AttributeKind, Feature};
use crate::error::RenderError;
use crate::render::session::RenderSession;
use crate::render::style_compiler::{CompiledStyle, StyleTarget};
use crate::style::{MapLayer, Rule, ScaleRange, Symbolizer};
use crate::surface::Surface;

/// Draws the features of one layer with its compiled styles.
pub(crate) struct FeatureProcessor<'s, 'r, 'l> {
    session: &'s mut RenderSession<'r>,
    layer: &'l MapLayer,
    query_crs: Crs,
}

impl<'s, 'r, 'l> FeatureProcessor<'s, 'r, 'l> {
    /// `query_crs` is the CRS the feature query requested geometries in.
    pub(crate) fn new(session: &'s mut RenderSession<'r>, layer: &'l MapLayer, query_crs: Crs) -> Self {
        Self {
            session,
            layer,
            query_crs,
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.session.ctx.cancel.is_cancelled()
    }

    /// Reports a non-fatal failure with the layer context.
    pub(crate) fn report(&self, err: RenderError) {
        self.session
            .ctx
            .listeners
            .error_occurred(&err.in_layer(self.layer.name()));
    }

    /// Draws the feature with every style. Only fatal errors are returned, others are reported.
    pub(crate) fn process(
        &mut self,
        surface: &mut Surface,
        styles: &mut [CompiledStyle<'_>],
        feature: &Feature,
    ) -> Result<(), RenderError> {
        let mut is_rendered = false;
        for style in styles.iter_mut() {
            let rules = applicable_rules(style, feature);
            let target = match &mut style.target {
                StyleTarget::Destination => &mut *surface,
                StyleTarget::Offscreen(offscreen) => offscreen,
            };

            for symbolizer in rules.iter().flat_map(|r| r.symbolizers.iter()) {
                match self.draw(target, feature, symbolizer) {
                    Ok(drawn) => is_rendered |= drawn,
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(err) => self.report(err),
                }
            }
        }

        if is_rendered {
            self.session.ctx.listeners.feature_rendered(feature);
        }

        Ok(())
    }

    /// Draws one symbolizer. Returns false if the feature has nothing to draw.
    fn draw(
        &mut self,
        target: &mut Surface,
        feature: &Feature,
        symbolizer: &Arc<Symbolizer>,
    ) -> Result<bool, RenderError> {
        if let Symbolizer::Raster(raster) = &**symbolizer {
            let coverage = self
                .session
                .ctx
                .coverage
                .ok_or_else(|| RenderError::Coverage("no coverage renderer is set".into()))?;
            coverage.render(target, feature, raster, &self.session.raster_context())?;
            return Ok(true);
        }

        let name = symbolizer
            .geometry_name()
            .or_else(|| feature.default_geometry_name());
        let Some(geometry) = name.and_then(|name| feature.geometry_by_name(name)) else {
            return Ok(false);
        };

        let geometry = match &**symbolizer {
            Symbolizer::Point(_) => Cow::Owned(point_anchor(geometry)?),
            _ => Cow::Borrowed(geometry),
        };

        let crs = self.geometry_crs(name);
        let association = self.session.transforms.get(symbolizer, &crs)?;
        let shape = association
            .decimator
            .decimate(&geometry, &*association.transform)?;

        let scale = ScaleRange::at(self.session.area.scale);
        if let Symbolizer::Text(text) = &**symbolizer {
            self.session.ctx.labels.put(text, feature, &shape, scale);
            return Ok(true);
        }

        let Some(style) = self.session.paints.resolve(feature, symbolizer, scale) else {
            return Ok(false);
        };
        style.paint(target, &shape, self.session.hints.antialias);

        Ok(true)
    }

    /// CRS of the named geometry attribute as returned by the query.
    fn geometry_crs(&self, name: Option<&str>) -> Crs {
        let source = self.layer.source();
        if self.query_crs != *source.crs() {
            return self.query_crs.clone();
        }

        match name
            .and_then(|name| source.schema().attribute(name))
            .map(|a| &a.kind)
        {
            Some(AttributeKind::Geometry(Some(crs))) => crs.clone(),
            _ => self.query_crs.clone(),
        }
    }
}

/// Normal rules matching the feature, or all the else rules if none matched.
fn applicable_rules<'a>(style: &CompiledStyle<'a>, feature: &Feature) -> Vec<&'a Rule> {
    let matched: Vec<&Rule> = style
        .normal_rules
        .iter()
        .copied()
        .filter(|rule| rule.matches(feature))
        .collect();

    if !matched.is_empty() {
        return matched;
    }

    style.else_rules.clone()
}

/// Placement anchor of point symbolizers: the centroid of a single geometry or the centroids of
/// the members of a multi-part one.
fn point_anchor(geometry: &Geom) -> Result<Geom, RenderError> {
    let degenerate = || RenderError::DegenerateGeometry("geometry has no centroid".into());
    match geometry {
        Geom::Point(_) | Geom::MultiPoint(_) => Ok(geometry.clone()),
        single if !single.is_collection() => single.centroid().map(Geom::Point).ok_or_else(degenerate),
        collection => {
            let centroids: Vec<_> = collection
                .members()
                .iter()
                .filter_map(Geom::centroid)
                .collect();
            if centroids.is_empty() {
                Err(degenerate())
            } else {
                Ok(Geom::MultiPoint(centroids))
            }
        }
    }
}
