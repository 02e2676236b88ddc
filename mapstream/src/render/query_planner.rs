use mapstream_types::geo::{find_transform, Crs, Projection};
use mapstream_types::Rect;

use crate::config::RendererConfig;
use crate::data::{push_unique, AttributeKind, FeatureSource, Filter, Query};
use crate::render::style_compiler::CompiledStyle;
use crate::style::{MapLayer, Symbolizer};

/// Number of segments each edge of an envelope is split into for reprojection.
const ENVELOPE_SEGMENTS: usize = 16;

/// Query built for a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Query to execute.
    pub query: Query,
    /// True if the rule predicates are part of the query filter.
    pub rules_pushed: bool,
}

/// Builds the query for the features of a layer drawn with the compiled styles.
///
/// `envelope` is the render extent in `render_crs`. When `preloaded` is set the query carries no
/// spatial filter since the features are clipped by the in-memory index.
pub fn plan_query(
    layer: &MapLayer,
    styles: &[CompiledStyle<'_>],
    envelope: &Rect,
    render_crs: &Crs,
    config: &RendererConfig,
    preloaded: bool,
) -> QueryPlan {
    let source = layer.source();
    let default_geometry = source.schema().default_geometry();

    let mut query = Query::all().with_crs(source.crs().clone());
    let mut rules_pushed = false;

    if config.optimized_data_loading() {
        let mut properties = vec![];
        for rule in styles.iter().flat_map(|s| s.rules()) {
            rule.collect_attributes(default_geometry, &mut properties);
        }

        let spatial = if preloaded {
            Filter::Include
        } else {
            spatial_filter(source, styles, envelope, render_crs)
        };

        let rules = rule_filter(styles, config.max_filters_to_datastore());
        rules_pushed = rules.is_some();

        query.filter = Filter::and([spatial, rules.unwrap_or(Filter::Include)]);
        query.properties = Some(properties);
    }

    if let Some(constraint) = layer.constraint() {
        query = query.merge(constraint);
    }

    QueryPlan {
        query,
        rules_pushed,
    }
}

/// Disjunction of the rule predicates, or `None` if the rules have to be evaluated in process.
fn rule_filter(styles: &[CompiledStyle<'_>], max_filters: usize) -> Option<Filter> {
    let mut predicates: Vec<&Filter> = vec![];
    for style in styles {
        if !style.else_rules().is_empty() {
            return None;
        }

        for rule in style.normal_rules() {
            let predicate = rule.predicate.as_ref()?;
            if !predicates.contains(&predicate) {
                predicates.push(predicate);
            }
        }
    }

    if predicates.is_empty() || predicates.len() > max_filters {
        return None;
    }

    Some(Filter::or(predicates.into_iter().cloned()))
}

/// Bounding box filter over every geometry attribute the symbolizers draw.
fn spatial_filter(
    source: &dyn FeatureSource,
    styles: &[CompiledStyle<'_>],
    envelope: &Rect,
    render_crs: &Crs,
) -> Filter {
    let schema = source.schema();
    let symbolizers = styles
        .iter()
        .flat_map(|s| s.rules())
        .flat_map(|r| r.symbolizers.iter());

    let mut geometries = vec![];
    for symbolizer in symbolizers {
        if let Symbolizer::Raster(_) = &**symbolizer {
            // coverages are clipped by the coverage renderer
            return Filter::Include;
        }

        if let Some(name) = symbolizer.geometry_name().or(schema.default_geometry()) {
            push_unique(&mut geometries, name);
        }
    }

    let mut filters = vec![];
    for name in geometries {
        let crs = match schema.attribute(&name).map(|a| &a.kind) {
            Some(AttributeKind::Geometry(Some(crs))) => crs,
            _ => source.crs(),
        };

        let Some(source_envelope) = source_envelope(source, envelope, render_crs, crs) else {
            // a full scan is the only safe query
            return Filter::Include;
        };

        let geometry = if Some(name.as_str()) == schema.default_geometry() {
            None
        } else {
            Some(name)
        };
        filters.push(Filter::Bbox {
            geometry,
            envelope: source_envelope,
        });
    }

    if filters.is_empty() {
        return Filter::Include;
    }

    Filter::or(filters)
}

/// Envelope of the render extent in the CRS of the source, or `None` if no envelope can be
/// determined.
pub(crate) fn source_envelope(
    source: &dyn FeatureSource,
    envelope: &Rect,
    render_crs: &Crs,
    source_crs: &Crs,
) -> Option<Rect> {
    if render_crs == source_crs {
        return Some(*envelope);
    }

    let reprojected = find_transform(render_crs, source_crs).ok().and_then(|transform| {
        envelope
            .boundary_points(ENVELOPE_SEGMENTS)
            .iter()
            .map(|p| transform.project(p))
            .collect::<Option<Vec<_>>>()
            .and_then(|points| Rect::from_points(points.iter()))
    });

    if reprojected.is_some() {
        return reprojected;
    }

    match source.bounds() {
        Some(bounds) if bounds.intersects(envelope) => {
            log::warn!(
                "Failed to reproject envelope from {render_crs} to {source_crs}, using it without reprojection"
            );
            Some(*envelope)
        }
        _ => {
            log::warn!(
                "Failed to reproject envelope from {render_crs} to {source_crs}, spatial filter is dropped"
            );
            None
        }
    }
}
