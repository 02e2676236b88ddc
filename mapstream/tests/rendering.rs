mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use common::*;
use mapstream::data::{Expression, Feature, Filter};
use mapstream::style::{
    FeatureTypeStyle, LineSymbolizer, MapLayer, PolygonSymbolizer, RasterSymbolizer, Rule,
    Symbolizer, TextSymbolizer,
};
use mapstream::{
    Color, CoverageRenderer, LabelCollector, Query, RasterContext, RenderError, RenderStatus,
    RendererConfig, StreamingRenderer, Surface,
};
use mapstream_types::geo::Crs;
use mapstream_types::{Contour, Point2d, Rect};

fn fill(color: Color) -> Symbolizer {
    Symbolizer::Polygon(PolygonSymbolizer::new(color))
}

fn surface() -> Surface {
    Surface::new(100, 100).unwrap()
}

fn renderer_with(layers: Vec<MapLayer>) -> StreamingRenderer {
    let mut renderer = StreamingRenderer::new(Crs::EPSG3857);
    renderer.set_layers(layers);
    renderer
}

#[test]
fn only_rules_within_scale_are_painted() {
    init_logger();
    let source = memory_source(
        Crs::EPSG3857,
        vec![area("a", "primary", rect_polygon(-100.0, -100.0, 100.0, 100.0))],
    );
    let style = FeatureTypeStyle::new(vec![
        Rule::new([fill(Color::RED)]).with_scale_range(Some(0.0), Some(1000.0)),
        Rule::new([fill(Color::BLUE)]).with_scale_range(Some(1000.0), None),
    ]);
    let renderer = renderer_with(vec![MapLayer::new("areas", source.clone(), [style])]);

    // About 1:500
    let mut large_scale = surface();
    let status = renderer.paint(&mut large_scale, SCREEN, Rect::new(0.0, 0.0, 14.0, 14.0));
    assert_eq!(status, RenderStatus::Completed);
    assert_eq!(large_scale.pixel(50, 50), Some(Color::RED));

    let mut small_scale = surface();
    let status = renderer.paint(&mut small_scale, SCREEN, Rect::new(0.0, 0.0, 90.0, 90.0));
    assert_eq!(status, RenderStatus::Completed);
    assert_eq!(small_scale.pixel(50, 50), Some(Color::BLUE));

    assert_eq!(source.open_cursors(), 0);
}

#[test]
fn every_matching_rule_is_applied() {
    let source = memory_source(
        Crs::EPSG3857,
        vec![
            area("wide", "primary", rect_polygon(0.0, 0.0, 50.0, 100.0)).with_property("lanes", 4),
            area("narrow", "primary", rect_polygon(50.0, 0.0, 100.0, 100.0))
                .with_property("lanes", 1),
        ],
    );
    let style = FeatureTypeStyle::new(vec![
        Rule::new([fill(Color::GREEN)]).with_predicate(Filter::equals("kind", "primary")),
        Rule::new([Symbolizer::Text(TextSymbolizer::new("name"))]).with_predicate(
            Filter::compare("lanes", mapstream::data::CompareOp::GreaterOrEqual, 2),
        ),
    ]);
    let labels = Arc::new(LabelCollector::new());
    let mut renderer = StreamingRenderer::new(Crs::EPSG3857).with_label_cache(labels.clone());
    renderer.set_layers(vec![MapLayer::new("roads", source, [style])]);

    let mut target = surface();
    let status = renderer.paint(&mut target, SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(status, RenderStatus::Completed);
    assert_eq!(target.pixel(25, 50), Some(Color::GREEN));
    assert_eq!(target.pixel(75, 50), Some(Color::GREEN));
    assert_eq!(labels.put_count(), 1);
    assert_eq!(labels.placed()[0].text, "wide");
}

#[test]
fn else_rules_paint_unmatched_features() {
    let source = memory_source(
        Crs::EPSG3857,
        vec![
            area("left", "primary", rect_polygon(0.0, 0.0, 50.0, 100.0)),
            area("right", "other", rect_polygon(50.0, 0.0, 100.0, 100.0)),
        ],
    );
    let style = FeatureTypeStyle::new(vec![
        Rule::new([fill(Color::RED)]).with_predicate(Filter::equals("kind", "primary")),
        Rule::new([fill(Color::BLUE)]).into_else(),
    ]);
    let renderer = renderer_with(vec![MapLayer::new("areas", source.clone(), [style])]);

    let mut target = surface();
    renderer.paint(&mut target, SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(target.pixel(25, 50), Some(Color::RED));
    assert_eq!(target.pixel(75, 50), Some(Color::BLUE));

    // Else rules disable the predicate pushdown.
    let query = &source.executed_queries()[0];
    assert_eq!(query.filter, Filter::bbox(Rect::new(0.0, 0.0, 100.0, 100.0)));
}

#[test]
fn later_styles_are_composited_on_top() {
    let source = memory_source(
        Crs::EPSG3857,
        vec![
            area("small", "small", rect_polygon(40.0, 40.0, 60.0, 60.0)),
            area("big", "big", rect_polygon(0.0, 0.0, 100.0, 100.0)),
        ],
    );
    let background = FeatureTypeStyle::new(vec![
        Rule::new([fill(Color::BLUE)]).with_predicate(Filter::equals("kind", "big"))
    ]);
    let foreground = FeatureTypeStyle::new(vec![
        Rule::new([fill(Color::RED)]).with_predicate(Filter::equals("kind", "small"))
    ]);
    let renderer = renderer_with(vec![MapLayer::new(
        "areas",
        source,
        [background, foreground],
    )]);

    let mut target = surface();
    let status = renderer.paint(&mut target, SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(status, RenderStatus::Completed);
    assert_eq!(target.pixel(50, 50), Some(Color::RED));
    assert_eq!(target.pixel(10, 10), Some(Color::BLUE));
}

#[test]
fn predicates_are_pushed_to_the_source() {
    let source = memory_source(
        Crs::EPSG3857,
        vec![area("a", "primary", rect_polygon(0.0, 0.0, 10.0, 10.0))],
    );
    let style = FeatureTypeStyle::new(vec![
        Rule::new([Symbolizer::Line(LineSymbolizer::new(Color::RED, 2.0))])
            .with_predicate(Filter::equals("kind", "primary")),
        Rule::new([Symbolizer::Line(LineSymbolizer::new(Color::BLUE, 1.0))])
            .with_predicate(Filter::equals("kind", "secondary")),
    ]);
    let renderer = renderer_with(vec![MapLayer::new("roads", source.clone(), [style])]);

    let extent = Rect::new(0.0, 0.0, 100.0, 100.0);
    renderer.paint(&mut surface(), SCREEN, extent);

    let queries = source.executed_queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(
        queries[0].filter,
        Filter::And(vec![
            Filter::bbox(extent),
            Filter::Or(vec![
                Filter::equals("kind", "primary"),
                Filter::equals("kind", "secondary"),
            ]),
        ])
    );
    assert_eq!(
        queries[0].properties,
        Some(vec!["kind".to_string(), "geom".to_string()])
    );
    assert_eq!(queries[0].crs, Some(Crs::EPSG3857));
}

#[test]
fn unoptimized_loading_requests_everything() {
    let source = memory_source(
        Crs::EPSG3857,
        vec![area("a", "primary", rect_polygon(0.0, 0.0, 10.0, 10.0))],
    );
    let style = FeatureTypeStyle::new(vec![
        Rule::new([fill(Color::RED)]).with_predicate(Filter::equals("kind", "primary"))
    ]);
    let mut renderer = StreamingRenderer::new(Crs::EPSG3857)
        .with_config(RendererConfig::default().with_optimized_data_loading(false));
    renderer.set_layers(vec![MapLayer::new("areas", source.clone(), [style])]);

    renderer.paint(&mut surface(), SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));

    let queries = source.executed_queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].filter, Filter::Include);
    assert_eq!(queries[0].properties, None);
}

#[test]
fn layer_constraint_is_merged_into_query() {
    let source = memory_source(
        Crs::EPSG3857,
        vec![
            area("a", "primary", rect_polygon(0.0, 0.0, 100.0, 100.0)),
            area("b", "other", rect_polygon(0.0, 0.0, 100.0, 100.0)),
        ],
    );
    let style = FeatureTypeStyle::new(vec![Rule::new([fill(Color::RED)])]);
    let listener = Arc::new(RecordingListener::default());
    let renderer = renderer_with(vec![MapLayer::new("areas", source.clone(), [style])
        .with_constraint(Query::with_filter(Filter::equals("kind", "other")))]);
    renderer.add_render_listener(listener.clone());

    renderer.paint(&mut surface(), SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));

    assert_eq!(listener.rendered(), vec!["b".to_string()]);
    assert_eq!(
        source.executed_queries()[0].filter,
        Filter::And(vec![
            Filter::bbox(Rect::new(0.0, 0.0, 100.0, 100.0)),
            Filter::equals("kind", "other"),
        ])
    );
}

#[test]
fn stop_from_listener_cancels_render() {
    let first = memory_source(
        Crs::EPSG3857,
        (0..5)
            .map(|i| area(&format!("f{i}"), "primary", rect_polygon(0.0, 0.0, 10.0, 10.0)))
            .collect(),
    );
    let second = memory_source(
        Crs::EPSG3857,
        vec![area("other", "primary", rect_polygon(0.0, 0.0, 10.0, 10.0))],
    );
    let style = || FeatureTypeStyle::new(vec![Rule::new([fill(Color::RED)])]);
    let labels = Arc::new(LabelCollector::new());
    let mut renderer = StreamingRenderer::new(Crs::EPSG3857).with_label_cache(labels.clone());
    renderer.set_layers(vec![
        MapLayer::new("first", first.clone(), [style()]),
        MapLayer::new("second", second.clone(), [style()]),
    ]);
    let listener = Arc::new(RecordingListener::stopping(renderer.stop_handle()));
    renderer.add_render_listener(listener.clone());

    let status = renderer.paint(&mut surface(), SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));

    assert_eq!(status, RenderStatus::Cancelled);
    assert_eq!(listener.rendered(), vec!["f0".to_string()]);
    assert_eq!(first.open_cursors(), 0);
    assert!(second.executed_queries().is_empty());
    assert!(labels.is_stopped());

    // next paint starts over
    let status = renderer.paint(&mut surface(), SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(status, RenderStatus::Completed);
    assert_eq!(second.executed_queries().len(), 1);
}

#[test]
fn text_goes_to_label_cache_only() {
    let source = memory_source(
        Crs::EPSG3857,
        vec![
            point("west", 10.0, 10.0),
            point("center", 50.0, 50.0),
            point("east", 90.0, 90.0),
        ],
    );
    let style = FeatureTypeStyle::new(vec![Rule::new([Symbolizer::Text(TextSymbolizer::new(
        "name",
    ))])]);
    let labels = Arc::new(LabelCollector::new());
    let mut renderer = StreamingRenderer::new(Crs::EPSG3857).with_label_cache(labels.clone());
    renderer.set_layers(vec![MapLayer::new("places", source, [style])]);
    let listener = Arc::new(RecordingListener::default());
    renderer.add_render_listener(listener.clone());

    let mut target = surface();
    let status = renderer.paint(&mut target, SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));

    assert_eq!(status, RenderStatus::Completed);
    assert!(target.is_blank());
    assert_eq!(labels.put_count(), 3);
    assert_eq!(listener.rendered().len(), 3);

    let placed = labels.placed();
    assert_eq!(placed.len(), 3);
    assert!(placed.iter().all(|label| label.layer == "places"));
}

#[test]
fn failing_feature_does_not_stop_siblings() {
    let source = memory_source(
        Crs::EPSG3857,
        vec![
            Feature::new("broken")
                .with_property("kind", "primary")
                .with_geometry("geom", Contour::open(vec![Point2d::new(1.0, 1.0)])),
            Feature::new("good")
                .with_property("kind", "primary")
                .with_geometry(
                    "geom",
                    Contour::open(vec![Point2d::new(0.0, 50.0), Point2d::new(100.0, 50.0)]),
                ),
        ],
    );
    let style = FeatureTypeStyle::new(vec![Rule::new([Symbolizer::Line(LineSymbolizer::new(
        Color::BLACK,
        4.0,
    ))])]);
    let renderer = renderer_with(vec![MapLayer::new("roads", source.clone(), [style])]);
    let listener = Arc::new(RecordingListener::default());
    renderer.add_render_listener(listener.clone());

    let mut target = surface();
    let status = renderer.paint(&mut target, SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));

    assert_eq!(status, RenderStatus::Completed);
    assert_eq!(listener.rendered(), vec!["good".to_string()]);
    let errors = listener.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("roads"), "{}", errors[0]);
    assert!(errors[0].contains("degenerate"), "{}", errors[0]);
    assert_eq!(target.pixel(50, 50), Some(Color::BLACK));
    assert_eq!(source.open_cursors(), 0);
}

#[test]
fn attribute_paint_follows_values_not_ids() {
    let lane = |x: f64, lanes: i64| {
        memory_source(
            Crs::EPSG3857,
            vec![Feature::new("1").with_property("lanes", lanes).with_geometry(
                "geom",
                Contour::open(vec![Point2d::new(x, 0.0), Point2d::new(x, 100.0)]),
            )],
        )
    };
    let mut line = LineSymbolizer::new(Color::BLACK, 1.0);
    line.stroke.width = Expression::property("lanes");
    let style = FeatureTypeStyle::new(vec![Rule::new([Symbolizer::Line(line)])]);
    let renderer = renderer_with(vec![
        MapLayer::new("narrow", lane(20.0, 1), [style.clone()]),
        MapLayer::new("wide", lane(70.0, 20), [style]),
    ]);

    let mut target = surface();
    let status = renderer.paint(&mut target, SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));

    assert_eq!(status, RenderStatus::Completed);
    assert_ne!(target.pixel(26, 50), Some(Color::BLACK));
    assert_eq!(target.pixel(76, 50), Some(Color::BLACK));
    assert_eq!(target.pixel(64, 50), Some(Color::BLACK));
}

#[test]
fn failing_symbolizer_does_not_stop_other_symbolizers() {
    let source = memory_source(
        Crs::EPSG3857,
        vec![area("park", "green", rect_polygon(0.0, 0.0, 100.0, 100.0))
            .with_geometry("route", Contour::open(vec![Point2d::new(1.0, 1.0)]))],
    );
    let mut route = LineSymbolizer::new(Color::BLACK, 4.0);
    route.geometry = Some("route".into());
    let style = FeatureTypeStyle::new(vec![Rule::new([
        Symbolizer::Line(route),
        fill(Color::GREEN),
    ])]);
    let renderer = renderer_with(vec![MapLayer::new("parks", source.clone(), [style])]);
    let listener = Arc::new(RecordingListener::default());
    renderer.add_render_listener(listener.clone());

    let mut target = surface();
    let status = renderer.paint(&mut target, SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));

    assert_eq!(status, RenderStatus::Completed);
    let errors = listener.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("degenerate"), "{}", errors[0]);
    assert_eq!(target.pixel(50, 50), Some(Color::GREEN));
    assert_eq!(listener.rendered(), vec!["park".to_string()]);
    assert_eq!(source.open_cursors(), 0);
}

#[test]
fn failing_layer_does_not_stop_others() {
    let good = memory_source(
        Crs::EPSG3857,
        vec![area("a", "primary", rect_polygon(0.0, 0.0, 100.0, 100.0))],
    );
    let style = || FeatureTypeStyle::new(vec![Rule::new([fill(Color::GREEN)])]);
    let renderer = renderer_with(vec![
        MapLayer::new("broken", Arc::new(BrokenSource::new()), [style()]),
        MapLayer::new("good", good, [style()]),
    ]);
    let listener = Arc::new(RecordingListener::default());
    renderer.add_render_listener(listener.clone());

    let mut target = surface();
    let status = renderer.paint(&mut target, SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));

    assert_eq!(status, RenderStatus::Completed);
    assert_eq!(listener.rendered(), vec!["a".to_string()]);
    assert_eq!(
        listener.errors(),
        vec!["failed to render layer 'broken': feature source error: connection refused".to_string()]
    );
    assert_eq!(target.pixel(50, 50), Some(Color::GREEN));
}

#[test]
fn invisible_layers_are_skipped() {
    let source = memory_source(
        Crs::EPSG3857,
        vec![area("a", "primary", rect_polygon(0.0, 0.0, 100.0, 100.0))],
    );
    let style = FeatureTypeStyle::new(vec![Rule::new([fill(Color::RED)])]);
    let renderer = renderer_with(vec![
        MapLayer::new("hidden", source.clone(), [style]).with_visible(false)
    ]);

    let mut target = surface();
    assert_eq!(
        renderer.paint(&mut target, SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0)),
        RenderStatus::Completed
    );
    assert!(target.is_blank());
    assert!(source.executed_queries().is_empty());
}

#[test]
fn invalid_arguments_skip_render() {
    let source = memory_source(
        Crs::EPSG3857,
        vec![area("a", "primary", rect_polygon(0.0, 0.0, 100.0, 100.0))],
    );
    let style = FeatureTypeStyle::new(vec![Rule::new([fill(Color::RED)])]);
    let renderer = renderer_with(vec![MapLayer::new("areas", source.clone(), [style])]);

    let mut target = surface();
    assert_eq!(
        renderer.paint(
            &mut target,
            Rect::new(0.0, 0.0, 200.0, 200.0),
            Rect::new(0.0, 0.0, 100.0, 100.0)
        ),
        RenderStatus::Skipped
    );
    assert_eq!(
        renderer.paint(&mut target, SCREEN, Rect::new(0.0, 0.0, 0.0, 100.0)),
        RenderStatus::Skipped
    );
    assert!(target.is_blank());
    assert!(source.executed_queries().is_empty());
}

#[test]
fn geographic_source_is_reprojected() {
    let source = memory_source(
        Crs::WGS84,
        vec![area("a", "primary", rect_polygon(-1.0, -1.0, 1.0, 1.0))],
    );
    let style = FeatureTypeStyle::new(vec![Rule::new([fill(Color::RED)])]);
    let renderer = renderer_with(vec![MapLayer::new("areas", source.clone(), [style])]);
    let listener = Arc::new(RecordingListener::default());
    renderer.add_render_listener(listener.clone());

    let mut target = surface();
    let status = renderer.paint(
        &mut target,
        SCREEN,
        Rect::new(-50_000.0, -50_000.0, 50_000.0, 50_000.0),
    );

    assert_eq!(status, RenderStatus::Completed);
    assert!(listener.errors().is_empty(), "{:?}", listener.errors());
    assert_eq!(target.pixel(50, 50), Some(Color::RED));
    assert_eq!(target.pixel(1, 98), Some(Color::RED));

    let query = &source.executed_queries()[0];
    assert_eq!(query.crs, Some(Crs::WGS84));
    assert_matches!(&query.filter, Filter::Bbox { envelope, .. } if envelope.x_max < 1.0);
}

#[test]
fn preloaded_features_are_reused() {
    let source = memory_source(
        Crs::EPSG3857,
        vec![
            area("west", "primary", rect_polygon(0.0, 0.0, 10.0, 10.0)),
            area("east", "primary", rect_polygon(1000.0, 0.0, 1010.0, 10.0)),
        ],
    );
    let style = FeatureTypeStyle::new(vec![Rule::new([fill(Color::RED)])]);
    let layer = || MapLayer::new("areas", source.clone(), [style.clone()]);
    let mut renderer = StreamingRenderer::new(Crs::EPSG3857)
        .with_config(RendererConfig::default().with_memory_preloading(true));
    renderer.set_layers(vec![layer()]);
    let listener = Arc::new(RecordingListener::default());
    renderer.add_render_listener(listener.clone());

    renderer.paint(&mut surface(), SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));
    renderer.paint(&mut surface(), SCREEN, Rect::new(950.0, 0.0, 1050.0, 100.0));

    assert_eq!(source.executed_queries().len(), 1);
    assert_eq!(listener.rendered(), vec!["west".to_string(), "east".to_string()]);
    assert_eq!(source.open_cursors(), 0);

    renderer.set_layers(vec![layer()]);
    renderer.paint(&mut surface(), SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(source.executed_queries().len(), 2);
}

#[test]
fn preloaded_layers_respect_feature_limit() {
    let source = memory_source(
        Crs::EPSG3857,
        vec![
            area("first", "primary", rect_polygon(0.0, 0.0, 10.0, 10.0)),
            area("second", "primary", rect_polygon(20.0, 0.0, 30.0, 10.0)),
            area("third", "primary", rect_polygon(40.0, 0.0, 50.0, 10.0)),
        ],
    );
    let style = FeatureTypeStyle::new(vec![Rule::new([fill(Color::RED)])]);
    let mut renderer = StreamingRenderer::new(Crs::EPSG3857)
        .with_config(RendererConfig::default().with_memory_preloading(true));
    renderer.set_layers(vec![MapLayer::new("areas", source.clone(), [style])
        .with_constraint(Query::all().with_max_features(2))]);
    let listener = Arc::new(RecordingListener::default());
    renderer.add_render_listener(listener.clone());

    renderer.paint(&mut surface(), SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));
    renderer.paint(&mut surface(), SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));

    assert_eq!(source.executed_queries().len(), 1);
    assert_eq!(
        listener.rendered(),
        vec!["first", "second", "first", "second"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    );
    assert_eq!(source.open_cursors(), 0);
}

struct SolidCoverage {
    calls: AtomicUsize,
}

impl CoverageRenderer for SolidCoverage {
    fn render(
        &self,
        surface: &mut Surface,
        _feature: &Feature,
        symbolizer: &RasterSymbolizer,
        context: &RasterContext,
    ) -> Result<(), RenderError> {
        assert_eq!(context.screen_size.width(), 100);
        self.calls.fetch_add(1, Ordering::Relaxed);
        surface.clear(Color::GREEN.with_opacity(symbolizer.opacity));
        Ok(())
    }
}

fn coverage_layer() -> MapLayer {
    let source = memory_source(Crs::EPSG3857, vec![Feature::new("grid")]);
    let style = FeatureTypeStyle::new(vec![Rule::new([Symbolizer::Raster(
        RasterSymbolizer::default(),
    )])]);
    MapLayer::new("elevation", source, [style])
}

#[test]
fn raster_symbolizers_use_coverage_renderer() {
    let coverage = Arc::new(SolidCoverage {
        calls: AtomicUsize::new(0),
    });
    let mut renderer = StreamingRenderer::new(Crs::EPSG3857).with_coverage_renderer(coverage.clone());
    renderer.set_layers(vec![coverage_layer()]);

    let mut target = surface();
    let status = renderer.paint(&mut target, SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));

    assert_eq!(status, RenderStatus::Completed);
    assert_eq!(coverage.calls.load(Ordering::Relaxed), 1);
    assert_eq!(target.pixel(10, 10), Some(Color::GREEN));
}

#[test]
fn raster_without_coverage_renderer_is_reported() {
    let renderer = renderer_with(vec![coverage_layer()]);
    let listener = Arc::new(RecordingListener::default());
    renderer.add_render_listener(listener.clone());

    let mut target = surface();
    let status = renderer.paint(&mut target, SCREEN, Rect::new(0.0, 0.0, 100.0, 100.0));

    assert_eq!(status, RenderStatus::Completed);
    assert!(target.is_blank());
    let errors = listener.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("coverage"), "{}", errors[0]);
}
