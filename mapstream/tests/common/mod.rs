#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use mapstream::data::{
    AttributeDescriptor, Feature, FeatureCursor, FeatureSource, FeatureType, MemoryFeatureSource,
};
use mapstream::{Query, RenderError, RenderListener, StopHandle};
use mapstream_types::geo::Crs;
use mapstream_types::{Contour, Point2d, Polygon, Rect};

pub const SCREEN: Rect = Rect {
    x_min: 0.0,
    y_min: 0.0,
    x_max: 100.0,
    y_max: 100.0,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn schema() -> FeatureType {
    FeatureType::new(
        "roads",
        vec![
            AttributeDescriptor::geometry("geom"),
            AttributeDescriptor::scalar("kind"),
            AttributeDescriptor::scalar("name"),
            AttributeDescriptor::scalar("lanes"),
        ],
    )
}

pub fn rect_polygon(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Polygon {
    Polygon::new(
        Contour::closed(
            Rect::new(x_min, y_min, x_max, y_max)
                .into_quadrangle()
                .to_vec(),
        ),
        vec![],
    )
}

pub fn area(id: &str, kind: &str, polygon: Polygon) -> Feature {
    Feature::new(id)
        .with_property("kind", kind)
        .with_property("name", id)
        .with_geometry("geom", polygon)
}

pub fn point(id: &str, x: f64, y: f64) -> Feature {
    Feature::new(id)
        .with_property("kind", "poi")
        .with_property("name", id)
        .with_geometry("geom", Point2d::new(x, y))
}

pub fn memory_source(crs: Crs, features: Vec<Feature>) -> Arc<MemoryFeatureSource> {
    Arc::new(MemoryFeatureSource::new(schema(), crs, features))
}

/// Records the events of a render. Optionally stops the render after the first rendered feature.
#[derive(Default)]
pub struct RecordingListener {
    rendered: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    stop_on_first_feature: Mutex<Option<StopHandle>>,
}

impl RecordingListener {
    pub fn stopping(handle: StopHandle) -> Self {
        Self {
            stop_on_first_feature: Mutex::new(Some(handle)),
            ..Default::default()
        }
    }

    pub fn rendered(&self) -> Vec<String> {
        self.rendered.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl RenderListener for RecordingListener {
    fn feature_rendered(&self, feature: &Feature) {
        self.rendered.lock().unwrap().push(feature.id().to_string());
        if let Some(handle) = self.stop_on_first_feature.lock().unwrap().take() {
            handle.stop();
        }
    }

    fn error_occurred(&self, error: &RenderError) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}

/// Source that fails every query.
pub struct BrokenSource {
    schema: FeatureType,
    crs: Crs,
}

impl BrokenSource {
    pub fn new() -> Self {
        Self {
            schema: schema(),
            crs: Crs::EPSG3857,
        }
    }
}

impl FeatureSource for BrokenSource {
    fn schema(&self) -> &FeatureType {
        &self.schema
    }

    fn crs(&self) -> &Crs {
        &self.crs
    }

    fn bounds(&self) -> Option<Rect> {
        None
    }

    fn get_features(&self, _query: &Query) -> Result<Box<dyn FeatureCursor + '_>, RenderError> {
        Err(RenderError::Source("connection refused".into()))
    }
}
