use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mapstream_types::geo::{find_transform, Crs, Projection};
use mapstream_types::Rect;

use crate::data::feature::{Feature, FeatureType};
use crate::data::query::Query;
use crate::data::source::{FeatureCursor, FeatureSource};
use crate::error::RenderError;

/// Feature source keeping all its features in memory.
pub struct MemoryFeatureSource {
    schema: FeatureType,
    crs: Crs,
    features: Vec<Feature>,
    bounds: Option<Rect>,
    open_cursors: Arc<AtomicUsize>,
    queries: parking_lot::Mutex<Vec<Query>>,
}

impl MemoryFeatureSource {
    /// Creates a new source.
    pub fn new(schema: FeatureType, crs: Crs, features: Vec<Feature>) -> Self {
        let bounds = Rect::merge_all(features.iter().flat_map(|f| {
            f.geometries()
                .filter_map(|(_, g)| g.bounding_rect())
                .collect::<Vec<_>>()
        }));
        Self {
            schema,
            crs,
            features,
            bounds,
            open_cursors: Arc::new(AtomicUsize::new(0)),
            queries: parking_lot::Mutex::new(vec![]),
        }
    }

    /// Overrides the declared bounds of the source.
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Number of cursors opened and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::Acquire)
    }

    /// Queries executed by the source so far, oldest first.
    pub fn executed_queries(&self) -> Vec<Query> {
        self.queries.lock().clone()
    }
}

impl FeatureSource for MemoryFeatureSource {
    fn schema(&self) -> &FeatureType {
        &self.schema
    }

    fn crs(&self) -> &Crs {
        &self.crs
    }

    fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    fn get_features(&self, query: &Query) -> Result<Box<dyn FeatureCursor + '_>, RenderError> {
        let transform = match &query.crs {
            Some(crs) if crs != &self.crs => Some(find_transform(&self.crs, crs)?),
            _ => None,
        };

        self.queries.lock().push(query.clone());
        self.open_cursors.fetch_add(1, Ordering::AcqRel);

        Ok(Box::new(MemoryCursor {
            features: self.features.iter(),
            query: query.clone(),
            transform,
            returned: 0,
            open_cursors: self.open_cursors.clone(),
        }))
    }
}

struct MemoryCursor<'a> {
    features: std::slice::Iter<'a, Feature>,
    query: Query,
    transform: Option<Box<dyn Projection>>,
    returned: usize,
    open_cursors: Arc<AtomicUsize>,
}

impl FeatureCursor for MemoryCursor<'_> {
    fn next_feature(&mut self) -> Option<Result<Feature, RenderError>> {
        if self
            .query
            .max_features
            .is_some_and(|max| self.returned >= max)
        {
            return None;
        }

        let feature = self
            .features
            .by_ref()
            .find(|f| self.query.filter.evaluate(f))?;
        self.returned += 1;

        let feature = match &self.query.properties {
            Some(properties) => feature.retain_attributes(properties),
            None => feature.clone(),
        };

        let Some(transform) = &self.transform else {
            return Some(Ok(feature));
        };

        let id = feature.id().clone();
        Some(feature.try_map_geometries(|geometry| {
            geometry
                .project(transform)
                .ok_or_else(|| RenderError::Source(format!("cannot reproject feature {id}")))
        }))
    }

    fn close(&mut self) {
        self.open_cursors.fetch_sub(1, Ordering::AcqRel);
    }
}
