use std::sync::Arc;

use mapstream_types::Rect;

use crate::data::feature::Feature;
use crate::data::filter::Filter;
use crate::data::query::Query;
use crate::data::source::{CursorGuard, FeatureCursor, FeatureSource};
use crate::error::RenderError;

/// Shape of the query an index was loaded with. An index can serve any query of the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PreloadKey {
    filter: Filter,
    properties: Option<Vec<String>>,
    crs: Option<mapstream_types::geo::Crs>,
}

impl PreloadKey {
    /// Shape of the query ignoring its spatial part and feature limit.
    pub fn of(query: &Query) -> Self {
        Self {
            filter: query.filter.without_spatial(),
            properties: query.properties.clone(),
            crs: query.crs.clone(),
        }
    }
}

/// In-memory copy of the features of a layer with their precomputed bounding boxes.
#[derive(Debug)]
pub struct PreloadedIndex {
    key: PreloadKey,
    entries: Vec<(Option<Rect>, Feature)>,
}

impl PreloadedIndex {
    /// Loads every feature passing the non-spatial part of the query.
    ///
    /// Features that fail to load are skipped and returned as errors along with the index.
    pub fn load(
        source: &dyn FeatureSource,
        query: &Query,
    ) -> Result<(Self, Vec<RenderError>), RenderError> {
        let key = PreloadKey::of(query);
        let load_query = Query {
            filter: key.filter.clone(),
            properties: key.properties.clone(),
            crs: key.crs.clone(),
            max_features: None,
        };

        let mut cursor = CursorGuard::new(source.get_features(&load_query)?);
        let mut entries = vec![];
        let mut errors = vec![];
        for result in &mut cursor {
            match result {
                Ok(feature) => {
                    let bbox = Rect::merge_all(feature.geometries().filter_map(|(_, g)| g.bounding_rect()));
                    entries.push((bbox, feature));
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => errors.push(err),
            }
        }

        log::debug!("Preloaded {} features", entries.len());

        Ok((Self { key, entries }, errors))
    }

    /// Returns true if the index was loaded with a query of the same shape.
    pub fn serves(&self, query: &Query) -> bool {
        self.key == PreloadKey::of(query)
    }

    /// Number of features in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index has no features.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor over the features whose bounding box intersects the envelope. `None` returns all
    /// features. The cursor stops after `max_features` visible features if a limit is given.
    pub fn cursor(
        self: &Arc<Self>,
        envelope: Option<Rect>,
        max_features: Option<usize>,
    ) -> Box<dyn FeatureCursor> {
        Box::new(PreloadedCursor {
            index: self.clone(),
            position: 0,
            returned: 0,
            envelope,
            max_features,
        })
    }
}

struct PreloadedCursor {
    index: Arc<PreloadedIndex>,
    position: usize,
    returned: usize,
    envelope: Option<Rect>,
    max_features: Option<usize>,
}

impl FeatureCursor for PreloadedCursor {
    fn next_feature(&mut self) -> Option<Result<Feature, RenderError>> {
        if self.max_features.is_some_and(|max| self.returned >= max) {
            return None;
        }

        while let Some((bbox, feature)) = self.index.entries.get(self.position) {
            self.position += 1;
            let visible = match (&self.envelope, bbox) {
                (None, _) => true,
                (Some(envelope), Some(bbox)) => bbox.intersects(envelope),
                (Some(_), None) => false,
            };

            if visible {
                self.returned += 1;
                return Some(Ok(feature.clone()));
            }
        }

        None
    }

    fn close(&mut self) {
        self.position = self.index.entries.len();
    }
}

#[cfg(test)]
mod tests {
    use mapstream_types::geo::Crs;
    use mapstream_types::Point2d;

    use super::*;
    use crate::data::feature::{AttributeDescriptor, FeatureType};
    use crate::data::memory::MemoryFeatureSource;

    fn source() -> MemoryFeatureSource {
        let schema = FeatureType::new(
            "poi",
            vec![
                AttributeDescriptor::geometry("geom"),
                AttributeDescriptor::scalar("kind"),
            ],
        );
        let features = (0..10)
            .map(|i| {
                Feature::new(format!("{i}").as_str())
                    .with_property("kind", if i % 2 == 0 { "even" } else { "odd" })
                    .with_geometry("geom", Point2d::new(i as f64, i as f64))
            })
            .collect();
        MemoryFeatureSource::new(schema, Crs::EPSG3857, features)
    }

    #[test]
    fn clips_by_envelope() {
        let source = source();
        let query = Query::with_filter(Filter::bbox(Rect::new(0.0, 0.0, 1.0, 1.0)));
        let (index, errors) = PreloadedIndex::load(&source, &query).unwrap();
        assert!(errors.is_empty());
        assert_eq!(index.len(), 10);
        assert_eq!(source.open_cursors(), 0);

        let index = Arc::new(index);
        let envelope = Rect::new(2.5, 2.5, 5.5, 5.5);
        let mut cursor = CursorGuard::new(index.cursor(Some(envelope), None));
        let ids: Vec<_> = (&mut cursor).map(|f| f.unwrap().id().0.clone()).collect();
        assert_eq!(ids, vec!["3", "4", "5"]);
    }

    #[test]
    fn limits_features_per_cursor() {
        let source = source();
        let query = Query::all().with_max_features(2);
        let (index, _) = PreloadedIndex::load(&source, &query).unwrap();
        assert_eq!(index.len(), 10);

        let index = Arc::new(index);
        let envelope = Rect::new(2.5, 2.5, 8.5, 8.5);
        let mut cursor = CursorGuard::new(index.cursor(Some(envelope), Some(2)));
        let ids: Vec<_> = (&mut cursor).map(|f| f.unwrap().id().0.clone()).collect();
        assert_eq!(ids, vec!["3", "4"]);

        let mut unlimited = CursorGuard::new(index.cursor(None, None));
        assert_eq!((&mut unlimited).count(), 10);
    }

    #[test]
    fn serves_queries_of_same_shape() {
        let source = source();
        let query = Query::with_filter(Filter::and([
            Filter::bbox(Rect::new(0.0, 0.0, 1.0, 1.0)),
            Filter::equals("kind", "odd"),
        ]));
        let (index, _) = PreloadedIndex::load(&source, &query).unwrap();
        assert_eq!(index.len(), 5);

        let moved = Query::with_filter(Filter::and([
            Filter::bbox(Rect::new(5.0, 5.0, 8.0, 8.0)),
            Filter::equals("kind", "odd"),
        ]));
        assert!(index.serves(&moved));
        assert!(!index.serves(&Query::with_filter(Filter::equals("kind", "even"))));
        assert!(!index.serves(&moved.with_properties(vec!["geom".into()])));
    }
}
