use mapstream_types::geo::Crs;
use mapstream_types::Rect;

use crate::data::feature::{Feature, FeatureType};
use crate::data::query::Query;
use crate::error::RenderError;

/// Source of features for a layer.
pub trait FeatureSource: Send + Sync {
    /// Schema of the features.
    fn schema(&self) -> &FeatureType;
    /// Native CRS of the features.
    fn crs(&self) -> &Crs;
    /// Declared bounds of all features in the native CRS, if known.
    fn bounds(&self) -> Option<Rect>;
    /// Executes the query returning a cursor over the features passing it.
    fn get_features(&self, query: &Query) -> Result<Box<dyn FeatureCursor + '_>, RenderError>;
}

/// Forward-only cursor over the result of a query.
pub trait FeatureCursor {
    /// Reads the next feature. An error for one feature does not end the cursor.
    fn next_feature(&mut self) -> Option<Result<Feature, RenderError>>;
    /// Releases the resources of the cursor. Called exactly once.
    fn close(&mut self);
}

/// Owns a cursor and closes it when dropped.
pub struct CursorGuard<'a> {
    cursor: Box<dyn FeatureCursor + 'a>,
    is_closed: bool,
}

impl<'a> CursorGuard<'a> {
    /// Wraps the cursor.
    pub fn new(cursor: Box<dyn FeatureCursor + 'a>) -> Self {
        Self {
            cursor,
            is_closed: false,
        }
    }

    /// Closes the cursor. Further reads return `None`.
    pub fn close(&mut self) {
        if !self.is_closed {
            self.is_closed = true;
            self.cursor.close();
        }
    }
}

impl Iterator for CursorGuard<'_> {
    type Item = Result<Feature, RenderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_closed {
            return None;
        }

        self.cursor.next_feature()
    }
}

impl Drop for CursorGuard<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
