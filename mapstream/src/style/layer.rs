use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::data::{FeatureSource, Query};
use crate::style::rule::FeatureTypeStyle;

/// Layer of a map: a feature source drawn with a list of styles.
#[derive(Clone)]
pub struct MapLayer {
    name: String,
    source: Arc<dyn FeatureSource>,
    styles: Vec<FeatureTypeStyle>,
    constraint: Option<Query>,
    visible: bool,
}

impl Debug for MapLayer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapLayer")
            .field("name", &self.name)
            .field("source", &self.source.schema().name())
            .field("styles", &self.styles.len())
            .field("constraint", &self.constraint)
            .field("visible", &self.visible)
            .finish()
    }
}

impl MapLayer {
    /// Creates a visible layer without constraint query.
    pub fn new(
        name: &str,
        source: Arc<dyn FeatureSource>,
        styles: impl IntoIterator<Item = FeatureTypeStyle>,
    ) -> Self {
        Self {
            name: name.to_string(),
            source,
            styles: styles.into_iter().collect(),
            constraint: None,
            visible: true,
        }
    }

    /// Sets the user query the features of the layer are restricted by.
    pub fn with_constraint(mut self, constraint: Query) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Sets the visibility of the layer.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Name of the layer.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Feature source of the layer.
    pub fn source(&self) -> &dyn FeatureSource {
        &*self.source
    }

    /// Styles of the layer in paint order.
    pub fn styles(&self) -> &[FeatureTypeStyle] {
        &self.styles
    }

    /// User query the features of the layer are restricted by.
    pub fn constraint(&self) -> Option<&Query> {
        self.constraint.as_ref()
    }

    /// Returns true if the layer is drawn.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the layer.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
