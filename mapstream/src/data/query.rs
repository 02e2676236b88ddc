use mapstream_types::geo::Crs;

use crate::data::filter::{push_unique, Filter};

/// Request for features from a [`FeatureSource`](crate::FeatureSource).
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Features must pass this filter.
    pub filter: Filter,
    /// Attributes to load. `None` loads all attributes.
    pub properties: Option<Vec<String>>,
    /// CRS geometries are returned in. `None` means the native CRS of the source.
    pub crs: Option<Crs>,
    /// Maximum number of features to return.
    pub max_features: Option<usize>,
}

impl Default for Query {
    fn default() -> Self {
        Self::all()
    }
}

impl Query {
    /// Query for all features with all attributes.
    pub fn all() -> Self {
        Self {
            filter: Filter::Include,
            properties: None,
            crs: None,
            max_features: None,
        }
    }

    /// Query for features passing the filter.
    pub fn with_filter(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::all()
        }
    }

    /// Sets the attributes to load.
    pub fn with_properties(mut self, properties: Vec<String>) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Sets the maximum number of features.
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Sets the CRS geometries should be returned in.
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }

    /// Combines the query with a constraint query.
    ///
    /// The filters are joined with a logical AND, projected attributes are united (a query
    /// loading all attributes absorbs the other list), the smaller feature limit is kept, and the
    /// CRS requested by the constraint wins.
    pub fn merge(self, constraint: &Query) -> Query {
        let properties = match (self.properties, &constraint.properties) {
            (Some(mut own), Some(other)) => {
                for name in other {
                    push_unique(&mut own, name);
                }
                Some(own)
            }
            _ => None,
        };

        let max_features = match (self.max_features, constraint.max_features) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        Query {
            filter: Filter::and([self.filter, constraint.filter.clone()]),
            properties,
            crs: constraint.crs.clone().or(self.crs),
            max_features,
        }
    }
}
