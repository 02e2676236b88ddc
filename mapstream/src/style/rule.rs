use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::data::{push_unique, Feature, FeatureType, Filter};
use crate::style::symbolizer::Symbolizer;

/// Absolute tolerance of the rule scale range bounds.
pub const SCALE_TOLERANCE: f64 = 1e-6;

/// Predicate-guarded, scale-bounded group of symbolizers.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Rule {
    /// Name of the rule, used in diagnostics.
    pub name: Option<String>,
    /// Features must pass the predicate. `None` accepts every feature.
    pub predicate: Option<Filter>,
    /// Smallest scale denominator the rule applies at (inclusive). `None` means `0`.
    pub min_scale: Option<f64>,
    /// Scale denominator the rule stops applying at (exclusive). `None` means unbounded.
    pub max_scale: Option<f64>,
    /// An else rule applies only to features no other rule of the style matched.
    pub is_else: bool,
    /// Symbolizers in paint order.
    pub symbolizers: Vec<Arc<Symbolizer>>,
}

impl Rule {
    /// Rule without predicate and scale limits.
    pub fn new(symbolizers: impl IntoIterator<Item = Symbolizer>) -> Self {
        Self {
            symbolizers: symbolizers.into_iter().map(Arc::new).collect(),
            ..Default::default()
        }
    }

    /// Sets the predicate.
    pub fn with_predicate(mut self, predicate: Filter) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Sets the scale range `[min, max)`.
    pub fn with_scale_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_scale = min;
        self.max_scale = max;
        self
    }

    /// Marks the rule as an else rule.
    pub fn into_else(mut self) -> Self {
        self.is_else = true;
        self
    }

    /// Returns true if the scale denominator is within `[min_scale, max_scale)`, with the bounds
    /// extended by [`SCALE_TOLERANCE`].
    pub fn is_within_scale(&self, scale: f64) -> bool {
        let min = self.min_scale.unwrap_or(0.0);
        let max = self.max_scale.unwrap_or(f64::INFINITY);
        min - SCALE_TOLERANCE <= scale && scale < max + SCALE_TOLERANCE
    }

    /// Returns true if the feature passes the predicate of the rule.
    pub fn matches(&self, feature: &Feature) -> bool {
        self.predicate
            .as_ref()
            .map_or(true, |predicate| predicate.evaluate(feature))
    }

    pub(crate) fn collect_attributes(&self, default_geometry: Option<&str>, out: &mut Vec<String>) {
        if let Some(predicate) = &self.predicate {
            predicate.collect_attributes(default_geometry, out);
        }

        for symbolizer in &self.symbolizers {
            symbolizer.collect_attributes(out);
            if let Some(name) = symbolizer.geometry_name().or(default_geometry) {
                push_unique(out, name);
            }
        }
    }
}

/// Ordered group of rules applicable to one feature type. Styles of a layer are painted over each
/// other in order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct FeatureTypeStyle {
    /// Name of the feature type the style applies to. `None` applies to any type.
    pub target_type_name: Option<String>,
    /// Rules of the style.
    pub rules: Vec<Rule>,
}

impl FeatureTypeStyle {
    /// Style for any feature type.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            target_type_name: None,
            rules,
        }
    }

    /// Restricts the style to the feature type and its descendants.
    pub fn for_type(mut self, type_name: &str) -> Self {
        self.target_type_name = Some(type_name.to_string());
        self
    }

    /// Returns true if the style applies to the features of the type.
    pub fn applies_to(&self, feature_type: &FeatureType) -> bool {
        match &self.target_type_name {
            None => true,
            Some(name) => feature_type.is_descendant_of(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::data::AttributeDescriptor;
    use crate::style::symbolizer::{LineSymbolizer, TextSymbolizer};

    #[test]
    fn scale_range_is_half_open() {
        let rule = Rule::new([]).with_scale_range(Some(1000.0), Some(5000.0));
        assert!(!rule.is_within_scale(999.0));
        assert!(rule.is_within_scale(1000.0));
        assert!(rule.is_within_scale(1000.0 - 1e-7));
        assert!(rule.is_within_scale(4999.0));
        assert!(rule.is_within_scale(5000.0));
        assert!(!rule.is_within_scale(5000.1));

        let unbounded = Rule::new([]);
        assert!(unbounded.is_within_scale(1e12));
        assert!(unbounded.is_within_scale(0.0));
    }

    #[test]
    fn rule_attributes() {
        let rule = Rule::new([
            Symbolizer::Line(LineSymbolizer::new(Color::RED, 1.0)),
            Symbolizer::Text(TextSymbolizer {
                geometry: Some("label_point".into()),
                ..TextSymbolizer::new("name")
            }),
        ])
        .with_predicate(Filter::equals("kind", "road"));

        let mut out = vec![];
        rule.collect_attributes(Some("geom"), &mut out);
        assert_eq!(out, vec!["kind", "geom", "name", "label_point"]);
    }

    #[test]
    fn style_applies_to_descendants() {
        let feature_type = FeatureType::new("roads", vec![AttributeDescriptor::geometry("geom")])
            .with_super_types(&["lines", "features"]);

        assert!(FeatureTypeStyle::new(vec![]).applies_to(&feature_type));
        assert!(FeatureTypeStyle::new(vec![]).for_type("roads").applies_to(&feature_type));
        assert!(FeatureTypeStyle::new(vec![]).for_type("features").applies_to(&feature_type));
        assert!(!FeatureTypeStyle::new(vec![]).for_type("rivers").applies_to(&feature_type));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn style_from_json() {
        let json = r##"{
            "targetTypeName": "roads",
            "rules": [
                {
                    "predicate": {"compare": {"left": {"property": "kind"}, "op": "equal", "right": {"literal": "primary"}}},
                    "maxScale": 50000.0,
                    "symbolizers": [{"type": "line", "stroke": {"color": "#FF0000", "width": {"literal": 3.0}}}]
                },
                {
                    "isElse": true,
                    "symbolizers": [{"type": "line", "stroke": {"color": "#808080FF"}}]
                }
            ]
        }"##;

        let style: FeatureTypeStyle = serde_json::from_str(json).unwrap();
        assert_eq!(style.target_type_name.as_deref(), Some("roads"));
        assert_eq!(style.rules.len(), 2);
        assert_eq!(style.rules[0].predicate, Some(Filter::equals("kind", "primary")));
        assert_eq!(style.rules[0].max_scale, Some(50000.0));
        assert!(style.rules[1].is_else);
        assert_eq!(
            *style.rules[1].symbolizers[0],
            Symbolizer::Line(LineSymbolizer::new(Color::GRAY, 1.0))
        );
    }
}
