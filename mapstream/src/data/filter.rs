use std::cmp::Ordering;

use mapstream_types::Rect;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::data::feature::{Feature, Value};

/// Value computed from a feature: either a constant or the value of a named attribute.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Expression {
    /// Constant value.
    Literal(Value),
    /// Value of the feature attribute with the given name.
    Property(String),
}

impl Expression {
    /// Shortcut for a property expression.
    pub fn property(name: &str) -> Self {
        Self::Property(name.to_string())
    }

    /// Shortcut for a literal expression.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Evaluates the expression. Missing attributes evaluate to [`Value::Null`].
    pub fn evaluate(&self, feature: &Feature) -> Value {
        match self {
            Expression::Literal(value) => value.clone(),
            Expression::Property(name) => feature.property(name).cloned().unwrap_or_default(),
        }
    }

    /// Evaluates the expression as a number.
    pub fn evaluate_f64(&self, feature: &Feature) -> Option<f64> {
        self.evaluate(feature).as_f64()
    }

    /// Returns true if the value of the expression does not depend on the feature.
    pub fn is_literal(&self) -> bool {
        matches!(self, Expression::Literal(_))
    }

    pub(crate) fn collect_attributes(&self, out: &mut Vec<String>) {
        if let Expression::Property(name) = self {
            push_unique(out, name);
        }
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CompareOp {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
}

impl CompareOp {
    fn accepts(&self, ordering: Option<Ordering>) -> bool {
        match (self, ordering) {
            (CompareOp::NotEqual, None) => true,
            (_, None) => false,
            (CompareOp::Equal, Some(o)) => o == Ordering::Equal,
            (CompareOp::NotEqual, Some(o)) => o != Ordering::Equal,
            (CompareOp::Less, Some(o)) => o == Ordering::Less,
            (CompareOp::LessOrEqual, Some(o)) => o != Ordering::Greater,
            (CompareOp::Greater, Some(o)) => o == Ordering::Greater,
            (CompareOp::GreaterOrEqual, Some(o)) => o != Ordering::Less,
        }
    }
}

/// Predicate over features.
///
/// Filters are used both as style rule predicates and as the selection part of a
/// [`Query`](crate::Query) sent to a feature source.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Filter {
    /// Accepts every feature.
    Include,
    /// Rejects every feature.
    Exclude,
    /// All of the filters must pass.
    And(Vec<Filter>),
    /// Any of the filters must pass.
    Or(Vec<Filter>),
    /// Inverts the filter.
    Not(Box<Filter>),
    /// Compares two expressions.
    Compare {
        /// Left operand.
        left: Expression,
        /// Operator.
        op: CompareOp,
        /// Right operand.
        right: Expression,
    },
    /// Passes if the expression evaluates to null.
    IsNull(Expression),
    /// Passes if the expression equals one of the values.
    In {
        /// Tested expression.
        expression: Expression,
        /// Accepted values.
        values: Vec<Value>,
    },
    /// Passes if the bounding box of the geometry intersects the envelope.
    Bbox {
        /// Geometry attribute name. `None` stands for the default geometry.
        geometry: Option<String>,
        /// Envelope in the CRS of the geometry.
        envelope: Rect,
    },
}

impl Filter {
    /// Conjunction of the filters. `Include` operands are dropped, nested conjunctions are
    /// flattened and a single remaining operand is returned as is.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Filter {
        let mut operands = vec![];
        for filter in filters {
            match filter {
                Filter::Include => {}
                Filter::Exclude => return Filter::Exclude,
                Filter::And(inner) => operands.extend(inner),
                other => operands.push(other),
            }
        }

        match operands.len() {
            0 => Filter::Include,
            1 => operands.remove(0),
            _ => Filter::And(operands),
        }
    }

    /// Disjunction of the filters. `Exclude` operands are dropped, nested disjunctions are
    /// flattened and a single remaining operand is returned as is.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Filter {
        let mut operands = vec![];
        for filter in filters {
            match filter {
                Filter::Exclude => {}
                Filter::Include => return Filter::Include,
                Filter::Or(inner) => operands.extend(inner),
                other => operands.push(other),
            }
        }

        match operands.len() {
            0 => Filter::Exclude,
            1 => operands.remove(0),
            _ => Filter::Or(operands),
        }
    }

    /// Shortcut for `property == value`.
    pub fn equals(property: &str, value: impl Into<Value>) -> Filter {
        Self::compare(property, CompareOp::Equal, value)
    }

    /// Shortcut for a comparison of a property with a literal.
    pub fn compare(property: &str, op: CompareOp, value: impl Into<Value>) -> Filter {
        Filter::Compare {
            left: Expression::property(property),
            op,
            right: Expression::literal(value),
        }
    }

    /// Shortcut for a bounding box filter on the default geometry.
    pub fn bbox(envelope: Rect) -> Filter {
        Filter::Bbox {
            geometry: None,
            envelope,
        }
    }

    /// Evaluates the filter against the feature.
    pub fn evaluate(&self, feature: &Feature) -> bool {
        match self {
            Filter::Include => true,
            Filter::Exclude => false,
            Filter::And(filters) => filters.iter().all(|f| f.evaluate(feature)),
            Filter::Or(filters) => filters.iter().any(|f| f.evaluate(feature)),
            Filter::Not(filter) => !filter.evaluate(feature),
            Filter::Compare { left, op, right } => {
                let left = left.evaluate(feature);
                let right = right.evaluate(feature);
                op.accepts(left.compare(&right))
            }
            Filter::IsNull(expression) => expression.evaluate(feature).is_null(),
            Filter::In { expression, values } => {
                let value = expression.evaluate(feature);
                values
                    .iter()
                    .any(|v| value.compare(v) == Some(Ordering::Equal))
            }
            Filter::Bbox { geometry, envelope } => {
                let geometry = match geometry {
                    Some(name) => feature.geometry_by_name(name),
                    None => feature.default_geometry(),
                };
                geometry
                    .and_then(|g| g.bounding_rect())
                    .is_some_and(|bbox| bbox.intersects(envelope))
            }
        }
    }

    /// Names of the attributes the filter reads. A bounding box filter on the default geometry
    /// reports `default_geometry`.
    pub fn referenced_attributes(&self, default_geometry: Option<&str>) -> Vec<String> {
        let mut out = vec![];
        self.collect_attributes(default_geometry, &mut out);
        out
    }

    pub(crate) fn collect_attributes(&self, default_geometry: Option<&str>, out: &mut Vec<String>) {
        match self {
            Filter::Include | Filter::Exclude => {}
            Filter::And(filters) | Filter::Or(filters) => filters
                .iter()
                .for_each(|f| f.collect_attributes(default_geometry, out)),
            Filter::Not(filter) => filter.collect_attributes(default_geometry, out),
            Filter::Compare { left, right, .. } => {
                left.collect_attributes(out);
                right.collect_attributes(out);
            }
            Filter::IsNull(expression) | Filter::In { expression, .. } => {
                expression.collect_attributes(out)
            }
            Filter::Bbox { geometry, .. } => {
                if let Some(name) = geometry.as_deref().or(default_geometry) {
                    push_unique(out, name);
                }
            }
        }
    }

    /// Removes the bounding box conditions of the filter, leaving only its attribute part.
    ///
    /// Bounding box conditions are replaced with `Include`, so the result accepts a superset of
    /// the features accepted by the original filter.
    pub fn without_spatial(&self) -> Filter {
        match self {
            Filter::Bbox { .. } => Filter::Include,
            Filter::And(filters) => Filter::and(filters.iter().map(Filter::without_spatial)),
            Filter::Or(filters) => Filter::or(filters.iter().map(Filter::without_spatial)),
            Filter::Not(inner) if inner.contains_spatial() => Filter::Include,
            other => other.clone(),
        }
    }

    fn contains_spatial(&self) -> bool {
        match self {
            Filter::Bbox { .. } => true,
            Filter::And(filters) | Filter::Or(filters) => {
                filters.iter().any(Filter::contains_spatial)
            }
            Filter::Not(inner) => inner.contains_spatial(),
            _ => false,
        }
    }
}

pub(crate) fn push_unique(out: &mut Vec<String>, name: &str) {
    if !out.iter().any(|n| n == name) {
        out.push(name.to_string());
    }
}
