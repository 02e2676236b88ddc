use std::fmt::{Display, Formatter};

use ahash::HashMap;
use mapstream_types::geo::Crs;
use mapstream_types::Geom;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scalar attribute value of a feature.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer number.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// String.
    String(String),
}

impl Value {
    /// Numeric representation of the value, if it has one. Strings are parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(_) | Value::Null => None,
        }
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Compares two values. Numbers are compared numerically (strings holding numbers included),
    /// other values only with values of the same type. `Null` is not comparable to anything.
    pub fn compare(&self, other: &Value) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => match (self.as_f64(), other.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => a.partial_cmp(b),
            },
            _ => self.as_f64()?.partial_cmp(&other.as_f64()?),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

/// Identifier of a feature, unique within its source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub String);

impl Display for FeatureId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A geographic object: a set of named scalar attributes and named geometries.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    id: FeatureId,
    properties: HashMap<String, Value>,
    geometries: HashMap<String, Geom>,
    default_geometry: Option<String>,
}

impl Feature {
    /// Creates a feature without attributes.
    pub fn new(id: impl Into<FeatureId>) -> Self {
        Self {
            id: id.into(),
            properties: HashMap::default(),
            geometries: HashMap::default(),
            default_geometry: None,
        }
    }

    /// Adds a scalar attribute.
    pub fn with_property(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    /// Adds a geometry attribute. The first geometry added becomes the default one.
    pub fn with_geometry(mut self, name: &str, geometry: impl Into<Geom>) -> Self {
        if self.default_geometry.is_none() {
            self.default_geometry = Some(name.to_string());
        }
        self.geometries.insert(name.to_string(), geometry.into());
        self
    }

    /// Sets the name of the default geometry attribute.
    pub fn with_default_geometry(mut self, name: &str) -> Self {
        self.default_geometry = Some(name.to_string());
        self
    }

    /// Feature identifier.
    pub fn id(&self) -> &FeatureId {
        &self.id
    }

    /// Value of a scalar attribute, `None` if the feature has no attribute with this name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Geometry attribute by name.
    pub fn geometry_by_name(&self, name: &str) -> Option<&Geom> {
        self.geometries.get(name)
    }

    /// The default geometry.
    pub fn default_geometry(&self) -> Option<&Geom> {
        self.geometries.get(self.default_geometry.as_ref()?)
    }

    /// Name of the default geometry attribute.
    pub fn default_geometry_name(&self) -> Option<&str> {
        self.default_geometry.as_deref()
    }

    /// Iterates over all geometry attributes.
    pub fn geometries(&self) -> impl Iterator<Item = (&str, &Geom)> {
        self.geometries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over all scalar attributes.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Creates a copy of the feature with only the named attributes. The default geometry name is
    /// kept even if its value is dropped.
    pub fn retain_attributes(&self, names: &[String]) -> Self {
        let keep = |name: &String| names.iter().any(|n| n == name);
        Self {
            id: self.id.clone(),
            properties: self
                .properties
                .iter()
                .filter(|(k, _)| keep(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            geometries: self
                .geometries
                .iter()
                .filter(|(k, _)| keep(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            default_geometry: self.default_geometry.clone(),
        }
    }

    /// Replaces every geometry of the feature with the result of `f`.
    pub fn try_map_geometries<E>(
        mut self,
        mut f: impl FnMut(&Geom) -> Result<Geom, E>,
    ) -> Result<Self, E> {
        for geometry in self.geometries.values_mut() {
            *geometry = f(geometry)?;
        }

        Ok(self)
    }
}

/// Kind of a feature type attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeKind {
    /// Scalar value.
    Scalar,
    /// Geometry in the given CRS. `None` means the CRS of the feature source.
    Geometry(Option<Crs>),
}

/// Descriptor of a feature type attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
    /// Attribute name.
    pub name: String,
    /// Attribute kind.
    pub kind: AttributeKind,
}

impl AttributeDescriptor {
    /// Scalar attribute.
    pub fn scalar(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: AttributeKind::Scalar,
        }
    }

    /// Geometry attribute in the source CRS.
    pub fn geometry(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: AttributeKind::Geometry(None),
        }
    }

    /// Geometry attribute with its own CRS.
    pub fn geometry_with_crs(name: &str, crs: Crs) -> Self {
        Self {
            name: name.to_string(),
            kind: AttributeKind::Geometry(Some(crs)),
        }
    }
}

/// Schema of the features of a source.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureType {
    name: String,
    super_types: Vec<String>,
    attributes: Vec<AttributeDescriptor>,
    default_geometry: Option<String>,
}

impl FeatureType {
    /// Creates a new feature type. The first geometry attribute is the default geometry.
    pub fn new(name: &str, attributes: Vec<AttributeDescriptor>) -> Self {
        let default_geometry = attributes
            .iter()
            .find(|a| matches!(a.kind, AttributeKind::Geometry(_)))
            .map(|a| a.name.clone());
        Self {
            name: name.to_string(),
            super_types: vec![],
            attributes,
            default_geometry,
        }
    }

    /// Sets the ancestors of the type, nearest first.
    pub fn with_super_types(mut self, super_types: &[&str]) -> Self {
        self.super_types = super_types.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute descriptors.
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    /// Names of all attributes.
    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.iter().map(|a| a.name.clone()).collect()
    }

    /// Attribute descriptor by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Name of the default geometry attribute.
    pub fn default_geometry(&self) -> Option<&str> {
        self.default_geometry.as_deref()
    }

    /// Returns true if the type is named `type_name` or descends from a type with that name.
    pub fn is_descendant_of(&self, type_name: &str) -> bool {
        self.name == type_name || self.super_types.iter().any(|t| t == type_name)
    }
}
