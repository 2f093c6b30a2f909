// Feature model shared by the dissolve passes and the GeoJSON reader/writer.
use geo_types::MultiPolygon;
use std::collections::HashSet;
use std::fmt;

static NULL_VALUE: FieldValue = FieldValue::Null;

/// Scalar attribute value of a parcel feature.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Convert a GeoJSON property value. Nested arrays and objects are kept as
    /// their JSON text since attribute tables only hold scalars.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Integer(i)
                } else {
                    n.as_f64().map(FieldValue::Float).unwrap_or(FieldValue::Null)
                }
            }
            serde_json::Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Integer(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Hashable grouping key; `None` for null (and NaN, which dataframes treat as null).
    pub fn group_key(&self) -> Option<GroupKey> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some(GroupKey::Bool(*b)),
            FieldValue::Integer(i) => Some(GroupKey::Integer(*i)),
            FieldValue::Float(f) if f.is_nan() => None,
            // -0.0 and 0.0 must land in the same group
            FieldValue::Float(f) => Some(GroupKey::Float((f + 0.0).to_bits())),
            FieldValue::Text(s) => Some(GroupKey::Text(s.clone())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Integer(i) => write!(f, "{}", i),
            // Integral floats keep their fraction digit ("100.0"), like parcel exports do
            FieldValue::Float(v) => write!(f, "{:?}", v),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Bool(bool),
    Integer(i64),
    Float(u64),
    Text(String),
}

/// One parcel record: a polygonal footprint plus its attribute row.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: MultiPolygon<f64>,
    // Ordered so the schema follows the source attribute order
    properties: Vec<(String, FieldValue)>,
}

impl Feature {
    pub fn new(geometry: MultiPolygon<f64>) -> Self {
        Feature {
            geometry,
            properties: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value.into());
        self
    }

    pub fn set(&mut self, name: &str, value: FieldValue) {
        match self.properties.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.properties.push((name.to_string(), value)),
        }
    }

    /// Missing fields read as null.
    pub fn get(&self, name: &str) -> &FieldValue {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
            .unwrap_or(&NULL_VALUE)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.properties.iter().map(|(key, value)| (key.as_str(), value))
    }
}

/// Ordered features with the union of their field names as schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    schema: Vec<String>,
    features: Vec<Feature>,
}

impl FeatureCollection {
    /// Build a collection whose schema is every field name in first-appearance order.
    pub fn new(features: Vec<Feature>) -> Self {
        let mut seen = HashSet::new();
        let mut schema = Vec::new();
        for feature in &features {
            for (name, _) in feature.fields() {
                if seen.insert(name.to_string()) {
                    schema.push(name.to_string());
                }
            }
        }
        FeatureCollection { schema, features }
    }

    pub fn with_schema(schema: Vec<String>, features: Vec<Feature>) -> Self {
        FeatureCollection { schema, features }
    }

    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.schema.iter().any(|field| field == name)
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn into_features(self) -> Vec<Feature> {
        self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
