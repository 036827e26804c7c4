//! Property values and canonical normalization
//!
//! Node and relationship properties are modeled as a closed tagged
//! variant rather than raw JSON so that ID normalization can match
//! exhaustively. Composite values (lists, nested documents) keep a
//! canonical serialization path: maps are `BTreeMap`s, so key order is
//! structural, not insertion-dependent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A map of named properties, as carried by nodes and relationships
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A single property value
///
/// The variant set is closed: string, integer, float, boolean, null,
/// and composite (list / nested document). Extraction code converts
/// raw tool output into these variants before anything downstream
/// touches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Absent / null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (covers all integer-like numerics)
    Int(i64),
    /// Floating-point value
    Float(f64),
    /// String value
    Str(String),
    /// Ordered list of values
    List(Vec<PropertyValue>),
    /// Nested document with sorted keys
    Map(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    /// Normalize this value to its canonical string form
    ///
    /// This is the normalization step of deterministic ID generation
    /// and must stay byte-for-byte stable:
    ///
    /// - strings are trimmed and lower-cased
    /// - integers are base-10 with no fractional part
    /// - floats are fixed-point with exactly 6 decimal places
    /// - booleans are the literals `true` / `false`
    /// - null is the literal `null`
    /// - lists and nested documents serialize to canonical JSON with
    ///   map keys in ascending order
    ///
    /// A value that cannot be serialized (e.g. a non-finite float
    /// inside a composite) is an error, never a silently divergent
    /// string.
    pub fn canonical_string(&self) -> Result<String> {
        match self {
            Self::Null => Ok("null".to_string()),
            Self::Bool(b) => Ok(if *b { "true" } else { "false" }.to_string()),
            Self::Int(i) => Ok(i.to_string()),
            Self::Float(f) => Ok(format!("{:.6}", f)),
            Self::Str(s) => Ok(s.trim().to_lowercase()),
            Self::List(_) | Self::Map(_) => {
                // serde_json writes non-finite floats as `null`, which
                // would silently alias distinct values; reject them up
                // front instead.
                self.check_serializable()?;
                serde_json::to_string(self).map_err(|e| Error::CanonicalSerialization {
                    property: String::new(),
                    message: e.to_string(),
                })
            }
        }
    }

    fn check_serializable(&self) -> Result<()> {
        match self {
            Self::Float(f) if !f.is_finite() => Err(Error::CanonicalSerialization {
                property: String::new(),
                message: format!("non-finite float {} has no canonical form", f),
            }),
            Self::List(items) => items.iter().try_for_each(Self::check_serializable),
            Self::Map(fields) => fields.values().try_for_each(Self::check_serializable),
            _ => Ok(()),
        }
    }

    /// Check whether this value counts as present for identifying-
    /// property validation
    ///
    /// Null is absent; a string is absent when it is empty or
    /// whitespace-only after trimming. Everything else is present.
    /// This rule applies only to identifying properties; auxiliary
    /// properties are stored as given.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Str(s) => !s.trim().is_empty(),
            _ => true,
        }
    }

    /// Get the variant name for display and schema rendering
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u16> for PropertyValue {
    fn from(value: u16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    // u64 values beyond i64::MAX and all fractional
                    // numbers take the float path
                    Self::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(fields) => Self::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, PropertyValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<PropertyValue> for serde_json::Value {
    fn from(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Null => serde_json::Value::Null,
            PropertyValue::Bool(b) => serde_json::Value::Bool(b),
            PropertyValue::Int(i) => serde_json::Value::from(i),
            PropertyValue::Float(f) => {
                serde_json::Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
            }
            PropertyValue::Str(s) => serde_json::Value::String(s),
            PropertyValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            PropertyValue::Map(fields) => serde_json::Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Build a [`PropertyMap`] from `(name, value)` pairs
pub fn properties<K, V, I>(pairs: I) -> PropertyMap
where
    K: Into<String>,
    V: Into<PropertyValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
