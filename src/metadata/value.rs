//! Metadata value types.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A metadata value that can be attached to a vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Boolean value.
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating point number.
    Float(f64),
    /// String value.
    String(String),
    /// Null/missing value.
    Null,
}

impl Eq for MetadataValue {}

impl Hash for MetadataValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash discriminant first to distinguish types
        std::mem::discriminant(self).hash(state);

        match self {
            MetadataValue::String(s) => s.hash(state),
            MetadataValue::Integer(i) => i.hash(state),
            MetadataValue::Float(f) => {
                // Bit representation for consistent hashing; all NaNs
                // collapse to one bucket, which is fine.
                f.to_bits().hash(state);
            }
            MetadataValue::Boolean(b) => b.hash(state),
            MetadataValue::Null => {}
        }
    }
}

impl MetadataValue {
    /// Get the type name as a string (for error messages).
    pub fn type_name(&self) -> &'static str {
        match self {
            MetadataValue::String(_) => "string",
            MetadataValue::Integer(_) => "integer",
            MetadataValue::Float(_) => "float",
            MetadataValue::Boolean(_) => "boolean",
            MetadataValue::Null => "null",
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, MetadataValue::Null)
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            MetadataValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            MetadataValue::Float(f) => Some(*f),
            MetadataValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this value counts as "present": non-null, non-empty string,
    /// non-zero number, or `true`. Language-proficiency flags collapse to
    /// 1/0 based on this predicate.
    pub fn is_truthy(&self) -> bool {
        match self {
            MetadataValue::String(s) => !s.is_empty(),
            MetadataValue::Integer(i) => *i != 0,
            MetadataValue::Float(f) => *f != 0.0,
            MetadataValue::Boolean(b) => *b,
            MetadataValue::Null => false,
        }
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::String(s)
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::String(s.to_string())
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        MetadataValue::Integer(i)
    }
}

impl From<i32> for MetadataValue {
    fn from(i: i32) -> Self {
        MetadataValue::Integer(i as i64)
    }
}

impl From<usize> for MetadataValue {
    fn from(i: usize) -> Self {
        MetadataValue::Integer(i as i64)
    }
}

impl From<f64> for MetadataValue {
    fn from(f: f64) -> Self {
        MetadataValue::Float(f)
    }
}

impl From<f32> for MetadataValue {
    fn from(f: f32) -> Self {
        MetadataValue::Float(f as f64)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Boolean(b)
    }
}

impl<T: Into<MetadataValue>> From<Option<T>> for MetadataValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => MetadataValue::Null,
        }
    }
}
