//! Property value types for graph elements
//!
//! Documents travel as JSON, which drops the static type of numbers. Values
//! read back are narrowed to the smallest numeric variant that holds them.
//!
//! Integers beyond the u64/i64 range and non-finite floats have no JSON number
//! form. They are written as single-entry objects, `{"$bigint": "<digits>"}`
//! and `{"$double": "NaN" | "inf" | "-inf"}`, and read back as numbers.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt;

/// Tag of integers outside the JSON number range
pub const BIGINT_TAG: &str = "$bigint";
/// Tag of NaN and the infinities
pub const DOUBLE_TAG: &str = "$double";

/// Property value type supporting multiple data types
///
/// Supports:
/// - String
/// - Integer (i32), Long (i64), BigInteger (i128)
/// - Float (f64)
/// - Boolean
/// - Array (Vec<PropertyValue>)
/// - Map (ordered String -> PropertyValue)
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Integer(i32),
    Long(i64),
    BigInteger(i128),
    Float(f64),
    Boolean(bool),
    Array(Vec<PropertyValue>),
    Map(IndexMap<String, PropertyValue>),
    Null,
}

impl PropertyValue {
    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Get string value if this is a string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get any integral value widened to i64, if it fits
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i as i64),
            PropertyValue::Long(l) => Some(*l),
            PropertyValue::BigInteger(b) => i64::try_from(*b).ok(),
            _ => None,
        }
    }

    /// Get float value if this is a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get boolean value if this is a boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get array value if this is an array
    pub fn as_array(&self) -> Option<&Vec<PropertyValue>> {
        match self {
            PropertyValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Get map value if this is a map
    pub fn as_map(&self) -> Option<&IndexMap<String, PropertyValue>> {
        match self {
            PropertyValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Get type name as string
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Integer(_) => "Integer",
            PropertyValue::Long(_) => "Long",
            PropertyValue::BigInteger(_) => "BigInteger",
            PropertyValue::Float(_) => "Float",
            PropertyValue::Boolean(_) => "Boolean",
            PropertyValue::Array(_) => "Array",
            PropertyValue::Map(_) => "Map",
            PropertyValue::Null => "Null",
        }
    }

    /// Narrow a JSON value into the matching property value
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => PropertyValue::Null,
            Value::Bool(b) => PropertyValue::Boolean(*b),
            Value::Number(n) => Self::narrow_number(n),
            Value::String(s) => PropertyValue::String(s.clone()),
            Value::Array(items) => {
                PropertyValue::Array(items.iter().map(PropertyValue::from_json).collect())
            }
            Value::Object(map) => Self::tagged_number(map).unwrap_or_else(|| {
                PropertyValue::Map(
                    map.iter()
                        .map(|(k, v)| (k.clone(), PropertyValue::from_json(v)))
                        .collect(),
                )
            }),
        }
    }

    fn tagged_number(map: &serde_json::Map<String, Value>) -> Option<Self> {
        if map.len() != 1 {
            return None;
        }
        let (tag, Value::String(text)) = map.iter().next()? else {
            return None;
        };
        match tag.as_str() {
            BIGINT_TAG => text.parse::<i128>().ok().map(PropertyValue::BigInteger),
            DOUBLE_TAG => text
                .parse::<f64>()
                .ok()
                .filter(|f| !f.is_finite())
                .map(PropertyValue::Float),
            _ => None,
        }
    }

    fn tagged(tag: &str, text: String) -> Value {
        let mut map = serde_json::Map::new();
        map.insert(tag.to_string(), Value::String(text));
        Value::Object(map)
    }

    fn narrow_number(n: &Number) -> Self {
        if let Some(i) = n.as_i64() {
            match i32::try_from(i) {
                Ok(small) => PropertyValue::Integer(small),
                Err(_) => PropertyValue::Long(i),
            }
        } else if let Some(u) = n.as_u64() {
            PropertyValue::BigInteger(u as i128)
        } else {
            PropertyValue::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }

    /// Encode as JSON
    ///
    /// Integers outside the u64/i64 range and non-finite floats are written
    /// in their tagged object form.
    pub fn to_json(&self) -> Value {
        match self {
            PropertyValue::String(s) => Value::String(s.clone()),
            PropertyValue::Integer(i) => Value::from(*i),
            PropertyValue::Long(l) => Value::from(*l),
            PropertyValue::BigInteger(b) => {
                if let Ok(i) = i64::try_from(*b) {
                    Value::from(i)
                } else if let Ok(u) = u64::try_from(*b) {
                    Value::from(u)
                } else {
                    Self::tagged(BIGINT_TAG, b.to_string())
                }
            }
            PropertyValue::Float(f) => match Number::from_f64(*f) {
                Some(n) => Value::Number(n),
                None => Self::tagged(DOUBLE_TAG, f.to_string()),
            },
            PropertyValue::Boolean(b) => Value::Bool(*b),
            PropertyValue::Array(arr) => Value::Array(arr.iter().map(|v| v.to_json()).collect()),
            PropertyValue::Map(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            PropertyValue::Null => Value::Null,
        }
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "\"{}\"", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Long(l) => write!(f, "{}", l),
            PropertyValue::BigInteger(b) => write!(f, "{}", b),
            PropertyValue::Float(fl) => write!(f, "{}", fl),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Array(arr) => {
                write!(f, "[")?;
                for (i, val) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
            PropertyValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, val)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, val)?;
                }
                write!(f, "}}")
            }
            PropertyValue::Null => write!(f, "null"),
        }
    }
}

// Convenience conversions
impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Long(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(arr: Vec<PropertyValue>) -> Self {
        PropertyValue::Array(arr)
    }
}

impl From<IndexMap<String, PropertyValue>> for PropertyValue {
    fn from(map: IndexMap<String, PropertyValue>) -> Self {
        PropertyValue::Map(map)
    }
}

/// Ordered property map for single-valued element properties
pub type PropertyMap = IndexMap<String, PropertyValue>;
