//! Typed values for the open-ended data bags
//!
//! `rawData`, `metadata` and `supportingData` are keyed bags whose contents are
//! supplied by external collaborators. They are stored as [`DataMap`]s of
//! [`DataValue`] so consumers pattern-match on the variant instead of casting.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered key to value mapping used for every data bag
pub type DataMap = BTreeMap<String, DataValue>;

/// A single value inside a data bag
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<DataValue>),
    Map(DataMap),
}

impl DataValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DataValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&DataMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Interpret a list as a series of numbers
    ///
    /// Returns `None` if this is not a list or any element is not a number.
    pub fn as_numbers(&self) -> Option<Vec<f64>> {
        self.as_list()?.iter().map(DataValue::as_f64).collect()
    }
}

impl From<f64> for DataValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for DataValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<DataValue>> From<Vec<T>> for DataValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<DataMap> for DataValue {
    fn from(map: DataMap) -> Self {
        Self::Map(map)
    }
}

/// Convert JSON returned by external collaborators into a typed value
impl From<serde_json::Value> for DataValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            // Numbers outside f64 range degrade to null
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}
