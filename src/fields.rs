//! Structured key/value context attached to a single entry.
//!
//! Values are tagged rather than loosely typed: strings, integers,
//! floats, booleans and nested maps cover what log aggregators index.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Map(Fields),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::String(s) => f.write_str(s),
            FieldValue::Map(m) => {
                let json = serde_json::to_string(m).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(v: $t) -> Self {
                FieldValue::Int(i64::from(v))
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        i64::try_from(v).map_or_else(|_| FieldValue::String(v.to_string()), FieldValue::Int)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or_else(|_| FieldValue::String(v.to_string()), FieldValue::Int)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(f64::from(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        FieldValue::String(v.clone())
    }
}

impl From<Fields> for FieldValue {
    fn from(v: Fields) -> Self {
        FieldValue::Map(v)
    }
}

/// Mapping of unique keys to values. Iteration is in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing any previous value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Builder-style [`Fields::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Fields(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V> Extend<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for Fields {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Build a [`Fields`] map inline.
///
/// ```rust
/// let fields = fieldlog::fields! { "req" => "", "status" => 200 };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(fields.insert($key, $value);)+
        fields
    }};
}
