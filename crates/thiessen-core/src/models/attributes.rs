//! Attribute tables carried by shapefile features.
//!
//! Source columns are arbitrary, so values are modeled as a semantic
//! field-name → value mapping. Lookups are lenient: a missing name or
//! identifier field degrades to the `"Unknown"` sentinel instead of
//! failing at access time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Label used when a requested field is absent or NULL.
pub const UNKNOWN_SENTINEL: &str = "Unknown";

/// A single attribute value converted from a DBF field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Null,
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Render the value the way it appears in result tables.
    pub fn as_label(&self) -> String {
        match self {
            AttributeValue::Text(s) => s.clone(),
            AttributeValue::Number(n) => n.to_string(),
            AttributeValue::Integer(i) => i.to_string(),
            AttributeValue::Boolean(b) => b.to_string(),
            AttributeValue::Null => UNKNOWN_SENTINEL.to_string(),
        }
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// Ordered attribute table of one feature.
///
/// A `BTreeMap` keeps field iteration deterministic, which in turn keeps
/// derived DBF schemas and tabular outputs byte-stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    /// Lenient lookup: missing or NULL fields become the `"Unknown"` sentinel.
    pub fn label(&self, name: &str) -> String {
        self.get(name).map(AttributeValue::as_label).unwrap_or_else(|| UNKNOWN_SENTINEL.to_string())
    }

    /// Strict-ish lookup for nullable identifier columns: `None` when the
    /// field is absent or NULL.
    pub fn identifier(&self, name: &str) -> Option<String> {
        match self.get(name) {
            Some(value) if !value.is_null() => Some(value.as_label()),
            _ => None,
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, AttributeValue)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (String, AttributeValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
