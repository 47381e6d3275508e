//! Document metadata: the values carried by group defaults, document entries
//! and embedded front matter headers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Insertion-ordered metadata map. Order is the declaration order of the
/// first source that introduced a key.
pub type Metadata = IndexMap<String, MetaValue>;

/// A single metadata value as it appears in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`.
    Unsigned(u64),
    Float(f64),
    String(String),
    Sequence(Vec<MetaValue>),
    Map(Metadata),
}

impl MetaValue {
    /// Scalar rendering used for control keys (`styling`, `source`,
    /// `destination`). Null and collections have no scalar form.
    pub fn as_scalar_string(&self) -> Option<String> {
        match self {
            MetaValue::String(s) => Some(s.clone()),
            MetaValue::Integer(i) => Some(i.to_string()),
            MetaValue::Unsigned(u) => Some(u.to_string()),
            MetaValue::Float(f) => Some(f.to_string()),
            MetaValue::Bool(b) => Some(b.to_string()),
            MetaValue::Null | MetaValue::Sequence(_) | MetaValue::Map(_) => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::String(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::String(s)
    }
}

impl From<i64> for MetaValue {
    fn from(i: i64) -> Self {
        MetaValue::Integer(i)
    }
}

impl From<bool> for MetaValue {
    fn from(b: bool) -> Self {
        MetaValue::Bool(b)
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

/// Returns `base` with every key of `top` written over it.
///
/// Keys already in `base` keep their position; keys new to `base` are
/// appended in `top`'s order. On collision `top` wins.
pub fn overlay(base: &Metadata, top: &Metadata) -> Metadata {
    let mut merged = base.clone();
    for (key, value) in top {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Compact single-line rendering of a metadata map for error messages.
pub fn describe(meta: &Metadata) -> String {
    serde_json::to_string(meta).unwrap_or_else(|_| format!("{meta:?}"))
}
