use crate::config::FLATTEN_SEPARATOR;
use serde::Serialize;
use std::collections::BTreeMap;

/// A leaf value or a string-keyed map of further values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Nested<T> {
    Leaf(T),
    Map(BTreeMap<String, Nested<T>>),
}

impl<T> Nested<T> {
    pub fn map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Nested<T>)>,
        K: Into<String>,
    {
        Nested::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_flat(&self) -> bool {
        match self {
            Nested::Leaf(_) => true,
            Nested::Map(m) => m.values().all(|v| matches!(v, Nested::Leaf(_))),
        }
    }
}

/// Flatten nested maps into one level, joining keys with `.`.
///
/// `{"a": {"b": 0, "c": 1}}` becomes `{"a.b": 0, "a.c": 1}`. A leaf is returned as is,
/// and an empty nested map contributes no keys.
pub fn flatten<T>(value: Nested<T>) -> Nested<T> {
    match value {
        Nested::Leaf(v) => Nested::Leaf(v),
        Nested::Map(m) => Nested::Map(flatten_entries(m).into_iter().map(|(k, v)| (k, Nested::Leaf(v))).collect()),
    }
}

/// Like [`flatten`], but returns the flat key/leaf pairs of a map directly.
pub fn flatten_entries<T>(map: BTreeMap<String, Nested<T>>) -> BTreeMap<String, T> {
    let mut out = BTreeMap::new();
    for (key, value) in map {
        match value {
            Nested::Leaf(v) => {
                out.insert(key, v);
            }
            Nested::Map(inner) => {
                for (deeper, v) in flatten_entries(inner) {
                    out.insert(format!("{key}{FLATTEN_SEPARATOR}{deeper}"), v);
                }
            }
        }
    }
    out
}
