use serde::Serialize;
use std::collections::BTreeMap;

/// Occurrences per derived key.
///
/// Backed by a sorted map so that serialized reports are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GroupCounts(BTreeMap<String, usize>);

impl GroupCounts {
    /// Count `items` by `key`. Items whose key is `None` are not counted.
    pub fn count_by<T, K, F>(items: &[T], key: F) -> Self
    where
        K: ToString,
        F: Fn(&T) -> Option<K>,
    {
        let mut counts = BTreeMap::new();
        for k in items.iter().filter_map(key) {
            *counts.entry(k.to_string()).or_insert(0) += 1;
        }
        Self(counts)
    }

    pub fn get(&self, key: &str) -> usize {
        self.0.get(key).copied().unwrap_or(0)
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Most frequent first; equal counts fall back to key order.
    pub fn by_count_desc(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}
