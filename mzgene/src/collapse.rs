//! Collapse the raw (source, target) pairs into a [`MappingTable`] with unique source keys.

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A mapping from source identifiers to target values where every source identifier is unique.
/// If a source identifier resolved to multiple targets these are joined by the separator.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MappingTable {
    map: IndexMap<String, String>,
}

impl MappingTable {
    /// Get the target value for this source identifier
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    /// Check if this source identifier is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// The number of source identifiers
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if there are no source identifiers
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over all (source, target) pairs, in order of first occurrence of the source
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Group the pairs by source identifier. If a source identifier has multiple target values these
/// are joined with the separator in the order in which they were given, repeated values are only
/// used once. The order is the order of the annotation service so is not guaranteed to be stable
/// between runs, but it is stable within a run.
/// ```
/// let mapping = mzgene::collapse(
///     [("A", "X"), ("B", "Z"), ("A", "Y")].map(|(a, b)| (a.to_string(), b.to_string())),
///     '/',
/// );
/// assert_eq!(mapping.get("A"), Some("X/Y"));
/// assert_eq!(mapping.get("B"), Some("Z"));
/// ```
pub fn collapse(
    pairs: impl IntoIterator<Item = (String, String)>,
    separator: char,
) -> MappingTable {
    let mut groups: IndexMap<String, IndexSet<String>> = IndexMap::new();
    for (source, target) in pairs {
        groups.entry(source).or_default().insert(target);
    }
    let separator = separator.to_string();
    MappingTable {
        map: groups
            .into_iter()
            .map(|(source, targets)| (source, targets.into_iter().join(&separator)))
            .collect(),
    }
}
