//! Reporting of identifiers that could not be resolved.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The maximal number of distinct identifiers listed in an [`UnresolvedReport`]
pub const MAX_REPORTED_IDENTIFIERS: usize = 20;

/// The rows that could not be resolved. This is not an error, it only informs on the rows that
/// were either left empty or got their own identifier copied.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct UnresolvedReport {
    /// The first (at most 20) distinct unresolved identifiers, in row order
    pub examples: Vec<String>,
    /// The number of distinct unresolved identifiers
    pub distinct: usize,
    /// The number of unresolved rows
    pub rows: usize,
}

impl UnresolvedReport {
    /// Build the report from the identifiers of all unresolved rows (one per row, in row order).
    pub fn new<'a>(identifiers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut rows = 0;
        let unique = identifiers
            .into_iter()
            .inspect(|_| rows += 1)
            .unique()
            .collect_vec();
        Self {
            distinct: unique.len(),
            examples: unique
                .into_iter()
                .take(MAX_REPORTED_IDENTIFIERS)
                .map(ToString::to_string)
                .collect(),
            rows,
        }
    }

    /// Check if all rows were resolved
    pub const fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

impl std::fmt::Display for UnresolvedReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "All rows were resolved")
        } else {
            write!(
                f,
                "{} rows ({} distinct identifiers) could not be resolved, {}: {}",
                self.rows,
                self.distinct,
                if self.distinct > self.examples.len() {
                    format!("the first {} are", self.examples.len())
                } else {
                    "these are".to_string()
                },
                self.examples.iter().map(|e| format!("'{e}'")).join(", ")
            )
        }
    }
}
