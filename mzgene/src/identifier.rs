//! Handle (composite) protein identifiers. A composite identifier is written as multiple atomic
//! identifiers joined by a separator, optionally preceded by a count: `2/P63261/P60709`.

use std::sync::LazyLock;

use context_error::BoxedError;
use indexmap::IndexSet;
use regex::Regex;

use crate::{MappingError, RecordTable};

/// Identifiers marked as contaminant, these are never resolved
static CONTAMINANT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^CONT_").unwrap());

/// The maximal number of digits in the count that can precede a composite identifier
const MAX_COUNT_DIGITS: usize = 3;

/// Check if this identifier is a contaminant (starts with `CONT_`, case sensitive).
pub fn is_contaminant(identifier: &str) -> bool {
    CONTAMINANT_REGEX.is_match(identifier)
}

/// Check if this identifier is a composite identifier.
pub fn is_composite(identifier: &str, separator: char) -> bool {
    identifier.contains(separator)
}

/// Remove the leading count from a composite identifier, a count is at most three digits
/// followed by the separator.
/// ```
/// assert_eq!(mzgene::strip_count("2/P63261/P60709", '/'), "P63261/P60709");
/// assert_eq!(mzgene::strip_count("1000/P63261", '/'), "1000/P63261");
/// assert_eq!(mzgene::strip_count("P60709", '/'), "P60709");
/// ```
pub fn strip_count(identifier: &str, separator: char) -> &str {
    match identifier.split_once(separator) {
        Some((count, rest))
            if (1..=MAX_COUNT_DIGITS).contains(&count.len())
                && count.bytes().all(|b| b.is_ascii_digit()) =>
        {
            rest
        }
        _ => identifier,
    }
}

/// Get all atomic identifiers from a (composite) identifier, in the original order. A leading
/// count is removed.
pub fn atomic_identifiers(identifier: &str, separator: char) -> impl Iterator<Item = &str> {
    strip_count(identifier, separator).split(separator)
}

/// Remove a leading count of any length from a composite identifier, used when building the set
/// of identifiers to query so that no count ends up at the annotation service.
fn strip_query_count(identifier: &str, separator: char) -> &str {
    match identifier.split_once(separator) {
        Some((count, rest))
            if !count.is_empty() && count.bytes().all(|b| b.is_ascii_digit()) =>
        {
            rest
        }
        _ => identifier,
    }
}

/// Get all distinct atomic identifiers from the given column that have to be resolved. The
/// simple identifiers come first (in order of first occurrence) followed by the atomic
/// identifiers from the composite identifiers, with any leading count removed. Contaminants are
/// left out. Empty values are kept.
/// # Errors
/// If the column does not exist.
pub fn extract_identifiers(
    table: &RecordTable,
    column: &str,
    separator: char,
) -> Result<IndexSet<String>, BoxedError<'static, MappingError>> {
    let distinct: IndexSet<&str> = table
        .column(column)
        .ok_or_else(|| table.column_not_found(column))?
        .collect();
    let (composite, simple): (Vec<&str>, Vec<&str>) = distinct
        .into_iter()
        .partition(|id| is_composite(id, separator));

    let mut identifiers: IndexSet<String> = simple
        .into_iter()
        .filter(|id| !is_contaminant(id))
        .map(ToString::to_string)
        .collect();
    identifiers.extend(
        composite
            .into_iter()
            .flat_map(|id| strip_query_count(id, separator).split(separator))
            .filter(|id| !is_contaminant(id))
            .map(ToString::to_string),
    );
    tracing::debug!(
        "Extracted {} distinct identifiers from column '{column}'",
        identifiers.len()
    );
    Ok(identifiers)
}
