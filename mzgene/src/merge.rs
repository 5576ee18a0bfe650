//! Merge a [`MappingTable`] into a [`RecordTable`], resolving composite identifiers token by token.

use std::collections::HashMap;

use context_error::BoxedError;
use itertools::Itertools;

use crate::{
    AnnotationParameters, MappingError, MappingTable, RecordTable, UnresolvedReport,
    atomic_identifiers, is_composite,
};

/// A table that has been annotated
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Annotated {
    /// The annotated table, with the target column added
    pub table: RecordTable,
    /// The rows that could not be resolved
    pub unresolved: UnresolvedReport,
}

/// Resolve a composite identifier by replacing every atomic identifier that is present in the
/// mapping with its target value, keeping the original order. Atomic identifiers that are not in
/// the mapping are kept as is if `copy_unconverted` is set, or otherwise left out. A leading
/// count is always left out. If none of the atomic identifiers could be resolved `None` is
/// returned.
/// ```
/// let mapping = mzgene::collapse([("P60709".to_string(), "ACTB".to_string())], '/');
/// assert_eq!(
///     mzgene::resolve_composite("2/P63261/P60709", &mapping, '/', true).as_deref(),
///     Some("P63261/ACTB")
/// );
/// assert_eq!(
///     mzgene::resolve_composite("2/P63261/P60709", &mapping, '/', false).as_deref(),
///     Some("ACTB")
/// );
/// assert_eq!(mzgene::resolve_composite("2/P63261/Q1", &mapping, '/', true), None);
/// ```
pub fn resolve_composite(
    identifier: &str,
    mapping: &MappingTable,
    separator: char,
    copy_unconverted: bool,
) -> Option<String> {
    let mut any_resolved = false;
    let parts = atomic_identifiers(identifier, separator)
        .filter_map(|token| {
            if let Some(value) = mapping.get(token) {
                any_resolved = true;
                Some(value)
            } else {
                copy_unconverted.then_some(token)
            }
        })
        .collect_vec();
    any_resolved.then(|| parts.iter().join(&separator.to_string()))
}

/// Merge the mapping into the table as a new column named after the target attribute (an
/// existing column with that name is overwritten).
///
/// 1. Every row whose identifier is a key in the mapping gets the mapped value.
/// 2. Every composite identifier that is still unresolved is resolved token by token, see
///    [`resolve_composite`]. The result is given to all rows with exactly the same identifier.
/// 3. The still unresolved rows are reported.
/// 4. If `copy_unconverted` is set the unresolved rows get their own identifier as value.
///
/// # Errors
/// If the identifier column does not exist.
pub fn merge_annotations(
    mut table: RecordTable,
    mapping: &MappingTable,
    parameters: &AnnotationParameters,
) -> Result<Annotated, BoxedError<'static, MappingError>> {
    let identifier_column = parameters.identifier_column.as_str();
    let target_column = parameters.target_attribute.as_str();
    let separator = parameters.separator;

    // The target column may replace the identifier column, so the identifiers are kept first
    let identifiers = table
        .column(identifier_column)
        .ok_or_else(|| table.column_not_found(identifier_column))?
        .map(ToString::to_string)
        .collect_vec();

    let matched = table.left_join(identifier_column, mapping, target_column)?;
    tracing::debug!("{matched} of {} rows matched directly", table.len());

    let direct = table
        .column(target_column)
        .ok_or_else(|| table.column_not_found(target_column))?
        .collect_vec();

    // All composite identifiers are resolved before any row is updated
    let mut composite: HashMap<&str, Option<String>> = HashMap::new();
    for (identifier, value) in identifiers.iter().zip(&direct) {
        if value.is_empty() && is_composite(identifier, separator) {
            composite.entry(identifier.as_str()).or_insert_with(|| {
                resolve_composite(
                    identifier,
                    mapping,
                    separator,
                    parameters.copy_unconverted,
                )
            });
        }
    }
    tracing::debug!(
        "{} of {} distinct unresolved composite identifiers were resolved",
        composite.values().filter(|v| v.is_some()).count(),
        composite.len()
    );

    let mut values = identifiers
        .iter()
        .zip(&direct)
        .map(|(identifier, value)| {
            if value.is_empty() {
                composite
                    .get(identifier.as_str())
                    .cloned()
                    .flatten()
                    .unwrap_or_default()
            } else {
                (*value).to_string()
            }
        })
        .collect_vec();

    let unresolved = UnresolvedReport::new(
        identifiers
            .iter()
            .zip(&values)
            .filter(|(_, value)| value.is_empty())
            .map(|(identifier, _)| identifier.as_str()),
    );
    if unresolved.is_empty() {
        tracing::info!("All {} rows were resolved", identifiers.len());
    } else {
        tracing::warn!("{unresolved}");
    }

    if parameters.copy_unconverted {
        for (identifier, value) in identifiers.iter().zip(values.iter_mut()) {
            if value.is_empty() {
                value.clone_from(identifier);
            }
        }
    }

    table.set_column(target_column, values);
    Ok(Annotated { table, unresolved })
}
