//! Resolve atomic identifiers with a [`MappingService`].

use context_error::BoxedError;
use indexmap::IndexSet;

use crate::{MappingError, MappingService};

/// Look up the identifiers with the given service. The service is called once with all
/// identifiers, the resulting pairs are returned unchanged. When there is nothing to look up (no
/// identifiers, or only empty identifiers) the service is not called at all.
/// # Errors
/// Any error from the service is returned unchanged.
pub fn resolve(
    service: &impl MappingService,
    source_attribute: &str,
    target_attribute: &str,
    identifiers: &IndexSet<String>,
) -> Result<Vec<(String, String)>, BoxedError<'static, MappingError>> {
    if identifiers.iter().all(String::is_empty) {
        tracing::debug!("No identifiers to resolve, the annotation service is not queried");
        return Ok(Vec::new());
    }
    tracing::info!(
        "Resolving {} identifiers from '{source_attribute}' to '{target_attribute}'",
        identifiers.len()
    );
    let pairs = service.lookup(source_attribute, target_attribute, identifiers)?;
    tracing::debug!("The annotation service returned {} pairs", pairs.len());
    Ok(pairs)
}
