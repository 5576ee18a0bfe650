//! The annotation services that can resolve identifiers.

#[cfg(feature = "internet")]
mod biomart;
mod mapping_file;

#[cfg(feature = "internet")]
pub use biomart::*;
pub use mapping_file::*;

use context_error::BoxedError;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::MappingError;

/// A service that can look up the target values for a set of source identifiers. Any closure with
/// the same signature as [`MappingService::lookup`] can be used as service.
pub trait MappingService {
    /// Look up all keys in one batch. A key can have zero, one, or multiple target values, all
    /// (key, value) pairs are returned in the order the service gives them.
    /// # Errors
    /// If the service could not be reached or answered with an error.
    fn lookup(
        &self,
        source_attribute: &str,
        target_attribute: &str,
        keys: &IndexSet<String>,
    ) -> Result<Vec<(String, String)>, BoxedError<'static, MappingError>>;

    /// Describe where the data of this service comes from, if available
    fn provenance(&self) -> Option<Provenance> {
        None
    }
}

impl<F> MappingService for F
where
    F: Fn(
        &str,
        &str,
        &IndexSet<String>,
    ) -> Result<Vec<(String, String)>, BoxedError<'static, MappingError>>,
{
    fn lookup(
        &self,
        source_attribute: &str,
        target_attribute: &str,
        keys: &IndexSet<String>,
    ) -> Result<Vec<(String, String)>, BoxedError<'static, MappingError>> {
        self(source_attribute, target_attribute, keys)
    }
}

/// The origin of the data used to annotate a table
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Provenance {
    /// The kind of service
    pub service: String,
    /// The location of the data (URL or file path)
    pub location: String,
    /// The dataset used
    pub dataset: Option<String>,
    /// The description of the dataset, as given by the service, this often contains the version
    pub description: Option<String>,
}
