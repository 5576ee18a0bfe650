//! The [`MappingError`] which makes it easy for downstream users of the error type to match on the exact error.

use context_error::ErrorKind;
use serde::{Deserialize, Serialize};

/// All ways in which annotating a table can fail. Unresolved identifiers are not an error, these
/// are reported with an [`crate::UnresolvedReport`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum MappingError {
    /// The identifier column is not present in the table
    ColumnNotFound,
    /// The annotation service could not be reached or returned a failing status
    ServiceUnavailable,
    /// The annotation service answered with something that could not be understood
    ServiceResponseInvalid,
    /// The host of the annotation service is not a valid http(s) URL
    InvalidUrl,
    /// A table does not have a unique header or a row has the wrong number of values
    MalformedTable,
    /// A file could not be opened
    #[default]
    FileCouldNotBeOpened,
    /// A file could be opened but reading from it failed
    FileCouldNotBeRead,
    /// A file could be read but its contents are malformed
    FileCouldNotBeParsed,
    /// A file could not be created or written to
    FileCouldNotBeWritten,
}

impl ErrorKind for MappingError {
    type Settings = ();
    fn descriptor(&self) -> &'static str {
        "error"
    }
    fn ignored(&self, _settings: Self::Settings) -> bool {
        false
    }
    fn is_error(&self, _settings: Self::Settings) -> bool {
        true
    }
}

impl MappingError {
    /// If this error originates from the annotation service
    pub const fn is_service_error(self) -> bool {
        matches!(self, Self::ServiceUnavailable | Self::ServiceResponseInvalid)
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn serialise() {
        assert_eq!(
            serde_json::to_string(&MappingError::ColumnNotFound).unwrap(),
            "\"ColumnNotFound\""
        );
        let kind: MappingError = serde_json::from_str("\"ServiceUnavailable\"").unwrap();
        assert!(kind.is_service_error());
    }
}
