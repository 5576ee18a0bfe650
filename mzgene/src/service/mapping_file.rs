use std::path::Path;

use context_error::{BoxedError, Context, CreateError};
use indexmap::IndexSet;
use itertools::Itertools;

use crate::{MappingError, MappingService, Provenance, RecordTable};

/// A mapping read from a file, to annotate without access to an annotation service. The file is
/// tab separated with a header line, the first column contains the source identifiers and the
/// second column the target values. Any other columns are ignored.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MappingFile {
    location: String,
    source_attribute: String,
    target_attribute: String,
    pairs: Vec<(String, String)>,
}

impl MappingFile {
    /// Read a mapping file, `.gz` files are decompressed on the fly.
    /// # Errors
    /// If the file could not be read or has less than two columns.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BoxedError<'static, MappingError>> {
        let path = path.as_ref();
        let table = RecordTable::from_path(path, b'\t')?;
        let Some((source_attribute, target_attribute)) = table.header().next_tuple() else {
            return Err(BoxedError::new(
                MappingError::FileCouldNotBeParsed,
                "Invalid mapping file",
                "A mapping file needs at least two columns, the source identifiers and the target values",
                Context::none().source(path.to_string_lossy()).to_owned(),
            ));
        };
        let (source_attribute, target_attribute) =
            (source_attribute.to_string(), target_attribute.to_string());
        let pairs = table
            .rows()
            .map(|row| (row[0].to_string(), row[1].to_string()))
            .collect();
        Ok(Self::from_pairs(source_attribute, target_attribute, pairs)
            .location(path.to_string_lossy()))
    }

    /// Create a mapping from (source, target) pairs
    pub fn from_pairs(
        source_attribute: impl Into<String>,
        target_attribute: impl Into<String>,
        pairs: Vec<(String, String)>,
    ) -> Self {
        Self {
            location: String::new(),
            source_attribute: source_attribute.into(),
            target_attribute: target_attribute.into(),
            pairs,
        }
    }

    fn location(self, location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..self
        }
    }

    /// The number of pairs in this mapping
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check if this mapping is empty
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl MappingService for MappingFile {
    fn lookup(
        &self,
        source_attribute: &str,
        target_attribute: &str,
        keys: &IndexSet<String>,
    ) -> Result<Vec<(String, String)>, BoxedError<'static, MappingError>> {
        if source_attribute != self.source_attribute || target_attribute != self.target_attribute
        {
            tracing::debug!(
                "Mapping file maps '{}' to '{}' but '{source_attribute}' to '{target_attribute}' was requested",
                self.source_attribute,
                self.target_attribute,
            );
        }
        Ok(self
            .pairs
            .iter()
            .filter(|(key, value)| !value.is_empty() && keys.contains(key))
            .cloned()
            .collect())
    }

    fn provenance(&self) -> Option<Provenance> {
        Some(Provenance {
            service: "Mapping file".to_string(),
            location: self.location.clone(),
            dataset: None,
            description: Some(format!(
                "{} to {}, {} pairs",
                self.source_attribute,
                self.target_attribute,
                self.pairs.len()
            )),
        })
    }
}
