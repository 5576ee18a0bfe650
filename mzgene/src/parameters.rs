use std::path::Path;

use context_error::{BoxedError, Context, CreateError};
use serde::{Deserialize, Serialize};

use crate::MappingError;

/// All parameters for annotating a table. Use the builder style methods to change the defaults.
/// ```
/// let parameters = mzgene::AnnotationParameters::default()
///     .identifier_column("Accession")
///     .separator(';')
///     .copy_unconverted(false);
/// assert_eq!(parameters.target_attribute, "hgnc_symbol");
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AnnotationParameters {
    /// The column containing the (composite) identifiers
    pub identifier_column: String,
    /// The species, used to select the dataset (`hsapiens` selects `hsapiens_gene_ensembl`)
    pub species: String,
    /// The host of the annotation service
    pub host: String,
    /// The mart (category) on the annotation service
    pub mart: String,
    /// The attribute the identifiers are given in
    pub source_attribute: String,
    /// The attribute to annotate, this is also the name of the added column
    pub target_attribute: String,
    /// The separator used in composite identifiers and to join multiple target values
    pub separator: char,
    /// Copy the identifier for unresolved rows, and keep unresolved parts of composite identifiers
    pub copy_unconverted: bool,
    /// Log additional details and write out the provenance of the annotation service
    pub verbose: bool,
}

impl Default for AnnotationParameters {
    fn default() -> Self {
        Self {
            identifier_column: "Protein".to_string(),
            species: "hsapiens".to_string(),
            host: "https://www.ensembl.org".to_string(),
            mart: "ENSEMBL_MART_ENSEMBL".to_string(),
            source_attribute: "uniprotswissprot".to_string(),
            target_attribute: "hgnc_symbol".to_string(),
            separator: '/',
            copy_unconverted: true,
            verbose: false,
        }
    }
}

impl AnnotationParameters {
    /// Set the identifier column
    #[must_use]
    pub fn identifier_column(self, identifier_column: impl Into<String>) -> Self {
        Self {
            identifier_column: identifier_column.into(),
            ..self
        }
    }

    /// Set the species
    #[must_use]
    pub fn species(self, species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            ..self
        }
    }

    /// Set the host
    #[must_use]
    pub fn host(self, host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..self
        }
    }

    /// Set the mart
    #[must_use]
    pub fn mart(self, mart: impl Into<String>) -> Self {
        Self {
            mart: mart.into(),
            ..self
        }
    }

    /// Set the source attribute
    #[must_use]
    pub fn source_attribute(self, source_attribute: impl Into<String>) -> Self {
        Self {
            source_attribute: source_attribute.into(),
            ..self
        }
    }

    /// Set the target attribute
    #[must_use]
    pub fn target_attribute(self, target_attribute: impl Into<String>) -> Self {
        Self {
            target_attribute: target_attribute.into(),
            ..self
        }
    }

    /// Set the separator
    #[must_use]
    pub fn separator(self, separator: char) -> Self {
        Self { separator, ..self }
    }

    /// Set if unresolved identifiers are copied
    #[must_use]
    pub fn copy_unconverted(self, copy_unconverted: bool) -> Self {
        Self {
            copy_unconverted,
            ..self
        }
    }

    /// Set verbose
    #[must_use]
    pub fn verbose(self, verbose: bool) -> Self {
        Self { verbose, ..self }
    }

    /// Read the parameters from a JSON file, any missing field gets its default value.
    /// # Errors
    /// If the file could not be opened or is not valid JSON for these parameters.
    pub fn from_json_file(
        path: impl AsRef<Path>,
    ) -> Result<Self, BoxedError<'static, MappingError>> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            BoxedError::new(
                MappingError::FileCouldNotBeOpened,
                "Could not open parameters file",
                e.to_string(),
                Context::none().source(path.to_string_lossy()).to_owned(),
            )
        })?;
        serde_json::from_reader(std::io::BufReader::new(file)).map_err(|e| {
            BoxedError::new(
                MappingError::FileCouldNotBeParsed,
                "Could not parse parameters file",
                e.to_string(),
                Context::none().source(path.to_string_lossy()).to_owned(),
            )
        })
    }
}
