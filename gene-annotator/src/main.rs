//! Annotate a tab separated proteomics table with gene symbols
use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use context_error::BoxedError;
use mzgene::{AnnotationParameters, MappingError, MappingFile, annotate_file};

/// The command line interface arguments, any parameter that is not given takes its value from
/// the parameters file or otherwise the default value.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// The input tab separated file (can be gzipped), the output is written next to it with
    /// `_annotated` added to the name
    #[arg(short, long)]
    in_path: PathBuf,
    /// A JSON file with the parameters, explicitly given parameters overrule this file
    #[arg(short, long)]
    parameters: Option<PathBuf>,
    /// Use this tab separated mapping file (source identifiers in the first column, target values
    /// in the second column) instead of the BioMart server
    #[arg(short, long)]
    mapping_file: Option<PathBuf>,
    /// The column with the (composite) identifiers [default: Protein]
    #[arg(long)]
    identifier_column: Option<String>,
    /// The species, selects the `<species>_gene_ensembl` dataset [default: hsapiens]
    #[arg(long)]
    species: Option<String>,
    /// The BioMart host [default: https://www.ensembl.org]
    #[arg(long)]
    host: Option<String>,
    /// The BioMart mart [default: ENSEMBL_MART_ENSEMBL]
    #[arg(long)]
    mart: Option<String>,
    /// The attribute of the identifiers [default: uniprotswissprot]
    #[arg(long)]
    source_attribute: Option<String>,
    /// The attribute to annotate, also the name of the new column [default: hgnc_symbol]
    #[arg(long)]
    target_attribute: Option<String>,
    /// The separator in composite identifiers [default: /]
    #[arg(long)]
    separator: Option<char>,
    /// Leave unresolved rows empty and drop unresolved parts of composite identifiers, instead
    /// of copying the identifiers
    #[arg(long)]
    no_copy_unconverted: bool,
    /// Log more details and write the provenance of the annotation next to the output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Combine the parameters file (or defaults) with the explicitly given parameters
    fn parameters(&self) -> Result<AnnotationParameters, BoxedError<'static, MappingError>> {
        let mut parameters = match &self.parameters {
            Some(path) => AnnotationParameters::from_json_file(path)?,
            None => AnnotationParameters::default(),
        };
        let overrides = [
            (&self.identifier_column, &mut parameters.identifier_column),
            (&self.species, &mut parameters.species),
            (&self.host, &mut parameters.host),
            (&self.mart, &mut parameters.mart),
            (&self.source_attribute, &mut parameters.source_attribute),
            (&self.target_attribute, &mut parameters.target_attribute),
        ];
        for (given, parameter) in overrides {
            if let Some(value) = given {
                parameter.clone_from(value);
            }
        }
        if let Some(separator) = self.separator {
            parameters.separator = separator;
        }
        if self.no_copy_unconverted {
            parameters.copy_unconverted = false;
        }
        if self.verbose {
            parameters.verbose = true;
        }
        Ok(parameters)
    }
}

fn run(args: &Cli) -> Result<(), BoxedError<'static, MappingError>> {
    let parameters = args.parameters()?;
    tracing::debug!("Parameters: {parameters:?}");
    let (path, unresolved) = if let Some(mapping_file) = &args.mapping_file {
        let mapping = MappingFile::from_path(mapping_file)?;
        annotate_file(&args.in_path, &parameters, &mapping)?
    } else {
        annotate_with_biomart(&args.in_path, &parameters)?
    };
    println!("Annotated table written to {}", path.display());
    if !unresolved.is_empty() {
        println!("{unresolved}");
    }
    Ok(())
}

#[cfg(feature = "internet")]
fn annotate_with_biomart(
    path: &std::path::Path,
    parameters: &AnnotationParameters,
) -> Result<(PathBuf, mzgene::UnresolvedReport), BoxedError<'static, MappingError>> {
    let mart = mzgene::BioMart::connect(&parameters.species, &parameters.host, &parameters.mart)?;
    annotate_file(path, parameters, &mart)
}

#[cfg(not(feature = "internet"))]
fn annotate_with_biomart(
    _path: &std::path::Path,
    _parameters: &AnnotationParameters,
) -> Result<(PathBuf, mzgene::UnresolvedReport), BoxedError<'static, MappingError>> {
    use context_error::{Context, CreateError};
    Err(BoxedError::new(
        MappingError::ServiceUnavailable,
        "BioMart is not available",
        "This build does not have the `internet` feature, use a mapping file instead",
        Context::none(),
    ))
}

fn main() -> ExitCode {
    let args = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn overrides() {
        let args = Cli::parse_from([
            "gene-annotator",
            "-i",
            "proteins.tsv",
            "--species",
            "mmusculus",
            "--target-attribute",
            "mgi_symbol",
            "--separator",
            ";",
            "--no-copy-unconverted",
        ]);
        let parameters = args.parameters().unwrap();
        assert_eq!(
            parameters,
            AnnotationParameters::default()
                .species("mmusculus")
                .target_attribute("mgi_symbol")
                .separator(';')
                .copy_unconverted(false)
        );
    }
}
