//! The full annotation pipeline, on an in memory table or on a file.

use std::{
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use context_error::{BoxedError, Context, CreateError};
use serde::Serialize;

use crate::{
    Annotated, AnnotationParameters, MappingError, MappingService, Provenance, RecordTable,
    UnresolvedReport, annotated_path, assemble_output, collapse, extract_identifiers,
    merge_annotations, resolve, table::suffixed_path,
};

/// Annotate a table. The identifiers in the identifier column are resolved with the service and
/// the result is placed in a new first column named after the target attribute.
/// # Errors
/// * If the identifier column does not exist, the error lists all available columns.
/// * If the service failed, the error from the service is returned unchanged.
pub fn annotate(
    table: RecordTable,
    parameters: &AnnotationParameters,
    service: &impl MappingService,
) -> Result<Annotated, BoxedError<'static, MappingError>> {
    if !table.contains_column(&parameters.identifier_column) {
        return Err(table.column_not_found(&parameters.identifier_column));
    }
    let identifiers =
        extract_identifiers(&table, &parameters.identifier_column, parameters.separator)?;
    let pairs = resolve(
        service,
        &parameters.source_attribute,
        &parameters.target_attribute,
        &identifiers,
    )?;
    let mapping = collapse(pairs, parameters.separator);
    tracing::debug!(
        "{} of {} identifiers could be resolved",
        mapping.len(),
        identifiers.len()
    );
    let Annotated { table, unresolved } = merge_annotations(table, &mapping, parameters)?;
    Ok(Annotated {
        table: assemble_output(table, &parameters.target_attribute),
        unresolved,
    })
}

/// Annotate a tab separated file, the result is written next to it with `_annotated` inserted
/// before the extension (see [`annotated_path`]). If verbose is set and the service knows its
/// provenance, this is written to a JSON file with `_provenance` after the file stem.
///
/// Returns the path of the annotated file and the unresolved rows.
/// # Errors
/// * If the file could not be read.
/// * If the annotation failed, see [`annotate`].
/// * If the annotated file or provenance file could not be written.
pub fn annotate_file(
    path: impl AsRef<Path>,
    parameters: &AnnotationParameters,
    service: &impl MappingService,
) -> Result<(PathBuf, UnresolvedReport), BoxedError<'static, MappingError>> {
    let path = path.as_ref();
    let table = RecordTable::from_path(path, b'\t')?;
    tracing::info!("Read {} rows from {}", table.len(), path.display());
    let Annotated { table, unresolved } = annotate(table, parameters, service)?;

    let out_path = annotated_path(path);
    table.write_to_path(&out_path, '\t')?;
    tracing::info!("Written annotated table to {}", out_path.display());

    if parameters.verbose
        && let Some(provenance) = service.provenance()
    {
        let provenance_path = suffixed_path(path, "_provenance", Some("json"));
        write_provenance(&provenance_path, parameters, provenance, &unresolved)?;
        tracing::info!("Written provenance to {}", provenance_path.display());
    }
    Ok((out_path, unresolved))
}

/// Everything needed to trace back how a table was annotated
#[derive(Debug, Serialize)]
struct ProvenanceReport<'a> {
    created: String,
    tool: &'static str,
    version: &'static str,
    parameters: &'a AnnotationParameters,
    source: Provenance,
    unresolved: &'a UnresolvedReport,
}

fn write_provenance(
    path: &Path,
    parameters: &AnnotationParameters,
    source: Provenance,
    unresolved: &UnresolvedReport,
) -> Result<(), BoxedError<'static, MappingError>> {
    let report = ProvenanceReport {
        created: chrono::Utc::now().to_rfc3339(),
        tool: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        parameters,
        source,
        unresolved,
    };
    let error = |e: String| {
        BoxedError::new(
            MappingError::FileCouldNotBeWritten,
            "Could not write provenance",
            e,
            Context::none().source(path.to_string_lossy()).to_owned(),
        )
    };
    let file = std::fs::File::create(path).map_err(|e| error(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report).map_err(|e| error(e.to_string()))?;
    writer.flush().map_err(|e| error(e.to_string()))
}
