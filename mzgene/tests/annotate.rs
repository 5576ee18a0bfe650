#![expect(clippy::missing_panics_doc)]
//! Integration tests for the full annotation pipeline
use std::cell::RefCell;

use context_error::{BoxedError, Context, CreateError, FullErrorContent, StaticErrorContent};
use indexmap::IndexSet;
use itertools::Itertools;
use mzgene::*;

type LookupResult = Result<Vec<(String, String)>, BoxedError<'static, MappingError>>;

/// A service that answers from a fixed list of pairs and remembers all queried keys
struct Stub {
    pairs: Vec<(String, String)>,
    queried: RefCell<Vec<IndexSet<String>>>,
}

impl Stub {
    fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            pairs: pairs
                .iter()
                .map(|(a, b)| ((*a).to_string(), (*b).to_string()))
                .collect(),
            queried: RefCell::new(Vec::new()),
        }
    }
}

impl MappingService for Stub {
    fn lookup(
        &self,
        _source_attribute: &str,
        _target_attribute: &str,
        keys: &IndexSet<String>,
    ) -> LookupResult {
        self.queried.borrow_mut().push(keys.clone());
        Ok(self
            .pairs
            .iter()
            .filter(|(k, _)| keys.contains(k))
            .cloned()
            .collect())
    }
}

fn table(text: &str) -> RecordTable {
    RecordTable::from_reader(text.as_bytes(), b'\t').unwrap()
}

/// Annotation of a typical table with shared peptides and contaminants
#[test]
fn proteomics_table() {
    let stub = Stub::new(&[
        ("P60709", "ACTB"),
        ("P68371", "TUBB4B"),
        ("P68371", "TUBB4A"),
        ("CONT_BOVINE", "ALB"),
    ]);
    let input = table(
        "Sequence\tProtein\tIntensity\n\
         SYELPDGQVITIGNER\t2/P63261/P60709\t1.5e6\n\
         AGFAGDDAPR\tP60709\t2.1e7\n\
         LHFFMPGFAPLTSR\tP68371\t4.0e5\n\
         LVNELTEFAK\tCONT_BOVINE\t3.3e8\n\
         DAFLGSFLYEYSR\t2/CONT_BOVINE/CONT_HUMAN\t1.0e4\n\
         VGINYQPPTVVPGGDLAK\tQ9XXXX\t7.0e3\n",
    );
    let annotated = annotate(input, &AnnotationParameters::default(), &stub).unwrap();

    let queried = stub.queried.borrow();
    assert_eq!(queried.len(), 1);
    assert_eq!(
        queried[0].iter().collect_vec(),
        ["P60709", "P68371", "Q9XXXX", "P63261"]
    );

    assert_eq!(
        annotated.table.header().collect_vec(),
        ["hgnc_symbol", "Sequence", "Protein", "Intensity"]
    );
    assert_eq!(
        annotated.table.column("hgnc_symbol").unwrap().collect_vec(),
        [
            "P63261/ACTB",
            "ACTB",
            "TUBB4B/TUBB4A",
            "CONT_BOVINE",
            "2/CONT_BOVINE/CONT_HUMAN",
            "Q9XXXX"
        ]
    );
    assert_eq!(
        annotated.unresolved.examples,
        ["CONT_BOVINE", "2/CONT_BOVINE/CONT_HUMAN", "Q9XXXX"]
    );
    assert_eq!(annotated.unresolved.rows, 3);
}

/// Without copying the unresolved identifiers stay empty
#[test]
fn no_copy() {
    let stub = Stub::new(&[("P60709", "ACTB")]);
    let annotated = annotate(
        table("Protein\n2/P63261/P60709\nQ1\n"),
        &AnnotationParameters::default().copy_unconverted(false),
        &stub,
    )
    .unwrap();
    assert_eq!(
        annotated.table.column("hgnc_symbol").unwrap().collect_vec(),
        ["ACTB", ""]
    );
}

/// Simple identifiers that all resolve give exactly the direct mapping, without changing the row count
#[test]
fn fully_resolved_is_direct_and_stable() {
    let stub = Stub::new(&[("A", "X"), ("B", "Y"), ("C", "Z")]);
    let parameters = AnnotationParameters::default();
    let input = table("Protein\tValue\nA\t1\nB\t2\nC\t3\nA\t4\n");
    let first = annotate(input, &parameters, &stub).unwrap();
    assert_eq!(first.table.len(), 4);
    assert_eq!(
        first.table.column("hgnc_symbol").unwrap().collect_vec(),
        ["X", "Y", "Z", "X"]
    );
    assert!(first.unresolved.is_empty());

    let second = annotate(first.table.clone(), &parameters, &stub).unwrap();
    assert_eq!(
        first.table.column("hgnc_symbol").unwrap().collect_vec(),
        second.table.column("hgnc_symbol").unwrap().collect_vec()
    );
    assert_eq!(second.table.number_of_columns(), 3);
}

/// Multiple targets are joined in the order of the service
#[test]
fn multiple_targets() {
    let stub = Stub::new(&[("A", "X"), ("A", "Y")]);
    let annotated = annotate(
        table("Protein\nA\n"),
        &AnnotationParameters::default(),
        &stub,
    )
    .unwrap();
    assert_eq!(annotated.table.value(0, "hgnc_symbol"), Some("X/Y"));
}

/// The unresolved report lists at most 20 identifiers
#[test]
fn unresolved_report() {
    let stub = Stub::new(&[]);
    let text = std::iter::once("Protein".to_string())
        .chain((0..25).map(|i| format!("Q{i:05}")))
        .join("\n");
    let annotated = annotate(table(&text), &AnnotationParameters::default(), &stub).unwrap();
    assert_eq!(annotated.unresolved.examples.len(), 20);
    assert_eq!(annotated.unresolved.examples[19], "Q00019");
    assert_eq!(annotated.unresolved.rows, 25);
    assert!(annotated.unresolved.to_string().starts_with("25 rows"));
}

/// A missing column is reported with all available columns and the service is never called
#[test]
fn missing_column() {
    let stub = Stub::new(&[]);
    let error = annotate(
        table("Accession\tIntensity\nP60709\t1\n"),
        &AnnotationParameters::default(),
        &stub,
    )
    .unwrap_err();
    assert!(matches!(error.get_kind(), MappingError::ColumnNotFound));
    assert!(error.get_long_description().contains("'Accession'"));
    assert!(error.get_long_description().contains("'Intensity'"));
    assert!(stub.queried.borrow().is_empty());
}

/// Errors from the service are returned as is
#[test]
fn service_error() {
    let service = |_: &str, _: &str, _: &IndexSet<String>| -> LookupResult {
        Err(BoxedError::new(
            MappingError::ServiceUnavailable,
            "Could not reach BioMart",
            "Connection timed out",
            Context::none(),
        ))
    };
    let error = annotate(
        table("Protein\nP60709\n"),
        &AnnotationParameters::default(),
        &service,
    )
    .unwrap_err();
    assert!(error.get_kind().is_service_error());
    assert_eq!(error.get_short_description(), "Could not reach BioMart");
}

/// Annotating a file writes the annotated file and optionally the provenance
#[test]
fn file() {
    let directory = tempfile::tempdir().unwrap();
    let input = directory.path().join("peptides.tsv");
    std::fs::write(
        &input,
        "Sequence\tAccession\nAGFAGDDAPR\tP60709\nSYELPDGQVITIGNER\t2;P63261;P60709\n",
    )
    .unwrap();
    let mapping_path = directory.path().join("mapping.tsv");
    std::fs::write(
        &mapping_path,
        "uniprotswissprot\thgnc_symbol\nP60709\tACTB\nP63261\tACTG1\n",
    )
    .unwrap();
    let mapping = MappingFile::from_path(&mapping_path).unwrap();
    let parameters = AnnotationParameters::default()
        .identifier_column("Accession")
        .separator(';')
        .verbose(true);

    let (path, unresolved) = annotate_file(&input, &parameters, &mapping).unwrap();
    assert_eq!(path, directory.path().join("peptides_annotated.tsv"));
    assert!(unresolved.is_empty());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "hgnc_symbol\tSequence\tAccession\nACTB\tAGFAGDDAPR\tP60709\nACTG1;ACTB\tSYELPDGQVITIGNER\t2;P63261;P60709\n"
    );

    let provenance: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(directory.path().join("peptides_provenance.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(provenance["parameters"]["identifier_column"], "Accession");
    assert_eq!(provenance["source"]["service"], "Mapping file");
    assert_eq!(provenance["unresolved"]["rows"], 0);
}

/// Gzipped files are read and written compressed
#[test]
fn gzipped_file() {
    use std::io::{Read, Write};

    let directory = tempfile::tempdir().unwrap();
    let input = directory.path().join("proteins.tsv.gz");
    let mut encoder = flate2::write::GzEncoder::new(
        std::fs::File::create(&input).unwrap(),
        flate2::Compression::default(),
    );
    encoder.write_all(b"Protein\nP60709\n").unwrap();
    encoder.finish().unwrap();

    let stub = Stub::new(&[("P60709", "ACTB")]);
    let (path, _) = annotate_file(&input, &AnnotationParameters::default(), &stub).unwrap();
    assert_eq!(path, directory.path().join("proteins_annotated.tsv.gz"));
    assert!(!directory.path().join("proteins_provenance.json").exists());

    let mut text = String::new();
    flate2::read::GzDecoder::new(std::fs::File::open(&path).unwrap())
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(text, "hgnc_symbol\tProtein\nACTB\tP60709\n");
}

/// A missing input file is an error
#[test]
fn missing_file() {
    let directory = tempfile::tempdir().unwrap();
    let error = annotate_file(
        directory.path().join("missing.tsv"),
        &AnnotationParameters::default(),
        &Stub::new(&[]),
    )
    .unwrap_err();
    assert!(matches!(
        error.get_kind(),
        MappingError::FileCouldNotBeOpened
    ));
}
