//! The [`RecordTable`], an in memory table of records with named columns, and reading and writing
//! it from and to delimited files.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use context_error::{BoxedError, Context, CreateError};
use flate2::{Compression, bufread::GzDecoder, write::GzEncoder};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{MappingError, MappingTable, helper_functions::check_extension};

/// A table of records. Every row has a value for every column, an empty string is used for
/// missing values. Columns are kept in an ordered map from name to the position of the values in
/// each row, so looking up a column by name is O(1) and reordering columns never touches the rows.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RecordTable {
    /// The column names in display order, with the index of their values in the rows
    columns: IndexMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl RecordTable {
    /// Create an empty table with the given column names.
    /// # Errors
    /// If a column name occurs more than once.
    pub fn new(
        header: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, BoxedError<'static, MappingError>> {
        let mut columns = IndexMap::new();
        for name in header {
            let name = name.into();
            if columns.contains_key(&name) {
                return Err(BoxedError::new(
                    MappingError::MalformedTable,
                    "Duplicate column",
                    format!(
                        "The column '{name}' occurs more than once, all column names have to be unique"
                    ),
                    Context::none(),
                ));
            }
            let index = columns.len();
            columns.insert(name, index);
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Add a row to the end of the table, the values are given in the current column order.
    /// # Errors
    /// If the row does not have exactly one value per column.
    pub fn push_row(
        &mut self,
        row: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<(), BoxedError<'static, MappingError>> {
        let row = row.into_iter().map(Into::into).collect_vec();
        if row.len() != self.columns.len() {
            return Err(BoxedError::new(
                MappingError::MalformedTable,
                "Incorrect number of columns",
                format!(
                    "{} columns were expected but {} were found",
                    self.columns.len(),
                    row.len()
                ),
                Context::none(),
            ));
        }
        let mut stored = vec![String::new(); row.len()];
        for (value, index) in row.into_iter().zip(self.columns.values()) {
            stored[*index] = value;
        }
        self.rows.push(stored);
        Ok(())
    }

    /// The column names in order
    pub fn header(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// The number of columns
    pub fn number_of_columns(&self) -> usize {
        self.columns.len()
    }

    /// The number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if this table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if this table has a column with this exact name
    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Get all values of a column, in row order
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        let index = *self.columns.get(name)?;
        Some(self.rows.iter().map(move |row| row[index].as_str()))
    }

    /// Get a single value
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = *self.columns.get(column)?;
        self.rows.get(row).map(|row| row[index].as_str())
    }

    /// Get all rows with their values in column order
    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> {
        self.rows.iter().map(|row| {
            self.columns
                .values()
                .map(|index| row[*index].as_str())
                .collect()
        })
    }

    /// Build an index from each distinct value in the given column to the rows that contain it.
    pub fn index_on(&self, column: &str) -> Option<HashMap<&str, Vec<usize>>> {
        let index = *self.columns.get(column)?;
        let mut map: HashMap<&str, Vec<usize>> = HashMap::new();
        for (row_index, row) in self.rows.iter().enumerate() {
            map.entry(row[index].as_str()).or_default().push(row_index);
        }
        Some(map)
    }

    /// Left outer join the mapping onto this table. Every row is kept exactly once, rows whose
    /// value in column `on` is a key in the mapping get the mapped value in `column`, all other
    /// rows get an empty value. If `column` already exists its values are replaced. Returns the
    /// number of rows that matched.
    /// # Errors
    /// If the column `on` does not exist.
    pub fn left_join(
        &mut self,
        on: &str,
        mapping: &MappingTable,
        column: &str,
    ) -> Result<usize, BoxedError<'static, MappingError>> {
        let index = self
            .index_on(on)
            .ok_or_else(|| self.column_not_found(on))?;
        let mut values = vec![String::new(); self.rows.len()];
        let mut matched = 0;
        for (key, rows) in index {
            if let Some(value) = mapping.get(key) {
                matched += rows.len();
                for row in rows {
                    values[row] = value.to_string();
                }
            }
        }
        self.set_column(column, values);
        Ok(matched)
    }

    /// Set the values of a column, adding it as the last column if it does not exist yet.
    pub(crate) fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        if let Some(index) = self.columns.get(name).copied() {
            for (row, value) in self.rows.iter_mut().zip(values) {
                row[index] = value;
            }
        } else {
            let index = self.columns.len();
            self.columns.insert(name.to_string(), index);
            for (row, value) in self.rows.iter_mut().zip(values) {
                row.push(value);
            }
        }
    }

    /// Move the given column to be the first column. Returns false if the column does not exist.
    pub fn move_column_to_front(&mut self, name: &str) -> bool {
        self.columns.get_index_of(name).is_some_and(|index| {
            self.columns.move_index(index, 0);
            true
        })
    }

    /// The error for a column that does not exist in this table, lists all available columns.
    pub(crate) fn column_not_found(&self, name: &str) -> BoxedError<'static, MappingError> {
        BoxedError::new(
            MappingError::ColumnNotFound,
            "Could not find given column",
            format!(
                "This table does not contain the column '{name}', the available columns are: {}",
                self.header().map(|c| format!("'{c}'")).join(", ")
            ),
            Context::none(),
        )
    }

    /// Read a delimited file with a header line. If the file has the extension `gz` it is
    /// decompressed on the fly.
    /// # Errors
    /// If the file could not be opened, or if any line could not be read or parsed.
    pub fn from_path(
        path: impl AsRef<Path>,
        separator: u8,
    ) -> Result<Self, BoxedError<'static, MappingError>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            BoxedError::new(
                MappingError::FileCouldNotBeOpened,
                "Could not open file",
                e.to_string(),
                Context::none().source(path.to_string_lossy()).to_owned(),
            )
        })?;
        let result = if check_extension(path, "gz") {
            Self::from_reader(GzDecoder::new(BufReader::new(file)), separator)
        } else {
            Self::from_reader(file, separator)
        };
        result.map_err(|e| e.add_contexts([Context::none().source(path.to_string_lossy()).to_owned()]))
    }

    /// Read a delimited table from a raw reader. The first line is the header, unless it is a
    /// `sep=C` line which then overrules the separator and the header is the second line. Empty
    /// lines are skipped, except in single column tables where they are an empty value.
    /// # Errors
    /// If there is no header line, if the header has duplicate column names, if a line could not
    /// be read, or if a line does not have the same number of columns as the header.
    pub fn from_reader(
        reader: impl Read,
        mut separator: u8,
    ) -> Result<Self, BoxedError<'static, MappingError>> {
        let reader = BufReader::new(reader);
        let mut lines = reader.lines().enumerate().peekable();
        let mut skip = false;
        if let Some(sep) = lines
            .peek()
            .and_then(|(_, l)| l.as_ref().ok())
            .and_then(|l| l.strip_prefix("sep="))
        {
            skip = true;
            if let Some(c) = sep.chars().next() {
                if c.len_utf8() == 1 {
                    separator = c as u8;
                } else {
                    return Err(BoxedError::new(
                        MappingError::FileCouldNotBeParsed,
                        "Unicode value separators not supported",
                        "This is a character that takes more than 1 byte to represent in Unicode, this is not supported in parsing delimited files.",
                        Context::full_line(0, format!("sep={sep}")),
                    ));
                }
            }
        }
        if skip {
            // Actually consume this line
            let _unused = lines.next();
        }
        let separator = char::from(separator);

        let (header_index, header_line) = lines.next().ok_or_else(|| {
            BoxedError::new(
                MappingError::FileCouldNotBeParsed,
                "Could not parse table",
                "The file is empty",
                Context::none(),
            )
        })?;
        let header_line = header_line.map_err(|err| {
            BoxedError::new(
                MappingError::FileCouldNotBeRead,
                "Could not read header line",
                err.to_string(),
                Context::default().line_index(header_index as u32),
            )
        })?;
        let header_line = header_line.trim_end_matches('\r');
        if let Some(name) = header_line.split(separator).duplicates().next() {
            return Err(BoxedError::new(
                MappingError::FileCouldNotBeParsed,
                "Duplicate column",
                format!(
                    "The column '{name}' occurs more than once, all column names have to be unique"
                ),
                Context::full_line(header_index as u32, header_line.to_string()),
            ));
        }
        let mut table = Self::new(header_line.split(separator))?;

        for (line_index, line) in lines {
            let line = line.map_err(|err| {
                BoxedError::new(
                    MappingError::FileCouldNotBeRead,
                    "Could not read line",
                    err.to_string(),
                    Context::default().line_index(line_index as u32),
                )
            })?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() && table.number_of_columns() > 1 {
                continue;
            }
            let row = line.split(separator).collect_vec();
            if row.len() != table.number_of_columns() {
                return Err(BoxedError::new(
                    MappingError::FileCouldNotBeParsed,
                    "Incorrect number of columns",
                    format!(
                        "It does not have the correct number of columns. {} columns were expected but {} were found.",
                        table.number_of_columns(),
                        row.len()
                    ),
                    Context::full_line(line_index as u32, line.to_string()),
                ));
            }
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Write this table with a header line. Values are written as is, without any quoting.
    /// # Errors
    /// If the `Write` implementation errors.
    pub fn write(&self, mut f: impl Write, separator: char) -> Result<(), std::io::Error> {
        let separator = separator.to_string();
        writeln!(f, "{}", self.header().join(&separator))?;
        for row in self.rows() {
            writeln!(f, "{}", row.join(&separator))?;
        }
        Ok(())
    }

    /// Write this table to the given path. If the path has the extension `gz` the file is
    /// compressed.
    /// # Errors
    /// If the file could not be created or written to.
    pub fn write_to_path(
        &self,
        path: impl AsRef<Path>,
        separator: char,
    ) -> Result<(), BoxedError<'static, MappingError>> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            BoxedError::new(
                MappingError::FileCouldNotBeWritten,
                "Could not create file",
                e.to_string(),
                Context::none().source(path.to_string_lossy()).to_owned(),
            )
        })?;
        let result = if check_extension(path, "gz") {
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            self.write(&mut encoder, separator)
                .and_then(|()| encoder.finish())
                .and_then(|mut writer| writer.flush())
        } else {
            let mut writer = BufWriter::new(file);
            self.write(&mut writer, separator)
                .and_then(|()| writer.flush())
        };
        result.map_err(|e| {
            BoxedError::new(
                MappingError::FileCouldNotBeWritten,
                "Could not write file",
                e.to_string(),
                Context::none().source(path.to_string_lossy()).to_owned(),
            )
        })
    }
}

/// The path for the annotated version of a file, `_annotated` is inserted before the extension.
/// For gzipped files it is placed before the extension of the compressed file.
/// ```
/// # use std::path::Path;
/// assert_eq!(mzgene::annotated_path("data/proteins.tsv"), Path::new("data/proteins_annotated.tsv"));
/// assert_eq!(mzgene::annotated_path("proteins.tsv.gz"), Path::new("proteins_annotated.tsv.gz"));
/// assert_eq!(mzgene::annotated_path("proteins"), Path::new("proteins_annotated"));
/// ```
pub fn annotated_path(path: impl AsRef<Path>) -> PathBuf {
    suffixed_path(path, "_annotated", None)
}

/// Insert the suffix after the file stem, optionally replacing the extension. Handles the
/// inner extension of gzipped files.
pub(crate) fn suffixed_path(
    path: impl AsRef<Path>,
    suffix: &str,
    extension: Option<&str>,
) -> PathBuf {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let (name, gz) = if check_extension(path, "gz") {
        (name[..name.len() - 3].to_string(), ".gz")
    } else {
        (name, "")
    };
    let (stem, original_extension) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{ext}")),
        _ => (name, String::new()),
    };
    let new_name = extension.map_or_else(
        || format!("{stem}{suffix}{original_extension}{gz}"),
        |ext| format!("{stem}{suffix}.{ext}"),
    );
    path.with_file_name(new_name)
}
