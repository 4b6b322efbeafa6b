//! Registry file reading
//!
//! A [`RegistrySource`] describes one input file: its format, the identifier
//! column(s) used for predicate pushdown and the value columns an extractor
//! needs. Reading streams record batches, conforms each batch to the declared
//! column types (lenient casts, absent optional columns become nulls), drops
//! rows that reference no sampled identifier and decodes the rest into typed
//! rows with `serde_arrow`.

pub mod encoding;
pub mod filter;
pub mod values;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{ArrayRef, new_null_array};
use arrow::compute::cast;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::ipc::reader::FileReader;
use arrow::record_batch::{RecordBatch, RecordBatchReader};
use itertools::Itertools;
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rustc_hash::FxHashSet;
use serde::de::DeserializeOwned;

use crate::error::util::safe_open_file;
use crate::error::{Error, Result};
use crate::utils::logging::{log_operation_complete, log_operation_start};

pub use encoding::{Encoding, Latin1ToUtf8};
pub use filter::IdFilter;

/// Default number of rows per record batch
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// On-disk layout of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Delimited text with a header row
    Csv { delimiter: u8, encoding: Encoding },
    /// Arrow IPC file
    Feather,
    Parquet,
}

impl FileFormat {
    /// Comma separated UTF-8 text
    pub const CSV: Self = Self::Csv {
        delimiter: b',',
        encoding: Encoding::Utf8,
    };

    /// Format of `path`, where a `.parquet` extension overrides the default
    #[must_use]
    pub fn detect(path: &Path, default: Self) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("parquet") => Self::Parquet,
            _ => default,
        }
    }
}

/// Decoded type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Float,
}

impl ColumnKind {
    const fn data_type(self) -> DataType {
        match self {
            Self::Text => DataType::Utf8,
            Self::Float => DataType::Float64,
        }
    }
}

/// A column an extractor reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Name of the decoded field
    pub name: &'static str,
    /// Column name in the file when it differs from `name`
    pub source: Option<String>,
    pub kind: ColumnKind,
    pub required: bool,
}

impl ColumnSpec {
    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            source: None,
            kind: ColumnKind::Text,
            required: true,
        }
    }

    #[must_use]
    pub const fn float(name: &'static str) -> Self {
        Self {
            name,
            source: None,
            kind: ColumnKind::Float,
            required: true,
        }
    }

    /// Read the field from a differently named file column
    #[must_use]
    pub fn read_from(mut self, column: impl Into<String>) -> Self {
        self.source = Some(column.into());
        self
    }

    fn file_column(&self) -> &str {
        self.source.as_deref().unwrap_or(self.name)
    }

    /// Absent columns decode as missing values instead of failing
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Counts reported after reading a source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub rows_read: usize,
    pub rows_kept: usize,
}

/// One input file and the columns read from it
#[derive(Debug, Clone)]
pub struct RegistrySource {
    name: String,
    path: PathBuf,
    format: FileFormat,
    id_columns: Vec<&'static str>,
    columns: Vec<ColumnSpec>,
}

/// Resolved position of every declared column within the projected batch
struct Layout {
    projection: Vec<usize>,
    slots: Vec<(&'static str, DataType, Option<usize>)>,
}

fn clean_header(name: &str) -> &str {
    name.trim_start_matches('\u{feff}').trim()
}

impl RegistrySource {
    /// Describe a source; `default_format` applies unless the path says Parquet
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, default_format: FileFormat) -> Self {
        let path = path.into();
        Self {
            name: name.into(),
            format: FileFormat::detect(&path, default_format),
            path,
            id_columns: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Identifier columns; a row is kept if any of them is sampled
    #[must_use]
    pub fn ids(mut self, columns: &[&'static str]) -> Self {
        self.id_columns = columns.to_vec();
        self
    }

    #[must_use]
    pub fn column(mut self, spec: ColumnSpec) -> Self {
        self.columns.push(spec);
        self
    }

    #[must_use]
    pub fn columns(mut self, specs: impl IntoIterator<Item = ColumnSpec>) -> Self {
        self.columns.extend(specs);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn format(&self) -> FileFormat {
        self.format
    }

    fn open(&self) -> Result<File> {
        safe_open_file(&self.path, &self.name)
    }

    fn open_text(&self, encoding: Encoding) -> Result<Box<dyn Read>> {
        let file = self.open()?;
        Ok(match encoding {
            Encoding::Utf8 => Box::new(file),
            Encoding::Latin1 => Box::new(Latin1ToUtf8::new(file)),
        })
    }

    /// Column names present in the file
    pub fn column_names(&self) -> Result<Vec<String>> {
        let names = match self.format {
            FileFormat::Csv {
                delimiter,
                encoding,
            } => {
                let format = Format::default()
                    .with_header(true)
                    .with_delimiter(delimiter);
                let (schema, _) = format.infer_schema(self.open_text(encoding)?, Some(0))?;
                schema.fields().iter().map(|f| f.name().clone()).collect_vec()
            }
            FileFormat::Feather => {
                let reader = FileReader::try_new(self.open()?, None)?;
                reader.schema().fields().iter().map(|f| f.name().clone()).collect_vec()
            }
            FileFormat::Parquet => {
                let builder = ParquetRecordBatchReaderBuilder::try_new(self.open()?)?;
                builder.schema().fields().iter().map(|f| f.name().clone()).collect_vec()
            }
        };
        Ok(names.iter().map(|name| clean_header(name).to_string()).collect())
    }

    /// Whether the file has a column
    pub fn has_column(&self, name: &str) -> Result<bool> {
        Ok(self.column_names()?.iter().any(|column| column == name))
    }

    fn layout(&self, names: &[String]) -> Result<Layout> {
        let wanted = self
            .id_columns
            .iter()
            .map(|&name| ColumnSpec::text(name))
            .chain(self.columns.iter().cloned())
            .unique_by(|spec| spec.name)
            .collect_vec();

        let mut found = Vec::with_capacity(wanted.len());
        for spec in &wanted {
            let index = names.iter().position(|name| name == spec.file_column());
            if index.is_none() && spec.required {
                return Err(Error::registry(
                    &self.name,
                    format!(
                        "required column {} not found in {}",
                        spec.file_column(),
                        self.path.display()
                    ),
                ));
            }
            found.push(index);
        }

        let projection = found.iter().flatten().copied().sorted().dedup().collect_vec();
        let slots = wanted
            .iter()
            .zip(found)
            .map(|(spec, index)| {
                let slot = index.and_then(|i| projection.binary_search(&i).ok());
                (spec.name, spec.kind.data_type(), slot)
            })
            .collect();
        Ok(Layout { projection, slots })
    }

    fn batches(&self, layout: &Layout, names: &[String]) -> Result<Box<dyn RecordBatchReader>> {
        let projection = layout.projection.clone();
        Ok(match self.format {
            FileFormat::Csv {
                delimiter,
                encoding,
            } => {
                let schema = Schema::new(
                    names
                        .iter()
                        .map(|name| Field::new(name, DataType::Utf8, true))
                        .collect_vec(),
                );
                let reader = ReaderBuilder::new(Arc::new(schema))
                    .with_header(true)
                    .with_delimiter(delimiter)
                    .with_batch_size(DEFAULT_BATCH_SIZE)
                    .with_projection(projection)
                    .build(self.open_text(encoding)?)?;
                Box::new(reader)
            }
            FileFormat::Feather => Box::new(FileReader::try_new(self.open()?, Some(projection))?),
            FileFormat::Parquet => {
                let builder = ParquetRecordBatchReaderBuilder::try_new(self.open()?)?;
                let mask = ProjectionMask::roots(builder.parquet_schema(), projection);
                Box::new(
                    builder
                        .with_projection(mask)
                        .with_batch_size(DEFAULT_BATCH_SIZE)
                        .build()?,
                )
            }
        })
    }

    /// Cast the projected batch to the declared column types
    fn conform(layout: &Layout, batch: &RecordBatch) -> Result<RecordBatch> {
        let rows = batch.num_rows();
        let mut fields = Vec::with_capacity(layout.slots.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(layout.slots.len());
        for (name, data_type, slot) in &layout.slots {
            let array = match slot {
                Some(position) => {
                    let column = batch.column(*position);
                    if column.data_type() == data_type {
                        column.clone()
                    } else {
                        cast(column, data_type)?
                    }
                }
                None => new_null_array(data_type, rows),
            };
            fields.push(Field::new(*name, data_type.clone(), true));
            arrays.push(array);
        }
        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }

    /// Stream the source, handing every kept row to `visit`
    ///
    /// With `ids`, rows whose identifier columns hold no sampled identifier
    /// are dropped before decoding.
    pub fn scan<T, F>(&self, ids: Option<&FxHashSet<String>>, mut visit: F) -> Result<ScanSummary>
    where
        T: DeserializeOwned,
        F: FnMut(T),
    {
        let start = Instant::now();
        log_operation_start(&format!("Reading {}", self.name), &self.path);

        let names = self.column_names()?;
        let layout = self.layout(&names)?;
        let filter = ids.map(|ids| IdFilter::new(ids, &self.id_columns));

        let mut summary = ScanSummary::default();
        for batch in self.batches(&layout, &names)? {
            let batch = Self::conform(&layout, &batch?)?;
            summary.rows_read += batch.num_rows();
            let batch = match &filter {
                Some(filter) => filter.apply(&batch)?,
                None => batch,
            };
            if batch.num_rows() == 0 {
                continue;
            }
            summary.rows_kept += batch.num_rows();
            let rows: Vec<T> = serde_arrow::from_record_batch(&batch)?;
            rows.into_iter().for_each(&mut visit);
        }

        log_operation_complete(
            &format!("read {} rows of", self.name),
            &self.path,
            summary.rows_kept,
            Some(start.elapsed()),
        );
        Ok(summary)
    }

    /// Read every kept row into memory
    pub fn read_rows<T: DeserializeOwned>(&self, ids: Option<&FxHashSet<String>>) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        self.scan(ids, |row| rows.push(row))?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        #[serde(rename = "TNRO")]
        id: Option<String>,
        #[serde(rename = "AMOUNT")]
        amount: Option<f64>,
        #[serde(rename = "NOTE")]
        note: Option<String>,
    }

    fn ids(values: &[&str]) -> FxHashSet<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_csv_scan_filters_and_casts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sa.csv");
        std::fs::write(&path, "TNRO;X;AMOUNT\nA;1;10.5\nB;2;oops\nC;3;\n").unwrap();
        let source = RegistrySource::new(
            "test",
            &path,
            FileFormat::Csv {
                delimiter: b';',
                encoding: Encoding::Utf8,
            },
        )
        .ids(&["TNRO"])
        .column(ColumnSpec::float("AMOUNT"))
        .column(ColumnSpec::text("NOTE").optional());

        let rows: Vec<Row> = source.read_rows(Some(&ids(&["A", "B"]))).unwrap();
        assert_eq!(
            rows,
            vec![
                Row {
                    id: Some("A".to_string()),
                    amount: Some(10.5),
                    note: None
                },
                Row {
                    id: Some("B".to_string()),
                    amount: None,
                    note: None
                },
            ]
        );
    }

    #[test]
    fn test_missing_required_column_is_registry_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.csv");
        std::fs::write(&path, "TNRO,OTHER\nA,1\n").unwrap();
        let source = RegistrySource::new("test", &path, FileFormat::CSV)
            .ids(&["TNRO"])
            .column(ColumnSpec::float("AMOUNT"));
        let err = source.read_rows::<Row>(None).unwrap_err();
        assert!(matches!(err, Error::Registry { .. }));
        assert!(err.to_string().contains("AMOUNT"));
    }

    #[test]
    fn test_latin1_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("l1.csv");
        let mut bytes = b"TNRO;NOTE;AMOUNT\nA;".to_vec();
        bytes.push(0xE4);
        bytes.extend_from_slice(b";1\n");
        std::fs::write(&path, bytes).unwrap();
        let source = RegistrySource::new(
            "test",
            &path,
            FileFormat::Csv {
                delimiter: b';',
                encoding: Encoding::Latin1,
            },
        )
        .ids(&["TNRO"])
        .column(ColumnSpec::float("AMOUNT"))
        .column(ColumnSpec::text("NOTE"));
        let rows: Vec<Row> = source.read_rows(None).unwrap();
        assert_eq!(rows[0].note.as_deref(), Some("ä"));
    }

    #[test]
    fn test_parquet_extension_overrides_format() {
        assert_eq!(
            FileFormat::detect(Path::new("/x/pension.parquet"), FileFormat::Feather),
            FileFormat::Parquet
        );
        assert_eq!(
            FileFormat::detect(Path::new("/x/pension.feather"), FileFormat::Feather),
            FileFormat::Feather
        );
    }
}
