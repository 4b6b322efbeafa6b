//! Fixture helpers: registry files in a temporary directory, a run
//! configuration pointing at them and a parsed view of the written output.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::datatypes::{Field, Schema};
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use regmatrix::{Result, RunConfig};
use tempfile::TempDir;

/// Run date used by every test
#[must_use]
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// A sampled individual: id, date of birth, follow-up start and end
pub type SampleRow<'a> = (&'a str, &'a str, &'a str, &'a str);

/// Input files and configuration pairs of one run
pub struct Fixture {
    dir: TempDir,
    pairs: Vec<(String, String)>,
}

impl Fixture {
    /// Write the sample and feature list and point the output at `out.csv`
    pub fn new(sample: &[SampleRow<'_>], features: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut fixture = Self {
            dir,
            pairs: Vec::new(),
        };

        let mut csv = String::from("FINREGISTRYID,date_of_birth,start_of_followup,end_of_followup\n");
        for (id, dob, start, end) in sample {
            csv.push_str(&format!("{id},{dob},{start},{end}\n"));
        }
        fixture.text_file("SampleFile", "sample.csv", &csv);
        fixture.text_file("FeatureFile", "features.txt", &features.join("\n"));
        let output = fixture.path("out.csv");
        fixture.set("OutputFile", output.to_string_lossy());
        fixture
    }

    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key.to_string(), value.into()));
        self
    }

    /// UTF-8 text file registered under `key`
    pub fn text_file(&mut self, key: &str, name: &str, content: &str) -> &mut Self {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        self.set(key, path.to_string_lossy())
    }

    /// ISO-8859-1 text file registered under `key`
    pub fn latin1_file(&mut self, key: &str, name: &str, content: &str) -> &mut Self {
        let bytes: Vec<u8> = content
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap())
            .collect();
        let path = self.path(name);
        fs::write(&path, bytes).unwrap();
        self.set(key, path.to_string_lossy())
    }

    /// Arrow IPC file registered under `key`
    pub fn feather_file(&mut self, key: &str, name: &str, columns: Vec<(&str, ArrayRef)>) -> &mut Self {
        let fields: Vec<Field> = columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
            .collect();
        let schema = Arc::new(Schema::new(fields));
        let arrays = columns.into_iter().map(|(_, array)| array).collect();
        let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();

        let path = self.path(name);
        let mut writer = FileWriter::try_new(File::create(&path).unwrap(), &schema).unwrap();
        writer.write(&batch).unwrap();
        writer.finish().unwrap();
        self.set(key, path.to_string_lossy())
    }

    #[must_use]
    pub fn config(&self) -> RunConfig {
        RunConfig::from_pairs(self.pairs.clone()).unwrap()
    }

    /// Run the pipeline and parse the CSV it wrote
    pub fn run(&self) -> Result<Output> {
        let config = self.config();
        regmatrix::run(&config, today(), false)?;
        Ok(Output::read(&config.output_file))
    }
}

/// Written feature matrix as text cells
pub struct Output {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Output {
    fn read(path: &std::path::Path) -> Self {
        let text = fs::read_to_string(path).unwrap();
        let mut lines = text.lines();
        let split = |line: &str| line.split(',').map(str::to_string).collect::<Vec<_>>();
        let header = lines.next().map(split).unwrap_or_default();
        let rows = lines.map(split).collect();
        Self { header, rows }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.header.iter().any(|column| column == name)
    }

    /// Cells of a column in row order
    #[must_use]
    pub fn column(&self, name: &str) -> Vec<&str> {
        let position = self
            .header
            .iter()
            .position(|column| column == name)
            .unwrap_or_else(|| panic!("column {name} not in output {:?}", self.header));
        self.rows.iter().map(|row| row[position].as_str()).collect()
    }
}
