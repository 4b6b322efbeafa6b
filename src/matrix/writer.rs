//! Feature matrix serialization
//!
//! Delimited text by default: integers without decimals, floats with a fixed
//! number of decimals, missing values as empty cells. An output path ending
//! in `.parquet` writes typed Parquet columns instead.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;

use crate::error::{Error, Result};
use crate::matrix::{Column, FeatureMatrix};
use crate::reader::DEFAULT_BATCH_SIZE;
use crate::utils::logging::{log_operation_complete, log_operation_start};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn text_array(column: &Column, rows: std::ops::Range<usize>, precision: usize) -> ArrayRef {
    let values: StringArray = match column {
        Column::Int(v) => v[rows].iter().map(|x| Some(x.to_string())).collect(),
        Column::OptInt(v) => v[rows].iter().map(|x| x.map(|x| x.to_string())).collect(),
        Column::Float(v) => v[rows]
            .iter()
            .map(|x| x.is_finite().then(|| format!("{x:.precision$}")))
            .collect(),
        Column::Text(v) => v[rows].iter().map(|x| x.as_deref()).collect(),
        Column::Date(v) => v[rows]
            .iter()
            .map(|x| Some(x.format(DATE_FORMAT).to_string()))
            .collect(),
    };
    Arc::new(values)
}

fn typed_array(column: &Column, rows: std::ops::Range<usize>) -> ArrayRef {
    match column {
        Column::Int(v) => Arc::new(Int64Array::from(v[rows].to_vec())),
        Column::OptInt(v) => Arc::new(Int64Array::from(v[rows].to_vec())),
        Column::Float(v) => Arc::new(
            v[rows]
                .iter()
                .map(|x| x.is_finite().then_some(*x))
                .collect::<Float64Array>(),
        ),
        Column::Text(v) => Arc::new(v[rows].iter().map(|x| x.as_deref()).collect::<StringArray>()),
        Column::Date(v) => {
            let epoch = unix_epoch();
            Arc::new(Date32Array::from(
                v[rows]
                    .iter()
                    .map(|d| (*d - epoch).num_days() as i32)
                    .collect::<Vec<_>>(),
            ))
        }
    }
}

const fn typed_data_type(column: &Column) -> DataType {
    match column {
        Column::Int(_) | Column::OptInt(_) => DataType::Int64,
        Column::Float(_) => DataType::Float64,
        Column::Text(_) => DataType::Utf8,
        Column::Date(_) => DataType::Date32,
    }
}

/// Render the matrix as record batches of at most `DEFAULT_BATCH_SIZE` rows
fn batches(matrix: &FeatureMatrix, typed: bool, precision: usize) -> Result<Vec<RecordBatch>> {
    let fields: Vec<Field> = matrix
        .columns()
        .iter()
        .map(|(name, column)| {
            let data_type = if typed {
                typed_data_type(column)
            } else {
                DataType::Utf8
            };
            Field::new(name, data_type, true)
        })
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let mut out = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + DEFAULT_BATCH_SIZE).min(matrix.len());
        let arrays: Vec<ArrayRef> = matrix
            .columns()
            .iter()
            .map(|(_, column)| {
                if typed {
                    typed_array(column, start..end)
                } else {
                    text_array(column, start..end, precision)
                }
            })
            .collect();
        out.push(RecordBatch::try_new(schema.clone(), arrays)?);
        if end >= matrix.len() {
            break;
        }
        start = end;
    }
    Ok(out)
}

/// Write the matrix to `path`
pub fn write_matrix(matrix: &FeatureMatrix, path: &Path, precision: usize) -> Result<()> {
    let start = Instant::now();
    log_operation_start("Writing feature matrix to", path);
    let file = File::create(path).map_err(|e| Error::file_access(path, "output", e))?;

    let parquet = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
    let batches = batches(matrix, parquet, precision)?;

    if parquet {
        let schema = batches
            .first()
            .map(RecordBatch::schema)
            .unwrap_or_else(|| Arc::new(Schema::empty()));
        let mut writer = ArrowWriter::try_new(file, schema, None)?;
        for batch in &batches {
            writer.write(batch)?;
        }
        writer.close()?;
    } else {
        let mut writer = WriterBuilder::new().with_header(true).build(file);
        for batch in &batches {
            writer.write(batch)?;
        }
    }

    log_operation_complete("wrote", path, matrix.len(), Some(start.elapsed()));
    Ok(())
}
