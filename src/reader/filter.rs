//! Identifier set-membership filtering of record batches.

use arrow::array::{Array, BooleanArray, StringArray};
use arrow::compute::filter_record_batch;
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashSet;

use crate::error::{Error, Result};

/// Keeps rows where any of the id columns holds a sampled identifier
#[derive(Debug, Clone, Copy)]
pub struct IdFilter<'a> {
    ids: &'a FxHashSet<String>,
    columns: &'a [&'a str],
}

impl<'a> IdFilter<'a> {
    #[must_use]
    pub const fn new(ids: &'a FxHashSet<String>, columns: &'a [&'a str]) -> Self {
        Self { ids, columns }
    }

    /// Boolean mask over the rows of a batch whose id columns are text
    pub fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let mut keep = vec![false; batch.num_rows()];
        for name in self.columns {
            let column = batch
                .column_by_name(name)
                .ok_or_else(|| Error::registry("id filter", format!("column {name} missing from batch")))?;
            let values = column
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| Error::registry("id filter", format!("column {name} is not text")))?;
            for (row, flag) in keep.iter_mut().enumerate() {
                if !*flag && values.is_valid(row) && self.ids.contains(values.value(row)) {
                    *flag = true;
                }
            }
        }
        Ok(BooleanArray::from(keep))
    }

    /// Drop rows that reference no sampled identifier
    pub fn apply(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mask = self.mask(batch)?;
        if mask.true_count() == batch.num_rows() {
            return Ok(batch.clone());
        }
        Ok(filter_record_batch(batch, &mask)?)
    }
}
