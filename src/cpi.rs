//! Consumer price index table
//!
//! Year to multiplier lookup used to inflation-adjust monetary amounts to a
//! reference year.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::reader::{ColumnSpec, FileFormat, RegistrySource};

#[derive(Debug, Deserialize)]
struct CpiRow {
    year: Option<f64>,
    multiplier: Option<f64>,
}

/// Year to multiplier mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpiTable {
    multipliers: BTreeMap<i32, f64>,
}

impl CpiTable {
    /// Build a table from `(year, multiplier)` pairs
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i32, f64)>) -> Self {
        Self {
            multipliers: pairs.into_iter().collect(),
        }
    }

    /// Read the CPI file: comma separated, the first two columns are the
    /// year and the multiplier, the header row is skipped
    pub fn from_file(path: &Path) -> Result<Self> {
        let names = RegistrySource::new("consumer price index", path, FileFormat::CSV).column_names()?;
        let (year, multiplier) = match names.as_slice() {
            [year, multiplier, ..] => (year.clone(), multiplier.clone()),
            _ => {
                return Err(Error::registry(
                    "consumer price index",
                    "expected at least two columns (year, multiplier)",
                ));
            }
        };
        let source = RegistrySource::new("consumer price index", path, FileFormat::CSV)
            .column(ColumnSpec::float("year").read_from(year))
            .column(ColumnSpec::float("multiplier").read_from(multiplier));
        let mut table = Self::default();
        source.scan(None, |row: CpiRow| {
            if let (Some(year), Some(multiplier)) = (row.year, row.multiplier) {
                table.multipliers.insert(year as i32, multiplier);
            }
        })?;
        Ok(table)
    }

    /// Multiplier for `year`
    ///
    /// Untabulated years use the closest earlier tabulated year, years before
    /// the first use the first. An empty table yields 1.0.
    #[must_use]
    pub fn multiplier(&self, year: i32) -> f64 {
        self.multipliers
            .range(..=year)
            .next_back()
            .or_else(|| self.multipliers.first_key_value())
            .map_or(1.0, |(_, value)| *value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.multipliers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.multipliers.is_empty()
    }
}
