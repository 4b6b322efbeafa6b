//! Registry feature-matrix builder.
//!
//! Joins a sampled population against administrative registries and derives
//! one row of features per individual, or per individual and calendar year.
//! Records are clipped to each individual's follow-up window, combined with
//! per-variable rules (ever-flags, CPI-indexed sums, latest-wins and
//! highest-wins categories) and written as CSV or Parquet.

pub mod accumulate;
pub mod config;
pub mod cpi;
pub mod error;
pub mod matrix;
pub mod models;
pub mod pipeline;
pub mod population;
pub mod reader;
pub mod registry;
pub mod temporal;
pub mod utils;

pub use config::{Granularity, RegistryKind, RunConfig};
pub use cpi::CpiTable;
pub use error::{Error, Result};
pub use matrix::{Column, FeatureMatrix, write_matrix};
pub use models::{FeatureRequest, Individual};
pub use pipeline::{RunSummary, run};
pub use population::RowIndex;
pub use reader::{FileFormat, RegistrySource};
pub use registry::{Extractor, extractors};
