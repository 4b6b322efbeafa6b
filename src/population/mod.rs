//! Sample population and the Time-Window Index
//!
//! The population is loaded once at startup, phenotype information is merged
//! into it and the [`RowIndex`] maps identifiers (and years) to output rows.

pub mod index;
pub mod sample;

pub use index::{RowIndex, RowKey, Slot};
pub use sample::{load_phenotype, load_sample};
