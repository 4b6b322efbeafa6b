//! Value accumulators
//!
//! Row-indexed combination policies used by the registry extractors:
//!
//! - [`EverFlag`] and [`OnsetAges`]: monotonic indicators with earliest onset
//! - [`IndexedSum`] and [`Tally`]: CPI-weighted sums and plain counts
//! - [`LatestWins`] and [`HighestWins`]: categorical overwrite rules
//! - [`CategoryDomain`]: declared category sets for one-hot encoding

pub mod categorical;
pub mod domain;
pub mod flag;
pub mod sum;

pub use categorical::{HighestWins, LatestWins};
pub use domain::{CategoryDomain, EDUCATION_FIELD, MOTHER_TONGUE, SES};
pub use flag::{EverFlag, OnsetAges};
pub use sum::{IndexedSum, Tally};
