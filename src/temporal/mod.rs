//! Temporal reconciliation primitives
//!
//! [`period`] clips registry record spans against follow-up windows and
//! splits the result into calendar years; [`onset`] turns event dates into
//! onset ages.

pub mod onset;
pub mod period;

pub use onset::{onset_age, update_earliest};
pub use period::{ClippedInterval, FollowUp, Interval, RecordSpan};
