//! Domain models
//!
//! Sampled individuals and the set of requested output variables.

pub mod individual;
pub mod request;

pub use individual::Individual;
pub use request::FeatureRequest;
