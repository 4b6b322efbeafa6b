//! Error handling for registry feature extraction.
//!
//! Fatal conditions (configuration problems, unreadable files, broken
//! population data) surface as [`Error`]. Problems with individual registry
//! records are not errors: those records are skipped during extraction.

pub mod util;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Specialized error type for a feature-matrix run
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed configuration line, missing key or inconsistent options
    #[error("Configuration error: {0}")]
    Config(String),

    /// A file that the run depends on is missing or cannot be opened
    #[error("Cannot access {purpose} file {}: {source}", .path.display())]
    FileAccess {
        /// Offending file
        path: PathBuf,
        /// What the file was needed for
        purpose: String,
        /// Underlying IO failure
        #[source]
        source: io::Error,
    },

    /// Sample population violates an integrity rule
    #[error("Population integrity error: {0}")]
    PopulationIntegrity(String),

    /// A registry file cannot be used (missing required column, bad layout)
    #[error("Registry error in {registry}: {message}")]
    Registry {
        /// Registry name
        registry: String,
        /// Description of the problem
        message: String,
    },

    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Error decoding typed rows from a record batch
    #[error("Row decoding error: {0}")]
    Decode(#[from] serde_arrow::Error),

    /// Error reading JSON configuration
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error writing or reading a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a registry error
    pub fn registry(registry: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Registry {
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Create a file access error
    pub fn file_access(path: impl Into<PathBuf>, purpose: impl Into<String>, source: io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            purpose: purpose.into(),
            source,
        }
    }
}

/// Result type for feature-matrix operations
pub type Result<T> = std::result::Result<T, Error>;
