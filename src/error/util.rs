//! Utility functions for error handling
//!
//! File access helpers that turn IO failures into [`Error::FileAccess`]
//! values naming the offending file and what it was needed for.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use crate::error::{Error, Result};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<File> {
    if path.exists() && !path.is_file() {
        return Err(Error::file_access(
            path,
            purpose,
            io::Error::new(io::ErrorKind::InvalidInput, "path is not a file"),
        ));
    }

    File::open(path).map_err(|e| Error::file_access(path, purpose, e))
}

/// Check that an output file can be created or written
///
/// Mirrors opening the file in write mode without truncating existing content.
pub fn check_writable(path: &Path, purpose: &str) -> Result<()> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map(|_| ())
        .map_err(|e| Error::file_access(path, purpose, e))
}

/// Safely read a file to string with rich error information
pub fn safe_read_to_string(path: &Path, purpose: &str) -> Result<String> {
    // Surface a missing file with the same message as `safe_open_file`
    safe_open_file(path, purpose)?;

    fs::read_to_string(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::InvalidData => {
                io::Error::new(e.kind(), "file contains invalid UTF-8 data")
            }
            _ => e,
        };
        Error::file_access(path, purpose, context)
    })
}
