//! Operation logging helpers
//!
//! Every registry read logs a start line naming the file and a completion
//! line with the number of rows kept and the elapsed time.

use std::path::Path;
use std::time::Duration;

/// Log the start of an operation on a file
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{operation} {}", path.display());
}

/// Log a finished operation with its item count
pub fn log_operation_complete(
    operation: &str,
    path: &Path,
    items: usize,
    elapsed: Option<Duration>,
) {
    match elapsed {
        Some(duration) => log::info!(
            "Successfully {operation} {} ({items} items) in {:.2?}",
            path.display(),
            duration
        ),
        None => log::info!("Successfully {operation} {} ({items} items)", path.display()),
    }
}

/// Log a warning, optionally tied to a file
pub fn log_warning(message: &str, path: Option<&Path>) {
    match path {
        Some(path) => log::warn!("{message}: {}", path.display()),
        None => log::warn!("{message}"),
    }
}

/// Log an extractor that was not run
pub fn log_skipped(what: &str, reason: &str) {
    log::debug!("Skipping {what}: {reason}");
}
