//! Logging utilities for operation reporting and progress tracking

pub mod log;
pub mod progress;

pub use log::{log_operation_complete, log_operation_start, log_skipped, log_warning};
pub use progress::{create_extractor_progress_bar, finish_progress_bar};
