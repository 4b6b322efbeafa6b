//! Progress reporting for the extraction sequence.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Template for the extractor progress bar
pub const EXTRACTOR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Progress bar ticking once per extractor
///
/// Drawn to stderr only when `visible`; tests and piped runs pass `false`.
#[must_use]
pub fn create_extractor_progress_bar(length: u64, visible: bool) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(
        Some(length),
        if visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        },
    );
    match ProgressStyle::default_bar().template(EXTRACTOR_TEMPLATE) {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(e) => log::debug!("Invalid progress template: {e}"),
    }
    pb
}

/// Finish a progress bar, leaving a final message if given
pub fn finish_progress_bar(pb: &ProgressBar, message: Option<&str>) {
    match message {
        Some(msg) => pb.finish_with_message(msg.to_string()),
        None => pb.finish(),
    }
}
