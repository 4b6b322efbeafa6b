//! Onset-age calculation.

use chrono::NaiveDate;

/// Days per year used for onset ages (fixed length, not calendar aware)
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Age in decimal years at `event` for someone born on `date_of_birth`
#[must_use]
pub fn onset_age(date_of_birth: NaiveDate, event: NaiveDate) -> f64 {
    (event - date_of_birth).num_days() as f64 / DAYS_PER_YEAR
}

/// Keep the earliest onset age seen so far
///
/// An unset cell (NaN) takes the candidate; a set cell keeps the minimum.
pub fn update_earliest(cell: &mut f64, candidate: f64) {
    if candidate.is_nan() {
        return;
    }
    if cell.is_nan() || candidate < *cell {
        *cell = candidate;
    }
}
