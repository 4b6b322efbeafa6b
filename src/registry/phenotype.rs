//! Minimal phenotype columns
//!
//! Merged at startup rather than extracted: `sex` in every mode and the
//! mother tongue one-hot group in aggregate mode only.

use crate::accumulate::MOTHER_TONGUE;
use crate::config::Granularity;
use crate::matrix::{Column, FeatureMatrix};
use crate::models::Individual;
use crate::population::RowIndex;

pub const SEX: &str = "sex";

/// Variables the phenotype file provides
#[must_use]
pub fn features() -> Vec<&'static str> {
    let mut names = vec![SEX];
    names.extend(MOTHER_TONGUE.request_names());
    names
}

/// Category of a mother tongue code
fn mother_tongue_index(code: Option<&str>) -> Option<usize> {
    Some(match code?.trim() {
        "fi" => 0,
        "sv" => 1,
        "ru" => 2,
        _ => 3,
    })
}

/// Add phenotype columns for every indexed row
pub fn apply(individuals: &[Individual], index: &RowIndex, matrix: &mut FeatureMatrix) {
    let keys = index.rows();
    matrix.put(
        SEX,
        Column::OptInt(keys.iter().map(|key| individuals[key.individual].sex).collect()),
    );
    if index.granularity() == Granularity::Aggregate {
        let tongues: Vec<Option<usize>> = keys
            .iter()
            .map(|key| mother_tongue_index(individuals[key.individual].mother_tongue.as_deref()))
            .collect();
        matrix.commit_domain(&MOTHER_TONGUE, &tongues);
    }
}
