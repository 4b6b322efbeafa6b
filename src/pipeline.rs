//! End-to-end run: configuration to written feature matrix.

use std::time::Instant;

use chrono::NaiveDate;
use itertools::Itertools;

use crate::config::{RegistryKind, RunConfig};
use crate::cpi::CpiTable;
use crate::error::{Error, Result};
use crate::matrix::{FeatureMatrix, write_matrix};
use crate::models::FeatureRequest;
use crate::population::{RowIndex, load_phenotype, load_sample};
use crate::registry::pension::TOTAL_PENSION;
use crate::registry::{
    ExtractContext, TOTAL_BENEFITS, TOTAL_INCOME, known_features, phenotype, required_registries,
    run_extractors,
};
use crate::utils::logging::log_warning;

/// Registries that add CPI-indexed amounts to the shared sums
const INDEXED_REGISTRIES: [RegistryKind; 3] = [
    RegistryKind::Pension,
    RegistryKind::Benefits,
    RegistryKind::SocialAssistance,
];

/// What a finished run produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub columns: usize,
    pub extractors: usize,
}

/// Whether the request needs the consumer price index
#[must_use]
pub fn needs_cpi(request: &FeatureRequest, config: &RunConfig) -> bool {
    request.contains(TOTAL_PENSION)
        || (request.contains_any(&[TOTAL_INCOME, TOTAL_BENEFITS])
            && INDEXED_REGISTRIES
                .iter()
                .any(|&kind| config.registries.get(kind).is_some()))
}

fn warn_unknown(request: &FeatureRequest) {
    let known = known_features();
    let unknown = request
        .names()
        .into_iter()
        .filter(|name| !known.contains(*name))
        .collect_vec();
    if !unknown.is_empty() {
        log_warning(
            &format!("Ignoring unknown requested variables {}", unknown.join(", ")),
            None,
        );
    }
}

/// Build and write the feature matrix described by `config`
///
/// `today` closes open-ended records. All inputs are validated before any
/// registry is read.
pub fn run(config: &RunConfig, today: NaiveDate, show_progress: bool) -> Result<RunSummary> {
    let start = Instant::now();
    let request = FeatureRequest::from_file(&config.feature_file)?;
    log::info!("{} variables requested", request.len());
    warn_unknown(&request);

    if config.minimal_phenotype_file.is_none() && request.contains_any(&phenotype::features()) {
        return Err(Error::Config(
            "MinimalPhenotypeFile is required when sex or mother tongue is requested".to_string(),
        ));
    }
    let registries = required_registries(&request);
    let needs_cpi = needs_cpi(&request, config);
    config.validate(&registries, needs_cpi)?;

    let mut individuals = load_sample(&config.sample_file)?;
    if let Some(path) = &config.minimal_phenotype_file {
        load_phenotype(path, &mut individuals)?;
    }
    let index = RowIndex::build(&individuals, config.granularity)?;
    log::info!(
        "Indexed {} output rows for {} individuals",
        index.len(),
        individuals.len()
    );

    let cpi = match &config.cpi_file {
        Some(path) => CpiTable::from_file(path)?,
        None => CpiTable::default(),
    };

    let mut matrix =
        FeatureMatrix::with_identity(&index, &individuals, request, config.output_age);
    if config.minimal_phenotype_file.is_some() {
        phenotype::apply(&individuals, &index, &mut matrix);
    }

    let ctx = ExtractContext {
        config,
        index: &index,
        cpi: &cpi,
        today,
    };
    let extractors = run_extractors(&ctx, &mut matrix, show_progress)?;

    write_matrix(&matrix, &config.output_file, config.precision)?;
    log::info!(
        "Wrote {} rows and {} columns to {} in {:.2?}",
        matrix.len(),
        matrix.columns().len(),
        config.output_file.display(),
        start.elapsed()
    );

    Ok(RunSummary {
        rows: matrix.len(),
        columns: matrix.columns().len(),
        extractors,
    })
}
