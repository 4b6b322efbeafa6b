//! Registry extractors
//!
//! Each extractor reads one registry, reconciles its records against the
//! row index and commits the derived variables to the feature matrix.
//! Extractors run in a fixed order because the cumulative sums
//! (`total_income`, `total_benefits`) are seeded by earlier extractors and
//! continued by later ones:
//!
//! 1. pension
//! 2. income
//! 3. benefits
//! 4. social assistance
//! 5. marital status
//! 6. pedigree
//! 7. living (residence)
//! 8. socioeconomic status
//! 9. education
//! 10. birth
//! 11. long-term care
//! 12. emigration
//!
//! An extractor whose registry contributes no requested variable is never
//! loaded.

pub mod benefits;
pub mod birth;
pub mod education;
pub mod emigration;
pub mod income;
pub mod living;
pub mod long_term_care;
pub mod marital;
pub mod pedigree;
pub mod pension;
pub mod phenotype;
pub mod reconcile;
pub mod ses;
pub mod social_assistance;

use std::time::Instant;

use chrono::NaiveDate;
use rustc_hash::FxHashSet;

use crate::accumulate::{EverFlag, IndexedSum, OnsetAges};
use crate::config::{RegistryKind, RunConfig};
use crate::cpi::CpiTable;
use crate::error::{Error, Result};
use crate::matrix::{Column, FeatureMatrix};
use crate::models::FeatureRequest;
use crate::population::RowIndex;
use crate::reader::{FileFormat, RegistrySource};
use crate::utils::logging::{
    create_extractor_progress_bar, finish_progress_bar, log_skipped, log_warning,
};

pub use reconcile::{Hit, Reconciler};

/// Cumulative income over all income-like registries
pub const TOTAL_INCOME: &str = "total_income";
/// Cumulative benefits over benefit registries
pub const TOTAL_BENEFITS: &str = "total_benefits";

/// Everything an extractor needs besides the matrix
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    pub config: &'a RunConfig,
    pub index: &'a RowIndex,
    pub cpi: &'a CpiTable,
    /// Run date, the end of open-ended records
    pub today: NaiveDate,
}

impl<'a> ExtractContext<'a> {
    #[must_use]
    pub const fn reconciler(&self) -> Reconciler<'a> {
        Reconciler::new(self.index, self.today)
    }

    /// Sampled identifiers
    #[must_use]
    pub const fn ids(&self) -> &'a FxHashSet<String> {
        self.index.ids()
    }

    /// Source of a registry whose path must be configured
    pub fn source(&self, kind: RegistryKind, format: FileFormat) -> Result<RegistrySource> {
        self.optional_source(kind, format).ok_or_else(|| {
            Error::Config(format!(
                "{} is required by the requested features",
                kind.config_key()
            ))
        })
    }

    /// Source of a registry if its path is configured
    #[must_use]
    pub fn optional_source(&self, kind: RegistryKind, format: FileFormat) -> Option<RegistrySource> {
        self.config
            .registries
            .get(kind)
            .map(|path| RegistrySource::new(format!("{kind} registry"), path, format))
    }
}

/// A registry extractor
pub trait Extractor {
    /// Registry read by this extractor
    fn kind(&self) -> RegistryKind;

    /// Variables only this extractor produces; requesting one requires the
    /// registry file
    fn features(&self) -> Vec<&'static str>;

    /// Cumulative variables this extractor adds to when its file is configured
    fn shared_features(&self) -> &'static [&'static str] {
        &[]
    }

    /// Read the registry and commit derived variables
    fn extract(&self, ctx: &ExtractContext<'_>, matrix: &mut FeatureMatrix) -> Result<()>;

    /// Whether the registry file must be configured for this request
    fn is_required(&self, request: &FeatureRequest) -> bool {
        request.contains_any(&self.features())
    }

    /// Whether the extractor runs for this request and configuration
    fn should_run(&self, request: &FeatureRequest, config: &RunConfig) -> bool {
        self.is_required(request)
            || (request.contains_any(self.shared_features())
                && config.registries.get(self.kind()).is_some())
    }
}

/// All extractors in run order
#[must_use]
pub fn extractors() -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(pension::PensionExtractor),
        Box::new(income::IncomeExtractor),
        Box::new(benefits::BenefitsExtractor),
        Box::new(social_assistance::SocialAssistanceExtractor),
        Box::new(marital::MaritalExtractor),
        Box::new(pedigree::PedigreeExtractor),
        Box::new(living::LivingExtractor),
        Box::new(ses::SesExtractor),
        Box::new(education::EducationExtractor),
        Box::new(birth::BirthExtractor),
        Box::new(long_term_care::LongTermCareExtractor),
        Box::new(emigration::EmigrationExtractor),
    ]
}

/// Registries whose files the request needs
#[must_use]
pub fn required_registries(request: &FeatureRequest) -> Vec<RegistryKind> {
    extractors()
        .iter()
        .filter(|extractor| extractor.is_required(request))
        .map(|extractor| extractor.kind())
        .collect()
}

/// Every variable name a request may contain
#[must_use]
pub fn known_features() -> FxHashSet<&'static str> {
    let mut known: FxHashSet<&'static str> = extractors()
        .iter()
        .flat_map(|extractor| {
            let mut names = extractor.features();
            names.extend_from_slice(extractor.shared_features());
            names
        })
        .collect();
    known.extend(phenotype::features());
    known
}

/// Run every extractor the request needs, in order
///
/// Returns the number of extractors that ran. A requested cumulative sum
/// that no configured registry feeds is written as zeros.
pub fn run_extractors(
    ctx: &ExtractContext<'_>,
    matrix: &mut FeatureMatrix,
    show_progress: bool,
) -> Result<usize> {
    let selected: Vec<Box<dyn Extractor>> = extractors()
        .into_iter()
        .filter(|extractor| {
            let run = extractor.should_run(matrix.request(), ctx.config);
            if !run {
                log_skipped(
                    &format!("{} registry", extractor.kind()),
                    "no requested variable uses it",
                );
            }
            run
        })
        .collect();

    let pb = create_extractor_progress_bar(selected.len() as u64, show_progress);
    for extractor in &selected {
        let start = Instant::now();
        pb.set_message(extractor.kind().name());
        extractor.extract(ctx, matrix)?;
        log::info!(
            "Extracted {} variables in {:.2?}",
            extractor.kind(),
            start.elapsed()
        );
        pb.inc(1);
    }
    finish_progress_bar(&pb, Some("extraction complete"));

    for name in [TOTAL_INCOME, TOTAL_BENEFITS] {
        if matrix.wants(name) && matrix.column(name).is_none() {
            log_warning(
                &format!("{name} was requested but no contributing registry is configured"),
                None,
            );
            Cumulative::resume(matrix, name).commit(matrix);
        }
    }
    Ok(selected.len())
}

/// Commit an ever-flag and its onset companion
pub(crate) fn commit_flag(matrix: &mut FeatureMatrix, name: &str, flag: EverFlag) {
    let (values, onsets) = flag.into_parts();
    matrix.commit(name, Column::Int(values));
    matrix.commit_onset(name, onsets);
}

/// Running sum continued from the matrix together with its onsets
pub(crate) struct Cumulative {
    name: &'static str,
    sum: IndexedSum,
    onsets: OnsetAges,
    active: bool,
    with_onset: bool,
}

impl Cumulative {
    /// Continue `name` if it was requested
    pub(crate) fn resume(matrix: &FeatureMatrix, name: &'static str) -> Self {
        Self {
            name,
            sum: IndexedSum::from_existing(matrix.take_float(name)),
            onsets: OnsetAges::from_existing(matrix.take_onset(name)),
            active: matrix.wants(name),
            with_onset: true,
        }
    }

    /// Sum without an `_OnsetAge` companion
    pub(crate) fn without_onset(mut self) -> Self {
        self.with_onset = false;
        self
    }

    /// Add an indexed amount
    pub(crate) fn add(&mut self, row: usize, amount: f64, multiplier: f64, weight: f64) {
        if self.active {
            self.sum.add(row, amount, multiplier, weight);
        }
    }

    /// Keep the earliest onset of a contribution
    pub(crate) fn mark(&mut self, row: usize, age: f64) {
        if self.active && self.with_onset {
            self.onsets.update(row, age);
        }
    }

    pub(crate) fn commit(self, matrix: &mut FeatureMatrix) {
        if self.active {
            matrix.commit(self.name, Column::Float(self.sum.into_inner()));
            if self.with_onset {
                matrix.commit_onset(self.name, self.onsets.into_inner());
            }
        }
    }
}
