//! Social benefits registry
//!
//! Benefit periods typed by `etuuslaji`. Each type maps to one ever-flag.
//! When the registry carries paid amounts (`maksettu_eur`), the amount is
//! spread over the record's days, indexed per year and added to the benefit
//! and income totals.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::accumulate::EverFlag;
use crate::config::RegistryKind;
use crate::error::Result;
use crate::matrix::FeatureMatrix;
use crate::reader::values::{finite, integer_code, lenient_date};
use crate::reader::{ColumnSpec, FileFormat};
use crate::registry::{
    Cumulative, ExtractContext, Extractor, TOTAL_BENEFITS, TOTAL_INCOME, commit_flag,
};
use crate::temporal::RecordSpan;

/// Flags in output order
pub const BENEFIT_FLAGS: [&str; 6] = [
    "received_maternity_paternity_parental_allowance",
    "received_sickness_allowance",
    "received_basic_unemployment_allowance",
    "received_unemployment_allowance",
    "received_study_allowance",
    "received_other_allowance",
];

/// Position in [`BENEFIT_FLAGS`] of a benefit type code
#[must_use]
pub fn benefit_flag(code: Option<i64>) -> usize {
    match code {
        Some(100..=103) => 0,
        Some(120 | 121) => 1,
        Some(150) => 2,
        Some(210) => 3,
        Some(300) => 4,
        _ => 5,
    }
}

#[derive(Debug, Deserialize)]
struct BenefitRow {
    id: Option<String>,
    etuuslaji: Option<f64>,
    #[serde(deserialize_with = "lenient_date::deserialize")]
    alkamispvm: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_date::deserialize")]
    paattymispvm: Option<NaiveDate>,
    maksettu_eur: Option<f64>,
}

impl BenefitRow {
    /// Inclusive length of the record in days, if its start is known
    fn record_days(&self, today: NaiveDate) -> Option<i64> {
        let start = self.alkamispvm?;
        let end = self.paattymispvm.unwrap_or(today);
        (start <= end).then(|| (end - start).num_days() + 1)
    }
}

pub struct BenefitsExtractor;

impl Extractor for BenefitsExtractor {
    fn kind(&self) -> RegistryKind {
        RegistryKind::Benefits
    }

    fn features(&self) -> Vec<&'static str> {
        BENEFIT_FLAGS.to_vec()
    }

    fn shared_features(&self) -> &'static [&'static str] {
        &[TOTAL_BENEFITS, TOTAL_INCOME]
    }

    fn extract(&self, ctx: &ExtractContext<'_>, matrix: &mut FeatureMatrix) -> Result<()> {
        let source = ctx
            .source(self.kind(), FileFormat::Feather)?
            .ids(&["id"])
            .columns([
                ColumnSpec::float("etuuslaji"),
                ColumnSpec::text("alkamispvm"),
                ColumnSpec::text("paattymispvm"),
                ColumnSpec::float("maksettu_eur").optional(),
            ]);

        let mut flags: Vec<EverFlag> = BENEFIT_FLAGS
            .iter()
            .map(|_| EverFlag::new(matrix.len()))
            .collect();
        let mut benefits = Cumulative::resume(matrix, TOTAL_BENEFITS);
        let mut income = Cumulative::resume(matrix, TOTAL_INCOME);
        let reconciler = ctx.reconciler();

        source.scan(Some(ctx.ids()), |row: BenefitRow| {
            let Some(id) = row.id.as_deref() else {
                return;
            };
            let flag = benefit_flag(integer_code(row.etuuslaji));
            let paid = finite(row.maksettu_eur)
                .zip(row.record_days(ctx.today))
                .filter(|(amount, _)| *amount != 0.0);

            for hit in reconciler.hits(id, RecordSpan::dated(row.alkamispvm, row.paattymispvm)) {
                let age = hit.onset_age();
                flags[flag].mark(hit.row, age);
                let Some((amount, days)) = paid else {
                    continue;
                };
                for year in hit.years() {
                    let share = hit.clipped.days_in_year(year) as f64 / days as f64;
                    let multiplier = ctx.cpi.multiplier(year);
                    benefits.add(hit.row, amount, multiplier, share);
                    income.add(hit.row, amount, multiplier, share);
                }
                if amount > 0.0 {
                    benefits.mark(hit.row, age);
                    income.mark(hit.row, age);
                }
            }
        })?;

        for (name, flag) in BENEFIT_FLAGS.iter().zip(flags) {
            commit_flag(matrix, name, flag);
        }
        benefits.commit(matrix);
        income.commit(matrix);
        Ok(())
    }
}
