//! Pension registry
//!
//! Each record is a pension decision with a start (`apvm`), an optional end
//! (`ppvm`, open while the pension is paid) and three monthly amounts. The
//! monthly total is inflation-indexed per year and weighted by the number of
//! months paid in that year.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::accumulate::EverFlag;
use crate::config::RegistryKind;
use crate::error::Result;
use crate::matrix::FeatureMatrix;
use crate::reader::values::{finite, lenient_date, non_empty};
use crate::reader::{ColumnSpec, FileFormat};
use crate::registry::{Cumulative, ExtractContext, Extractor, TOTAL_INCOME, commit_flag};
use crate::temporal::RecordSpan;

pub const RECEIVED_PENSION: &str = "received_pension";
pub const RECEIVED_DISABILITY_PENSION: &str = "received_disability_pension";
pub const TOTAL_PENSION: &str = "total_pension";

#[derive(Debug, Deserialize)]
struct PensionRow {
    id: Option<String>,
    #[serde(deserialize_with = "lenient_date::deserialize")]
    apvm: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_date::deserialize")]
    ppvm: Option<NaiveDate>,
    ptma: Option<f64>,
    ltma: Option<f64>,
    jkma: Option<f64>,
    tksyy1: Option<String>,
}

impl PensionRow {
    /// Sum of the monthly amounts, missing amounts count as zero
    fn monthly_amount(&self) -> f64 {
        [self.ptma, self.ltma, self.jkma]
            .into_iter()
            .filter_map(finite)
            .sum()
    }

    fn is_disability(&self) -> bool {
        non_empty(self.tksyy1.as_deref()).is_some()
    }
}

pub struct PensionExtractor;

impl Extractor for PensionExtractor {
    fn kind(&self) -> RegistryKind {
        RegistryKind::Pension
    }

    fn features(&self) -> Vec<&'static str> {
        vec![RECEIVED_PENSION, RECEIVED_DISABILITY_PENSION, TOTAL_PENSION]
    }

    fn shared_features(&self) -> &'static [&'static str] {
        &[TOTAL_INCOME]
    }

    fn extract(&self, ctx: &ExtractContext<'_>, matrix: &mut FeatureMatrix) -> Result<()> {
        let source = ctx
            .source(self.kind(), FileFormat::Feather)?
            .ids(&["id"])
            .columns([
                ColumnSpec::text("apvm"),
                ColumnSpec::text("ppvm"),
                ColumnSpec::float("ptma"),
                ColumnSpec::float("ltma"),
                ColumnSpec::float("jkma"),
                ColumnSpec::text("tksyy1"),
            ]);

        let rows = matrix.len();
        let mut received = EverFlag::new(rows);
        let mut disability = EverFlag::new(rows);
        let mut pension = Cumulative::resume(matrix, TOTAL_PENSION);
        let mut income = Cumulative::resume(matrix, TOTAL_INCOME);
        let reconciler = ctx.reconciler();

        source.scan(Some(ctx.ids()), |row: PensionRow| {
            let Some(id) = row.id.as_deref() else {
                return;
            };
            let monthly = row.monthly_amount();
            let disabled = row.is_disability();
            for hit in reconciler.hits(id, RecordSpan::dated(row.apvm, row.ppvm)) {
                let age = hit.onset_age();
                received.mark(hit.row, age);
                if disabled {
                    disability.mark(hit.row, age);
                }
                for year in hit.years() {
                    let multiplier = ctx.cpi.multiplier(year);
                    let weight = f64::from(hit.months(year));
                    pension.add(hit.row, monthly, multiplier, weight);
                    income.add(hit.row, monthly, multiplier, weight);
                }
                pension.mark(hit.row, age);
                income.mark(hit.row, age);
            }
        })?;

        commit_flag(matrix, RECEIVED_PENSION, received);
        commit_flag(matrix, RECEIVED_DISABILITY_PENSION, disability);
        pension.commit(matrix);
        income.commit(matrix);
        Ok(())
    }
}
