//! Labour income registry
//!
//! One row per person and statistics year with the already-indexed annual
//! earnings, so no CPI adjustment is applied.

use serde::Deserialize;

use crate::accumulate::EverFlag;
use crate::config::RegistryKind;
use crate::error::Result;
use crate::matrix::FeatureMatrix;
use crate::reader::values::{finite, integer_code};
use crate::reader::{ColumnSpec, FileFormat};
use crate::registry::{Cumulative, ExtractContext, Extractor, TOTAL_INCOME, commit_flag};
use crate::temporal::RecordSpan;

pub const TOTAL_LABOR_INCOME: &str = "total_labor_income";
pub const RECEIVED_LABOR_INCOME: &str = "received_labor_income";

#[derive(Debug, Deserialize)]
struct IncomeRow {
    id: Option<String>,
    vuosi: Option<f64>,
    vuosiansio_indexed: Option<f64>,
}

pub struct IncomeExtractor;

impl Extractor for IncomeExtractor {
    fn kind(&self) -> RegistryKind {
        RegistryKind::Income
    }

    fn features(&self) -> Vec<&'static str> {
        vec![TOTAL_LABOR_INCOME, RECEIVED_LABOR_INCOME]
    }

    fn shared_features(&self) -> &'static [&'static str] {
        &[TOTAL_INCOME]
    }

    fn extract(&self, ctx: &ExtractContext<'_>, matrix: &mut FeatureMatrix) -> Result<()> {
        let source = ctx
            .source(self.kind(), FileFormat::Feather)?
            .ids(&["id"])
            .columns([
                ColumnSpec::float("vuosi"),
                ColumnSpec::float("vuosiansio_indexed"),
            ]);

        let mut received = EverFlag::new(matrix.len());
        let mut labor = Cumulative::resume(matrix, TOTAL_LABOR_INCOME).without_onset();
        let mut income = Cumulative::resume(matrix, TOTAL_INCOME);
        let reconciler = ctx.reconciler();

        source.scan(Some(ctx.ids()), |row: IncomeRow| {
            let (Some(id), Some(year)) = (row.id.as_deref(), integer_code(row.vuosi)) else {
                return;
            };
            let amount = finite(row.vuosiansio_indexed).unwrap_or(0.0);
            for hit in reconciler.hits(id, RecordSpan::Year(year as i32)) {
                labor.add(hit.row, amount, 1.0, 1.0);
                income.add(hit.row, amount, 1.0, 1.0);
                if amount > 0.0 {
                    let age = hit.onset_age();
                    received.mark(hit.row, age);
                    income.mark(hit.row, age);
                }
            }
        })?;

        commit_flag(matrix, RECEIVED_LABOR_INCOME, received);
        labor.commit(matrix);
        income.commit(matrix);
        Ok(())
    }
}
