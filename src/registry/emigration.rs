//! Emigration registry

use chrono::NaiveDate;
use serde::Deserialize;

use crate::accumulate::{EverFlag, Tally};
use crate::config::RegistryKind;
use crate::error::Result;
use crate::matrix::{Column, FeatureMatrix};
use crate::population::sample::ID_COLUMN;
use crate::reader::values::lenient_date;
use crate::reader::{ColumnSpec, FileFormat};
use crate::registry::{ExtractContext, Extractor, commit_flag};
use crate::temporal::RecordSpan;

pub const EMIGRATED: &str = "emigrated";
pub const DAYS_ABROAD: &str = "days_abroad";

#[derive(Debug, Deserialize)]
struct EmigrationRow {
    #[serde(rename = "FINREGISTRYID")]
    id: Option<String>,
    #[serde(rename = "Departure_date", deserialize_with = "lenient_date::deserialize")]
    departure: Option<NaiveDate>,
    #[serde(rename = "Return_date", deserialize_with = "lenient_date::deserialize")]
    return_date: Option<NaiveDate>,
}

pub struct EmigrationExtractor;

impl Extractor for EmigrationExtractor {
    fn kind(&self) -> RegistryKind {
        RegistryKind::Emigration
    }

    fn features(&self) -> Vec<&'static str> {
        vec![EMIGRATED, DAYS_ABROAD]
    }

    fn extract(&self, ctx: &ExtractContext<'_>, matrix: &mut FeatureMatrix) -> Result<()> {
        let source = ctx
            .source(self.kind(), FileFormat::CSV)?
            .ids(&[ID_COLUMN])
            .columns([
                ColumnSpec::text("Departure_date"),
                ColumnSpec::text("Return_date"),
            ]);

        let mut emigrated = EverFlag::new(matrix.len());
        let mut days_abroad = Tally::new(matrix.len());
        let reconciler = ctx.reconciler();

        source.scan(Some(ctx.ids()), |row: EmigrationRow| {
            let Some(id) = row.id.as_deref() else {
                return;
            };
            // a stay abroad needs a departure even in aggregate mode
            let Some(departure) = row.departure else {
                return;
            };
            for hit in reconciler.hits(id, RecordSpan::dated(Some(departure), row.return_date)) {
                emigrated.mark(hit.row, hit.onset_age());
                days_abroad.add(hit.row, hit.days());
            }
        })?;

        commit_flag(matrix, EMIGRATED, emigrated);
        matrix.commit(DAYS_ABROAD, Column::Int(days_abroad.into_inner()));
        Ok(())
    }
}
