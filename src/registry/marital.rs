//! Marriage history registry
//!
//! Only marriages (2), divorces (4), registered partnerships (6) and
//! dissolved partnerships (7) are used. A divorce or dissolution with an end
//! date marks `divorced` on that date.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::accumulate::EverFlag;
use crate::config::{Granularity, RegistryKind};
use crate::error::Result;
use crate::matrix::FeatureMatrix;
use crate::population::sample::ID_COLUMN;
use crate::reader::values::{integer_code, lenient_date};
use crate::reader::{ColumnSpec, FileFormat};
use crate::registry::{ExtractContext, Extractor, commit_flag};
use crate::temporal::RecordSpan;

pub const MARRIED: &str = "married";
pub const DIVORCED: &str = "divorced";

const MARRIED_STATUS: i64 = 2;
const DIVORCED_STATUS: i64 = 4;
const PARTNERSHIP_STATUS: i64 = 6;
const DISSOLVED_STATUS: i64 = 7;

#[derive(Debug, Deserialize)]
struct MarriageRow {
    #[serde(rename = "FINREGISTRYID")]
    id: Option<String>,
    #[serde(rename = "Current_marital_status")]
    status: Option<f64>,
    #[serde(rename = "Starting_date", deserialize_with = "lenient_date::deserialize")]
    start: Option<NaiveDate>,
    #[serde(rename = "Ending_day", deserialize_with = "lenient_date::deserialize")]
    end: Option<NaiveDate>,
}

impl MarriageRow {
    /// Date the union was dissolved, if the record is a divorce
    fn divorce_date(&self, status: i64) -> Option<NaiveDate> {
        matches!(status, DIVORCED_STATUS | DISSOLVED_STATUS)
            .then_some(self.end)
            .flatten()
    }
}

pub struct MaritalExtractor;

impl Extractor for MaritalExtractor {
    fn kind(&self) -> RegistryKind {
        RegistryKind::MaritalStatus
    }

    fn features(&self) -> Vec<&'static str> {
        vec![MARRIED, DIVORCED]
    }

    fn extract(&self, ctx: &ExtractContext<'_>, matrix: &mut FeatureMatrix) -> Result<()> {
        let source = ctx
            .source(self.kind(), FileFormat::CSV)?
            .ids(&[ID_COLUMN])
            .columns([
                ColumnSpec::float("Current_marital_status"),
                ColumnSpec::text("Starting_date"),
                ColumnSpec::text("Ending_day"),
            ]);

        let mut married = EverFlag::new(matrix.len());
        let mut divorced = EverFlag::new(matrix.len());
        let reconciler = ctx.reconciler();
        let index = ctx.index;

        source.scan(Some(ctx.ids()), |row: MarriageRow| {
            let (Some(id), Some(status)) = (row.id.as_deref(), integer_code(row.status)) else {
                return;
            };
            if !matches!(
                status,
                MARRIED_STATUS | DIVORCED_STATUS | PARTNERSHIP_STATUS | DISSOLVED_STATUS
            ) {
                return;
            }
            let divorce = row.divorce_date(status);
            let hits = reconciler.hits(id, RecordSpan::dated(row.start, row.end));
            for hit in &hits {
                married.mark(hit.row, hit.onset_age());
            }

            let Some(divorce) = divorce else {
                return;
            };
            match index.granularity() {
                Granularity::Aggregate => {
                    for hit in hits.iter().filter(|hit| divorce <= hit.clipped.end) {
                        divorced.mark(hit.row, hit.age_at(divorce));
                    }
                }
                Granularity::Yearly if !hits.is_empty() => {
                    // only the row keyed by the divorce year, if it exists
                    for slot in index.slots(id) {
                        if let Some(row) = index.row(slot, divorce.year()) {
                            divorced.mark(row, slot.follow_up.age_at(divorce));
                        }
                    }
                }
                Granularity::Yearly => {}
            }
        })?;

        commit_flag(matrix, MARRIED, married);
        commit_flag(matrix, DIVORCED, divorced);
        Ok(())
    }
}
