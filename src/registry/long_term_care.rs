//! Long-term care registry
//!
//! Care periods run from `TUPVA` to `LPVM`; a missing end date means the
//! period is ongoing.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::accumulate::{EverFlag, Tally};
use crate::config::RegistryKind;
use crate::error::Result;
use crate::matrix::{Column, FeatureMatrix};
use crate::reader::values::{integer_code, lenient_date};
use crate::reader::{ColumnSpec, Encoding, FileFormat};
use crate::registry::{ExtractContext, Extractor, commit_flag};
use crate::temporal::RecordSpan;

pub const RECEIVED_LONG_TERM_CARE: &str = "received_long_term_care";
pub const INSTITUTIONAL_CARE: &str = "institutional_care";
pub const LONG_TERM_CARE_DAYS: &str = "long_term_care_days";

const FORMAT: FileFormat = FileFormat::Csv {
    delimiter: b';',
    encoding: Encoding::Latin1,
};

#[derive(Debug, Deserialize)]
struct CareRow {
    #[serde(rename = "TNRO")]
    id: Option<String>,
    #[serde(rename = "TUPVA", deserialize_with = "lenient_date::deserialize")]
    start: Option<NaiveDate>,
    #[serde(rename = "LPVM", deserialize_with = "lenient_date::deserialize")]
    end: Option<NaiveDate>,
    #[serde(rename = "PALA")]
    service: Option<f64>,
}

impl CareRow {
    /// Service types 31 to 34 are institutional
    fn is_institutional(&self) -> bool {
        matches!(integer_code(self.service), Some(31..=34))
    }
}

pub struct LongTermCareExtractor;

impl Extractor for LongTermCareExtractor {
    fn kind(&self) -> RegistryKind {
        RegistryKind::LongTermCare
    }

    fn features(&self) -> Vec<&'static str> {
        vec![RECEIVED_LONG_TERM_CARE, INSTITUTIONAL_CARE, LONG_TERM_CARE_DAYS]
    }

    fn extract(&self, ctx: &ExtractContext<'_>, matrix: &mut FeatureMatrix) -> Result<()> {
        let source = ctx
            .source(self.kind(), FORMAT)?
            .ids(&["TNRO"])
            .columns([
                ColumnSpec::text("TUPVA"),
                ColumnSpec::text("LPVM"),
                ColumnSpec::float("PALA"),
            ]);

        let mut received = EverFlag::new(matrix.len());
        let mut institutional = EverFlag::new(matrix.len());
        let mut days = Tally::new(matrix.len());
        let reconciler = ctx.reconciler();

        source.scan(Some(ctx.ids()), |row: CareRow| {
            let Some(id) = row.id.as_deref() else {
                return;
            };
            for hit in reconciler.hits(id, RecordSpan::dated(row.start, row.end)) {
                let age = hit.onset_age();
                received.mark(hit.row, age);
                if row.is_institutional() {
                    institutional.mark(hit.row, age);
                }
                days.add(hit.row, hit.days());
            }
        })?;

        commit_flag(matrix, RECEIVED_LONG_TERM_CARE, received);
        commit_flag(matrix, INSTITUTIONAL_CARE, institutional);
        matrix.commit(LONG_TERM_CARE_DAYS, Column::Int(days.into_inner()));
        Ok(())
    }
}
