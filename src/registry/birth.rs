//! Birth registry (obstetric records)
//!
//! Deliveries are events of the mother on the child's birthday.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::accumulate::EverFlag;
use crate::config::RegistryKind;
use crate::error::Result;
use crate::matrix::FeatureMatrix;
use crate::reader::values::{integer_code, lenient_date};
use crate::reader::{ColumnSpec, Encoding, FileFormat};
use crate::registry::{ExtractContext, Extractor, commit_flag};
use crate::temporal::RecordSpan;

pub const GAVE_BIRTH: &str = "gave_birth";
pub const PRETERM_BIRTH: &str = "preterm_birth";
pub const CAESAREAN_SECTION: &str = "caesarean_section";
pub const SMOKED_DURING_PREGNANCY: &str = "smoked_during_pregnancy";

/// Semicolon separated ISO-8859-1 text
pub const FORMAT: FileFormat = FileFormat::Csv {
    delimiter: b';',
    encoding: Encoding::Latin1,
};

pub const ID_COLUMN: &str = "MOTHER_FINREGISTRYID";
pub const DATE_COLUMN: &str = "CHILD_BIRTHDAY";

/// Gestational weeks below which a birth is preterm
const FULL_TERM_WEEKS: f64 = 37.0;

#[derive(Debug, Deserialize)]
struct DeliveryRow {
    #[serde(rename = "MOTHER_FINREGISTRYID")]
    mother: Option<String>,
    #[serde(rename = "CHILD_BIRTHDAY", deserialize_with = "lenient_date::deserialize")]
    birthday: Option<NaiveDate>,
    #[serde(rename = "DURATION_WEEKS")]
    weeks: Option<f64>,
    #[serde(rename = "CAESAREAN")]
    caesarean: Option<f64>,
    #[serde(rename = "SMOKING")]
    smoking: Option<f64>,
}

impl DeliveryRow {
    fn is_preterm(&self) -> bool {
        self.weeks.is_some_and(|weeks| weeks < FULL_TERM_WEEKS)
    }

    fn is_caesarean(&self) -> bool {
        integer_code(self.caesarean) == Some(1)
    }

    fn smoked(&self) -> bool {
        matches!(integer_code(self.smoking), Some(2..=4))
    }
}

pub struct BirthExtractor;

impl Extractor for BirthExtractor {
    fn kind(&self) -> RegistryKind {
        RegistryKind::Birth
    }

    fn features(&self) -> Vec<&'static str> {
        vec![GAVE_BIRTH, PRETERM_BIRTH, CAESAREAN_SECTION, SMOKED_DURING_PREGNANCY]
    }

    fn extract(&self, ctx: &ExtractContext<'_>, matrix: &mut FeatureMatrix) -> Result<()> {
        let source = ctx
            .source(self.kind(), FORMAT)?
            .ids(&[ID_COLUMN])
            .columns([
                ColumnSpec::text(DATE_COLUMN),
                ColumnSpec::float("DURATION_WEEKS"),
                ColumnSpec::float("CAESAREAN"),
                ColumnSpec::float("SMOKING"),
            ]);

        let rows = matrix.len();
        let mut gave_birth = EverFlag::new(rows);
        let mut preterm = EverFlag::new(rows);
        let mut caesarean = EverFlag::new(rows);
        let mut smoked = EverFlag::new(rows);
        let reconciler = ctx.reconciler();

        source.scan(Some(ctx.ids()), |row: DeliveryRow| {
            let (Some(mother), Some(birthday)) = (row.mother.as_deref(), row.birthday) else {
                return;
            };
            for hit in reconciler.hits(mother, RecordSpan::Event(birthday)) {
                let age = hit.onset_age();
                gave_birth.mark(hit.row, age);
                if row.is_preterm() {
                    preterm.mark(hit.row, age);
                }
                if row.is_caesarean() {
                    caesarean.mark(hit.row, age);
                }
                if row.smoked() {
                    smoked.mark(hit.row, age);
                }
            }
        })?;

        commit_flag(matrix, GAVE_BIRTH, gave_birth);
        commit_flag(matrix, PRETERM_BIRTH, preterm);
        commit_flag(matrix, CAESAREAN_SECTION, caesarean);
        commit_flag(matrix, SMOKED_DURING_PREGNANCY, smoked);
        Ok(())
    }
}
