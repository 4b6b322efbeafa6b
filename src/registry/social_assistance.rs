//! Social assistance registry
//!
//! Yearly totals of five income-support components per person. The summed
//! amount is CPI-indexed and feeds both cumulative sums.

use serde::Deserialize;

use crate::accumulate::EverFlag;
use crate::config::RegistryKind;
use crate::error::Result;
use crate::matrix::FeatureMatrix;
use crate::reader::values::{finite, integer_code};
use crate::reader::{ColumnSpec, Encoding, FileFormat};
use crate::registry::{
    Cumulative, ExtractContext, Extractor, TOTAL_BENEFITS, TOTAL_INCOME, commit_flag,
};
use crate::temporal::RecordSpan;

pub const RECEIVED_ANY_INCOME_SUPPORT: &str = "received_any_income_support";

/// Semicolon separated ISO-8859-1 text
pub const FORMAT: FileFormat = FileFormat::Csv {
    delimiter: b';',
    encoding: Encoding::Latin1,
};

/// Identifier column
pub const ID_COLUMN: &str = "TNRO";
/// Statistics year column
pub const YEAR_COLUMN: &str = "TILASTOVUOSI";

const AMOUNT_COLUMNS: [&str; 5] = [
    "EHKAISEVA_TOIMEENTULOTUKI_EUR",
    "PERUS_TOIMEENTULOTUKI_EUR",
    "TAYD_TOIMEENTULOTUKI_EUR",
    "KUNT_TOIMINTARAHA_EUR",
    "KUNT_MATKAKORVAUS_EUR",
];

#[derive(Debug, Deserialize)]
struct AssistanceRow {
    #[serde(rename = "TNRO")]
    id: Option<String>,
    #[serde(rename = "TILASTOVUOSI")]
    year: Option<f64>,
    #[serde(rename = "EHKAISEVA_TOIMEENTULOTUKI_EUR")]
    preventive: Option<f64>,
    #[serde(rename = "PERUS_TOIMEENTULOTUKI_EUR")]
    basic: Option<f64>,
    #[serde(rename = "TAYD_TOIMEENTULOTUKI_EUR")]
    supplementary: Option<f64>,
    #[serde(rename = "KUNT_TOIMINTARAHA_EUR")]
    activity_allowance: Option<f64>,
    #[serde(rename = "KUNT_MATKAKORVAUS_EUR")]
    travel_allowance: Option<f64>,
}

impl AssistanceRow {
    fn amount(&self) -> f64 {
        [
            self.preventive,
            self.basic,
            self.supplementary,
            self.activity_allowance,
            self.travel_allowance,
        ]
        .into_iter()
        .filter_map(finite)
        .sum()
    }
}

pub struct SocialAssistanceExtractor;

impl Extractor for SocialAssistanceExtractor {
    fn kind(&self) -> RegistryKind {
        RegistryKind::SocialAssistance
    }

    fn features(&self) -> Vec<&'static str> {
        vec![RECEIVED_ANY_INCOME_SUPPORT]
    }

    fn shared_features(&self) -> &'static [&'static str] {
        &[TOTAL_BENEFITS, TOTAL_INCOME]
    }

    fn extract(&self, ctx: &ExtractContext<'_>, matrix: &mut FeatureMatrix) -> Result<()> {
        let source = ctx
            .source(self.kind(), FORMAT)?
            .ids(&[ID_COLUMN])
            .column(ColumnSpec::float(YEAR_COLUMN))
            .columns(AMOUNT_COLUMNS.map(ColumnSpec::float));

        let mut support = EverFlag::new(matrix.len());
        let mut benefits = Cumulative::resume(matrix, TOTAL_BENEFITS);
        let mut income = Cumulative::resume(matrix, TOTAL_INCOME);
        let reconciler = ctx.reconciler();

        source.scan(Some(ctx.ids()), |row: AssistanceRow| {
            let (Some(id), Some(year)) = (row.id.as_deref(), integer_code(row.year)) else {
                return;
            };
            let year = year as i32;
            let amount = row.amount();
            let multiplier = ctx.cpi.multiplier(year);
            for hit in reconciler.hits(id, RecordSpan::Year(year)) {
                benefits.add(hit.row, amount, multiplier, 1.0);
                income.add(hit.row, amount, multiplier, 1.0);
                if amount > 0.0 {
                    let age = hit.onset_age();
                    support.mark(hit.row, age);
                    benefits.mark(hit.row, age);
                    income.mark(hit.row, age);
                }
            }
        })?;

        commit_flag(matrix, RECEIVED_ANY_INCOME_SUPPORT, support);
        benefits.commit(matrix);
        income.commit(matrix);
        Ok(())
    }
}
