//! Pedigree registry
//!
//! One row per child with both parents' identifiers. Each parent is handled
//! independently: the child counts for a parent only if it was born inside
//! that parent's follow-up window.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::accumulate::{OnsetAges, Tally};
use crate::config::RegistryKind;
use crate::error::Result;
use crate::matrix::{Column, FeatureMatrix};
use crate::reader::values::{lenient_date, non_empty};
use crate::reader::{ColumnSpec, Encoding, FileFormat};
use crate::registry::{ExtractContext, Extractor};
use crate::temporal::RecordSpan;

pub const CHILDREN: &str = "children";

const FORMAT: FileFormat = FileFormat::Csv {
    delimiter: b'\t',
    encoding: Encoding::Utf8,
};

#[derive(Debug, Deserialize)]
struct ChildRow {
    #[serde(rename = "MOTHER_ID")]
    mother: Option<String>,
    #[serde(rename = "FATHER_ID")]
    father: Option<String>,
    #[serde(rename = "Birth_Date", deserialize_with = "lenient_date::deserialize")]
    birth_date: Option<NaiveDate>,
}

pub struct PedigreeExtractor;

impl Extractor for PedigreeExtractor {
    fn kind(&self) -> RegistryKind {
        RegistryKind::Pedigree
    }

    fn features(&self) -> Vec<&'static str> {
        vec![CHILDREN]
    }

    fn extract(&self, ctx: &ExtractContext<'_>, matrix: &mut FeatureMatrix) -> Result<()> {
        let source = ctx
            .source(self.kind(), FORMAT)?
            .ids(&["MOTHER_ID", "FATHER_ID"])
            .column(ColumnSpec::text("Birth_Date"));

        let mut children = Tally::new(matrix.len());
        let mut onsets = OnsetAges::new(matrix.len());
        let reconciler = ctx.reconciler();

        source.scan(Some(ctx.ids()), |row: ChildRow| {
            let Some(birth_date) = row.birth_date else {
                return;
            };
            let mother = non_empty(row.mother.as_deref());
            let father = non_empty(row.father.as_deref()).filter(|f| Some(*f) != mother);
            for parent in [mother, father].into_iter().flatten() {
                for hit in reconciler.hits(parent, RecordSpan::Event(birth_date)) {
                    children.add(hit.row, 1);
                    onsets.update(hit.row, hit.onset_age());
                }
            }
        })?;

        matrix.commit(CHILDREN, Column::Int(children.into_inner()));
        matrix.commit_onset(CHILDREN, onsets.into_inner());
        Ok(())
    }
}
