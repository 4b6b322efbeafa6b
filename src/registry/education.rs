//! Education registry
//!
//! One row per completed degree and year. A degree is held from January 1 of
//! its completion year onward, and only a strictly higher level replaces the
//! one already held; the field of study and onset move with the level.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::accumulate::{EDUCATION_FIELD, HighestWins, OnsetAges};
use crate::config::RegistryKind;
use crate::error::Result;
use crate::matrix::{Column, FeatureMatrix};
use crate::population::sample::ID_COLUMN;
use crate::reader::values::{integer_code, non_empty};
use crate::reader::{ColumnSpec, FileFormat};
use crate::registry::{ExtractContext, Extractor};
use crate::temporal::RecordSpan;

pub const EDUCATION_LEVEL: &str = "education_level";

/// Broad field code meaning unknown
const UNKNOWN_FIELD: u32 = 99;

#[derive(Debug, Deserialize)]
struct DegreeRow {
    #[serde(rename = "FINREGISTRYID")]
    id: Option<String>,
    vuosi: Option<f64>,
    kaste_t2: Option<String>,
    iscfi2013: Option<String>,
}

/// Digits of a code, dropping a trailing fraction
fn code_digits(value: Option<&str>) -> Option<&str> {
    let code = non_empty(value)?.split('.').next()?;
    (!code.is_empty() && code.bytes().all(|b| b.is_ascii_digit())).then_some(code)
}

/// ISCED level: first digit of the level code
fn education_level(value: Option<&str>) -> Option<i64> {
    code_digits(value)?
        .chars()
        .next()
        .and_then(|digit| digit.to_digit(10))
        .map(i64::from)
}

/// Broad field index within [`EDUCATION_FIELD`]
///
/// Detailed field codes have four digits; leading zeros lost to numeric
/// storage are restored before taking the first two.
fn education_field(value: Option<&str>) -> Option<usize> {
    let code = code_digits(value)?;
    if code.len() > 4 {
        return None;
    }
    let padded = format!("{code:0>4}");
    let broad: u32 = padded[..2].parse().ok()?;
    match broad {
        0..=10 => usize::try_from(broad).ok(),
        UNKNOWN_FIELD => Some(EDUCATION_FIELD.categories.len() - 1),
        _ => None,
    }
}

fn first_day(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}

pub struct EducationExtractor;

impl Extractor for EducationExtractor {
    fn kind(&self) -> RegistryKind {
        RegistryKind::Education
    }

    fn features(&self) -> Vec<&'static str> {
        let mut names = vec![EDUCATION_LEVEL];
        names.extend(EDUCATION_FIELD.request_names());
        names
    }

    fn extract(&self, ctx: &ExtractContext<'_>, matrix: &mut FeatureMatrix) -> Result<()> {
        let source = ctx
            .source(self.kind(), FileFormat::CSV)?
            .ids(&[ID_COLUMN])
            .columns([
                ColumnSpec::float("vuosi"),
                ColumnSpec::text("kaste_t2"),
                ColumnSpec::text("iscfi2013"),
            ]);

        let mut degrees: Vec<(i32, DegreeRow)> = source
            .read_rows::<DegreeRow>(Some(ctx.ids()))?
            .into_iter()
            .filter_map(|row| {
                let year = i32::try_from(integer_code(row.vuosi)?).ok()?;
                Some((year, row))
            })
            .collect();
        degrees.sort_by_key(|(year, _)| *year);

        let rows = matrix.len();
        let mut levels = HighestWins::new(rows);
        let mut fields: Vec<Option<usize>> = vec![None; rows];
        let mut onsets = OnsetAges::new(rows);
        let reconciler = ctx.reconciler();

        for (year, degree) in &degrees {
            let (Some(id), Some(level), Some(completed)) = (
                degree.id.as_deref(),
                education_level(degree.kaste_t2.as_deref()),
                first_day(*year),
            ) else {
                continue;
            };
            let field = education_field(degree.iscfi2013.as_deref());
            for hit in reconciler.hits(id, RecordSpan::dated(Some(completed), None)) {
                if levels.offer(hit.row, level) {
                    fields[hit.row] = field;
                    onsets.set(hit.row, hit.onset_age());
                }
            }
        }

        matrix.commit(EDUCATION_LEVEL, Column::OptInt(levels.into_inner()));
        matrix.commit_onset(EDUCATION_LEVEL, onsets.into_inner());
        matrix.commit_domain(&EDUCATION_FIELD, &fields);
        Ok(())
    }
}
