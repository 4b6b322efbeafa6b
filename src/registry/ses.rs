//! Socioeconomic status registry
//!
//! Yearly status codes are classified with the scheme in force for the
//! record year and combined latest-wins. Rows still missing after the
//! primary registry are backfilled from the social assistance registry and
//! then the birth registry, each step filling only rows that were missing
//! when the step began.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::accumulate::{LatestWins, OnsetAges, SES};
use crate::config::RegistryKind;
use crate::error::Result;
use crate::matrix::FeatureMatrix;
use crate::population::sample::ID_COLUMN;
use crate::reader::values::{integer_code, lenient_date, normalize_code};
use crate::reader::{ColumnSpec, FileFormat, RegistrySource};
use crate::registry::{ExtractContext, Extractor, birth, social_assistance};
use crate::temporal::RecordSpan;
use crate::utils::logging::log_skipped;

/// Status column shared by the fallback registries
pub const FALLBACK_COLUMN: &str = "SOSIOEKONOMINEN_ASEMA";

/// Output categories, in domain order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SesCategory {
    SelfEmployed,
    UpperLevel,
    LowerLevel,
    ManualWorkers,
    Students,
    Pensioners,
    Others,
    Unknown,
}

impl SesCategory {
    /// Position within the `ses` domain
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Classification in force for a statistics year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SesCodeScheme {
    /// 1980s classification, stored in `psose`
    Pre1990,
    /// Early `sose` years, coded with the same classification as 1995 on
    Early1990s,
    /// 1995 classification, stored in `sose`
    From1995,
}

impl SesCodeScheme {
    #[must_use]
    pub const fn for_year(year: i32) -> Self {
        match year {
            ..1990 => Self::Pre1990,
            1990..=1994 => Self::Early1990s,
            _ => Self::From1995,
        }
    }

    /// Column of the primary registry holding codes of this scheme
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Pre1990 => "psose",
            Self::Early1990s | Self::From1995 => "sose",
        }
    }

    /// Category of a raw code; unknown and missing codes give `None`
    #[must_use]
    pub fn classify(self, raw: &str) -> Option<SesCategory> {
        let code = normalize_code(raw)?;
        match self {
            Self::Pre1990 => classify_1980s(&code),
            Self::Early1990s | Self::From1995 => classify_sose(&code),
        }
    }
}

fn classify_1980s(code: &str) -> Option<SesCategory> {
    use SesCategory::*;
    Some(match code {
        "11" | "12" | "21" | "22" => SelfEmployed,
        "3" | "31" | "32" | "33" | "34" => UpperLevel,
        "4" | "41" | "42" | "43" | "44" => LowerLevel,
        "5" | "51" | "52" | "53" | "54" => ManualWorkers,
        "7" | "70" => Students,
        "6" => Pensioners,
        "91" | "92" | "93" | "94" => Others,
        "99" => Unknown,
        _ => return None,
    })
}

fn classify_sose(code: &str) -> Option<SesCategory> {
    use SesCategory::*;
    Some(match code {
        "10" | "11" | "12" | "20" | "21" | "22" | "23" | "24" | "29" => SelfEmployed,
        "31" | "32" | "33" | "34" | "39" => UpperLevel,
        "41" | "42" | "43" | "44" | "49" => LowerLevel,
        "5" | "51" | "52" | "53" | "54" | "59" => ManualWorkers,
        "60" => Students,
        "70" | "71" | "72" | "73" | "74" | "79" => Pensioners,
        "81" | "82" | "91" | "92" => Others,
        "X" | "99" => Unknown,
        _ => return None,
    })
}

/// A status observation from any source
#[derive(Debug, Clone, PartialEq, Eq)]
struct Observation {
    id: String,
    year: i32,
    category: Option<SesCategory>,
}

#[derive(Debug, Deserialize)]
struct StatusRow {
    #[serde(rename = "FINREGISTRYID")]
    id: Option<String>,
    vuosi: Option<f64>,
    psose: Option<String>,
    sose: Option<String>,
}

impl StatusRow {
    fn observation(self) -> Option<Observation> {
        let year = i32::try_from(integer_code(self.vuosi)?).ok()?;
        let scheme = SesCodeScheme::for_year(year);
        let code = match scheme {
            SesCodeScheme::Pre1990 => self.psose,
            SesCodeScheme::Early1990s | SesCodeScheme::From1995 => self.sose,
        };
        Some(Observation {
            id: self.id?,
            year,
            category: code.as_deref().and_then(|code| scheme.classify(code)),
        })
    }
}

#[derive(Debug, Deserialize)]
struct AssistanceStatusRow {
    #[serde(rename = "TNRO")]
    id: Option<String>,
    #[serde(rename = "TILASTOVUOSI")]
    year: Option<f64>,
    #[serde(rename = "SOSIOEKONOMINEN_ASEMA")]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BirthStatusRow {
    #[serde(rename = "MOTHER_FINREGISTRYID")]
    id: Option<String>,
    #[serde(rename = "CHILD_BIRTHDAY", deserialize_with = "lenient_date::deserialize")]
    birthday: Option<NaiveDate>,
    #[serde(rename = "SOSIOEKONOMINEN_ASEMA")]
    code: Option<String>,
}

fn fallback_observation(id: Option<String>, year: Option<i32>, code: Option<String>) -> Option<Observation> {
    let year = year?;
    Some(Observation {
        id: id?,
        year,
        category: code
            .as_deref()
            .and_then(|code| SesCodeScheme::for_year(year).classify(code)),
    })
}

/// Latest status per row together with its onset
struct StatusState {
    status: LatestWins<SesCategory>,
    onsets: OnsetAges,
}

impl StatusState {
    /// Apply observations in chronological order
    ///
    /// With `only`, rows outside the mask are left untouched.
    fn apply(
        &mut self,
        ctx: &ExtractContext<'_>,
        mut observations: Vec<Observation>,
        only: Option<&[bool]>,
    ) {
        observations.sort_by_key(|observation| observation.year);
        let reconciler = ctx.reconciler();
        for observation in observations {
            for hit in reconciler.hits(&observation.id, RecordSpan::Year(observation.year)) {
                if only.is_some_and(|mask| !mask[hit.row]) {
                    continue;
                }
                if self.status.offer(hit.row, observation.category) {
                    self.onsets.set(hit.row, hit.onset_age());
                }
            }
        }
    }

    /// Fill rows that are still missing from another source
    fn backfill(&mut self, ctx: &ExtractContext<'_>, observations: Vec<Observation>) {
        let missing = self.status.missing_rows();
        if missing.iter().any(|&row| row) {
            self.apply(ctx, observations, Some(&missing));
        }
    }
}

/// Fallback source if its path is configured and it carries a status column
fn fallback_source(
    ctx: &ExtractContext<'_>,
    kind: RegistryKind,
    format: FileFormat,
) -> Result<Option<RegistrySource>> {
    let Some(source) = ctx.optional_source(kind, format) else {
        log_skipped(&format!("{kind} status fallback"), "registry not configured");
        return Ok(None);
    };
    if !source.has_column(FALLBACK_COLUMN)? {
        log_skipped(
            &format!("{kind} status fallback"),
            &format!("no {FALLBACK_COLUMN} column"),
        );
        return Ok(None);
    }
    Ok(Some(source))
}

pub struct SesExtractor;

impl Extractor for SesExtractor {
    fn kind(&self) -> RegistryKind {
        RegistryKind::Ses
    }

    fn features(&self) -> Vec<&'static str> {
        SES.request_names()
    }

    fn extract(&self, ctx: &ExtractContext<'_>, matrix: &mut FeatureMatrix) -> Result<()> {
        let source = ctx
            .source(self.kind(), FileFormat::CSV)?
            .ids(&[ID_COLUMN])
            .columns([
                ColumnSpec::float("vuosi"),
                ColumnSpec::text("psose"),
                ColumnSpec::text("sose"),
            ]);

        let mut state = StatusState {
            status: LatestWins::new(matrix.len()),
            onsets: OnsetAges::new(matrix.len()),
        };

        let primary = source
            .read_rows::<StatusRow>(Some(ctx.ids()))?
            .into_iter()
            .filter_map(StatusRow::observation)
            .collect();
        state.apply(ctx, primary, None);

        if let Some(source) = fallback_source(ctx, RegistryKind::SocialAssistance, social_assistance::FORMAT)? {
            let observations = source
                .ids(&[social_assistance::ID_COLUMN])
                .columns([
                    ColumnSpec::float(social_assistance::YEAR_COLUMN),
                    ColumnSpec::text(FALLBACK_COLUMN),
                ])
                .read_rows::<AssistanceStatusRow>(Some(ctx.ids()))?
                .into_iter()
                .filter_map(|row| {
                    let year = integer_code(row.year).and_then(|y| i32::try_from(y).ok());
                    fallback_observation(row.id, year, row.code)
                })
                .collect();
            state.backfill(ctx, observations);
        }

        if let Some(source) = fallback_source(ctx, RegistryKind::Birth, birth::FORMAT)? {
            let observations = source
                .ids(&[birth::ID_COLUMN])
                .columns([
                    ColumnSpec::text(birth::DATE_COLUMN),
                    ColumnSpec::text(FALLBACK_COLUMN),
                ])
                .read_rows::<BirthStatusRow>(Some(ctx.ids()))?
                .into_iter()
                .filter_map(|row| {
                    fallback_observation(row.id, row.birthday.map(|d| d.year()), row.code)
                })
                .collect();
            state.backfill(ctx, observations);
        }

        let categories: Vec<Option<usize>> = state
            .status
            .into_inner()
            .into_iter()
            .map(|category| category.map(SesCategory::index))
            .collect();
        matrix.commit_domain(&SES, &categories);
        matrix.commit_domain_onset(&SES, state.onsets.into_inner());
        Ok(())
    }
}
