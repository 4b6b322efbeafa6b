//! Run configuration.
//!
//! The configuration is read once at startup from a tab-separated
//! `key<TAB>value` file (or a JSON object with the same keys) and is passed
//! by reference into every component afterwards.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::util::{check_writable, safe_open_file, safe_read_to_string};
use crate::error::{Error, Result};

/// Output row granularity, fixed for a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Granularity {
    /// One row per individual covering the whole follow-up window
    #[default]
    Aggregate,
    /// One row per individual and calendar year touched by follow-up
    Yearly,
}

impl TryFrom<String> for Granularity {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match parse_flag(&value) {
            Some(true) => Ok(Self::Yearly),
            Some(false) => Ok(Self::Aggregate),
            None => match value.trim().to_lowercase().as_str() {
                "yearly" | "year" => Ok(Self::Yearly),
                "aggregate" => Ok(Self::Aggregate),
                _ => Err(format!("invalid ByYear value '{value}', expected T or F")),
            },
        }
    }
}

/// The registries an extraction run can draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryKind {
    Pension,
    Income,
    Benefits,
    SocialAssistance,
    MaritalStatus,
    Pedigree,
    Living,
    Ses,
    Education,
    Birth,
    LongTermCare,
    Emigration,
}

impl RegistryKind {
    /// Every registry, in extraction order
    pub const ALL: [Self; 12] = [
        Self::Pension,
        Self::Income,
        Self::Benefits,
        Self::SocialAssistance,
        Self::MaritalStatus,
        Self::Pedigree,
        Self::Living,
        Self::Ses,
        Self::Education,
        Self::Birth,
        Self::LongTermCare,
        Self::Emigration,
    ];

    /// Configuration key holding the registry file path
    #[must_use]
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::Pension => "PensionFile",
            Self::Income => "IncomeFile",
            Self::Benefits => "BenefitsFile",
            Self::SocialAssistance => "SocialAssistanceFile",
            Self::MaritalStatus => "MarriageHistoryFile",
            Self::Pedigree => "PedigreeFile",
            Self::Living => "LivingExtendedFile",
            Self::Ses => "SESFile",
            Self::Education => "EducationFile",
            Self::Birth => "BirthFile",
            Self::LongTermCare => "LongTermCareFile",
            Self::Emigration => "EmigrationFile",
        }
    }

    /// Human readable registry name used in logs and errors
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pension => "pension",
            Self::Income => "income",
            Self::Benefits => "benefits",
            Self::SocialAssistance => "social assistance",
            Self::MaritalStatus => "marriage history",
            Self::Pedigree => "pedigree",
            Self::Living => "living extended",
            Self::Ses => "socioeconomic status",
            Self::Education => "education",
            Self::Birth => "birth",
            Self::LongTermCare => "long-term care",
            Self::Emigration => "emigration",
        }
    }
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Paths of the per-registry files; each one is only needed when a
/// requested feature draws from it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryPaths {
    #[serde(rename = "PensionFile", default)]
    pub pension: Option<PathBuf>,
    #[serde(rename = "IncomeFile", default)]
    pub income: Option<PathBuf>,
    #[serde(rename = "BenefitsFile", default)]
    pub benefits: Option<PathBuf>,
    #[serde(rename = "SocialAssistanceFile", default)]
    pub social_assistance: Option<PathBuf>,
    #[serde(rename = "MarriageHistoryFile", default)]
    pub marriage_history: Option<PathBuf>,
    #[serde(rename = "PedigreeFile", default)]
    pub pedigree: Option<PathBuf>,
    #[serde(rename = "LivingExtendedFile", default)]
    pub living_extended: Option<PathBuf>,
    #[serde(rename = "SESFile", default)]
    pub ses: Option<PathBuf>,
    #[serde(rename = "EducationFile", default)]
    pub education: Option<PathBuf>,
    #[serde(rename = "BirthFile", default)]
    pub birth: Option<PathBuf>,
    #[serde(rename = "LongTermCareFile", default)]
    pub long_term_care: Option<PathBuf>,
    #[serde(rename = "EmigrationFile", default)]
    pub emigration: Option<PathBuf>,
}

impl RegistryPaths {
    /// Path configured for a registry, if any
    #[must_use]
    pub fn get(&self, kind: RegistryKind) -> Option<&Path> {
        let path = match kind {
            RegistryKind::Pension => &self.pension,
            RegistryKind::Income => &self.income,
            RegistryKind::Benefits => &self.benefits,
            RegistryKind::SocialAssistance => &self.social_assistance,
            RegistryKind::MaritalStatus => &self.marriage_history,
            RegistryKind::Pedigree => &self.pedigree,
            RegistryKind::Living => &self.living_extended,
            RegistryKind::Ses => &self.ses,
            RegistryKind::Education => &self.education,
            RegistryKind::Birth => &self.birth,
            RegistryKind::LongTermCare => &self.long_term_care,
            RegistryKind::Emigration => &self.emigration,
        };
        path.as_deref()
    }

    /// Every configured registry with its path
    pub fn configured(&self) -> impl Iterator<Item = (RegistryKind, &Path)> + '_ {
        RegistryKind::ALL
            .into_iter()
            .filter_map(move |kind| self.get(kind).map(|path| (kind, path)))
    }
}

/// Immutable configuration for one extraction run
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Sample population (identifier, follow-up window, date of birth)
    #[serde(rename = "SampleFile")]
    pub sample_file: PathBuf,
    /// List of requested output variables
    #[serde(rename = "FeatureFile")]
    pub feature_file: PathBuf,
    /// Consumer price index table, needed for indexed monetary sums
    #[serde(rename = "CpiFile", default)]
    pub cpi_file: Option<PathBuf>,
    /// Sex and mother tongue of each sampled individual
    #[serde(rename = "MinimalPhenotypeFile", default)]
    pub minimal_phenotype_file: Option<PathBuf>,
    /// Destination of the feature matrix
    #[serde(rename = "OutputFile")]
    pub output_file: PathBuf,
    #[serde(flatten)]
    pub registries: RegistryPaths,
    #[serde(rename = "ByYear", default)]
    pub granularity: Granularity,
    /// Emit `_OnsetAge` companion columns
    #[serde(rename = "OutputAge", default, deserialize_with = "deserialize_flag")]
    pub output_age: bool,
    /// Decimal places for floating point output
    #[serde(
        rename = "Precision",
        default = "default_precision",
        deserialize_with = "deserialize_precision"
    )]
    pub precision: usize,
}

const fn default_precision() -> usize {
    2
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "T" | "t" | "true" | "TRUE" | "True" | "1" => Some(true),
        "F" | "f" | "false" | "FALSE" | "False" | "0" => Some(false),
        _ => None,
    }
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    let value = String::deserialize(deserializer)?;
    parse_flag(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid flag '{value}', expected T or F")))
}

fn deserialize_precision<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<usize, D::Error> {
    let value = String::deserialize(deserializer)?;
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| serde::de::Error::custom(format!("invalid Precision '{value}'")))
}

impl RunConfig {
    /// Read the configuration file
    ///
    /// Files ending in `.json` hold a JSON object; anything else is read as
    /// tab-separated `key value` lines.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = safe_read_to_string(path, "configuration")?;
        let pairs = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            parse_json_pairs(&text)?
        } else {
            parse_tab_pairs(&text)?
        };
        Self::from_pairs(pairs)
    }

    /// Build the configuration from raw key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let object: Map<String, Value> = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), Value::String(value.into())))
            .collect();
        serde_json::from_value(Value::Object(object)).map_err(|e| Error::Config(e.to_string()))
    }

    /// Override the granularity (command line takes precedence)
    #[must_use]
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Override the onset-age output flag
    #[must_use]
    pub fn with_output_age(mut self, output_age: bool) -> Self {
        self.output_age = output_age;
        self
    }

    /// Check that every file the run needs can be opened
    ///
    /// `registries` lists the registries that contribute requested features
    /// and must be configured; every configured registry file must open,
    /// requested or not. `needs_cpi` is set when an inflation-indexed sum
    /// was requested.
    pub fn validate(&self, registries: &[RegistryKind], needs_cpi: bool) -> Result<()> {
        safe_open_file(&self.sample_file, "sample")?;
        safe_open_file(&self.feature_file, "feature list")?;

        if let Some(path) = &self.minimal_phenotype_file {
            safe_open_file(path, "minimal phenotype")?;
        }

        match (&self.cpi_file, needs_cpi) {
            (Some(path), _) => {
                safe_open_file(path, "consumer price index")?;
            }
            (None, true) => {
                return Err(Error::Config(
                    "CpiFile is required when indexed income or benefit sums are requested"
                        .to_string(),
                ));
            }
            (None, false) => {}
        }

        if let Some(kind) = registries.iter().find(|kind| self.registries.get(**kind).is_none()) {
            return Err(Error::Config(format!(
                "{} is required because a requested feature uses the {kind} registry",
                kind.config_key()
            )));
        }
        for (kind, path) in self.registries.configured() {
            safe_open_file(path, &format!("{kind} registry"))?;
        }

        check_writable(&self.output_file, "output")
    }
}

fn parse_tab_pairs(text: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let trimmed = line.trim_end_matches('\r');
        if trimmed.trim().is_empty() || trimmed.trim_start().starts_with('#') {
            continue;
        }
        let mut fields = trimmed.split('\t');
        let key = fields.next().map(str::trim).unwrap_or_default();
        let value = fields.next().map(str::trim);
        match value {
            Some(value) if !key.is_empty() => pairs.push((key.to_string(), value.to_string())),
            _ => {
                return Err(Error::Config(format!(
                    "malformed configuration line {}: '{trimmed}' (expected key<TAB>value)",
                    number + 1
                )));
            }
        }
    }
    Ok(pairs)
}

fn parse_json_pairs(text: &str) -> Result<Vec<(String, String)>> {
    let object: Map<String, Value> = serde_json::from_str(text)?;
    Ok(object
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}
