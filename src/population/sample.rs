//! Sample and minimal phenotype loading.

use std::path::Path;

use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::Individual;
use crate::reader::values::{integer_code, non_empty, parse_date};
use crate::reader::{ColumnSpec, FileFormat, RegistrySource};

/// Identifier column shared by the sample and most registries
pub const ID_COLUMN: &str = "FINREGISTRYID";

#[derive(Debug, Deserialize)]
struct SampleRow {
    #[serde(rename = "FINREGISTRYID")]
    id: Option<String>,
    start_of_followup: Option<String>,
    end_of_followup: Option<String>,
    date_of_birth: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhenotypeRow {
    #[serde(rename = "FINREGISTRYID")]
    id: Option<String>,
    sex: Option<f64>,
    mother_tongue: Option<String>,
}

fn required_date(id: &str, field: &str, value: Option<&str>) -> Result<NaiveDate> {
    let value = non_empty(value).ok_or_else(|| {
        Error::PopulationIntegrity(format!("individual {id} has no {field}"))
    })?;
    parse_date(value).ok_or_else(|| {
        Error::PopulationIntegrity(format!("individual {id} has unparseable {field} '{value}'"))
    })
}

impl TryFrom<SampleRow> for Individual {
    type Error = Error;

    fn try_from(row: SampleRow) -> Result<Self> {
        let id = non_empty(row.id.as_deref())
            .ok_or_else(|| Error::PopulationIntegrity("sample row without identifier".to_string()))?
            .to_string();
        let start = required_date(&id, "start_of_followup", row.start_of_followup.as_deref())?;
        let end = required_date(&id, "end_of_followup", row.end_of_followup.as_deref())?;
        let dob = required_date(&id, "date_of_birth", row.date_of_birth.as_deref())?;
        Ok(Self::new(id, dob, start, end))
    }
}

/// Read the sample population file
///
/// Every row must carry an identifier and three parseable dates; anything
/// else is a population integrity error.
pub fn load_sample(path: &Path) -> Result<Vec<Individual>> {
    let source = RegistrySource::new("sample", path, FileFormat::CSV).columns([
        ColumnSpec::text(ID_COLUMN),
        ColumnSpec::text("start_of_followup"),
        ColumnSpec::text("end_of_followup"),
        ColumnSpec::text("date_of_birth"),
    ]);
    let rows: Vec<SampleRow> = source.read_rows(None)?;
    let individuals = rows
        .into_iter()
        .map(Individual::try_from)
        .collect::<Result<Vec<_>>>()?;
    log::info!("Loaded {} sampled individuals", individuals.len());
    Ok(individuals)
}

/// Merge sex and mother tongue from the minimal phenotype file
///
/// Individuals missing from the file keep empty phenotype values.
pub fn load_phenotype(path: &Path, individuals: &mut [Individual]) -> Result<()> {
    let ids: FxHashSet<String> = individuals.iter().map(|i| i.id.clone()).collect();
    let source = RegistrySource::new("minimal phenotype", path, FileFormat::Feather)
        .ids(&[ID_COLUMN])
        .column(ColumnSpec::float("sex").optional())
        .column(ColumnSpec::text("mother_tongue").optional());

    let mut phenotypes: FxHashMap<String, (Option<i64>, Option<String>)> = FxHashMap::default();
    source.scan(Some(&ids), |row: PhenotypeRow| {
        if let Some(id) = row.id {
            let tongue = non_empty(row.mother_tongue.as_deref()).map(str::to_string);
            phenotypes.insert(id, (integer_code(row.sex), tongue));
        }
    })?;

    for individual in individuals.iter_mut() {
        if let Some((sex, tongue)) = phenotypes.get(&individual.id) {
            individual.sex = *sex;
            individual.mother_tongue.clone_from(tongue);
        }
    }
    log::info!(
        "Merged phenotype information for {} of {} individuals",
        phenotypes.len(),
        individuals.len()
    );
    Ok(())
}
