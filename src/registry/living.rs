//! Residence history registry
//!
//! Each residence carries the zip code and area statistics of the address.
//! Residences are applied in order of their start date so the latest one in
//! the follow-up window wins field by field. Area statistics suppressed for
//! small areas are stored as `-1` and treated as missing.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::accumulate::{LatestWins, OnsetAges};
use crate::config::RegistryKind;
use crate::error::Result;
use crate::matrix::{Column, FeatureMatrix, onset_name};
use crate::population::sample::ID_COLUMN;
use crate::reader::values::{finite, lenient_date, non_empty};
use crate::reader::{ColumnSpec, FileFormat};
use crate::registry::{ExtractContext, Extractor};
use crate::temporal::RecordSpan;

pub const ZIP_CODE: &str = "zip_code";

/// Text attributes and their file columns
const TEXT_FIELDS: [(&str, &str); 3] = [
    (ZIP_CODE, "posti_alue"),
    ("urbanization_class", "TaajamaLuo"),
    ("urban_rural_class_code", "Luokka"),
];

/// Numeric attributes and their file columns
const NUMERIC_FIELDS: [(&str, &str); 11] = [
    ("sparse_small_house_area", "sparse_small_house_area"),
    ("apartment_building_area", "apartment_building_area"),
    ("small_house_area", "small_house_area"),
    ("demographic_dependency_ratio", "demographic_dependency_ratio"),
    ("economic_dependency_ratio", "economic_dependency_ratio"),
    (
        "general_at_risk_of_poverty_rate_for_the_municipality",
        "general_at_risk_of_poverty_rate_for_the_municipality",
    ),
    (
        "intermunicipal_net_migration_1000_inhabitants",
        "intermunicipal_net_migration_1000_inhabitants",
    ),
    (
        "sale_of_alcoholic_beverages_per_capita",
        "sale_of_alcoholic_beverages_per_capita_as_litres_of_pure_alcohol",
    ),
    (
        "self_rated_health_moderate_or_poor_scaled_health_and_welfare_indicator",
        "self_rated_health_moderate_or_poor_scaled_health_and_welfare_indicator",
    ),
    ("average_income_of_inhabitants", "hr_ktu"),
    ("median_income_of_inhabitants", "hr_mtu"),
];

const PERMANENT_RESIDENTS: (&str, &str) = ("permanent_residents_fraction", "pt_vakiy");

/// Marker of a suppressed value
const SUPPRESSED: f64 = -1.0;

#[derive(Debug, Deserialize)]
struct ResidenceRow {
    #[serde(rename = "FINREGISTRYID")]
    id: Option<String>,
    #[serde(rename = "Start_of_residence", deserialize_with = "lenient_date::deserialize")]
    start: Option<NaiveDate>,
    #[serde(rename = "End_of_residence", deserialize_with = "lenient_date::deserialize")]
    end: Option<NaiveDate>,
    zip_code: Option<String>,
    urbanization_class: Option<String>,
    urban_rural_class_code: Option<String>,
    sparse_small_house_area: Option<f64>,
    apartment_building_area: Option<f64>,
    small_house_area: Option<f64>,
    demographic_dependency_ratio: Option<f64>,
    economic_dependency_ratio: Option<f64>,
    general_at_risk_of_poverty_rate_for_the_municipality: Option<f64>,
    intermunicipal_net_migration_1000_inhabitants: Option<f64>,
    sale_of_alcoholic_beverages_per_capita: Option<f64>,
    self_rated_health_moderate_or_poor_scaled_health_and_welfare_indicator: Option<f64>,
    average_income_of_inhabitants: Option<f64>,
    median_income_of_inhabitants: Option<f64>,
    permanent_residents_fraction: Option<f64>,
}

fn text_value(value: Option<&str>) -> Option<String> {
    non_empty(value)
        .filter(|v| v.parse::<f64>().ok() != Some(SUPPRESSED))
        .map(str::to_string)
}

fn numeric_value(value: Option<f64>) -> Option<f64> {
    finite(value).filter(|v| *v != SUPPRESSED)
}

impl ResidenceRow {
    /// Text attributes in [`TEXT_FIELDS`] order
    fn texts(&self) -> [Option<String>; 3] {
        [
            text_value(self.zip_code.as_deref()),
            text_value(self.urbanization_class.as_deref()),
            text_value(self.urban_rural_class_code.as_deref()),
        ]
    }

    /// Numeric attributes in [`NUMERIC_FIELDS`] order, then permanent residents
    fn numbers(&self) -> [Option<f64>; 12] {
        [
            self.sparse_small_house_area,
            self.apartment_building_area,
            self.small_house_area,
            self.demographic_dependency_ratio,
            self.economic_dependency_ratio,
            self.general_at_risk_of_poverty_rate_for_the_municipality,
            self.intermunicipal_net_migration_1000_inhabitants,
            self.sale_of_alcoholic_beverages_per_capita,
            self.self_rated_health_moderate_or_poor_scaled_health_and_welfare_indicator,
            self.average_income_of_inhabitants,
            self.median_income_of_inhabitants,
            self.permanent_residents_fraction,
        ]
        .map(numeric_value)
    }
}

fn numeric_fields() -> impl Iterator<Item = (&'static str, &'static str)> {
    NUMERIC_FIELDS.into_iter().chain([PERMANENT_RESIDENTS])
}

pub struct LivingExtractor;

impl Extractor for LivingExtractor {
    fn kind(&self) -> RegistryKind {
        RegistryKind::Living
    }

    fn features(&self) -> Vec<&'static str> {
        TEXT_FIELDS
            .iter()
            .map(|(name, _)| *name)
            .chain(numeric_fields().map(|(name, _)| name))
            .collect()
    }

    fn extract(&self, ctx: &ExtractContext<'_>, matrix: &mut FeatureMatrix) -> Result<()> {
        let source = ctx
            .source(self.kind(), FileFormat::CSV)?
            .ids(&[ID_COLUMN])
            .columns([
                ColumnSpec::text("Start_of_residence"),
                ColumnSpec::text("End_of_residence"),
            ])
            .columns(
                TEXT_FIELDS
                    .into_iter()
                    .map(|(name, column)| ColumnSpec::text(name).read_from(column)),
            )
            .columns(numeric_fields().map(|(name, column)| ColumnSpec::float(name).read_from(column)));

        let mut residences: Vec<ResidenceRow> = source.read_rows(Some(ctx.ids()))?;
        // undated residences sort last
        residences.sort_by_key(|row| (row.start.is_none(), row.start));

        let rows = matrix.len();
        let mut texts: Vec<LatestWins<String>> = TEXT_FIELDS.iter().map(|_| LatestWins::new(rows)).collect();
        let mut numbers: Vec<LatestWins<f64>> = numeric_fields().map(|_| LatestWins::new(rows)).collect();
        let mut onsets = OnsetAges::new(rows);
        let reconciler = ctx.reconciler();

        for residence in &residences {
            let Some(id) = residence.id.as_deref() else {
                continue;
            };
            let hits = reconciler.hits(id, RecordSpan::dated(residence.start, residence.end));
            if hits.is_empty() {
                continue;
            }
            let text_values = residence.texts();
            let numeric_values = residence.numbers();
            for hit in &hits {
                for (field, value) in texts.iter_mut().zip(&text_values) {
                    field.offer(hit.row, value.clone());
                }
                for (field, value) in numbers.iter_mut().zip(numeric_values) {
                    field.offer(hit.row, value);
                }
                onsets.set(hit.row, hit.onset_age());
            }
        }

        // one onset column shared by all residence attributes
        let wants_any = self.features().iter().any(|name| matrix.wants(name));
        let mut zip_onsets = (wants_any && matrix.output_age()).then(|| onsets.into_inner());
        for ((name, _), values) in TEXT_FIELDS.into_iter().zip(texts) {
            matrix.commit(name, Column::Text(values.into_inner()));
            if name == ZIP_CODE {
                if let Some(ages) = zip_onsets.take() {
                    matrix.put(&onset_name(ZIP_CODE), Column::Float(ages));
                }
            }
        }
        for ((name, _), values) in numeric_fields().zip(numbers) {
            let values = values
                .into_inner()
                .into_iter()
                .map(|value| value.unwrap_or(f64::NAN))
                .collect();
            matrix.commit(name, Column::Float(values));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suppressed_values_are_missing() {
        assert_eq!(numeric_value(Some(-1.0)), None);
        assert_eq!(numeric_value(Some(f64::NAN)), None);
        assert_eq!(numeric_value(Some(0.5)), Some(0.5));
        assert_eq!(text_value(Some("-1")), None);
        assert_eq!(text_value(Some(" ")), None);
        assert_eq!(text_value(Some("00100")), Some("00100".to_string()));
    }

    #[test]
    fn test_feature_names_cover_all_attributes() {
        let names = LivingExtractor.features();
        assert_eq!(names.len(), 15);
        assert_eq!(names[0], ZIP_CODE);
        assert!(names.contains(&"permanent_residents_fraction"));
        assert!(names.contains(&"average_income_of_inhabitants"));
    }
}
