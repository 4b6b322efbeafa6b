use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};

use crate::utils::Fixture;

const SAMPLE: [crate::utils::SampleRow<'static>; 2] = [
    ("FR1", "1970-01-01", "2010-01-01", "2012-12-31"),
    ("FR2", "1980-06-15", "2010-01-01", "2012-12-31"),
];

fn income_fixture(features: &[&str]) -> Fixture {
    let mut fixture = Fixture::new(&SAMPLE, features);
    fixture.feather_file(
        "IncomeFile",
        "income.feather",
        vec![
            (
                "id",
                Arc::new(StringArray::from(vec!["FR1", "FR1", "FR3"])) as ArrayRef,
            ),
            ("vuosi", Arc::new(Int64Array::from(vec![2011, 2015, 2011])) as ArrayRef),
            (
                "vuosiansio_indexed",
                Arc::new(Float64Array::from(vec![1000.0, 5000.0, 999.0])) as ArrayRef,
            ),
        ],
    );
    fixture.latin1_file(
        "SocialAssistanceFile",
        "assistance.csv",
        "TNRO;TILASTOVUOSI;KUNTA;EHKAISEVA_TOIMEENTULOTUKI_EUR;PERUS_TOIMEENTULOTUKI_EUR;\
         TAYD_TOIMEENTULOTUKI_EUR;KUNT_TOIMINTARAHA_EUR;KUNT_MATKAKORVAUS_EUR\n\
         FR1;2012;Hämeenlinna;150;200;;0;0\n\
         FR9;2012;Åbo;5;5;5;5;5\n",
    );
    fixture.text_file(
        "CpiFile",
        "cpi.csv",
        "year,multiplier\n2010,1.0\n2011,1.0\n2012,2.0\n",
    );
    fixture
}

#[test]
fn test_total_income_spans_registries() -> regmatrix::Result<()> {
    let fixture = income_fixture(&[
        "total_income",
        "total_benefits",
        "received_labor_income",
        "received_any_income_support",
    ]);
    let output = fixture.run()?;

    assert_eq!(output.len(), 2);
    assert_eq!(output.column("FINREGISTRYID"), vec!["FR1", "FR2"]);
    // 1000 labour income plus (150 + 200) assistance at multiplier 2.0
    assert_eq!(output.column("total_income"), vec!["1700.00", "0.00"]);
    assert_eq!(output.column("total_benefits"), vec!["700.00", "0.00"]);
    assert_eq!(output.column("received_labor_income"), vec!["1", "0"]);
    assert_eq!(output.column("received_any_income_support"), vec!["1", "0"]);
    assert!(!output.has_column("total_labor_income"));
    assert!(!output.has_column("total_income_OnsetAge"));
    Ok(())
}

#[test]
fn test_identity_columns_lead() -> regmatrix::Result<()> {
    let output = income_fixture(&["received_labor_income"]).run()?;
    assert_eq!(
        output.header,
        vec![
            "FINREGISTRYID",
            "date_of_birth",
            "start_of_followup",
            "end_of_followup",
            "received_labor_income",
        ]
    );
    assert_eq!(output.column("date_of_birth"), vec!["1970-01-01", "1980-06-15"]);
    Ok(())
}

#[test]
fn test_onset_ages_take_earliest_contribution() -> regmatrix::Result<()> {
    let mut fixture = income_fixture(&["total_income", "received_labor_income"]);
    fixture.set("OutputAge", "T");
    let output = fixture.run()?;

    // 2011-01-01 is 14975 days after the birth date
    assert_eq!(output.column("received_labor_income_OnsetAge"), vec!["41.03", ""]);
    assert_eq!(output.column("total_income_OnsetAge"), vec!["41.03", ""]);
    Ok(())
}

#[test]
fn test_residence_latest_wins_in_start_order() -> regmatrix::Result<()> {
    let numeric = [
        "sparse_small_house_area",
        "apartment_building_area",
        "small_house_area",
        "demographic_dependency_ratio",
        "economic_dependency_ratio",
        "general_at_risk_of_poverty_rate_for_the_municipality",
        "intermunicipal_net_migration_1000_inhabitants",
        "sale_of_alcoholic_beverages_per_capita_as_litres_of_pure_alcohol",
        "self_rated_health_moderate_or_poor_scaled_health_and_welfare_indicator",
        "hr_ktu",
        "hr_mtu",
    ];
    let header = format!(
        "FINREGISTRYID,Start_of_residence,End_of_residence,posti_alue,TaajamaLuo,Luokka,{},pt_vakiy",
        numeric.join(",")
    );
    let fillers = vec!["1"; numeric.len()].join(",");
    // the later residence is listed first
    let content = format!(
        "{header}\n\
         FR1,2011-01-01,,00200,1,K1,{fillers},-1\n\
         FR1,2005-01-01,2010-12-31,00100,2,K2,{fillers},0.5\n\
         FR2,1999-01-01,2001-01-01,99999,2,K3,{fillers},0.9\n"
    );

    let mut fixture = Fixture::new(
        &SAMPLE,
        &["zip_code", "urbanization_class", "permanent_residents_fraction"],
    );
    fixture.text_file("LivingExtendedFile", "living.csv", &content);
    fixture.set("OutputAge", "T");
    let output = fixture.run()?;

    assert_eq!(output.column("zip_code"), vec!["00200", ""]);
    assert_eq!(output.column("urbanization_class"), vec!["1", ""]);
    // the suppressed -1 of the latest residence does not overwrite
    assert_eq!(output.column("permanent_residents_fraction"), vec!["0.50", ""]);
    assert_eq!(output.column("zip_code_OnsetAge"), vec!["41.03", ""]);
    Ok(())
}
