use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};

use crate::utils::Fixture;

const SAMPLE: [crate::utils::SampleRow<'static>; 2] = [
    ("FR1", "1970-01-01", "2010-01-01", "2012-12-31"),
    ("FR2", "1980-06-15", "2010-01-01", "2012-12-31"),
];

const CPI: &str = "year,multiplier\n2010,1.0\n2011,1.0\n2012,2.0\n";

fn strings(values: Vec<Option<&str>>) -> ArrayRef {
    Arc::new(StringArray::from(values))
}

fn floats(values: Vec<Option<f64>>) -> ArrayRef {
    Arc::new(Float64Array::from(values))
}

/// A full year of old-age pension in 2011 and a disability pension paid
/// March to October 2012
fn pension_fixture(features: &[&str]) -> Fixture {
    let mut fixture = Fixture::new(&SAMPLE, features);
    fixture
        .feather_file(
            "PensionFile",
            "pension.feather",
            vec![
                ("id", strings(vec![Some("FR1"), Some("FR1"), Some("FR7")])),
                ("apvm", strings(vec![Some("2011-01-01"), Some("2012-03-01"), Some("2011-01-01")])),
                ("ppvm", strings(vec![Some("2011-12-31"), Some("2012-10-31"), None])),
                ("ptma", floats(vec![Some(100.0), None, Some(9.0)])),
                ("ltma", floats(vec![None, Some(5.0), None])),
                ("jkma", floats(vec![None, None, None])),
                ("tksyy1", strings(vec![None, Some("12"), None])),
            ],
        )
        .text_file("CpiFile", "cpi.csv", CPI);
    fixture
}

fn with_income(fixture: &mut Fixture) {
    fixture.feather_file(
        "IncomeFile",
        "income.feather",
        vec![
            ("id", strings(vec![Some("FR1")])),
            ("vuosi", Arc::new(Int64Array::from(vec![2011])) as ArrayRef),
            ("vuosiansio_indexed", floats(vec![Some(500.0)])),
        ],
    );
}

#[test]
fn test_pension_is_indexed_and_month_weighted() -> regmatrix::Result<()> {
    let mut fixture = pension_fixture(&[
        "received_pension",
        "received_disability_pension",
        "total_pension",
    ]);
    fixture.set("OutputAge", "T");
    let output = fixture.run()?;

    // 12 months of 100, then 10 months of 5 at multiplier 2.0
    assert_eq!(output.column("total_pension"), vec!["1300.00", "0.00"]);
    assert_eq!(output.column("received_pension"), vec!["1", "0"]);
    assert_eq!(output.column("received_disability_pension"), vec!["1", "0"]);
    assert_eq!(output.column("received_pension_OnsetAge"), vec!["41.03", ""]);
    assert_eq!(output.column("received_disability_pension_OnsetAge"), vec!["42.19", ""]);
    Ok(())
}

#[test]
fn test_yearly_pension_rows() -> regmatrix::Result<()> {
    let mut fixture = pension_fixture(&["total_pension"]);
    fixture.set("ByYear", "T");
    let output = fixture.run()?;

    assert_eq!(output.column("year"), vec!["2010", "2011", "2012", "2010", "2011", "2012"]);
    assert_eq!(
        output.column("total_pension"),
        vec!["0.00", "1200.00", "100.00", "0.00", "0.00", "0.00"]
    );
    Ok(())
}

#[test]
fn test_total_income_adds_pension_income_and_assistance() -> regmatrix::Result<()> {
    let mut fixture = pension_fixture(&["total_income"]);
    let output = fixture.run()?;
    assert_eq!(output.column("total_income"), vec!["1300.00", "0.00"]);

    with_income(&mut fixture);
    let output = fixture.run()?;
    assert_eq!(output.column("total_income"), vec!["1800.00", "0.00"]);

    fixture.latin1_file(
        "SocialAssistanceFile",
        "assistance.csv",
        "TNRO;TILASTOVUOSI;KUNTA;EHKAISEVA_TOIMEENTULOTUKI_EUR;PERUS_TOIMEENTULOTUKI_EUR;\
         TAYD_TOIMEENTULOTUKI_EUR;KUNT_TOIMINTARAHA_EUR;KUNT_MATKAKORVAUS_EUR\n\
         FR1;2012;Närpiö;150;200;;;\n",
    );
    let output = fixture.run()?;
    assert_eq!(output.column("total_income"), vec!["2500.00", "0.00"]);
    assert!(!output.has_column("total_pension"));
    Ok(())
}

#[test]
fn test_benefit_payments_are_prorated_by_days() -> regmatrix::Result<()> {
    let mut fixture = Fixture::new(
        &SAMPLE,
        &[
            "total_benefits",
            "received_basic_unemployment_allowance",
            "received_study_allowance",
            "received_maternity_paternity_parental_allowance",
        ],
    );
    fixture
        .feather_file(
            "BenefitsFile",
            "benefits.feather",
            vec![
                ("id", strings(vec![Some("FR1"), Some("FR2"), Some("FR1")])),
                ("etuuslaji", floats(vec![Some(150.0), Some(300.0), Some(101.0)])),
                (
                    "alkamispvm",
                    strings(vec![Some("2009-12-01"), Some("2012-06-01"), Some("2011-05-01")]),
                ),
                (
                    "paattymispvm",
                    strings(vec![Some("2010-01-30"), Some("2012-06-10"), Some("2011-05-31")]),
                ),
                ("maksettu_eur", floats(vec![Some(610.0), Some(100.0), None])),
            ],
        )
        .text_file("CpiFile", "cpi.csv", CPI);
    let output = fixture.run()?;

    // 30 of 61 days fall inside follow-up; the 2012 payment is doubled by the index
    assert_eq!(output.column("total_benefits"), vec!["300.00", "200.00"]);
    assert_eq!(output.column("received_basic_unemployment_allowance"), vec!["1", "0"]);
    assert_eq!(output.column("received_study_allowance"), vec!["0", "1"]);
    assert_eq!(
        output.column("received_maternity_paternity_parental_allowance"),
        vec!["1", "0"]
    );
    Ok(())
}

#[test]
fn test_unfed_cumulative_is_written_as_zero() -> regmatrix::Result<()> {
    let output = Fixture::new(&SAMPLE, &["total_benefits"]).run()?;
    assert_eq!(output.column("total_benefits"), vec!["0.00", "0.00"]);
    Ok(())
}

#[test]
fn test_labor_income_has_no_onset_column() -> regmatrix::Result<()> {
    let mut fixture = Fixture::new(&SAMPLE, &["total_labor_income", "received_labor_income"]);
    with_income(&mut fixture);
    fixture.set("OutputAge", "T");
    let output = fixture.run()?;

    assert_eq!(output.column("total_labor_income"), vec!["500.00", "0.00"]);
    assert_eq!(output.column("received_labor_income_OnsetAge"), vec!["41.03", ""]);
    assert!(!output.has_column("total_labor_income_OnsetAge"));
    Ok(())
}
