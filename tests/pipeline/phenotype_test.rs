use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use regmatrix::Error;

use crate::utils::Fixture;

const SAMPLE: [crate::utils::SampleRow<'static>; 3] = [
    ("FR1", "1970-01-01", "2010-01-01", "2011-12-31"),
    ("FR2", "1980-06-15", "2010-01-01", "2010-12-31"),
    ("FR3", "1975-03-03", "2010-01-01", "2010-12-31"),
];

fn phenotype_fixture(by_year: bool) -> Fixture {
    let mut fixture = Fixture::new(&SAMPLE, &["sex", "mothertongue"]);
    fixture
        .feather_file(
            "MinimalPhenotypeFile",
            "phenotype.feather",
            vec![
                (
                    "FINREGISTRYID",
                    Arc::new(StringArray::from(vec!["FR1", "FR2", "FR9"])) as ArrayRef,
                ),
                ("sex", Arc::new(Int64Array::from(vec![1, 2, 1])) as ArrayRef),
                (
                    "mother_tongue",
                    Arc::new(StringArray::from(vec!["fi", "sv", "ru"])) as ArrayRef,
                ),
            ],
        )
        .set("ByYear", if by_year { "T" } else { "F" });
    fixture
}

#[test]
fn test_phenotype_is_merged_by_identifier() -> regmatrix::Result<()> {
    let output = phenotype_fixture(false).run()?;

    assert_eq!(output.column("sex"), vec!["1", "2", ""]);
    assert_eq!(output.column("mothertongue_fi"), vec!["1", "0", "0"]);
    assert_eq!(output.column("mothertongue_swe"), vec!["0", "1", "0"]);
    assert_eq!(output.column("mothertongue_rus"), vec!["0", "0", "0"]);
    assert_eq!(output.column("mothertongue_other"), vec!["0", "0", "0"]);
    Ok(())
}

#[test]
fn test_yearly_rows_carry_sex_only() -> regmatrix::Result<()> {
    let output = phenotype_fixture(true).run()?;

    assert_eq!(output.column("sex"), vec!["1", "1", "2", ""]);
    assert!(!output.has_column("mothertongue_fi"));
    Ok(())
}

#[test]
fn test_phenotype_request_requires_file() {
    let err = Fixture::new(&SAMPLE, &["sex"]).run().err().expect("run should fail");
    assert!(matches!(err, Error::Config(_)), "{err}");
    assert!(err.to_string().contains("MinimalPhenotypeFile"));
}
