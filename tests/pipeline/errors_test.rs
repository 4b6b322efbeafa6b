use regmatrix::Error;

use crate::utils::Fixture;

const SAMPLE: [crate::utils::SampleRow<'static>; 1] =
    [("FR1", "1970-01-01", "2010-01-01", "2012-12-31")];

#[test]
fn test_missing_registry_path_is_config_error() {
    let fixture = Fixture::new(&SAMPLE, &["married"]);
    let err = fixture.run().err().expect("run should fail");
    assert!(matches!(err, Error::Config(_)), "{err}");
    assert!(err.to_string().contains("MarriageHistoryFile"));
}

#[test]
fn test_indexed_pension_requires_cpi() {
    let mut fixture = Fixture::new(&SAMPLE, &["total_pension"]);
    fixture.set("PensionFile", fixture.path("pension.feather").to_string_lossy());
    let err = fixture.run().err().expect("run should fail");
    assert!(matches!(err, Error::Config(_)), "{err}");
    assert!(err.to_string().contains("CpiFile"));
}

#[test]
fn test_unopenable_registry_names_the_file() {
    let mut fixture = Fixture::new(&SAMPLE, &["emigrated"]);
    fixture.set("EmigrationFile", fixture.path("missing.csv").to_string_lossy());
    let err = fixture.run().err().expect("run should fail");
    assert!(matches!(err, Error::FileAccess { .. }), "{err}");
    assert!(err.to_string().contains("missing.csv"));
}

#[test]
fn test_missing_required_column_names_the_column() {
    let mut fixture = Fixture::new(&SAMPLE, &["emigrated"]);
    fixture.text_file(
        "EmigrationFile",
        "emigration.csv",
        "FINREGISTRYID,Departure_date\nFR1,2011-01-01\n",
    );
    let err = fixture.run().err().expect("run should fail");
    assert!(matches!(err, Error::Registry { .. }), "{err}");
    assert!(err.to_string().contains("Return_date"));
}

#[test]
fn test_inverted_follow_up_is_integrity_error() {
    let mut fixture =
        Fixture::new(&[("FR1", "1970-01-01", "2013-01-01", "2012-12-31")], &["married"]);
    fixture.text_file(
        "MarriageHistoryFile",
        "marriage.csv",
        "FINREGISTRYID,Current_marital_status,Starting_date,Ending_day\n",
    );
    let err = fixture.run().err().expect("run should fail");
    assert!(matches!(err, Error::PopulationIntegrity(_)), "{err}");
}

#[test]
fn test_unrequested_registry_must_still_open() {
    let mut fixture = Fixture::new(&SAMPLE, &["emigrated"]);
    fixture.text_file(
        "EmigrationFile",
        "emigration.csv",
        "FINREGISTRYID,Departure_date,Return_date\nFR1,2011-01-01,\n",
    );
    fixture.set("BirthFile", fixture.path("does_not_exist.csv").to_string_lossy());
    let err = fixture.run().err().expect("run should fail");
    assert!(matches!(err, Error::FileAccess { .. }), "{err}");
    assert!(err.to_string().contains("does_not_exist.csv"));
}
