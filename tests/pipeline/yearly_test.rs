use crate::utils::Fixture;

const SAMPLE: [crate::utils::SampleRow<'static>; 2] = [
    ("FR1", "1970-01-01", "2010-06-01", "2012-03-01"),
    ("FR2", "1980-06-15", "2015-01-01", "2015-12-31"),
];

fn fixture(by_year: bool) -> Fixture {
    let mut fixture = Fixture::new(
        &SAMPLE,
        &["married", "divorced", "children", "emigrated", "days_abroad"],
    );
    fixture
        .text_file(
            "MarriageHistoryFile",
            "marriage.csv",
            "FINREGISTRYID,Current_marital_status,Starting_date,Ending_day\n\
             FR1,4,2011-02-01,2011-10-01\n\
             FR1,1,2010-07-01,\n",
        )
        .text_file(
            "PedigreeFile",
            "pedigree.tsv",
            "ID\tMOTHER_ID\tFATHER_ID\tBirth_Date\n\
             C1\tFR1\tFR9\t2012-02-01\n\
             C2\tX1\tFR1\t2012-05-01\n",
        )
        .text_file(
            "EmigrationFile",
            "emigration.csv",
            "FINREGISTRYID,Departure_date,Return_date\nFR2,2015-12-01,\n",
        )
        .set("ByYear", if by_year { "T" } else { "F" });
    fixture
}

#[test]
fn test_one_row_per_follow_up_year() -> regmatrix::Result<()> {
    let output = fixture(true).run()?;
    assert_eq!(output.len(), 4);
    assert_eq!(output.column("FINREGISTRYID"), vec!["FR1", "FR1", "FR1", "FR2"]);
    assert_eq!(output.column("year"), vec!["2010", "2011", "2012", "2015"]);
    assert_eq!(output.header[1], "year");
    Ok(())
}

#[test]
fn test_yearly_events_land_in_their_year() -> regmatrix::Result<()> {
    let output = fixture(true).run()?;
    assert_eq!(output.column("married"), vec!["0", "1", "0", "0"]);
    assert_eq!(output.column("divorced"), vec!["0", "1", "0", "0"]);
    assert_eq!(output.column("children"), vec!["0", "0", "1", "0"]);
    assert_eq!(output.column("emigrated"), vec!["0", "0", "0", "1"]);
    assert_eq!(output.column("days_abroad"), vec!["0", "0", "0", "31"]);
    Ok(())
}

#[test]
fn test_aggregate_rows_cover_whole_window() -> regmatrix::Result<()> {
    let output = fixture(false).run()?;
    assert_eq!(output.len(), 2);
    assert!(!output.has_column("year"));
    assert_eq!(output.column("married"), vec!["1", "0"]);
    assert_eq!(output.column("divorced"), vec!["1", "0"]);
    assert_eq!(output.column("children"), vec!["1", "0"]);
    assert_eq!(output.column("days_abroad"), vec!["0", "31"]);
    Ok(())
}

#[test]
fn test_divorce_after_follow_up_is_dropped() -> regmatrix::Result<()> {
    let mut fixture = Fixture::new(&SAMPLE[..1], &["married", "divorced"]);
    fixture
        .text_file(
            "MarriageHistoryFile",
            "marriage.csv",
            "FINREGISTRYID,Current_marital_status,Starting_date,Ending_day\n\
             FR1,4,2011-02-01,2013-05-01\n",
        )
        .set("ByYear", "T");
    let output = fixture.run()?;

    // the marriage is recorded but 2013 has no row for the divorce
    assert_eq!(output.column("year"), vec!["2010", "2011", "2012"]);
    assert_eq!(output.column("married"), vec!["0", "1", "1"]);
    assert_eq!(output.column("divorced"), vec!["0", "0", "0"]);
    Ok(())
}
