use regmatrix::accumulate::SES;

use crate::utils::Fixture;

const SAMPLE: [crate::utils::SampleRow<'static>; 3] = [
    ("FR1", "1970-01-01", "2010-01-01", "2012-12-31"),
    ("FR2", "1980-06-15", "1995-01-01", "2000-12-31"),
    ("FR3", "1975-03-03", "2010-01-01", "2012-12-31"),
];

const SES_FILE: &str = "FINREGISTRYID,vuosi,psose,sose\n\
                        FR1,2011,,na\n\
                        FR2,1989,91,\n\
                        FR2,1996,,60\n\
                        FR2,1999,,60\n";

fn ses_fixture() -> Fixture {
    let mut fixture = Fixture::new(&SAMPLE, &["ses"]);
    fixture.text_file("SESFile", "ses.csv", SES_FILE);
    fixture
}

#[test]
fn test_backfill_keeps_first_successful_source() -> regmatrix::Result<()> {
    let mut fixture = ses_fixture();
    fixture.latin1_file(
        "SocialAssistanceFile",
        "assistance.csv",
        "TNRO;TILASTOVUOSI;SOSIOEKONOMINEN_ASEMA\nFR1;2011;31\n",
    );
    fixture.latin1_file(
        "BirthFile",
        "birth.csv",
        "MOTHER_FINREGISTRYID;CHILD_BIRTHDAY;SOSIOEKONOMINEN_ASEMA\n\
         FR1;2012-05-05;60\n\
         FR3;2011-02-02;na\n",
    );
    fixture.set("OutputAge", "T");
    let output = fixture.run()?;

    assert_eq!(output.column("ses_upperlevel"), vec!["1", "0", "0"]);
    assert_eq!(output.column("ses_students"), vec!["0", "1", "0"]);
    assert_eq!(output.column("ses_missing"), vec!["0", "0", "1"]);
    // onset stays at the first year of an unchanged status
    assert_eq!(output.column("ses_OnsetAge"), vec!["41.03", "15.56", ""]);
    Ok(())
}

#[test]
fn test_one_hot_emits_full_domain() -> regmatrix::Result<()> {
    let output = ses_fixture().run()?;
    for column in SES.columns() {
        assert!(output.has_column(column), "{column} missing");
    }
    assert_eq!(output.column("ses_self_employed"), vec!["0", "0", "0"]);
    assert_eq!(output.column("ses_missing"), vec!["1", "0", "1"]);
    assert!(!output.has_column("ses_OnsetAge"));
    Ok(())
}

#[test]
fn test_fallback_without_status_column_is_skipped() -> regmatrix::Result<()> {
    let mut fixture = ses_fixture();
    fixture.latin1_file(
        "SocialAssistanceFile",
        "assistance.csv",
        "TNRO;TILASTOVUOSI;PERUS_TOIMEENTULOTUKI_EUR\nFR1;2011;10\n",
    );
    let output = fixture.run()?;
    assert_eq!(output.column("ses_missing"), vec!["1", "0", "1"]);
    Ok(())
}
