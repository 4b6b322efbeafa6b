use crate::utils::Fixture;

const SAMPLE: [crate::utils::SampleRow<'static>; 2] = [
    ("FR1", "1970-01-01", "2010-01-01", "2012-12-31"),
    ("FR2", "1980-06-15", "2010-01-01", "2012-12-31"),
];

#[test]
fn test_education_keeps_highest_degree_with_its_field() -> regmatrix::Result<()> {
    let mut fixture = Fixture::new(&SAMPLE, &["education_level", "education_field"]);
    fixture
        .text_file(
            "EducationFile",
            "education.csv",
            "FINREGISTRYID,vuosi,kaste_t2,iscfi2013\n\
             FR1,2012,3,0411\n\
             FR1,2010,5,0613\n\
             FR1,2011,7,0913\n\
             FR2,2011,6,\n",
        )
        .set("OutputAge", "T");
    let output = fixture.run()?;

    // the later, lower degree neither lowers the level nor moves the field
    assert_eq!(output.column("education_level"), vec!["7", "6"]);
    assert_eq!(output.column("edufield_health_welfare"), vec!["1", "0"]);
    assert_eq!(output.column("edufield_ict"), vec!["0", "0"]);
    assert_eq!(output.column("edufield_business_law"), vec!["0", "0"]);
    assert_eq!(output.column("edufield_missing"), vec!["0", "1"]);
    assert_eq!(output.column("education_level_OnsetAge"), vec!["41.03", "30.57"]);
    Ok(())
}

fn care_fixture(by_year: bool) -> Fixture {
    let mut fixture = Fixture::new(
        &SAMPLE,
        &["received_long_term_care", "institutional_care", "long_term_care_days"],
    );
    fixture
        .latin1_file(
            "LongTermCareFile",
            "care.csv",
            "TNRO;TUPVA;LPVM;PALA;KUNTA\n\
             FR1;2009-12-22;2010-01-10;21;Jyväskylä\n\
             FR1;2012-12-01;;32;Jyväskylä\n\
             FR2;2005-01-01;2009-12-31;31;Åbo\n",
        )
        .set("ByYear", if by_year { "T" } else { "F" })
        .set("OutputAge", "T");
    fixture
}

#[test]
fn test_long_term_care_days_within_follow_up() -> regmatrix::Result<()> {
    let output = care_fixture(false).run()?;

    // 10 days of home care in 2010 and 31 days of open institutional care
    assert_eq!(output.column("long_term_care_days"), vec!["41", "0"]);
    assert_eq!(output.column("received_long_term_care"), vec!["1", "0"]);
    assert_eq!(output.column("institutional_care"), vec!["1", "0"]);
    assert_eq!(output.column("received_long_term_care_OnsetAge"), vec!["40.03", ""]);
    assert_eq!(output.column("institutional_care_OnsetAge"), vec!["42.95", ""]);
    Ok(())
}

#[test]
fn test_yearly_long_term_care_days() -> regmatrix::Result<()> {
    let output = care_fixture(true).run()?;
    assert_eq!(
        output.column("long_term_care_days"),
        vec!["10", "0", "31", "0", "0", "0"]
    );
    assert_eq!(
        output.column("institutional_care"),
        vec!["0", "0", "1", "0", "0", "0"]
    );
    Ok(())
}

#[test]
fn test_delivery_indicators() -> regmatrix::Result<()> {
    let mut fixture = Fixture::new(
        &SAMPLE,
        &[
            "gave_birth",
            "preterm_birth",
            "caesarean_section",
            "smoked_during_pregnancy",
        ],
    );
    fixture
        .latin1_file(
            "BirthFile",
            "birth.csv",
            "MOTHER_FINREGISTRYID;CHILD_BIRTHDAY;DURATION_WEEKS;CAESAREAN;SMOKING\n\
             FR1;2011-04-04;36;0;1\n\
             FR1;2012-02-02;40;1;3\n\
             FR2;2009-05-05;30;1;2\n",
        )
        .set("OutputAge", "T");
    let output = fixture.run()?;

    assert_eq!(output.column("gave_birth"), vec!["1", "0"]);
    assert_eq!(output.column("preterm_birth"), vec!["1", "0"]);
    assert_eq!(output.column("caesarean_section"), vec!["1", "0"]);
    assert_eq!(output.column("smoked_during_pregnancy"), vec!["1", "0"]);
    assert_eq!(output.column("gave_birth_OnsetAge"), vec!["41.28", ""]);
    assert_eq!(output.column("caesarean_section_OnsetAge"), vec!["42.12", ""]);
    Ok(())
}
