use super::common::*;
use crate::workflows::enrollment::domain::{ApplicantRecord, SubjectScores};
use crate::workflows::enrollment::export::applicants_to_csv;

#[test]
fn empty_list_still_has_header() {
    let csv = applicants_to_csv(&[]).expect("csv renders");
    assert_eq!(
        csv,
        "name,mathematics,science,social_studies,indonesian,distance\n"
    );
}

#[test]
fn rows_follow_registration_order() {
    let records = vec![
        ApplicantRecord::scored(name("Sari"), SubjectScores::new(80, 70, 70, 60), Some(2.5)),
        ApplicantRecord::scored(name("Budi, Jr."), SubjectScores::new(1, 2, 3, 4), None),
        ApplicantRecord::unscored(name("Cici")),
    ];

    let csv = applicants_to_csv(&records).expect("csv renders");
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "Sari,80,70,70,60,2.5");
    assert_eq!(lines[2], "\"Budi, Jr.\",1,2,3,4,");
    assert_eq!(lines[3], "Cici,,,,,");
}
