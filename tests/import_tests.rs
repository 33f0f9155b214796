use pert_estimator::{ImportError, load_candidates_from_csv, parse_candidates_str};
use std::io::Write;
use tempfile::NamedTempFile;

const AZURE_EXPORT: &str = "\
ID,Work Item Type,Title,Assigned To,State,Tags,Area Path
101,User Story,Login page,Jane Doe <jane@x.com>,Active,ui; auth,Web
102,Bug,,Sam Lee <sam@x.com>,New,,Web
103,Task,\"Export, with comma\",,,backend,Api
104,Task,   ,Ann,Closed,,Api
105,Feature,\"Quote \"\"heavy\"\" title\",Ann,Resolved,planning;q3,Web
";

#[test]
fn rows_missing_title_are_filtered() {
    let report = parse_candidates_str(AZURE_EXPORT).unwrap();
    assert_eq!(report.rows_read, 5);
    assert_eq!(report.candidates.len(), 3);
    assert_eq!(report.dropped, 2);
    let ids: Vec<&str> = report
        .candidates
        .iter()
        .map(|c| c.external_id.as_str())
        .collect();
    assert_eq!(ids, vec!["101", "103", "105"]);
}

#[test]
fn rows_missing_id_are_filtered() {
    let csv = "ID,Title\n,Orphan title\n  ,Blank id\n7,Kept\n";
    let report = parse_candidates_str(csv).unwrap();
    assert_eq!(report.candidates.len(), 1);
    assert_eq!(report.candidates[0].title, "Kept");
}

#[test]
fn fields_are_normalized_at_the_boundary() {
    let report = parse_candidates_str(AZURE_EXPORT).unwrap();
    let login = &report.candidates[0];
    assert_eq!(login.work_item_type, "User Story");
    assert_eq!(login.assigned_to, "Jane Doe");
    assert_eq!(login.state, "Active");
    assert_eq!(login.tags, "ui; auth");
    assert_eq!(login.tag_list(), vec!["ui", "auth"]);

    let export = &report.candidates[1];
    assert_eq!(export.title, "Export, with comma");
    assert_eq!(export.assigned_to, "Unassigned");
    assert_eq!(export.state, "Unknown");
    assert_eq!(export.tags, "backend");

    let quoted = &report.candidates[2];
    assert_eq!(quoted.title, "Quote \"heavy\" title");
    assert_eq!(quoted.assigned_to, "Ann");
}

#[test]
fn missing_optional_columns_use_defaults() {
    let report = parse_candidates_str("title,id\nOnly required,9\n").unwrap();
    let candidate = &report.candidates[0];
    assert_eq!(candidate.external_id, "9");
    assert_eq!(candidate.title, "Only required");
    assert_eq!(candidate.work_item_type, "");
    assert_eq!(candidate.assigned_to, "Unassigned");
    assert_eq!(candidate.state, "Unknown");
    assert_eq!(candidate.tags, "");
}

#[test]
fn state_values_pass_through_verbatim() {
    let report = parse_candidates_str("ID,Title,State\n1,A,in review \n").unwrap();
    assert_eq!(report.candidates[0].state, "in review ");
}

#[test]
fn header_only_file_yields_no_candidates() {
    let report = parse_candidates_str("ID,Title,State\n").unwrap();
    assert!(report.candidates.is_empty());
    assert_eq!(report.rows_read, 0);
}

#[test]
fn empty_input_is_an_import_error() {
    let err = parse_candidates_str("").unwrap_err();
    assert!(matches!(err, ImportError::MissingHeader));
}

#[test]
fn invalid_utf8_is_an_import_error() {
    let bytes: &[u8] = b"ID,Title\n1,\xff\xfe broken\n";
    let err = pert_estimator::parse_candidates(bytes).unwrap_err();
    assert!(matches!(err, ImportError::Csv(_)));
}

#[test]
fn loads_candidates_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(AZURE_EXPORT.as_bytes()).unwrap();
    let report = load_candidates_from_csv(file.path()).unwrap();
    assert_eq!(report.candidates.len(), 3);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_candidates_from_csv(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, ImportError::Io(_)));
}
