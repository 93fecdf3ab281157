use incident_protocol::Dimension;
use incident_store::{load_incidents, load_relations, RecordStore, StoreError};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

#[test]
fn loads_csv_and_json_tables_into_store() {
    let temp = TempDir::new().expect("tempdir");
    let incidents_path = temp.path().join("incidents.csv");
    let relations_path = temp.path().join("relations.json");
    fs::write(
        &incidents_path,
        "Site,Time frame,Group,Category,Sub Cat,Count,Hours\n\
         Pune,Morning,Ops,Network,DNS,2,3\n\
         Pune,Evening,Dev,Network,Proxy,1,9\n\
         Chennai,Morning,Ops,Storage,Disk,4,1.5\n",
    )
    .expect("write incidents");
    fs::write(
        &relations_path,
        r#"[{"Source":"Network","Target":"DNS"},{"Source":"Storage","Target":"Storage"}]"#,
    )
    .expect("write relations");

    let incidents = load_incidents(&incidents_path).expect("incidents");
    let relations = load_relations(&relations_path).expect("relations");
    let store = RecordStore::new(incidents, relations);

    assert_eq!(store.incident_count(), 3);
    assert_eq!(store.relation_count(), 2);
    assert_eq!(store.domain(Dimension::Category), vec!["Network", "Storage"]);
    assert_eq!(store.domain(Dimension::TimeFrame), vec!["Evening", "Morning"]);
}

#[test]
fn missing_file_reports_path() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("absent.csv");

    let err = load_incidents(&path).unwrap_err();
    match err {
        StoreError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}
