//! Tests for SharedFileTable
//!
//! Two handles over one directory stand in for the two cooperating processes.

use shared::ProcessRole;
use tempfile::TempDir;

use crate::error::ReconcilerError;
use crate::services::shared_file_table::SharedFileTable;
use crate::traits::{KeyValueTable, TableKey};

fn open_pair(dir: &TempDir) -> (SharedFileTable, SharedFileTable) {
    let roster = SharedFileTable::open(dir.path(), "flightkey").unwrap();
    let logbook = SharedFileTable::open(dir.path(), "flightkey").unwrap();
    (roster, logbook)
}

#[test]
fn test_open_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("group").join("container");

    let table = SharedFileTable::open(&nested, "flightkey").unwrap();
    assert!(nested.is_dir());
    assert_eq!(table.dir(), nested.as_path());
    assert!(table.is_shared());
}

#[test]
fn test_open_fails_when_path_is_a_file() {
    let dir = TempDir::new().unwrap();
    let file_path = dir.path().join("not_a_dir");
    std::fs::write(&file_path, b"x").unwrap();

    let result = SharedFileTable::open(&file_path, "flightkey");
    assert!(matches!(result, Err(ReconcilerError::StorageUnavailable { .. })));
}

#[test]
fn test_open_rejects_namespace_with_path_components() {
    let dir = TempDir::new().unwrap();
    for namespace in ["../outside", "nested/ns", ""] {
        let result = SharedFileTable::open(dir.path(), namespace);
        assert!(matches!(result, Err(ReconcilerError::StorageUnavailable { .. })));
    }
    assert!(!dir.path().parent().unwrap().join("outside.composite_map.json").exists());
}

#[test]
fn test_writes_are_visible_to_other_handle() {
    let dir = TempDir::new().unwrap();
    let (roster, logbook) = open_pair(&dir);

    assert!(logbook.get(TableKey::CompositeMap).unwrap().is_none());
    roster.put(TableKey::CompositeMap, br#"{"a":"b"}"#).unwrap();
    assert_eq!(
        logbook.get(TableKey::CompositeMap).unwrap(),
        Some(br#"{"a":"b"}"#.to_vec())
    );

    logbook.put(TableKey::CompositeMap, b"{}").unwrap();
    assert_eq!(roster.get(TableKey::CompositeMap).unwrap(), Some(b"{}".to_vec()));
}

#[test]
fn test_file_naming_and_no_leftover_temp_files() {
    let dir = TempDir::new().unwrap();
    let table = SharedFileTable::open(dir.path(), "crew").unwrap();

    table.put(TableKey::RosterMap, b"{}").unwrap();
    table.put(TableKey::RosterMap, b"{\"u\":\"k\"}").unwrap();

    let expected = dir.path().join("crew.roster_map.json");
    assert_eq!(table.path_for(TableKey::RosterMap), expected);
    assert!(expected.is_file());

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["crew.roster_map.json".to_string()]);
}

#[test]
fn test_namespaces_do_not_collide() {
    let dir = TempDir::new().unwrap();
    let first = SharedFileTable::open(dir.path(), "one").unwrap();
    let second = SharedFileTable::open(dir.path(), "two").unwrap();

    first.put(TableKey::CreatedSet(ProcessRole::Roster), b"[]").unwrap();
    assert!(second.get(TableKey::CreatedSet(ProcessRole::Roster)).unwrap().is_none());
}

#[test]
fn test_remove_missing_and_existing() {
    let dir = TempDir::new().unwrap();
    let (roster, logbook) = open_pair(&dir);

    roster.remove(TableKey::CreatedSet(ProcessRole::Roster)).unwrap();
    roster.put(TableKey::CreatedSet(ProcessRole::Roster), b"[]").unwrap();
    logbook.remove(TableKey::CreatedSet(ProcessRole::Roster)).unwrap();
    assert!(roster.get(TableKey::CreatedSet(ProcessRole::Roster)).unwrap().is_none());
}
