//! Integration tests for the CSV series store

mod common;

use common::{create_observation, create_series};
use pulsewatch::storage::{CorruptRecordPolicy, CsvSeriesStore, SeriesStore, StoreError, HEADER};
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> CsvSeriesStore {
    CsvSeriesStore::new(dir.path().join("metrics_history.csv"))
}

#[test]
fn test_missing_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert!(store.load_all().unwrap().is_empty());
    assert!(!store.path().exists());
}

#[test]
fn test_append_then_load_preserves_order() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    let series = create_series(&[1000, 1005, 1010]);

    for observation in &series {
        store.append(observation).unwrap();
    }

    assert_eq!(store.load_all().unwrap(), series);
}

#[test]
fn test_header_written_once() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);

    store.append(&create_observation(0, 1000)).unwrap();
    store.append(&create_observation(1, 1010)).unwrap();

    let text = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(text.matches(HEADER).count(), 1);
    assert!(text.starts_with(HEADER));
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn test_append_never_rewrites_existing_lines() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);

    store.append(&create_observation(0, 1000)).unwrap();
    let before = std::fs::read_to_string(store.path()).unwrap();

    store.append(&create_observation(1, 1010)).unwrap();
    let after = std::fs::read_to_string(store.path()).unwrap();

    assert!(after.starts_with(&before));
}

#[test]
fn test_load_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    store.append(&create_observation(0, 1000)).unwrap();

    assert_eq!(store.load_all().unwrap(), store.load_all().unwrap());
}

#[test]
fn test_append_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let mut store = CsvSeriesStore::new(dir.path().join("data/nested/series.csv"));

    store.append(&create_observation(0, 1000)).unwrap();
    assert_eq!(store.load_all().unwrap().len(), 1);
}

#[test]
fn test_append_after_missing_trailing_newline() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metrics_history.csv");
    std::fs::write(&path, format!("{HEADER}\n2024-01-01,1000,50,5000,200")).unwrap();

    let mut store = CsvSeriesStore::new(&path);
    store.append(&create_observation(1, 1010)).unwrap();

    let loaded = store.load_all().unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[1].followers, 1010);
}

#[test]
fn test_first_append_to_blank_file_is_readable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metrics_history.csv");
    std::fs::write(&path, "\n").unwrap();

    let mut store = CsvSeriesStore::new(&path);
    store.append(&create_observation(0, 1000)).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches(HEADER).count(), 1);
    assert_eq!(store.load_all().unwrap(), vec![create_observation(0, 1000)]);
}

fn write_corrupt_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("metrics_history.csv");
    let text = format!(
        "{HEADER}\n2024-01-01,1000,50,5000,200\n2024-01-02,lots,50,5100,210\n2024-01-03,1010,50,5200,220\n"
    );
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_corrupt_record_aborts_by_default() {
    let dir = TempDir::new().unwrap();
    let store = CsvSeriesStore::new(write_corrupt_file(&dir));

    match store.load_all() {
        Err(StoreError::CorruptRecord { line, .. }) => assert_eq!(line, 3),
        other => panic!("Expected corrupt record error, got: {other:?}"),
    }
}

#[test]
fn test_corrupt_record_skipped_with_skip_policy() {
    let dir = TempDir::new().unwrap();
    let store =
        CsvSeriesStore::new(write_corrupt_file(&dir)).with_policy(CorruptRecordPolicy::Skip);

    let report = store.load_report().unwrap();
    assert_eq!(report.skipped_lines, vec![3]);

    let followers: Vec<u64> = report.observations.iter().map(|o| o.followers).collect();
    assert_eq!(followers, vec![1000, 1010]);

    // Skipping is deterministic
    assert_eq!(store.load_all().unwrap(), report.observations);
}
