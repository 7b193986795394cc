use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::common::*;
use crate::workflows::applications::csv_store::COLUMNS;
use crate::workflows::applications::{
    ApplicationStatus, CsvListingStore, ListingStore, StoreError,
};
use crate::workflows::listings::ListingId;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "jobhound-csv-{name}-{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    dir.join("output").join("main.csv")
}

fn cleanup(path: &Path) {
    if let Some(dir) = path.parent().and_then(|output| output.parent()) {
        let _ = fs::remove_dir_all(dir);
    }
}

#[test]
fn missing_file_loads_as_empty() {
    let path = scratch("missing");
    let store = CsvListingStore::new(&path);
    assert!(store.load().expect("load").is_empty());
}

#[test]
fn appended_listings_load_back_as_pending() {
    let path = scratch("append");
    let store = CsvListingStore::new(&path);
    let first = listing("https://jobs.example.com/acme/1", 0);
    let second = listing("https://jobs.example.com/acme/2", 3);

    store.append(&first).expect("append first");
    store.append(&second).expect("append second");

    let raw = fs::read_to_string(&path).expect("storage file");
    assert_eq!(raw.lines().next(), Some(COLUMNS.join(",").as_str()));

    let rows = store.load().expect("load");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].listing, first);
    assert_eq!(rows[1].listing, second);
    assert!(rows.iter().all(|row| row.is_pending()));
    cleanup(&path);
}

#[test]
fn duplicate_append_is_a_conflict() {
    let path = scratch("conflict");
    let store = CsvListingStore::new(&path);
    let job = listing("job-1", 0);
    store.append(&job).expect("append");

    match store.append(&job) {
        Err(StoreError::Conflict(id)) => assert_eq!(id, job.id),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(store.load().expect("load").len(), 1);
    cleanup(&path);
}

#[test]
fn update_rewrites_only_the_application_state() {
    let path = scratch("update");
    let store = CsvListingStore::new(&path);
    store.append(&listing("job-1", 0)).expect("append");
    store.append(&listing("job-2", 1)).expect("append");

    let mut record = store.load().expect("load")[1].application.clone();
    record
        .mark_failed(discovered(60), "timeout")
        .expect("pending -> failed");
    store.update(&record).expect("update");

    let rows = store.load().expect("reload");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].application.status, ApplicationStatus::Pending);
    assert_eq!(rows[1].application.status, ApplicationStatus::Failed);
    assert_eq!(rows[1].application.last_attempt_at, Some(discovered(60)));
    assert_eq!(rows[1].application.failure_reason.as_deref(), Some("timeout"));
    assert_eq!(rows[1].listing, listing("job-2", 1));
    cleanup(&path);
}

#[test]
fn update_of_unknown_listing_is_not_found() {
    let path = scratch("not-found");
    let store = CsvListingStore::new(&path);
    store.append(&listing("job-1", 0)).expect("append");

    let mut record = crate::workflows::applications::ApplicationRecord::pending(
        ListingId::from("job-404"),
    );
    record.mark_applied(discovered(5)).expect("pending -> applied");

    assert!(matches!(
        store.update(&record),
        Err(StoreError::NotFound(id)) if id.as_str() == "job-404"
    ));
    cleanup(&path);
}

#[test]
fn malformed_rows_are_skipped_but_preserved() {
    let path = scratch("malformed");
    let store = CsvListingStore::new(&path);
    store.append(&listing("job-1", 0)).expect("append");
    {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .expect("open storage");
        writeln!(file, "broken-row,not enough columns").expect("write");
    }

    let rows = store.load().expect("load");
    assert_eq!(rows.len(), 1);

    let mut record = rows[0].application.clone();
    record.mark_applied(discovered(10)).expect("pending -> applied");
    store.update(&record).expect("update");

    let raw = fs::read_to_string(&path).expect("storage file");
    assert!(raw.contains("broken-row,not enough columns"));
    assert_eq!(
        store.load().expect("reload")[0].application.status,
        ApplicationStatus::Applied
    );
    cleanup(&path);
}

#[test]
fn undecodable_row_does_not_block_the_store() {
    let path = scratch("invalid-utf8");
    let store = CsvListingStore::new(&path);
    store.append(&listing("job-1", 0)).expect("append");
    {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .expect("open storage");
        file.write_all(b"bad\xff\xferow,x\n").expect("write");
    }

    let rows = store.load().expect("load");
    assert_eq!(rows.len(), 1);
    store.append(&listing("job-2", 1)).expect("append after bad row");

    let mut record = store.load().expect("reload")[0].application.clone();
    record.mark_applied(discovered(10)).expect("pending -> applied");
    store.update(&record).expect("update");

    let raw = fs::read(&path).expect("storage file");
    assert!(raw
        .windows(b"bad\xff\xferow,x".len())
        .any(|window| window == b"bad\xff\xferow,x"));
    let rows = store.load().expect("load after update");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].application.status, ApplicationStatus::Applied);
    cleanup(&path);
}

#[test]
fn foreign_header_is_rejected_without_writing() {
    let path = scratch("header");
    let store = CsvListingStore::new(&path);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
    let legacy = "company,title,team,location,hours,wfh,min_salary,max_salary,desc,qual,posting,apply,scraped,applied\n\
                  Acme,Engineer,,,,,,,,,,,,\n";
    fs::write(&path, legacy).expect("seed");

    match store.append(&listing("job-1", 0)) {
        Err(StoreError::HeaderMismatch { found, .. }) => {
            assert!(found.starts_with("company,title"));
        }
        other => panic!("expected header mismatch, got {other:?}"),
    }
    assert!(matches!(
        store.load(),
        Err(StoreError::HeaderMismatch { .. })
    ));
    assert_eq!(fs::read_to_string(&path).expect("storage file"), legacy);
    cleanup(&path);
}

#[test]
fn empty_file_gets_a_header_on_first_append() {
    let path = scratch("empty");
    let store = CsvListingStore::new(&path);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
    fs::write(&path, "").expect("seed");

    assert!(store.load().expect("load").is_empty());
    store.append(&listing("job-1", 0)).expect("append");
    let raw = fs::read_to_string(&path).expect("storage file");
    assert_eq!(raw.lines().next(), Some(COLUMNS.join(",").as_str()));
    cleanup(&path);
}
