//! End-to-end behavior of `LogStore` over both storage layouts.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use logbook::{EntryType, LogStore, LogStoreConfig, LogbookError, StorageMode};
use serde_json::{Value, json};
use tempfile::TempDir;
use test_case::test_case;

#[derive(Debug, Clone, Copy)]
enum Layout {
    File,
    Directory,
}

/// Provisions a storage location of the requested layout.
fn provision(layout: Layout) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = match layout {
        Layout::File => {
            let path = temp_dir.path().join("logs.json");
            fs::write(&path, "").expect("create log file");
            path
        }
        Layout::Directory => {
            let path = temp_dir.path().join("logs");
            fs::create_dir(&path).expect("create log dir");
            path
        }
    };
    (path, temp_dir)
}

fn quiet(path: &Path) -> LogStoreConfig {
    LogStoreConfig::new(path).with_stdout(false)
}

/// Counts entries as they exist on disk, independent of any store.
fn on_disk_count(path: &Path) -> usize {
    if path.is_dir() {
        fs::read_dir(path).expect("list dir").count()
    } else {
        let raw = fs::read_to_string(path).expect("read log file");
        let records: Vec<Value> = serde_json::from_str(&raw).expect("parse log file");
        records.len()
    }
}

fn on_disk_records(path: &Path) -> Vec<Value> {
    if path.is_dir() {
        let mut names: Vec<PathBuf> = fs::read_dir(path)
            .expect("list dir")
            .filter_map(Result::ok)
            .map(|e| e.path())
            .collect();
        names.sort();
        names
            .iter()
            .map(|p| serde_json::from_str(&fs::read_to_string(p).expect("read entry")).expect("parse entry"))
            .collect()
    } else {
        serde_json::from_str(&fs::read_to_string(path).expect("read log file")).expect("parse log file")
    }
}

#[test]
fn directory_store_keeps_last_25_of_100_warnings() {
    let (path, _dir) = provision(Layout::Directory);
    let mut store = LogStore::new(quiet(&path).with_max_entries(25)).expect("create store");

    for i in 0..100 {
        store.log_warning(format!("warning {i}"), Some(json!(i))).expect("append");
        assert!(store.len() <= 25);
    }

    assert_eq!(store.len(), 25);
    assert!(store.iter().all(|e| e.entry_type() == EntryType::Warning));
    assert_eq!(store.entries()[0].payload(), Some(&json!(75)));
    assert_eq!(on_disk_count(&path), 25);
}

#[test_case(Layout::File ; "aggregate file")]
#[test_case(Layout::Directory ; "directory")]
fn count_boundary_drops_only_the_oldest(layout: Layout) {
    let (path, _dir) = provision(layout);
    let mut store = LogStore::new(quiet(&path).with_max_entries(3)).expect("create store");

    for i in 0..4 {
        store.log_info(format!("m{i}"), None).expect("append");
    }

    let messages: Vec<_> = store.iter().filter_map(|e| e.message().cloned()).collect();
    assert_eq!(messages, vec![json!("m1"), json!("m2"), json!("m3")]);
    assert_eq!(on_disk_count(&path), 3);
}

#[test_case(Layout::File ; "aggregate file")]
#[test_case(Layout::Directory ; "directory")]
fn aged_out_entries_are_pruned_on_next_write(layout: Layout) {
    let (path, _dir) = provision(layout);
    let mut store =
        LogStore::new(quiet(&path).with_max_age(Duration::from_millis(500))).expect("create store");

    for i in 0..100 {
        store.log_warning(format!("w{i}"), None).expect("append");
    }
    thread::sleep(Duration::from_millis(700));
    for i in 0..25 {
        store.log_error(format!("e{i}"), None).expect("append");
    }

    assert_eq!(store.len(), 25);
    assert!(store.iter().all(|e| e.entry_type() == EntryType::Error));
    assert_eq!(on_disk_count(&path), 25);
}

#[test_case(Layout::File ; "aggregate file")]
#[test_case(Layout::Directory ; "directory")]
fn absent_fields_never_reach_disk(layout: Layout) {
    let (path, _dir) = provision(layout);
    let mut store = LogStore::new(quiet(&path)).expect("create store");

    store.append(EntryType::Error, None, None).expect("append");
    store.append(EntryType::Info, Some(Value::Null), Some(Value::Null)).expect("append");

    for record in on_disk_records(&path) {
        let obj = record.as_object().expect("record is an object");
        assert!(!obj.contains_key("message"));
        assert!(!obj.contains_key("payload"));
    }

    let mut reloaded = LogStore::open(quiet(&path)).expect("reopen store");
    reloaded.load().expect("load again");
    assert!(reloaded.iter().all(|e| e.message().is_none() && e.payload().is_none()));
}

#[test_case(Layout::File ; "aggregate file")]
#[test_case(Layout::Directory ; "directory")]
fn save_load_round_trip_preserves_fields_and_order(layout: Layout) {
    let (path, _dir) = provision(layout);
    let mut store = LogStore::new(quiet(&path)).expect("create store");

    store
        .append_typed("INFO", Some(json!("Hello, world!")), None)
        .and_then(|s| s.log_info("Goodbye, world!", Some(json!({"x": 3, "y": 5, "z": 7}))))
        .and_then(|s| s.log_warning(json!({"this is not": "a string"}), None))
        .and_then(|s| s.append(EntryType::Error, None, None))
        .and_then(|s| s.log_success("Yippee!", Some(json!("Hooray!"))))
        .expect("append entries");
    let original = store.entries().to_vec();

    let mut reopened = LogStore::new(quiet(&path)).expect("second store");
    for _ in 0..3 {
        reopened.load().and_then(LogStore::save).expect("load/save cycle");
    }

    assert_eq!(reopened.entries(), original.as_slice());
    assert!(reopened.entries().windows(2).all(|w| w[0].date() <= w[1].date()));
}

#[test]
fn second_store_over_same_file_sees_first_store_history() {
    let (path, _dir) = provision(Layout::File);

    let mut first = LogStore::new(quiet(&path)).expect("first store");
    first.log_info("one", None).expect("append");
    first.log_error("two", Some(json!([1, 2]))).expect("append");

    let second = LogStore::open(quiet(&path)).expect("second store");

    assert_eq!(second.mode(), Some(StorageMode::AggregateFile));
    assert_eq!(second.len(), first.len());
    for (a, b) in first.iter().zip(second.iter()) {
        let a = serde_json::to_value(a).expect("serialize");
        let b = serde_json::to_value(b).expect("serialize");
        assert_eq!(a, b);
    }
}

#[test_case(Layout::File ; "aggregate file")]
#[test_case(Layout::Directory ; "directory")]
fn unknown_fields_survive_load_and_save(layout: Layout) {
    let (path, _dir) = provision(layout);
    let record = json!({
        "date": "2026-01-01T00:00:00.123Z",
        "id": "k3j4h5g6",
        "type": "SUCCESS",
        "message": "imported",
        "origin": {"host": "n1"}
    });
    match layout {
        Layout::File => {
            fs::write(&path, serde_json::to_string(&json!([record])).expect("serialize")).expect("seed");
        }
        Layout::Directory => {
            fs::write(path.join("2026-01-01-00-00-00-123-k3j4h5g6"), record.to_string()).expect("seed");
        }
    }

    let mut store = LogStore::open(quiet(&path)).expect("open store");
    store.log_info("new", None).expect("append");

    let records = on_disk_records(&path);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], record);
}

#[test_case(Layout::File ; "aggregate file")]
#[test_case(Layout::Directory ; "directory")]
fn stored_nulls_are_stripped_from_disk_on_save(layout: Layout) {
    let (path, _dir) = provision(layout);
    let record = json!({
        "date": "2026-01-01T00:00:00.123Z",
        "type": "INFO",
        "message": null,
        "payload": null
    });
    match layout {
        Layout::File => {
            fs::write(&path, serde_json::to_string(&json!([record])).expect("serialize")).expect("seed");
        }
        Layout::Directory => {
            fs::write(path.join("2026-01-01-00-00-00-123-k3j4h5g6"), record.to_string()).expect("seed");
        }
    }

    let mut store = LogStore::open(quiet(&path)).expect("open store");
    assert!(store.entries()[0].message().is_none());
    store.save().expect("save");

    let records = on_disk_records(&path);
    assert_eq!(records, vec![json!({"date": "2026-01-01T00:00:00.123Z", "type": "INFO"})]);
}

#[test]
fn corrupted_directory_entry_recovers_to_empty_history() {
    let (path, _dir) = provision(Layout::Directory);
    fs::write(path.join("2026-01-01-00-00-00-000-bad"), "not json").expect("seed corrupt file");

    let mut store = LogStore::open(quiet(&path)).expect("open store recovers");
    assert!(store.is_empty());

    store.log_info("fresh start", None).expect("append");
    assert_eq!(store.len(), 1);
    assert_eq!(on_disk_count(&path), 1);
}

#[test]
fn missing_location_is_reported_not_created() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("never-created");
    let mut store = LogStore::new(quiet(&path)).expect("create store");

    let result = store.log_info("nowhere to go", None);

    assert!(matches!(result, Err(LogbookError::StorageUnavailable { .. })));
    assert!(store.is_empty());
    assert!(!path.exists());
}
