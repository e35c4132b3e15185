// MemDb Persistence Tests
// Save/load/purge merge rules against a real storage file

use std::collections::HashMap;
use std::fs;

use memdb::{Document, MemoryDb, Record};
use tempfile::{tempdir, TempDir};

fn temp_db() -> (MemoryDb, TempDir) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();
    let db = MemoryDb::with_file(dir.path().join("vars.json"));
    (db, dir)
}

fn stored(dir: &TempDir) -> Vec<Record> {
    let raw = fs::read_to_string(dir.path().join("vars.json")).unwrap();
    serde_json::from_str::<Document>(&raw).unwrap().records
}

fn record(key: &str, value: &str) -> Record {
    Record {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[test]
fn test_storage_enabled_only_with_file() {
    let (db, _dir) = temp_db();
    assert!(db.is_persistent_storage_enabled());
    assert!(!MemoryDb::new().is_persistent_storage_enabled());
}

#[test]
fn test_save_and_load() {
    let (db, _dir) = temp_db();
    let key = "/test/dir1/val1";

    db.add(key, Some("Here is the value")).unwrap();
    let status = db.save(key);
    assert!(status.ok, "save failed: {}", status.message);
    assert_eq!(status.message, "Variable is saved");

    db.remove_all();
    assert_eq!(db.select(key), None);

    let status = db.load(false, key);
    assert!(status.ok, "load failed: {}", status.message);
    assert_eq!(status.message, "Variable is loaded");
    assert_eq!(db.select(key), Some("Here is the value".to_string()));
}

#[test]
fn test_save_is_idempotent() {
    let (db, dir) = temp_db();
    db.add("k", Some("v")).unwrap();

    assert!(db.save("k").ok);
    assert!(db.save("k").ok);
    assert_eq!(stored(&dir), vec![record("k", "v")]);
}

#[test]
fn test_save_new_value_appends_record() {
    let (db, dir) = temp_db();
    db.add("k", Some("v1")).unwrap();
    db.save("k");
    db.add("k", Some("v2")).unwrap();
    db.save("k");
    db.add("k", Some("v1")).unwrap();
    db.save("k");

    assert_eq!(stored(&dir), vec![record("k", "v1"), record("k", "v2")]);
}

#[test]
fn test_save_missing_variable() {
    let (db, dir) = temp_db();
    let status = db.save("nope");
    assert!(!status.ok);
    assert_eq!(status.message, "Variable does not exist");
    assert_eq!(fs::read_to_string(dir.path().join("vars.json")).unwrap(), "");
}

#[test]
fn test_save_requires_key() {
    let (db, _dir) = temp_db();
    for key in ["", "   "] {
        let status = db.save(key);
        assert!(!status.ok);
        assert_eq!(status.message, "Key is not specified");
    }
}

#[test]
fn test_override_load() {
    let (db, _dir) = temp_db();
    let key = "/test/dir1/val1";

    db.add(key, Some("Here is the value")).unwrap();
    assert!(db.save(key).ok);

    db.add(key, Some("Changed value")).unwrap();

    let status = db.load(false, key);
    assert!(!status.ok);
    assert_eq!(status.message, "Variable already exist and override is not allowed");
    assert_eq!(db.select(key), Some("Changed value".to_string()));

    let status = db.load(true, key);
    assert!(status.ok, "load failed: {}", status.message);
    assert_eq!(db.select(key), Some("Here is the value".to_string()));
}

#[test]
fn test_load_errors() {
    let (db, _dir) = temp_db();

    let status = db.load(true, "k");
    assert!(!status.ok);
    assert_eq!(status.message, "File is empty");

    db.add("other", Some("x")).unwrap();
    db.save("other");

    let status = db.load(true, "k");
    assert!(!status.ok);
    assert_eq!(status.message, "Variable could not be located in the file");

    assert_eq!(db.load(true, "").message, "Key is not specified");
}

#[test]
fn test_load_uses_first_matching_record() {
    let (db, _dir) = temp_db();
    db.add("k", Some("first")).unwrap();
    db.save("k");
    db.add("k", Some("second")).unwrap();
    db.save("k");

    db.remove_all();
    assert!(db.load(false, "k").ok);
    assert_eq!(db.select("k"), Some("first".to_string()));
}

#[test]
fn test_load_all_round_trip() {
    let (db, _dir) = temp_db();
    let control = [
        ("test1/proc1/val1", "sample value #1"),
        ("test1/proc1/val2", "sample value #2"),
        ("test1/proc2/val1", "sample value #3"),
        ("test2/val1", "sample value #4"),
    ];

    for (k, v) in &control {
        db.add(k, Some(*v)).unwrap();
        assert!(db.save(k).ok);
    }

    db.remove_all();
    assert!(db.list_all().is_empty());

    let status = db.load_all(false);
    assert!(status.ok, "load_all failed: {}", status.message);
    assert_eq!(status.message, "Variables are loaded");

    let loaded: HashMap<String, String> = db.list_all().into_iter().collect();
    let expected: HashMap<String, String> = control
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(loaded, expected);
}

#[test]
fn test_load_all_keeps_memory_without_replace() {
    let (db, _dir) = temp_db();
    db.add("a", Some("disk")).unwrap();
    db.add("b", Some("disk")).unwrap();
    db.save("a");
    db.save("b");

    db.add("a", Some("memory")).unwrap();
    db.remove_dir("b").unwrap();

    let status = db.load_all(false);
    assert!(status.ok);
    assert_eq!(db.select("a"), Some("memory".to_string()));
    assert_eq!(db.select("b"), Some("disk".to_string()));

    assert!(db.load_all(true).ok);
    assert_eq!(db.select("a"), Some("disk".to_string()));
}

#[test]
fn test_load_all_duplicate_keys() {
    let (db, _dir) = temp_db();
    db.add("k", Some("old")).unwrap();
    db.save("k");
    db.add("k", Some("new")).unwrap();
    db.save("k");

    db.remove_all();
    db.load_all(false);
    assert_eq!(db.select("k"), Some("old".to_string()));

    db.load_all(true);
    assert_eq!(db.select("k"), Some("new".to_string()));
}

#[test]
fn test_load_all_empty_file() {
    let (db, _dir) = temp_db();
    let status = db.load_all(true);
    assert!(!status.ok);
    assert_eq!(status.message, "File is empty");
}

#[test]
fn test_load_all_skips_blank_keys() {
    let (db, dir) = temp_db();
    fs::write(
        dir.path().join("vars.json"),
        r#"{"VariableName":[{"key":"","value":"lost"},{"key":"ok","value":"kept"}]}"#,
    )
    .unwrap();

    assert!(db.load_all(true).ok);
    assert_eq!(db.list_all(), vec![("ok".to_string(), "kept".to_string())]);
}

#[test]
fn test_purge() {
    let (db, dir) = temp_db();
    db.add("a", Some("1")).unwrap();
    db.add("b", Some("2")).unwrap();
    db.save("a");
    db.save("b");

    let status = db.purge("a");
    assert!(status.ok, "purge failed: {}", status.message);
    assert_eq!(status.message, "Variable is purged from file");
    assert_eq!(stored(&dir), vec![record("b", "2")]);

    // memory is untouched
    assert_eq!(db.select("a"), Some("1".to_string()));

    let status = db.purge("a");
    assert!(!status.ok);
    assert_eq!(status.message, "Variable did not exist in the file");
}

#[test]
fn test_purge_removes_one_record_at_a_time() {
    let (db, dir) = temp_db();
    db.add("k", Some("v1")).unwrap();
    db.save("k");
    db.add("k", Some("v2")).unwrap();
    db.save("k");

    assert!(db.purge("k").ok);
    assert_eq!(stored(&dir), vec![record("k", "v2")]);
    assert!(db.purge("k").ok);
    assert!(stored(&dir).is_empty());
}

#[test]
fn test_purge_errors() {
    let (db, _dir) = temp_db();
    assert_eq!(db.purge("k").message, "File is empty");
    assert_eq!(db.purge("").message, "Key is not specified");
    assert_eq!(MemoryDb::new().purge("k").message, "Persistent storage is not allowed");
}

#[test]
fn test_persistence_across_instances() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vars.json");

    {
        let db = MemoryDb::with_file(&path);
        db.add("users/alice/name", Some("Alice")).unwrap();
        db.add("users/bob/name", Some("Bob")).unwrap();
        db.save("users/alice/name");
        db.save("users/bob/name");
    }

    let db = MemoryDb::with_file(&path);
    assert!(db.load_all(false).ok);
    assert_eq!(db.list_dir("users").unwrap().len(), 2);
}
