//! Durability tests: the JSON file backend, alone and behind the
//! caching middleware.

use serde_json::{json, Value};
use shelfdb::json::JsonStorage;
use shelfdb::prelude::*;

fn fields(value: Value) -> Fields {
    value.as_object().cloned().unwrap()
}

#[test]
fn state_survives_a_database_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");

    {
        let db = ShelfDb::new(JsonStorage::open(&path).unwrap());
        db.insert(fields(json!({"name": "ada", "age": 36}))).unwrap();
        db.table("pets")
            .insert(fields(json!({"name": "rex"})))
            .unwrap();
        db.close().unwrap();
    }

    let db = ShelfDb::new(JsonStorage::open(&path).unwrap());
    assert_eq!(db.len().unwrap(), 1);
    assert!(db.contains(&field("name").eq("ada")).unwrap());
    assert_eq!(db.table("pets").len().unwrap(), 1);

    // The next id continues from the persisted state.
    assert_eq!(db.insert(fields(json!({"name": "grace"}))).unwrap(), 2);
}

#[test]
fn file_holds_plain_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");

    let db = ShelfDb::new(JsonStorage::open(&path).unwrap());
    db.insert(fields(json!({"name": "ada"}))).unwrap();
    db.close().unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let parsed: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed[DEFAULT_TABLE]["1"]["name"], json!("ada"));
}

#[test]
fn middleware_buffers_writes_until_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");

    let storage = CachingMiddleware::with_write_cache_size(
        JsonStorage::open(&path).unwrap(),
        1000,
    );
    let db = ShelfDb::new(storage);
    db.insert(fields(json!({"n": 1}))).unwrap();
    db.insert(fields(json!({"n": 2}))).unwrap();

    // Nothing has reached the file, but reads see the buffered state.
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    assert_eq!(db.len().unwrap(), 2);

    // close() flushes the buffer through to disk.
    db.close().unwrap();
    let db = ShelfDb::new(JsonStorage::open(&path).unwrap());
    assert_eq!(db.len().unwrap(), 2);
}

#[test]
fn middleware_flushes_once_threshold_is_reached() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");

    let storage =
        CachingMiddleware::with_write_cache_size(JsonStorage::open(&path).unwrap(), 3);
    let db = ShelfDb::new(storage);

    // On a fresh file the first insert buffers two storage writes: one
    // persisting the newly created table entry and one for the document.
    db.insert(fields(json!({"n": 1}))).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

    // The second insert's write is the third, reaching the threshold.
    db.insert(fields(json!({"n": 2}))).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    let parsed: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed[DEFAULT_TABLE].as_object().unwrap().len(), 2);
}

#[test]
fn default_middleware_flushes_every_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");

    let db = ShelfDb::new(CachingMiddleware::new(JsonStorage::open(&path).unwrap()));
    db.insert(fields(json!({"n": 1}))).unwrap();

    let parsed: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed[DEFAULT_TABLE]["1"]["n"], json!(1));
}
