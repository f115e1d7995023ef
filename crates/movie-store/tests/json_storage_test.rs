//! Integration tests for the JSON file backend.
//!
//! These run against real files in a temporary directory.

use std::fs;
use std::path::PathBuf;

use movie_store::{AttributeValue, Collection, JsonStorage, MovieRecord, MovieStorage, Number, StorageError};
use tempfile::TempDir;

const SAMPLE: &str = r#"{
    "Monty Python and the Holy Grail": {
        "rating": 8.2,
        "year": 1975,
        "actors": ["Graham Chapman", "John Cleese"],
        "director": "Terry Gilliam",
        "gross": 5.0
    },
    "The Room": {"rating": 3.6, "year": 2003},
    "Whatever": {"rating": 5.0, "year": 1998, "gross": 0, "studio": "Independent"}
}"#;

fn create_test_db(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("movies.json");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_load_sample_document() {
    let (_dir, path) = create_test_db(SAMPLE);
    let movies = JsonStorage::open(&path).load().unwrap();

    assert_eq!(movies.len(), 3);

    let grail = movies.get("Monty Python and the Holy Grail").unwrap();
    assert_eq!(grail.rating, Number::Float(8.2));
    assert_eq!(
        grail.actors,
        AttributeValue::from(vec!["Graham Chapman".to_string(), "John Cleese".to_string()])
    );
    assert_eq!(grail.gross, AttributeValue::Float(5.0));

    let whatever = movies.get("Whatever").unwrap();
    assert_eq!(whatever.gross, AttributeValue::Integer(0));
    assert_eq!(whatever.extra["studio"], serde_json::json!("Independent"));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = JsonStorage::open(dir.path().join("nope.json")).load().unwrap_err();

    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[test]
fn test_load_invalid_json() {
    let (_dir, path) = create_test_db("{ not json");
    let err = JsonStorage::open(&path).load().unwrap_err();

    assert!(matches!(err, StorageError::Malformed { .. }));
}

#[test]
fn test_load_record_without_year() {
    let (_dir, path) = create_test_db(r#"{"Alien": {"rating": 8.5}}"#);
    let err = JsonStorage::open(&path).load().unwrap_err();

    assert!(matches!(err, StorageError::Malformed { .. }));
}

#[test]
fn test_save_load_round_trip() {
    let (_dir, path) = create_test_db(SAMPLE);
    let storage = JsonStorage::open(&path);

    let original = storage.load().unwrap();
    storage.save(&original).unwrap();
    let reloaded = storage.load().unwrap();

    assert_eq!(original, reloaded);
    assert!(!path.with_file_name("movies.json.tmp").exists());
}

#[test]
fn test_load_keeps_document_order() {
    let (_dir, path) = create_test_db(SAMPLE);
    let movies = JsonStorage::open(&path).load().unwrap();

    let titles: Vec<_> = movies.titles().collect();
    assert_eq!(
        titles,
        vec!["Monty Python and the Holy Grail", "The Room", "Whatever"]
    );
}

#[test]
fn test_save_keeps_integers_and_order() {
    let (_dir, path) = create_test_db(
        r#"{"Zardoz": {"rating": 6, "year": 1974, "gross": 0}, "Alien": {"rating": 8.5, "year": 1979}}"#,
    );
    let storage = JsonStorage::open(&path);
    storage.save(&storage.load().unwrap()).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains(r#""rating": 6,"#));
    assert!(written.contains(r#""gross": 0"#));
    assert!(!written.contains("0.0"));
    assert!(written.find("Zardoz").unwrap() < written.find("Alien").unwrap());
}

#[test]
fn test_add_record_does_not_overwrite() {
    let (_dir, path) = create_test_db(SAMPLE);
    let storage = JsonStorage::open(&path);

    let err = storage
        .add_record("The Room", MovieRecord::new(10.0, 2003))
        .unwrap_err();
    assert!(matches!(err, StorageError::DuplicateTitle { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
}

#[test]
fn test_mutations_reload_before_writing() {
    let (_dir, path) = create_test_db(SAMPLE);
    let storage = JsonStorage::open(&path);

    // An edit made behind the storage's back is picked up by the next mutation
    let mut edited = storage.load().unwrap();
    edited.insert("Alien", MovieRecord::new(8.5, 1979));
    JsonStorage::open(&path).save(&edited).unwrap();

    let movies = storage
        .add_record("Life of Brian", MovieRecord::new(8.0, 1979))
        .unwrap();
    assert!(movies.contains("Alien"));
    assert!(movies.contains("Life of Brian"));
    assert_eq!(storage.load().unwrap().len(), 5);
}

#[test]
fn test_delete_record() {
    let (_dir, path) = create_test_db(SAMPLE);
    let storage = JsonStorage::open(&path);

    let movies = storage.delete_record("The Room").unwrap();
    assert_eq!(movies.len(), 2);
    assert!(!storage.load().unwrap().contains("The Room"));

    let err = storage.delete_record("The Room").unwrap_err();
    assert!(matches!(err, StorageError::MissingTitle { .. }));
}

#[test]
fn test_create_if_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("movies.json");

    let storage = JsonStorage::create_if_missing(&path).unwrap();
    assert_eq!(storage.load().unwrap(), Collection::new());

    // An existing document is left alone
    storage.add_record("Alien", MovieRecord::new(8.5, 1979)).unwrap();
    let storage = JsonStorage::create_if_missing(&path).unwrap();
    assert_eq!(storage.load().unwrap().len(), 1);
}

#[test]
fn test_failed_save_keeps_previous_document() {
    let (dir, path) = create_test_db(SAMPLE);

    // A directory squatting on the temp path makes the write fail
    fs::create_dir(dir.path().join("movies.json.tmp")).unwrap();

    let storage = JsonStorage::open(&path);
    let err = storage
        .add_record("Alien", MovieRecord::new(8.5, 1979))
        .unwrap_err();

    assert!(matches!(err, StorageError::Io { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
}
