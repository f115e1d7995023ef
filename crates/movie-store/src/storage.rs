//! Persistence of the movie collection.
//!
//! The collection is always read and written as a whole: there is no
//! incremental or append persistence. Each record-level mutation is one full
//! read followed by one full write of the backing document.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::error::{Result, StorageError};
use crate::types::{Collection, MovieRecord};

/// Backend that holds the collection.
///
/// Implementations only need `load` and `save`; the record-level mutations are
/// built on `transact`, so swapping the backend never touches manager logic.
pub trait MovieStorage {
    /// Read the full collection
    fn load(&self) -> Result<Collection>;

    /// Replace the stored collection with `collection`
    fn save(&self, collection: &Collection) -> Result<()>;

    /// Read-modify-write of the whole collection.
    ///
    /// Loads the current document, applies `mutate` to it and saves the
    /// result, returning the saved collection together with `mutate`'s
    /// output. Nothing is saved if `mutate` fails.
    ///
    /// There is no locking. Reloading first picks up edits made since the
    /// caller last read, but another writer saving between this load and
    /// this save is overwritten: last writer wins.
    #[instrument(level = "debug", skip_all)]
    fn transact<T, F>(&self, mutate: F) -> Result<(Collection, T)>
    where
        F: FnOnce(&mut Collection) -> Result<T>,
    {
        let mut collection = self.load()?;
        let output = mutate(&mut collection)?;
        self.save(&collection)?;
        debug!("Transaction saved {} movies", collection.len());
        Ok((collection, output))
    }

    /// Store a new record under `title`.
    ///
    /// Fails with `StorageError::DuplicateTitle`, saving nothing, if the
    /// document already holds the title at the time of the reload.
    fn add_record(&self, title: &str, record: MovieRecord) -> Result<Collection> {
        let (collection, _) = self.transact(|movies| {
            if movies.contains(title) {
                return Err(StorageError::DuplicateTitle {
                    title: title.to_string(),
                });
            }
            movies.insert(title, record);
            Ok(())
        })?;
        Ok(collection)
    }

    /// Replace the record stored under `title`.
    ///
    /// Fails with `StorageError::MissingTitle` if the document has no such
    /// title at the time of the reload.
    fn update_record(&self, title: &str, record: MovieRecord) -> Result<Collection> {
        let (collection, _) = self.transact(|movies| {
            if !movies.contains(title) {
                return Err(StorageError::MissingTitle {
                    title: title.to_string(),
                });
            }
            movies.insert(title, record);
            Ok(())
        })?;
        Ok(collection)
    }

    /// Remove the record stored under `title`.
    ///
    /// Fails with `StorageError::MissingTitle` if the document has no such
    /// title at the time of the reload.
    fn delete_record(&self, title: &str) -> Result<Collection> {
        let (collection, _) = self.transact(|movies| {
            movies
                .remove(title)
                .map(|_| ())
                .ok_or_else(|| StorageError::MissingTitle {
                    title: title.to_string(),
                })
        })?;
        Ok(collection)
    }
}

// =============================================================================
// JSON file backend
// =============================================================================

/// Collection stored as a single JSON object at a fixed path
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    /// Use the document at `path`; nothing is read or created yet
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Like `open`, but writes an empty collection first if no document exists
    pub fn create_if_missing(path: impl Into<PathBuf>) -> Result<Self> {
        let storage = Self::open(path);
        if !storage.path.exists() {
            if let Some(parent) = storage.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
            }
            storage.save(&Collection::new())?;
            debug!("Created empty movie database at {}", storage.path.display());
        }
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl MovieStorage for JsonStorage {
    fn load(&self) -> Result<Collection> {
        let json = fs::read_to_string(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        let collection: Collection =
            serde_json::from_str(&json).map_err(|source| StorageError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        debug!(
            "Loaded {} movies from {}",
            collection.len(),
            self.path.display()
        );
        Ok(collection)
    }

    /// Serializes in memory, writes a sibling temp file and renames it over
    /// the document, so a failed save leaves the previous document in place.
    fn save(&self, collection: &Collection) -> Result<()> {
        let json = serde_json::to_string_pretty(collection)?;
        let temp = self.temp_path();

        fs::write(&temp, json).map_err(|e| StorageError::io(&temp, e))?;
        if let Err(e) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(StorageError::Io {
                path: self.path.clone(),
                source: e,
            });
        }

        debug!("Saved {} movies to {}", collection.len(), self.path.display());
        Ok(())
    }
}

// =============================================================================
// In-memory backend
// =============================================================================

/// Collection kept in memory only.
///
/// Behaves like `JsonStorage` minus the file: `load` hands out a copy and
/// `save` replaces the held collection.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    movies: RefCell<Collection>,
}

impl MemoryStorage {
    pub fn new(collection: Collection) -> Self {
        Self {
            movies: RefCell::new(collection),
        }
    }
}

impl MovieStorage for MemoryStorage {
    fn load(&self) -> Result<Collection> {
        Ok(self.movies.borrow().clone())
    }

    fn save(&self, collection: &Collection) -> Result<()> {
        *self.movies.borrow_mut() = collection.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributeValue;

    fn storage_with(titles: &[(&str, f64)]) -> MemoryStorage {
        let collection: Collection = titles
            .iter()
            .map(|&(title, rating)| (title.to_string(), MovieRecord::new(rating, 2000)))
            .collect();
        MemoryStorage::new(collection)
    }

    #[test]
    fn test_add_record_persists() {
        let storage = MemoryStorage::default();
        let collection = storage.add_record("Alien", MovieRecord::new(8.5, 1979)).unwrap();

        assert!(collection.contains("Alien"));
        assert_eq!(storage.load().unwrap(), collection);
    }

    #[test]
    fn test_delete_missing_title() {
        let storage = storage_with(&[("Alien", 8.5)]);
        let err = storage.delete_record("Aliens").unwrap_err();

        assert!(matches!(err, StorageError::MissingTitle { ref title } if title == "Aliens"));
        assert_eq!(storage.load().unwrap().len(), 1);
    }

    #[test]
    fn test_transact_failure_saves_nothing() {
        let storage = storage_with(&[("Alien", 8.5)]);
        let result: Result<(Collection, ())> = storage.transact(|movies| {
            movies.remove("Alien");
            Err(StorageError::MissingTitle {
                title: "Alien".to_string(),
            })
        });

        assert!(result.is_err());
        assert!(storage.load().unwrap().contains("Alien"));
    }

    #[test]
    fn test_update_record_replaces() {
        let storage = storage_with(&[("Alien", 8.5)]);
        let mut record = storage.load().unwrap().get("Alien").cloned().unwrap();
        record.director = AttributeValue::from("Ridley Scott");

        let collection = storage.update_record("Alien", record).unwrap();
        assert_eq!(collection.get("Alien").unwrap().director, AttributeValue::from("Ridley Scott"));
    }

    #[test]
    fn test_add_existing_title_saves_nothing() {
        let storage = storage_with(&[("Alien", 8.5)]);
        let err = storage.add_record("Alien", MovieRecord::new(1.0, 2020)).unwrap_err();

        assert!(matches!(err, StorageError::DuplicateTitle { ref title } if title == "Alien"));
        assert_eq!(storage.load().unwrap().get("Alien").unwrap().rating.as_f64(), 8.5);
    }

    #[test]
    fn test_update_missing_title_saves_nothing() {
        let storage = storage_with(&[("Alien", 8.5)]);
        let err = storage.update_record("Aliens", MovieRecord::new(1.0, 2020)).unwrap_err();

        assert!(matches!(err, StorageError::MissingTitle { ref title } if title == "Aliens"));
        assert!(!storage.load().unwrap().contains("Aliens"));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let storage = JsonStorage::open("data/movies.json");
        assert_eq!(storage.temp_path(), PathBuf::from("data/movies.json.tmp"));
    }
}
