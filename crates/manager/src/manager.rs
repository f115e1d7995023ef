//! CRUD and lookups over the movie collection.
//!
//! `MovieManager` owns the collection it serves reads from. Mutations go
//! through the storage first and the held collection is replaced with what
//! the storage saved, so a failed write never leaves memory ahead of disk.

use movie_store::{Attributes, Collection, MovieRecord, MovieStorage, StorageError, Template};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::{ManagerError, Result};

/// Title-keyed access to the movie database, backed by any `MovieStorage`
#[derive(Debug)]
pub struct MovieManager<S: MovieStorage> {
    storage: S,
    movies: Collection,
}

impl<S: MovieStorage> MovieManager<S> {
    /// Create a manager, loading the collection from `storage`
    pub fn new(storage: S) -> Result<Self> {
        let movies = storage.load()?;
        info!("Movie manager ready with {} movies", movies.len());
        Ok(Self { storage, movies })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The collection as of the last load or successful mutation
    pub fn movies(&self) -> &Collection {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Re-read the collection from storage
    pub fn reload(&mut self) -> Result<()> {
        self.movies = self.storage.load()?;
        Ok(())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a movie built from the template.
    ///
    /// An existing title is left untouched and `Ok(false)` is returned, also
    /// when another writer stored it since the last load. Otherwise `rating`
    /// and `year` are set and `extra` is merged in as given: keys outside the
    /// template go to `extra`, template keys replace the default whatever
    /// their kind. Only a non-numeric `rating` or non-integer `year` is
    /// dropped.
    pub fn add_movie(
        &mut self,
        title: &str,
        rating: f64,
        year: i64,
        extra: Attributes,
    ) -> Result<bool> {
        if self.movies.contains(title) {
            debug!("'{}' already exists, not adding", title);
            return Ok(false);
        }

        let mut record = MovieRecord::new(rating, year);
        for (name, value) in extra {
            if Template::contains(&name) {
                let found = value.kind();
                if !record.assign(&name, value) {
                    warn!("Dropping '{}' for '{}': {} cannot hold {}", name, title, name, found);
                }
            } else {
                record.insert_extra(name, value);
            }
        }

        match self.storage.add_record(title, record) {
            Ok(movies) => {
                self.movies = movies;
                info!("Added '{}'", title);
                Ok(true)
            }
            // Stored by someone else since we last read
            Err(StorageError::DuplicateTitle { .. }) => {
                self.reload()?;
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a movie, returning `false` if the title is not stored
    pub fn delete_movie(&mut self, title: &str) -> Result<bool> {
        if !self.movies.contains(title) {
            return Ok(false);
        }

        match self.storage.delete_record(title) {
            Ok(movies) => {
                self.movies = movies;
                info!("Deleted '{}'", title);
                Ok(true)
            }
            // Removed from the document since we last read it
            Err(StorageError::MissingTitle { .. }) => {
                self.reload()?;
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Update attributes of an existing movie.
    ///
    /// Each attribute is applied only if it is a template attribute and the
    /// new value has the same kind as the stored one; anything else is
    /// skipped. Returns `false` if the title is not stored.
    pub fn update_movie(&mut self, title: &str, new_attributes: Attributes) -> Result<bool> {
        let Some(current) = self.movies.get(title) else {
            return Ok(false);
        };

        let mut record = current.clone();
        for (name, value) in new_attributes {
            let found = value.kind();
            if !record.set(&name, value) {
                debug!("Skipping '{}' ({}) for '{}'", name, found, title);
            }
        }

        match self.storage.update_record(title, record) {
            Ok(movies) => {
                self.movies = movies;
                info!("Updated '{}'", title);
                Ok(true)
            }
            Err(StorageError::MissingTitle { .. }) => {
                self.reload()?;
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Exact, case-sensitive lookup
    pub fn find_by_title(&self, title: &str) -> Option<&MovieRecord> {
        self.movies.get(title)
    }

    /// Titles containing `query`, ignoring case, in iteration order
    pub fn find_by_title_substring(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        self.movies
            .titles()
            .filter(|title| title.to_lowercase().contains(&query))
            .collect()
    }

    /// The `index`-th title in iteration order
    pub fn find_by_index(&self, index: usize) -> Result<&str> {
        self.movies
            .titles()
            .nth(index)
            .ok_or(ManagerError::IndexOutOfRange {
                index,
                len: self.movies.len(),
            })
    }

    /// A uniformly chosen title
    pub fn random_movie<R: Rng>(&self, rng: &mut R) -> Result<&str> {
        if self.movies.is_empty() {
            return Err(ManagerError::EmptyCollection);
        }
        let index = rng.random_range(0..self.movies.len());
        self.find_by_index(index)
    }
}
