//! Error types for the movie-store crate.
//!
//! Every failure here is surfaced to the caller unchanged; nothing in this
//! crate retries or recovers.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing the movie document
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing document does not exist
    #[error("Movie database not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The document exists but could not be read or written
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON, or does not match the record schema
    ///
    /// A record missing `rating` or `year` ends up here as well.
    #[error("Malformed movie database {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The collection could not be serialized
    #[error("Failed to serialize movie collection: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A record-level operation named a title that is not stored
    #[error("No movie titled '{title}'")]
    MissingTitle { title: String },

    /// A new record was added under a title that is already stored
    #[error("A movie titled '{title}' already exists")]
    DuplicateTitle { title: String },
}

impl StorageError {
    /// Wrap an I/O error, mapping `NotFound` to the dedicated variant
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound { path }
        } else {
            StorageError::Io { path, source }
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StorageError>;
