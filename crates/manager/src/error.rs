//! Error types for the manager crate.

use movie_store::StorageError;
use thiserror::Error;

/// Errors returned by `MovieManager` operations.
///
/// A missing title on update or delete is not an error: those operations
/// report it by returning `false`.
#[derive(Error, Debug)]
pub enum ManagerError {
    /// The backing storage failed; nothing in memory was changed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Analytics need at least one movie
    #[error("The movie database is empty")]
    EmptyCollection,

    /// Positional lookup past the end of the collection
    #[error("Index {index} is out of range for {len} movies")]
    IndexOutOfRange { index: usize, len: usize },

    /// Sort key that is not a template attribute
    #[error("Unknown attribute '{0}'")]
    UnknownAttribute(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ManagerError>;
