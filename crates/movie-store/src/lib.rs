//! # Movie Store Crate
//!
//! This crate holds the movie database's data model and its persistence.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (MovieRecord, AttributeValue, Collection)
//! - **template**: The recognised attribute set and its defaults
//! - **storage**: The `MovieStorage` trait with JSON file and in-memory backends
//! - **error**: Error types for storage
//!
//! ## Example Usage
//!
//! ```ignore
//! use movie_store::{JsonStorage, MovieRecord, MovieStorage};
//!
//! let storage = JsonStorage::open("data/movies.json");
//! let movies = storage.load()?;
//!
//! // Every mutation re-reads the document and writes it back whole
//! let movies = storage.add_record("Life of Brian", MovieRecord::new(8.0, 1979))?;
//! println!("{} movies stored", movies.len());
//! ```

pub mod error;
pub mod storage;
pub mod template;
pub mod types;

pub use error::{Result, StorageError};
pub use storage::{JsonStorage, MemoryStorage, MovieStorage};
pub use template::Template;
pub use types::{
    // Type aliases
    Attributes,
    Title,
    // Core types
    AttributeKind,
    AttributeValue,
    Collection,
    MovieRecord,
    Number,
};
