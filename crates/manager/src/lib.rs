//! Movie database manager.
//!
//! This crate provides:
//! - `MovieManager` for title-keyed CRUD validated against the template
//! - Read-only analytics (average, median, extremes, sorting)
//! - `RatingHistogram` for the rating distribution
//!
//! ## Architecture
//! The manager sits between the presentation layer and storage:
//! 1. The collection is loaded once when the manager is built
//! 2. Reads and analytics are served from that collection
//! 3. Mutations go through `MovieStorage` (reload, modify, save) and the
//!    held collection is replaced only after the save succeeded
//!
//! ## Example Usage
//! ```ignore
//! use manager::{Extreme, MovieManager};
//! use movie_store::{Attributes, JsonStorage};
//!
//! let mut manager = MovieManager::new(JsonStorage::open("data/movies.json"))?;
//! manager.add_movie("Life of Brian", 8.0, 1979, Attributes::new())?;
//!
//! let (best, rating) = manager.extreme_rated_movies(Extreme::Max)?;
//! println!("{} ({})", best.join(", "), rating);
//! ```

pub mod analytics;
pub mod error;
pub mod histogram;
pub mod manager;

// Re-export main types
pub use analytics::{DEFAULT_SORT_KEY, Extreme};
pub use error::{ManagerError, Result};
pub use histogram::{Bin, RatingHistogram};
pub use manager::MovieManager;
