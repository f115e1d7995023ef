//! Core domain types for the movie database.
//!
//! - `MovieRecord`: the attributes of one movie, each template field keeping
//!   the kind it was stored with
//! - `Number`: a numeric value that is either an integer or a float
//! - `AttributeValue` / `AttributeKind`: a tagged value and its type tag,
//!   used wherever attributes are addressed by name
//! - `Collection`: the title -> record mapping persisted as one document, in
//!   document order

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::template::Template;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique, case-sensitive movie identifier
pub type Title = String;

// =============================================================================
// Attribute values
// =============================================================================

/// Type tag of an attribute value.
///
/// Updates only go through when the incoming value's kind equals the kind of
/// the value already stored, so `Integer` and `Float` are distinct here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Integer,
    Float,
    Text,
    TextList,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeKind::Integer => "integer",
            AttributeKind::Float => "float",
            AttributeKind::Text => "text",
            AttributeKind::TextList => "list of text",
        };
        f.write_str(name)
    }
}

/// A single attribute value addressed by name.
///
/// Serialized untagged, so `7` decodes as `Integer`, `7.5` (and `7.0`) as
/// `Float`, `"x"` as `Text` and `["a", "b"]` as `TextList`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(i64),
    Float(f64),
    Text(String),
    TextList(Vec<String>),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::Integer(_) => AttributeKind::Integer,
            AttributeValue::Float(_) => AttributeKind::Float,
            AttributeValue::Text(_) => AttributeKind::Text,
            AttributeValue::TextList(_) => AttributeKind::TextList,
        }
    }

    /// The value as a number, if it is one
    pub fn as_number(&self) -> Option<Number> {
        match *self {
            AttributeValue::Integer(v) => Some(Number::Integer(v)),
            AttributeValue::Float(v) => Some(Number::Float(v)),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Integer(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Text(v) => f.write_str(v),
            AttributeValue::TextList(v) => f.write_str(&v.join(", ")),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Integer(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(v: Vec<String>) -> Self {
        AttributeValue::TextList(v)
    }
}

impl From<AttributeValue> for serde_json::Value {
    fn from(v: AttributeValue) -> Self {
        match v {
            AttributeValue::Integer(i) => serde_json::Value::from(i),
            AttributeValue::Float(x) => serde_json::Value::from(x),
            AttributeValue::Text(s) => serde_json::Value::String(s),
            AttributeValue::TextList(items) => serde_json::Value::from(items),
        }
    }
}

/// Named attributes supplied by a caller when adding or updating a movie
pub type Attributes = BTreeMap<String, AttributeValue>;

// =============================================================================
// Numbers
// =============================================================================

/// A numeric attribute that remembers how it was written.
///
/// `8` stays `Integer` and `8.0` stays `Float` across a load/save cycle, and
/// updates compare against that stored kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    pub fn kind(self) -> AttributeKind {
        match self {
            Number::Integer(_) => AttributeKind::Integer,
            Number::Float(_) => AttributeKind::Float,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Integer(v)
    }
}

impl From<Number> for AttributeValue {
    fn from(v: Number) -> Self {
        match v {
            Number::Integer(i) => AttributeValue::Integer(i),
            Number::Float(x) => AttributeValue::Float(x),
        }
    }
}

// =============================================================================
// Movie record
// =============================================================================

/// The attributes of one movie.
///
/// `rating` and `year` are required in the document; the remaining template
/// fields fall back to their template defaults. Every template field keeps
/// the kind it was stored with. Keys outside the template land in `extra`
/// and are written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub rating: Number,
    pub year: i64,
    #[serde(default = "Template::default_actors")]
    pub actors: AttributeValue,
    #[serde(default = "Template::default_director")]
    pub director: AttributeValue,
    #[serde(default = "Template::default_gross")]
    pub gross: AttributeValue,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl MovieRecord {
    /// Template defaults with the given rating and year
    pub fn new(rating: impl Into<Number>, year: i64) -> Self {
        Self {
            rating: rating.into(),
            year,
            ..Template::default_record()
        }
    }

    /// Read a template attribute by name.
    ///
    /// Returns `None` for names outside the template, including keys that
    /// only exist in `extra`.
    pub fn get(&self, name: &str) -> Option<AttributeValue> {
        let value = match name {
            "rating" => AttributeValue::from(self.rating),
            "year" => AttributeValue::Integer(self.year),
            "actors" => self.actors.clone(),
            "director" => self.director.clone(),
            "gross" => self.gross.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Kind of the value currently stored under a template attribute
    pub fn stored_kind(&self, name: &str) -> Option<AttributeKind> {
        let kind = match name {
            "rating" => self.rating.kind(),
            "year" => AttributeKind::Integer,
            "actors" => self.actors.kind(),
            "director" => self.director.kind(),
            "gross" => self.gross.kind(),
            _ => return None,
        };
        Some(kind)
    }

    /// Overwrite a template attribute if `value` has the stored kind.
    ///
    /// Returns `false`, leaving the record untouched, for unknown names and
    /// kind mismatches.
    pub fn set(&mut self, name: &str, value: AttributeValue) -> bool {
        if self.stored_kind(name) != Some(value.kind()) {
            return false;
        }
        self.assign(name, value)
    }

    /// Store a template attribute as given, whatever its current kind.
    ///
    /// `rating` takes any number and `year` only an integer; the optional
    /// attributes take any value. Returns `false` for names outside the
    /// template and for values the required pair cannot hold.
    pub fn assign(&mut self, name: &str, value: AttributeValue) -> bool {
        match (name, value) {
            ("rating", value) => match value.as_number() {
                Some(number) => self.rating = number,
                None => return false,
            },
            ("year", AttributeValue::Integer(v)) => self.year = v,
            ("actors", value) => self.actors = value,
            ("director", value) => self.director = value,
            ("gross", value) => self.gross = value,
            _ => return false,
        }
        true
    }

    /// Store a non-template attribute as-is
    pub fn insert_extra(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.extra.insert(name.into(), value.into());
    }
}

impl Default for MovieRecord {
    fn default() -> Self {
        Template::default_record()
    }
}

// =============================================================================
// Collection - the unit of persistence
// =============================================================================

/// Every stored movie, keyed by title.
///
/// Keeps document order: loaded titles stay where they were, new titles are
/// appended and replacing a record keeps its position. That order is what
/// index lookups, display and the stable sorts in the manager see.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    movies: Vec<(Title, MovieRecord)>,
}

impl Collection {
    /// Creates a new, empty Collection
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, title: &str) -> Option<usize> {
        self.movies.iter().position(|(stored, _)| stored == title)
    }

    pub fn get(&self, title: &str) -> Option<&MovieRecord> {
        self.position(title).map(|i| &self.movies[i].1)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.position(title).is_some()
    }

    /// Insert or replace a record, returning the previous one
    pub fn insert(&mut self, title: impl Into<Title>, record: MovieRecord) -> Option<MovieRecord> {
        let title = title.into();
        match self.position(&title) {
            Some(i) => Some(std::mem::replace(&mut self.movies[i].1, record)),
            None => {
                self.movies.push((title, record));
                None
            }
        }
    }

    /// Remove a record; the titles after it keep their relative order
    pub fn remove(&mut self, title: &str) -> Option<MovieRecord> {
        self.position(title).map(|i| self.movies.remove(i).1)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Titles in iteration order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.movies.iter().map(|(title, _)| title.as_str())
    }

    /// Records in iteration order
    pub fn records(&self) -> impl Iterator<Item = &MovieRecord> {
        self.movies.iter().map(|(_, record)| record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MovieRecord)> {
        self.movies.iter().map(|(title, record)| (title.as_str(), record))
    }
}

impl FromIterator<(Title, MovieRecord)> for Collection {
    fn from_iter<I: IntoIterator<Item = (Title, MovieRecord)>>(iter: I) -> Self {
        let mut collection = Collection::new();
        for (title, record) in iter {
            collection.insert(title, record);
        }
        collection
    }
}

impl IntoIterator for Collection {
    type Item = (Title, MovieRecord);
    type IntoIter = std::vec::IntoIter<(Title, MovieRecord)>;

    fn into_iter(self) -> Self::IntoIter {
        self.movies.into_iter()
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for Collection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CollectionVisitor;

        impl<'de> Visitor<'de> for CollectionVisitor {
            type Value = Collection;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping titles to movie records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Collection, A::Error> {
                let mut collection = Collection::new();
                // A repeated title keeps its first position and its last value
                while let Some((title, record)) = map.next_entry::<Title, MovieRecord>()? {
                    collection.insert(title, record);
                }
                Ok(collection)
            }
        }

        deserializer.deserialize_map(CollectionVisitor)
    }
}
