//! The movie template: recognised attribute names and their defaults.

use std::collections::BTreeMap;

use crate::types::{AttributeValue, MovieRecord, Number};

/// The fixed attribute set every record is built from.
///
/// `rating` and `year` are the identifying pair a caller must always supply;
/// the rest are optional details. A fresh record's kinds are those of the
/// defaults, so `gross` starts out as the integer `0`.
pub struct Template;

impl Template {
    /// Recognised attributes, in display order
    pub const FIELDS: [&'static str; 5] = ["rating", "year", "actors", "director", "gross"];

    /// Attributes every record must carry
    pub const REQUIRED: [&'static str; 2] = ["rating", "year"];

    pub fn contains(name: &str) -> bool {
        Self::FIELDS.contains(&name)
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::FIELDS.into_iter()
    }

    /// Optional attributes, i.e. everything but the required pair
    pub fn optional_names() -> impl Iterator<Item = &'static str> {
        Self::names().filter(|name| !Self::REQUIRED.contains(name))
    }

    /// A record holding nothing but template defaults
    pub fn default_record() -> MovieRecord {
        MovieRecord {
            rating: Number::Float(0.1),
            year: 0,
            actors: Self::default_actors(),
            director: Self::default_director(),
            gross: Self::default_gross(),
            extra: BTreeMap::new(),
        }
    }

    /// Default value of a template attribute
    pub fn default_value(name: &str) -> Option<AttributeValue> {
        Self::default_record().get(name)
    }

    pub(crate) fn default_actors() -> AttributeValue {
        AttributeValue::TextList(Vec::new())
    }

    pub(crate) fn default_director() -> AttributeValue {
        AttributeValue::Text(String::new())
    }

    pub(crate) fn default_gross() -> AttributeValue {
        AttributeValue::Integer(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributeKind;

    #[test]
    fn test_contains() {
        assert!(Template::contains("year"));
        assert!(Template::contains("gross"));
        assert!(!Template::contains("studio"));
        assert!(!Template::contains("Rating"));
    }

    #[test]
    fn test_default_kinds() {
        let record = Template::default_record();
        assert_eq!(record.stored_kind("rating"), Some(AttributeKind::Float));
        assert_eq!(record.stored_kind("year"), Some(AttributeKind::Integer));
        assert_eq!(record.stored_kind("actors"), Some(AttributeKind::TextList));
        assert_eq!(record.stored_kind("director"), Some(AttributeKind::Text));
        assert_eq!(record.stored_kind("gross"), Some(AttributeKind::Integer));
    }

    #[test]
    fn test_every_field_has_a_default() {
        for name in Template::FIELDS {
            assert!(Template::default_value(name).is_some(), "no default for {}", name);
        }
        assert_eq!(Template::default_value("studio"), None);
    }

    #[test]
    fn test_optional_names() {
        let optional: Vec<_> = Template::optional_names().collect();
        assert_eq!(optional, vec!["actors", "director", "gross"]);
    }
}
