//! Read-only analytics over the held collection.
//!
//! Everything here works on the collection as last loaded or saved; nothing
//! touches storage.

use std::cmp::Ordering;

use movie_store::{AttributeValue, MovieRecord, MovieStorage, Number, Template};

use crate::error::{ManagerError, Result};
use crate::histogram::RatingHistogram;
use crate::manager::MovieManager;

/// Which end of the rating scale to look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Max,
    Min,
}

/// Attribute `sort_by_attribute` uses when the caller has no preference
pub const DEFAULT_SORT_KEY: &str = "rating";

impl<S: MovieStorage> MovieManager<S> {
    /// Every rating, in iteration order
    pub fn ratings(&self) -> Vec<f64> {
        self.movies()
            .records()
            .map(|record| record.rating.as_f64())
            .collect()
    }

    /// Movies in descending order of `key`.
    ///
    /// The sort is stable, so ties keep iteration order. Integers and floats
    /// compare by value and text lists by length; values of different kinds
    /// group as numbers, then text, then lists. Fails for names outside the
    /// template.
    pub fn sort_by_attribute(&self, key: &str) -> Result<Vec<(&str, &MovieRecord)>> {
        if !Template::contains(key) {
            return Err(ManagerError::UnknownAttribute(key.to_string()));
        }

        let mut keyed: Vec<(AttributeValue, &str, &MovieRecord)> = self
            .movies()
            .iter()
            .filter_map(|(title, record)| record.get(key).map(|value| (value, title, record)))
            .collect();
        keyed.sort_by(|a, b| compare_values(&b.0, &a.0));

        Ok(keyed
            .into_iter()
            .map(|(_, title, record)| (title, record))
            .collect())
    }

    /// Mean rating rounded to one decimal place
    pub fn average_rating(&self) -> Result<f64> {
        let ratings = self.non_empty_ratings()?;
        let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
        Ok(round_to_tenth(mean))
    }

    /// Median rating; the mean of the two middle values for even counts
    pub fn median_rating(&self) -> Result<f64> {
        let mut ratings = self.non_empty_ratings()?;
        ratings.sort_by(f64::total_cmp);

        let mid = ratings.len() / 2;
        if ratings.len() % 2 == 1 {
            Ok(ratings[mid])
        } else {
            Ok((ratings[mid - 1] + ratings[mid]) / 2.0)
        }
    }

    /// All titles sharing the highest (or lowest) rating, with that rating
    pub fn extreme_rated_movies(&self, extreme: Extreme) -> Result<(Vec<&str>, f64)> {
        let ratings = self.non_empty_ratings()?;
        let fold: fn(f64, f64) -> f64 = match extreme {
            Extreme::Max => f64::max,
            Extreme::Min => f64::min,
        };
        let target = ratings[1..].iter().copied().fold(ratings[0], fold);

        let titles = self
            .movies()
            .iter()
            .filter(|(_, record)| record.rating.as_f64() == target)
            .map(|(title, _)| title)
            .collect();
        Ok((titles, target))
    }

    /// Distribution of ratings over fixed-width bins
    pub fn rating_histogram(&self) -> RatingHistogram {
        RatingHistogram::from_ratings(&self.ratings())
    }

    fn non_empty_ratings(&self) -> Result<Vec<f64>> {
        let ratings = self.ratings();
        if ratings.is_empty() {
            return Err(ManagerError::EmptyCollection);
        }
        Ok(ratings)
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Ascending order between two values of the same attribute
fn compare_values(a: &AttributeValue, b: &AttributeValue) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return match (x, y) {
            (Number::Integer(x), Number::Integer(y)) => x.cmp(&y),
            _ => x.as_f64().total_cmp(&y.as_f64()),
        };
    }
    match (a, b) {
        (AttributeValue::Text(x), AttributeValue::Text(y)) => x.cmp(y),
        (AttributeValue::TextList(x), AttributeValue::TextList(y)) => x.len().cmp(&y.len()),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: &AttributeValue) -> u8 {
    match value {
        AttributeValue::Integer(_) | AttributeValue::Float(_) => 0,
        AttributeValue::Text(_) => 1,
        AttributeValue::TextList(_) => 2,
    }
}
