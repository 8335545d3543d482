//! Data models for the audit report.
//!
//! This module contains the core data structures used throughout the
//! application for representing query results and the accumulated report.

use chrono::NaiveDateTime;
use std::fmt;

/// One cell of a result tuple.
///
/// The analytical queries return mixed scalar types: integer counts and
/// ids, floating-point averages, titles, and rating timestamps. `Null`
/// covers cells produced by the outer joins when a rating references a
/// movie row that does not exist.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
    Null,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            // Whole-number averages keep a decimal point so a float cell
            // stays distinguishable from an integer one
            Scalar::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{:.1}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Text(v) => write!(f, "'{}'", v),
            Scalar::Timestamp(v) => write!(f, "{}", v),
            Scalar::Null => write!(f, "NULL"),
        }
    }
}

impl From<Option<String>> for Scalar {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(v) => Scalar::Text(v),
            None => Scalar::Null,
        }
    }
}

impl From<Option<i32>> for Scalar {
    fn from(value: Option<i32>) -> Self {
        match value {
            Some(v) => Scalar::Int(v as i64),
            None => Scalar::Null,
        }
    }
}

/// One genre token with the number of movies carrying it.
///
/// Genres are stored pipe-delimited per movie; the query splits them into
/// individual tokens before counting, so a movie contributes to several
/// genres at once.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreCount {
    pub genre: String,
    pub movie_count: i64,
}

impl GenreCount {
    pub fn into_tuple(self) -> Vec<Scalar> {
        vec![Scalar::Text(self.genre), Scalar::Int(self.movie_count)]
    }
}

/// A highly rated movie that cleared the popularity cutoff.
#[derive(Debug, Clone, PartialEq)]
pub struct TopMovie {
    /// Movie id; absent if the ratings table references an unknown movie.
    pub movie_id: Option<i32>,
    pub title: Option<String>,
    pub avg_rating: f64,
    pub rating_count: i64,
}

impl TopMovie {
    pub fn into_tuple(self) -> Vec<Scalar> {
        vec![
            Scalar::from(self.movie_id),
            Scalar::from(self.title),
            Scalar::Float(self.avg_rating),
            Scalar::Int(self.rating_count),
        ]
    }
}

/// A user ranked by how many ratings they have submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveUser {
    pub user_id: i32,
    pub rating_count: i64,
}

impl ActiveUser {
    pub fn into_tuple(self) -> Vec<Scalar> {
        vec![
            Scalar::Int(self.user_id as i64),
            Scalar::Int(self.rating_count),
        ]
    }
}

/// A single rating joined with its movie title.
///
/// Used for the earliest/latest ratings in the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingEvent {
    pub title: Option<String>,
    pub user_id: i32,
    pub rating: f64,
    pub rated_at: NaiveDateTime,
}

impl RatingEvent {
    pub fn into_tuple(self) -> Vec<Scalar> {
        vec![
            Scalar::from(self.title),
            Scalar::Int(self.user_id as i64),
            Scalar::Float(self.rating),
            Scalar::Timestamp(self.rated_at),
        ]
    }
}

/// A movie id/title pair, as returned by the release-year filter.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieEntry {
    pub movie_id: i32,
    pub title: String,
}

impl MovieEntry {
    pub fn into_tuple(self) -> Vec<Scalar> {
        vec![
            Scalar::Int(self.movie_id as i64),
            Scalar::Text(self.title),
        ]
    }
}

/// The value stored under one report key: a single scalar (the movie
/// count) or an ordered sequence of fixed-arity tuples.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportValue {
    Scalar(Scalar),
    Rows(Vec<Vec<Scalar>>),
}

/// Insertion-ordered accumulation of named query results for one run.
///
/// Each query stores its result under a fixed key. Re-running a query
/// overwrites its key in place without disturbing the order, so every key
/// appears at most once.
#[derive(Debug, Clone, Default)]
pub struct Report {
    entries: Vec<(String, ReportValue)>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result under `key`, replacing any previous value for the
    /// same key while keeping its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: ReportValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    #[allow(dead_code)] // Lookup helper; the report is rendered by iteration
    pub fn get(&self, key: &str) -> Option<&ReportValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReportValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)] // Companion to len
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::Int(9125).to_string(), "9125");
        assert_eq!(Scalar::Float(4.5).to_string(), "4.5");
        assert_eq!(Scalar::Float(4.0).to_string(), "4.0");
        assert_eq!(Scalar::Text("Drama".to_string()).to_string(), "'Drama'");
        assert_eq!(Scalar::Null.to_string(), "NULL");
    }

    #[test]
    fn test_scalar_from_optional() {
        assert_eq!(
            Scalar::from(Some("Heat (1995)".to_string())),
            Scalar::Text("Heat (1995)".to_string())
        );
        assert_eq!(Scalar::from(None::<String>), Scalar::Null);
        assert_eq!(Scalar::from(Some(42_i32)), Scalar::Int(42));
    }

    #[test]
    fn test_report_preserves_insertion_order() {
        let mut report = Report::new();
        report.insert("movies_count", ReportValue::Scalar(Scalar::Int(1)));
        report.insert("most_common_genre", ReportValue::Rows(vec![]));
        report.insert("top_10", ReportValue::Rows(vec![]));

        let keys: Vec<&str> = report.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["movies_count", "most_common_genre", "top_10"]);
    }

    #[test]
    fn test_report_insert_overwrites_in_place() {
        let mut report = Report::new();
        report.insert("movies_count", ReportValue::Scalar(Scalar::Int(1)));
        report.insert("most_common_genre", ReportValue::Rows(vec![]));
        report.insert("movies_count", ReportValue::Scalar(Scalar::Int(9125)));

        assert_eq!(report.len(), 2);
        let keys: Vec<&str> = report.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["movies_count", "most_common_genre"]);
        assert_eq!(
            report.get("movies_count"),
            Some(&ReportValue::Scalar(Scalar::Int(9125)))
        );
    }

    #[test]
    fn test_genre_count_tuple() {
        let row = GenreCount {
            genre: "Drama".to_string(),
            movie_count: 4365,
        };
        assert_eq!(
            row.into_tuple(),
            vec![Scalar::Text("Drama".to_string()), Scalar::Int(4365)]
        );
    }

    #[test]
    fn test_top_movie_tuple_with_missing_join() {
        let row = TopMovie {
            movie_id: None,
            title: None,
            avg_rating: 4.25,
            rating_count: 320,
        };
        assert_eq!(
            row.into_tuple(),
            vec![
                Scalar::Null,
                Scalar::Null,
                Scalar::Float(4.25),
                Scalar::Int(320)
            ]
        );
    }
}
