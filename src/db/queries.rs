//! SQL text for the six analytical queries.
//!
//! Each builder interpolates only the configured table names; values that
//! come from the caller (result limits, the release year pattern) are bound
//! as query parameters at execution time.

use crate::config::TableConfig;

/// Total row count of the movies table.
pub fn count_movies(tables: &TableConfig) -> String {
    format!("SELECT count(*) FROM {}", tables.movies)
}

/// Every genre tied for the maximum movie count.
///
/// Genre lists are pipe-delimited per movie; `regexp_split_to_array` +
/// `unnest` turns them into one row per (movie, genre) before counting.
pub fn most_common_genre(tables: &TableConfig) -> String {
    format!(
        r"WITH genres AS (
    SELECT
        unnest(regexp_split_to_array(genres, E'\\|')) AS genre,
        count(*) AS cnt
    FROM {movies}
    GROUP BY 1 ORDER BY 1
),
max_cnt AS (
    SELECT max(cnt) AS max_cnt
    FROM genres
)
SELECT genres.genre, genres.cnt
FROM genres
LEFT JOIN max_cnt ON 1=1
WHERE cnt = max_cnt.max_cnt",
        movies = tables.movies
    )
}

/// Highest-rated movies among those whose rating count reaches the 99th
/// percentile (continuous interpolation) of rating counts. `$1` binds the
/// result limit.
pub fn top_movies(tables: &TableConfig) -> String {
    format!(
        r"WITH rats AS (
    SELECT movieId, avg(rating)::float8 AS avg_rating, count(*) AS cnt
    FROM {ratings}
    GROUP BY 1
),
count_perc AS (
    SELECT (percentile_cont(0.99) WITHIN GROUP (ORDER BY rats.cnt)::int) AS p99
    FROM rats
),
top_m AS (
    SELECT movieId, avg_rating, cnt
    FROM rats
    CROSS JOIN count_perc
    WHERE rats.cnt >= count_perc.p99
    ORDER BY rats.avg_rating DESC
    LIMIT $1
)
SELECT m.movieId, m.title, t.avg_rating, t.cnt
FROM {movies} m
RIGHT JOIN top_m t ON t.movieId = m.movieId",
        ratings = tables.ratings,
        movies = tables.movies
    )
}

/// Users with the most submitted ratings, descending. `$1` binds the
/// result limit.
pub fn most_active_users(tables: &TableConfig) -> String {
    format!(
        "SELECT userId, count(*) FROM {} GROUP BY 1 ORDER BY 2 DESC LIMIT $1",
        tables.ratings
    )
}

/// Every rating at the global minimum or maximum timestamp, joined with
/// its movie title, ordered by timestamp ascending.
pub fn first_and_last_ratings(tables: &TableConfig) -> String {
    format!(
        r"WITH min_max AS (
    SELECT min(timestamp) AS min_ts, max(timestamp) AS max_ts
    FROM {ratings}
),
first_last AS (
    SELECT userId, movieId, rating, timestamp
    FROM {ratings} r
    CROSS JOIN min_max mm
    WHERE mm.min_ts = r.timestamp OR mm.max_ts = r.timestamp
)
SELECT m.title, fl.userId, fl.rating::float8, fl.timestamp
FROM first_last fl
LEFT JOIN {movies} m ON m.movieId = fl.movieId
ORDER BY fl.timestamp",
        ratings = tables.ratings,
        movies = tables.movies
    )
}

/// Movies whose title carries a parenthesized year token. `$1` binds the
/// regex pattern built by [`year_pattern`].
pub fn movies_from_year(tables: &TableConfig) -> String {
    format!(
        "SELECT movieId, title FROM {} WHERE title ~ $1",
        tables.movies
    )
}

/// Case-sensitive pattern matching a literal space before the
/// parenthesized year, e.g. `" \(1990\)"`. Titles like "Home Alone (1990)"
/// match; "Alone1990" does not.
pub fn year_pattern(year: i32) -> String {
    format!(r" \({}\)", year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> TableConfig {
        TableConfig::default()
    }

    #[test]
    fn test_count_movies_uses_configured_table() {
        let custom = TableConfig {
            movies: "films".to_string(),
            ..TableConfig::default()
        };
        assert_eq!(count_movies(&custom), "SELECT count(*) FROM films");
    }

    #[test]
    fn test_most_common_genre_splits_pipe_delimited_tokens() {
        let sql = most_common_genre(&tables());
        assert!(sql.contains("regexp_split_to_array(genres, E'\\\\|')"));
        assert!(sql.contains("unnest"));
        assert!(sql.contains("max(cnt)"));
        // Returns all genres tied for the maximum, not LIMIT 1
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn test_top_movies_applies_percentile_cutoff_and_bound_limit() {
        let sql = top_movies(&tables());
        assert!(sql.contains("percentile_cont(0.99) WITHIN GROUP"));
        assert!(sql.contains("cnt >= count_perc.p99"));
        assert!(sql.contains("ORDER BY rats.avg_rating DESC"));
        assert!(sql.contains("LIMIT $1"));
        assert!(sql.contains("FROM ratings"));
        assert!(sql.contains("FROM movies m"));
    }

    #[test]
    fn test_most_active_users_orders_by_count_descending() {
        let sql = most_active_users(&tables());
        assert_eq!(
            sql,
            "SELECT userId, count(*) FROM ratings GROUP BY 1 ORDER BY 2 DESC LIMIT $1"
        );
    }

    #[test]
    fn test_first_and_last_ratings_selects_both_extremes() {
        let sql = first_and_last_ratings(&tables());
        assert!(sql.contains("min(timestamp)"));
        assert!(sql.contains("max(timestamp)"));
        assert!(sql.contains("mm.min_ts = r.timestamp OR mm.max_ts = r.timestamp"));
        assert!(sql.contains("ORDER BY fl.timestamp"));
    }

    #[test]
    fn test_movies_from_year_binds_pattern() {
        let sql = movies_from_year(&tables());
        assert_eq!(sql, "SELECT movieId, title FROM movies WHERE title ~ $1");
    }

    #[test]
    fn test_year_pattern_requires_space_and_parens() {
        assert_eq!(year_pattern(1990), r" \(1990\)");
        assert_eq!(year_pattern(2001), r" \(2001\)");
    }
}
