//! The audit run.
//!
//! [`Auditor`] owns the resolved connection parameters, the table names,
//! the accumulated report, and the output path. One call to [`Auditor::audit`]
//! runs the six analytical queries in a fixed order over a single
//! connection; [`Auditor::save`] writes the accumulated report to disk.

use crate::config::{Config, QueryConfig, TableConfig};
use crate::db::{self, queries, ConnectionParams};
use crate::error::AuditError;
use crate::models::{
    ActiveUser, GenreCount, MovieEntry, RatingEvent, Report, ReportValue, Scalar, TopMovie,
};
use crate::report::generator;
use std::path::{Path, PathBuf};
use tokio_postgres::Client;
use tracing::info;

/// The (key, SQL) pairs one audit run executes, in execution order.
///
/// Usable without resolved credentials, for showing the plan without
/// connecting.
pub fn planned_statements(tables: &TableConfig, params: &QueryConfig) -> Vec<(String, String)> {
    vec![
        ("movies_count".to_string(), queries::count_movies(tables)),
        (
            "most_common_genre".to_string(),
            queries::most_common_genre(tables),
        ),
        (
            format!("top_{}", params.top_count),
            queries::top_movies(tables),
        ),
        (
            "most_active_users".to_string(),
            queries::most_active_users(tables),
        ),
        (
            "first_last_ratings".to_string(),
            queries::first_and_last_ratings(tables),
        ),
        (
            format!("movies_from_{}", params.year),
            queries::movies_from_year(tables),
        ),
    ]
}

/// Runs the fixed set of analytical queries and accumulates their results.
pub struct Auditor {
    params: ConnectionParams,
    tables: TableConfig,
    queries: QueryConfig,
    report: Report,
    output: PathBuf,
}

impl Auditor {
    /// Build an auditor from configuration.
    ///
    /// Resolves the database password from the environment here, so a
    /// missing credential fails before any connection attempt.
    pub fn new(config: &Config) -> Result<Self, AuditError> {
        let params = ConnectionParams::resolve(&config.database)?;

        Ok(Self {
            params,
            tables: config.tables.clone(),
            queries: config.queries.clone(),
            report: Report::new(),
            output: PathBuf::from(&config.report.output),
        })
    }

    /// The accumulated report.
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Where [`Auditor::save`] writes the report.
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Run all six queries in order over a single connection.
    ///
    /// The connection is released when the client drops, on success and on
    /// error alike. A failing query aborts the rest of the sequence;
    /// results recorded so far stay in memory but are never written.
    pub async fn audit(&mut self) -> Result<(), AuditError> {
        let client = db::connect(&self.params).await?;

        self.count_movies(&client).await?;
        self.most_common_genre(&client).await?;
        self.top_movies(&client, self.queries.top_count).await?;
        self.most_active_users(&client, self.queries.active_count)
            .await?;
        self.first_and_last_ratings(&client).await?;
        self.movies_from_year(&client, self.queries.year).await?;

        Ok(())
    }

    /// Serialize the report to the output path, truncating any existing
    /// file.
    pub fn save(&self) -> Result<(), AuditError> {
        generator::write_report(&self.report, &self.output)
    }

    /// The (key, SQL) pairs a run would execute, in execution order.
    #[allow(dead_code)] // Instance form of planned_statements
    pub fn sql_statements(&self) -> Vec<(String, String)> {
        planned_statements(&self.tables, &self.queries)
    }

    /// Count movies in the movies table. Stored under `movies_count`.
    pub async fn count_movies(&mut self, client: &Client) -> Result<i64, AuditError> {
        let sql = queries::count_movies(&self.tables);
        let rows = db::fetch_all(client, "movies_count", &sql, &[]).await?;

        let count: i64 = rows[0].try_get(0)?;
        self.report
            .insert("movies_count", ReportValue::Scalar(Scalar::Int(count)));
        info!("Counted {} movies", count);
        Ok(count)
    }

    /// Every genre tied for the maximum movie count. Stored under
    /// `most_common_genre`.
    pub async fn most_common_genre(
        &mut self,
        client: &Client,
    ) -> Result<Vec<GenreCount>, AuditError> {
        let sql = queries::most_common_genre(&self.tables);
        let rows = db::fetch_all(client, "most_common_genre", &sql, &[]).await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            result.push(GenreCount {
                genre: row.try_get(0)?,
                movie_count: row.try_get(1)?,
            });
        }

        self.store_rows(
            "most_common_genre",
            result.iter().cloned().map(GenreCount::into_tuple),
        );
        Ok(result)
    }

    /// The `count` highest-rated movies among those whose rating count
    /// reaches the 99th percentile of rating counts. Stored under
    /// `top_{count}`.
    pub async fn top_movies(
        &mut self,
        client: &Client,
        count: i64,
    ) -> Result<Vec<TopMovie>, AuditError> {
        let key = format!("top_{}", count);
        let sql = queries::top_movies(&self.tables);
        let rows = db::fetch_all(client, &key, &sql, &[&count]).await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            result.push(TopMovie {
                movie_id: row.try_get(0)?,
                title: row.try_get(1)?,
                avg_rating: row.try_get(2)?,
                rating_count: row.try_get(3)?,
            });
        }

        self.store_rows(key, result.iter().cloned().map(TopMovie::into_tuple));
        Ok(result)
    }

    /// The `count` users with the most ratings, descending. Stored under
    /// `most_active_users`.
    pub async fn most_active_users(
        &mut self,
        client: &Client,
        count: i64,
    ) -> Result<Vec<ActiveUser>, AuditError> {
        let sql = queries::most_active_users(&self.tables);
        let rows = db::fetch_all(client, "most_active_users", &sql, &[&count]).await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            result.push(ActiveUser {
                user_id: row.try_get(0)?,
                rating_count: row.try_get(1)?,
            });
        }

        self.store_rows(
            "most_active_users",
            result.iter().cloned().map(ActiveUser::into_tuple),
        );
        Ok(result)
    }

    /// Every rating at the earliest or latest timestamp in the dataset,
    /// ordered ascending. Stored under `first_last_ratings`.
    pub async fn first_and_last_ratings(
        &mut self,
        client: &Client,
    ) -> Result<Vec<RatingEvent>, AuditError> {
        let sql = queries::first_and_last_ratings(&self.tables);
        let rows = db::fetch_all(client, "first_last_ratings", &sql, &[]).await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            result.push(RatingEvent {
                title: row.try_get(0)?,
                user_id: row.try_get(1)?,
                rating: row.try_get(2)?,
                rated_at: row.try_get(3)?,
            });
        }

        self.store_rows(
            "first_last_ratings",
            result.iter().cloned().map(RatingEvent::into_tuple),
        );
        Ok(result)
    }

    /// Movies whose title carries a parenthesized `year` token. Stored
    /// under `movies_from_{year}`.
    pub async fn movies_from_year(
        &mut self,
        client: &Client,
        year: i32,
    ) -> Result<Vec<MovieEntry>, AuditError> {
        let key = format!("movies_from_{}", year);
        let sql = queries::movies_from_year(&self.tables);
        let pattern = queries::year_pattern(year);
        let rows = db::fetch_all(client, &key, &sql, &[&pattern]).await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            result.push(MovieEntry {
                movie_id: row.try_get(0)?,
                title: row.try_get(1)?,
            });
        }

        self.store_rows(key, result.iter().cloned().map(MovieEntry::into_tuple));
        Ok(result)
    }

    fn store_rows(
        &mut self,
        key: impl Into<String>,
        tuples: impl Iterator<Item = Vec<Scalar>>,
    ) {
        self.report
            .insert(key, ReportValue::Rows(tuples.collect()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(password_env: &str) -> Config {
        let mut config = Config::default();
        config.database.password_env = password_env.to_string();
        config
    }

    #[test]
    fn test_new_fails_without_password_env() {
        let config = make_config("MOVIES_AUDIT_TEST_AUDITOR_NO_PASSWORD");
        assert!(matches!(
            Auditor::new(&config),
            Err(AuditError::Configuration { .. })
        ));
    }

    #[test]
    fn test_sql_statements_cover_all_queries_in_order() {
        std::env::set_var("MOVIES_AUDIT_TEST_AUDITOR_PLAN_PASSWORD", "pw");
        let config = make_config("MOVIES_AUDIT_TEST_AUDITOR_PLAN_PASSWORD");
        let auditor = Auditor::new(&config).unwrap();

        let statements = auditor.sql_statements();
        let keys: Vec<&str> = statements.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "movies_count",
                "most_common_genre",
                "top_10",
                "most_active_users",
                "first_last_ratings",
                "movies_from_1990",
            ]
        );
    }

    #[test]
    fn test_sql_statements_reflect_configured_parameters() {
        std::env::set_var("MOVIES_AUDIT_TEST_AUDITOR_PARAMS_PASSWORD", "pw");
        let mut config = make_config("MOVIES_AUDIT_TEST_AUDITOR_PARAMS_PASSWORD");
        config.queries.top_count = 3;
        config.queries.year = 1995;
        config.tables.movies = "films".to_string();

        let auditor = Auditor::new(&config).unwrap();
        let statements = auditor.sql_statements();

        assert_eq!(statements[2].0, "top_3");
        assert_eq!(statements[5].0, "movies_from_1995");
        assert!(statements[0].1.contains("FROM films"));
    }

    #[test]
    fn test_new_starts_with_empty_report() {
        std::env::set_var("MOVIES_AUDIT_TEST_AUDITOR_EMPTY_PASSWORD", "pw");
        let config = make_config("MOVIES_AUDIT_TEST_AUDITOR_EMPTY_PASSWORD");
        let auditor = Auditor::new(&config).unwrap();

        assert!(auditor.report().is_empty());
        assert_eq!(
            auditor.output_path(),
            Path::new("/movies-audit-result/audit-result.md")
        );
    }
}
