//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.movies-audit.toml` files. Defaults reproduce the fixed constants the
//! tool ships with; only the database password comes from the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Names of the audited tables.
    #[serde(default)]
    pub tables: TableConfig,

    /// Report output settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Query parameters.
    #[serde(default)]
    pub queries: QueryConfig,
}

/// Database connection settings.
///
/// The password itself never appears here; `password_env` names the
/// environment variable it is read from at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Database port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database name.
    #[serde(default = "default_dbname")]
    pub dbname: String,

    /// Database user.
    #[serde(default = "default_user")]
    pub user: String,

    /// Environment variable holding the database password.
    #[serde(default = "default_password_env")]
    pub password_env: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            dbname: default_dbname(),
            user: default_user(),
            password_env: default_password_env(),
        }
    }
}

fn default_host() -> String {
    "movies-db".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_dbname() -> String {
    "movies".to_string()
}

fn default_user() -> String {
    "movies".to_string()
}

fn default_password_env() -> String {
    "MOVIES_DB_PASSWORD".to_string()
}

/// Names of the four tables the audit reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default = "default_movies_table")]
    pub movies: String,

    #[serde(default = "default_links_table")]
    pub links: String,

    #[serde(default = "default_ratings_table")]
    pub ratings: String,

    #[serde(default = "default_tags_table")]
    pub tags: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            movies: default_movies_table(),
            links: default_links_table(),
            ratings: default_ratings_table(),
            tags: default_tags_table(),
        }
    }
}

fn default_movies_table() -> String {
    "movies".to_string()
}

fn default_links_table() -> String {
    "links".to_string()
}

fn default_ratings_table() -> String {
    "ratings".to_string()
}

fn default_tags_table() -> String {
    "tags".to_string()
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output file path. The file is fully overwritten on each run.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "/movies-audit-result/audit-result.md".to_string()
}

/// Parameters for the ranked queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// How many top-rated movies to report.
    #[serde(default = "default_top_count")]
    pub top_count: i64,

    /// How many of the most active users to report.
    #[serde(default = "default_active_count")]
    pub active_count: i64,

    /// Release year to filter movies by.
    #[serde(default = "default_year")]
    pub year: i32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_count: default_top_count(),
            active_count: default_active_count(),
            year: default_year(),
        }
    }
}

fn default_top_count() -> i64 {
    10
}

fn default_active_count() -> i64 {
    5
}

fn default_year() -> i32 {
    1990
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but
    /// can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".movies-audit.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings. Only
    /// explicitly provided values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.database.host = host.clone();
        }
        if let Some(ref output) = args.output {
            self.report.output = output.display().to_string();
        }
        if let Some(top_count) = args.top_count {
            self.queries.top_count = top_count;
        }
        if let Some(active_count) = args.active_count {
            self.queries.active_count = active_count;
        }
        if let Some(year) = args.year {
            self.queries.year = year;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
