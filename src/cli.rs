//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// movies-audit - analytical SQL auditor for a movie-ratings database
///
/// Connects to a PostgreSQL movies/ratings dataset, runs a fixed set of
/// analytical queries, and writes the results to a text report file.
/// The database password is read from an environment variable
/// (MOVIES_DB_PASSWORD by default).
///
/// Examples:
///   movies-audit
///   movies-audit --host localhost --output audit.md
///   movies-audit --year 1995 --top-count 3
///   movies-audit --dry-run
///   movies-audit --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .movies-audit.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// Overrides the config file setting.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Database host to connect to
    #[arg(long, value_name = "HOST", env = "MOVIES_DB_HOST")]
    pub host: Option<String>,

    /// How many top-rated movies to report
    #[arg(long, value_name = "COUNT")]
    pub top_count: Option<i64>,

    /// How many of the most active users to report
    #[arg(long, value_name = "COUNT")]
    pub active_count: Option<i64>,

    /// Release year to filter movies by
    #[arg(long, value_name = "YEAR")]
    pub year: Option<i32>,

    /// Print the audit queries without connecting to the database
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .movies-audit.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(top_count) = self.top_count {
            if top_count < 1 {
                return Err("Top count must be at least 1".to_string());
            }
        }

        if let Some(active_count) = self.active_count {
            if active_count < 1 {
                return Err("Active count must be at least 1".to_string());
            }
        }

        if let Some(year) = self.year {
            if !(1870..=2100).contains(&year) {
                return Err(format!("Year {} is outside the plausible range", year));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            config: None,
            output: None,
            host: None,
            top_count: None,
            active_count: None,
            year: None,
            dry_run: false,
            init_config: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_validation_defaults_ok() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_counts() {
        let mut args = make_args();
        args.top_count = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.active_count = Some(-1);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_implausible_year() {
        let mut args = make_args();
        args.year = Some(10990);
        assert!(args.validate().is_err());

        args.year = Some(1990);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
