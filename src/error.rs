//! Error types for the audit run.
//!
//! Every failure is fatal: nothing is caught or retried internally, errors
//! propagate to `main` which logs them and exits nonzero. Partial query
//! results accumulated before a failure are discarded because the report is
//! only written after the full audit succeeds.

use thiserror::Error;

/// Errors that can abort an audit run.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The database password environment variable is unset or empty.
    ///
    /// Raised at Auditor construction, before any connection attempt.
    #[error("database password not provided; set it in the {env_var} environment variable")]
    Configuration { env_var: String },

    /// The database could not be reached. No retry is attempted.
    #[error("failed to connect to database at {host}:{port}: {source}")]
    Connection {
        host: String,
        port: u16,
        #[source]
        source: tokio_postgres::Error,
    },

    /// A query that is expected to always return at least one row came back
    /// empty. Given the known dataset this means a broken query or an
    /// empty/corrupt table, so the run halts rather than recording nothing.
    #[error("query '{query}' returned no rows")]
    NoData { query: String },

    /// Any other driver-level failure (malformed SQL, type mismatch, wire
    /// error mid-query).
    #[error(transparent)]
    Query(#[from] tokio_postgres::Error),

    /// Report file could not be written.
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_names_env_var() {
        let err = AuditError::Configuration {
            env_var: "MOVIES_DB_PASSWORD".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("MOVIES_DB_PASSWORD"));
        assert!(msg.contains("password not provided"));
    }

    #[test]
    fn test_no_data_error_names_query() {
        let err = AuditError::NoData {
            query: "most_common_genre".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "query 'most_common_genre' returned no rows"
        );
    }
}
