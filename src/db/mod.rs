//! Database access.
//!
//! Direct PostgreSQL access over a single tokio-postgres connection: no
//! pooling, no retries, one read-only session per audit run. The SQL text
//! for the analytical queries lives in [`queries`].

pub mod queries;

use crate::config::DatabaseConfig;
use crate::error::AuditError;
use std::fmt;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, error};

/// Resolved connection parameters for one audit run.
///
/// The password is read from the environment exactly once, at construction;
/// a missing or empty value is a configuration error surfaced before any
/// connection attempt.
#[derive(Clone)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    password: String,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ConnectionParams {
    /// Resolve parameters from config, reading the password from the
    /// environment variable named by `password_env`.
    pub fn resolve(config: &DatabaseConfig) -> Result<Self, AuditError> {
        let password = std::env::var(&config.password_env)
            .ok()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AuditError::Configuration {
                env_var: config.password_env.clone(),
            })?;

        Ok(Self {
            host: config.host.clone(),
            port: config.port,
            dbname: config.dbname.clone(),
            user: config.user.clone(),
            password,
        })
    }
}

/// Open a single connection to the database.
///
/// The connection driver runs on a spawned task and terminates when the
/// returned client is dropped, which releases the session on every exit
/// path.
pub async fn connect(params: &ConnectionParams) -> Result<Client, AuditError> {
    debug!(
        "Connecting to {}:{}/{} as {}",
        params.host, params.port, params.dbname, params.user
    );

    let mut pg_config = tokio_postgres::Config::new();
    pg_config
        .host(&params.host)
        .port(params.port)
        .dbname(&params.dbname)
        .user(&params.user)
        .password(&params.password);

    let (client, connection) =
        pg_config
            .connect(NoTls)
            .await
            .map_err(|source| AuditError::Connection {
                host: params.host.clone(),
                port: params.port,
                source,
            })?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("Database connection error: {}", e);
        }
    });

    Ok(client)
}

/// Run one read-only query and fetch all result rows.
///
/// Every audit query is expected to return at least one row against the
/// known dataset; an empty result set means a broken query or an
/// empty/corrupt table and aborts the run. A `count(*)` always yields one
/// row and can never trip this.
pub async fn fetch_all(
    client: &Client,
    name: &str,
    sql: &str,
    params: &[&(dyn ToSql + Sync)],
) -> Result<Vec<Row>, AuditError> {
    debug!("Executing query '{}'", name);
    let rows = client.query(sql, params).await?;

    if rows.is_empty() {
        return Err(AuditError::NoData {
            query: name.to_string(),
        });
    }

    debug!("Query '{}' returned {} rows", name, rows.len());
    Ok(rows)
}
