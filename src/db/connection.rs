//! Per-request PostgreSQL connections.
//!
//! The factory holds the server-level endpoint (host, port, credentials) and opens a
//! fresh connection to whichever database a request names. Connections are never
//! pooled or shared: the caller owns the returned connection and closes it when the
//! operation completes.

use crate::config::ServerConfig;
use crate::error::{AdminError, AdminResult};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::{Connection, PgConnection};
use std::str::FromStr;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// SQLSTATE for `invalid_catalog_name` (database does not exist).
const SQLSTATE_INVALID_CATALOG_NAME: &str = "3D000";
/// SQLSTATE class for `invalid_authorization_specification`.
const SQLSTATE_INVALID_AUTHORIZATION: &str = "28";

#[derive(Debug, Clone)]
pub struct ConnectionFactory {
    server: ServerConfig,
    connect_timeout: Duration,
}

impl ConnectionFactory {
    pub fn new(server: ServerConfig, connect_timeout: Duration) -> Self {
        Self {
            server,
            connect_timeout,
        }
    }

    /// Build connect options for `db_name` on the configured server.
    pub fn connect_options(&self, db_name: &str) -> AdminResult<PgConnectOptions> {
        if db_name.trim().is_empty() {
            return Err(AdminError::validation("db_name must not be empty"));
        }

        let mut options = PgConnectOptions::new()
            .host(&self.server.host)
            .port(self.server.port)
            .username(&self.server.username)
            .database(db_name);

        if let Some(password) = &self.server.password {
            options = options.password(password);
        }
        if let Some(mode) = self.server.param("sslmode") {
            let mode = PgSslMode::from_str(mode).map_err(|e| {
                AdminError::connection(
                    format!("Invalid sslmode '{}': {}", mode, e),
                    "Use one of disable, allow, prefer, require, verify-ca, verify-full",
                )
            })?;
            options = options.ssl_mode(mode);
        }
        if let Some(name) = self.server.param("application_name") {
            options = options.application_name(name);
        }

        Ok(options)
    }

    /// Open a new connection to `db_name`.
    pub async fn connect(&self, db_name: &str) -> AdminResult<PgConnection> {
        let options = self.connect_options(db_name)?;

        debug!(
            host = %self.server.host,
            port = self.server.port,
            db_name = %db_name,
            "Opening database connection"
        );

        match timeout(self.connect_timeout, PgConnection::connect_with(&options)).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => Err(classify_connect_error(db_name, e)),
            Err(_) => Err(AdminError::connection(
                format!(
                    "Timed out after {}s connecting to database '{}'",
                    self.connect_timeout.as_secs(),
                    db_name
                ),
                "Check network connectivity and database server status",
            )),
        }
    }
}

/// Close a connection, logging rather than failing if the server already went away.
pub async fn close_quietly(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        debug!(error = %e, "Error while closing database connection");
    }
}

/// Every failure to establish a connection is a connection error, whatever its source.
fn classify_connect_error(db_name: &str, err: sqlx::Error) -> AdminError {
    if let sqlx::Error::Database(db_err) = &err {
        let code = db_err.code().map(|c| c.to_string()).unwrap_or_default();
        if code == SQLSTATE_INVALID_CATALOG_NAME {
            return AdminError::connection(
                format!("Database '{}' does not exist", db_name),
                "Verify the database name exists on the server",
            );
        }
        if code.starts_with(SQLSTATE_INVALID_AUTHORIZATION) {
            return AdminError::connection(
                format!("Authentication rejected for database '{}': {}", db_name, db_err.message()),
                "Check the configured username and password",
            );
        }
        return AdminError::connection(
            format!("Failed to connect to '{}': {}", db_name, db_err.message()),
            "Check the connection credentials are correct",
        );
    }

    match AdminError::from(err) {
        AdminError::Connection {
            message,
            suggestion,
        } => AdminError::connection(
            format!("Failed to connect to '{}': {}", db_name, message),
            suggestion,
        ),
        other => AdminError::connection(
            format!("Failed to connect to '{}': {}", db_name, other),
            "Check network connectivity and database server status",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory(url: &str) -> ConnectionFactory {
        ConnectionFactory::new(ServerConfig::parse(url).unwrap(), Duration::from_secs(2))
    }

    #[test]
    fn test_connect_options_targets_requested_database() {
        let f = factory("postgres://admin:pw@db.example:6543");
        let opts = f.connect_options("shop").unwrap();
        assert_eq!(opts.get_host(), "db.example");
        assert_eq!(opts.get_port(), 6543);
        assert_eq!(opts.get_username(), "admin");
        assert_eq!(opts.get_database(), Some("shop"));
    }

    #[test]
    fn test_connect_options_rejects_empty_database() {
        let f = factory("postgres://admin@localhost");
        let err = f.connect_options("  ").unwrap_err();
        assert!(matches!(err, AdminError::Validation { .. }));
    }

    #[test]
    fn test_connect_options_rejects_bad_sslmode() {
        let f = factory("postgres://admin@localhost?sslmode=sometimes");
        let err = f.connect_options("shop").unwrap_err();
        assert!(matches!(err, AdminError::Connection { .. }));
    }

    #[test]
    fn test_connect_options_accepts_sslmode() {
        let f = factory("postgres://admin@localhost?sslmode=disable");
        assert!(f.connect_options("shop").is_ok());
    }

    #[tokio::test]
    async fn test_connect_refused_is_connection_error() {
        // Port 1 is reserved and nothing listens there in test environments.
        let f = factory("postgres://admin:pw@127.0.0.1:1");
        let err = f.connect("shop").await.unwrap_err();
        assert!(matches!(err, AdminError::Connection { .. }));
        assert!(err.to_string().contains("shop"));
    }
}
