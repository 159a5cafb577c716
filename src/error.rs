//! Error types for the PostgreSQL admin API.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Every variant carries a human-readable message, and the HTTP layer maps each kind
//! to a status code through [`IntoResponse`].

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Encoding error: {message}")]
    Encoding { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AdminError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Database { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Machine-readable code used in error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection_error",
            Self::Database { .. } => "database_error",
            Self::Validation { .. } => "validation_error",
            Self::Encoding { .. } => "encoding_error",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// HTTP status for this error kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::Encoding { .. } => StatusCode::BAD_REQUEST,
            Self::Connection { .. } | Self::Database { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client errors are caused by the request payload itself.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Convert sqlx errors to AdminError.
impl From<sqlx::Error> for AdminError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => AdminError::connection(
                msg.to_string(),
                "Check the server URL format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                AdminError::database(
                    db_err.message(),
                    code,
                    "Check the object names, column types and privileges",
                )
            }
            sqlx::Error::RowNotFound => AdminError::database(
                "No rows returned",
                None,
                "Verify the query conditions match existing data",
            ),
            sqlx::Error::Io(io_err) => AdminError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => AdminError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => AdminError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnNotFound(col) => {
                AdminError::internal(format!("Column not found in result: {}", col))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                AdminError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => {
                AdminError::internal(format!("Decode error: {}", source))
            }
            sqlx::Error::WorkerCrashed => AdminError::internal("Database worker crashed"),
            _ => AdminError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for admin operations.
pub type AdminResult<T> = Result<T, AdminError>;

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sql_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let sql_state = match &self {
            AdminError::Database { sql_state, .. } => sql_state.clone(),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
                sql_state,
                suggestion: self.suggestion().map(String::from),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdminError::connection("Failed to connect", "Check credentials");
        assert!(err.to_string().contains("Connection failed"));
    }

    #[test]
    fn test_error_suggestion() {
        let err = AdminError::database(
            "Syntax error",
            Some("42601".to_string()),
            "Check SQL syntax",
        );
        assert_eq!(err.suggestion(), Some("Check SQL syntax"));
        assert_eq!(AdminError::validation("bad").suggestion(), None);
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = AdminError::validation("row 3 has 3 cells, expected 2");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.is_client_error());
    }

    #[test]
    fn test_encoding_maps_to_bad_request() {
        let err = AdminError::encoding("invalid utf-8");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_server_errors_map_to_500() {
        for err in [
            AdminError::connection("refused", "retry"),
            AdminError::database("permission denied", Some("42501".into()), "grant"),
            AdminError::internal("boom"),
        ] {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
            assert!(!err.is_client_error());
        }
    }

    #[test]
    fn test_codes() {
        assert_eq!(AdminError::validation("x").code(), "validation_error");
        assert_eq!(AdminError::encoding("x").code(), "encoding_error");
        assert_eq!(AdminError::connection("x", "y").code(), "connection_error");
    }

    #[test]
    fn test_io_error_is_connection() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: AdminError = sqlx::Error::Io(io).into();
        assert!(matches!(err, AdminError::Connection { .. }));
    }

    #[test]
    fn test_row_not_found_is_database() {
        let err: AdminError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AdminError::Database { sql_state: None, .. }));
    }
}
