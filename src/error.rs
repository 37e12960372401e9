//! Error types for the capture service.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Executor misuse, pagination bounds and store failures each get their own variant so
//! the HTTP layer can map them to status codes without string matching.

use crate::db::Role;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sqlx::error::ErrorKind;
use std::time::Duration;
use thiserror::Error;

fn describe_limit(limit: &Option<Duration>) -> String {
    match limit {
        Some(limit) => format!("exceeded {:?}", limit),
        None => "timed out".to_string(),
    }
}

/// Which pagination round trip a store error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPass {
    /// `SELECT COUNT(*)` over the wrapped base query
    Count,
    /// The base query with `LIMIT`/`OFFSET` appended
    Bounded,
}

impl std::fmt::Display for QueryPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count => write!(f, "count"),
            Self::Bounded => write!(f, "bounded"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database unreachable: {message}")]
    Unreachable { message: String },

    #[error("Failed to begin transaction: {message}")]
    BeginFailed { message: String },

    #[error("Role violation: {operation} is not allowed on a {role} executor")]
    RoleViolation { role: Role, operation: String },

    #[error("Type mismatch: {type_name} is not a recognized execution context")]
    TypeMismatch { type_name: String },

    #[error("Invalid on connection: {operation} requires a transaction executor")]
    InvalidOnConnection { operation: String },

    #[error("Transaction already finished: {operation} after commit or rollback")]
    TransactionFinished { operation: String },

    #[error("Rows out of range: {rows} (must be between 1 and {max})")]
    RowsOutOfRange { rows: i64, max: i64 },

    #[error("Invalid page: {page} (must be between 1 and {last})")]
    InvalidPage { page: i64, last: i64 },

    #[error("Query failed during {pass} pass: {source}")]
    Query {
        pass: QueryPass,
        #[source]
        source: Box<DbError>,
    },

    #[error("Timeout: {operation} {}", describe_limit(.limit))]
    Timeout {
        operation: String,
        /// `None` when the limit is owned by the pool rather than this service.
        limit: Option<Duration>,
    },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "23503" for a foreign key violation
        sql_state: Option<String>,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create an unreachable-store error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    /// Create a begin-failed error.
    pub fn begin_failed(message: impl Into<String>) -> Self {
        Self::BeginFailed {
            message: message.into(),
        }
    }

    /// Create a role violation error.
    pub fn role_violation(role: Role, operation: impl Into<String>) -> Self {
        Self::RoleViolation {
            role,
            operation: operation.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(type_name: impl Into<String>) -> Self {
        Self::TypeMismatch {
            type_name: type_name.into(),
        }
    }

    pub fn invalid_on_connection(operation: impl Into<String>) -> Self {
        Self::InvalidOnConnection {
            operation: operation.into(),
        }
    }

    pub fn transaction_finished(operation: impl Into<String>) -> Self {
        Self::TransactionFinished {
            operation: operation.into(),
        }
    }

    /// Create a rows-out-of-range error.
    pub fn rows_out_of_range(rows: i64, max: i64) -> Self {
        Self::RowsOutOfRange { rows, max }
    }

    /// Wrap a store error with the pagination pass it happened in.
    pub fn query(pass: QueryPass, source: DbError) -> Self {
        Self::Query {
            pass,
            source: Box::new(source),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, limit: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            limit: Some(limit),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
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
            Self::Query { source, .. } => source.suggestion(),
            _ => None,
        }
    }

    /// Short machine-readable kind used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "unreachable",
            Self::BeginFailed { .. } => "begin_failed",
            Self::RoleViolation { .. } => "role_violation",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::InvalidOnConnection { .. } => "invalid_on_connection",
            Self::TransactionFinished { .. } => "transaction_finished",
            Self::RowsOutOfRange { .. } => "rows_out_of_range",
            Self::InvalidPage { .. } => "invalid_page",
            Self::Query { .. } => "query",
            Self::Timeout { .. } => "timeout",
            Self::Connection { .. } => "connection",
            Self::Database { .. } => "database",
            Self::NotFound { .. } => "not_found",
            Self::InvalidInput { .. } => "invalid_input",
            Self::Internal { .. } => "internal",
        }
    }

    /// HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidInput { .. } | Self::RowsOutOfRange { .. } | Self::InvalidPage { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Unreachable { .. } | Self::Connection { .. } | Self::BeginFailed { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Query { source, .. } => source.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) if db_err.kind() == ErrorKind::UniqueViolation => {
                DbError::invalid_input(format!("Duplicate value: {}", db_err.message()))
            }
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::database(db_err.message(), code)
            }
            sqlx::Error::RowNotFound => DbError::database("No rows returned", None),
            sqlx::Error::PoolTimedOut => DbError::Timeout {
                operation: "connection pool acquire".to_string(),
                limit: None,
            },
            sqlx::Error::PoolClosed => {
                DbError::connection("Connection pool is closed", "Restart the service")
            }
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnNotFound(col) => {
                DbError::internal(format!("Column not found: {}", col))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => DbError::internal("Database worker crashed"),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

impl IntoResponse for DbError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "Request failed");
        }
        let mut body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let Some(suggestion) = self.suggestion() {
            body["suggestion"] = serde_json::Value::from(suggestion);
        }
        (status, axum::Json(body)).into_response()
    }
}
