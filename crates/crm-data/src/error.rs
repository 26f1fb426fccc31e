//! # Data Error Types
//!
//! Error types for data sources and session storage.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DataError (storage) ← Adds context and categorization                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SourceError (data source fault) ← Storage, decode, injected faults    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store: logged at error level, surfaced as the operation's fallback    │
//! │         message ("Failed to fetch customers")                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `SourceError` is never an expected outcome. "Customer not found" or
//! "Invalid email or password" travel as failure envelopes instead.

use thiserror::Error;

// =============================================================================
// Storage Errors
// =============================================================================

/// Session storage errors.
#[derive(Debug, Error)]
pub enum DataError {
    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored value could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Internal storage error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

/// Convert sqlx errors to DataError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → DataError::QueryFailed
/// sqlx::Error::PoolTimedOut   → DataError::PoolExhausted
/// sqlx::Error::PoolClosed     → DataError::ConnectionFailed
/// Other                       → DataError::Internal
/// ```
impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DataError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DataError::PoolExhausted,
            sqlx::Error::PoolClosed => DataError::ConnectionFailed("Pool is closed".to_string()),
            _ => DataError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DataError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DataError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Serialization(err.to_string())
    }
}

/// Result type for storage operations.
pub type DataResult<T> = Result<T, DataError>;

// =============================================================================
// Source Errors
// =============================================================================

/// An unexpected fault inside a data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request could not be sent at all.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body was not a valid envelope.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// Reading or writing the persisted session failed.
    #[error("Session storage error: {0}")]
    Storage(#[from] DataError),

    /// The source refused to serve the call (injected by tests and demos).
    #[error("Data source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    pub fn transport(message: impl Into<String>) -> Self {
        SourceError::Transport(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        SourceError::Decode(message.into())
    }

    pub fn unavailable(operation: impl Into<String>) -> Self {
        SourceError::Unavailable(operation.into())
    }
}

/// Result type for data-source calls.
pub type SourceResult<T> = Result<T, SourceError>;
