//! # CLI Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the CLI                                │
//! │                                                                         │
//! │  crm customers add --name ""                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, CliError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Form invalid? ──── Vec<ValidationError> ─────────┐             │  │
//! │  │         │                                          │             │  │
//! │  │         ▼                                          ▼             │  │
//! │  │  Settlement::Rejected ── "Customer not found" ── CliError ─────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Storage / store fault ── logged, generic text ──┘              │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: [Rejected] Customer not found                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Data-source failure messages are shown verbatim; they were written for
//! the user. Internal faults are logged and replaced by a fixed message.

use serde::Serialize;
use thiserror::Error;

use crm_core::{CoreError, Settlement, ValidationError};
use crm_data::DataError;
use crm_store::StoreError;
use crm_transport::TransportError;

/// Error returned from CLI commands.
///
/// With `--json` this is what gets printed:
/// ```json
/// {
///   "code": "REJECTED",
///   "message": "Invalid email or password"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct CliError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed before any call was made
    ValidationError,

    /// The data source answered with a failure message
    Rejected,

    /// The command needs a signed-in user
    NotSignedIn,

    /// Config file or environment is invalid
    ConfigError,

    /// Session storage failed
    StorageError,

    /// Anything else
    Internal,
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Rejected, message)
    }

    pub fn not_signed_in() -> Self {
        CliError::new(ErrorCode::NotSignedIn, "Not signed in. Run `crm login` first")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Internal, message)
    }
}

/// Unwraps a fulfilled settlement, turning a rejection into [`ErrorCode::Rejected`].
pub fn fulfilled<T>(settlement: Settlement<T>) -> CliResult<T> {
    match settlement {
        Settlement::Fulfilled(value) => Ok(value),
        Settlement::Rejected(message) => Err(CliError::rejected(message)),
    }
}

/// Fails with every field error joined, or succeeds when there are none.
pub fn check(errors: Vec<ValidationError>) -> CliResult<()> {
    if errors.is_empty() {
        return Ok(());
    }
    let message = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(CliError::validation(message))
}

// =============================================================================
// Conversions
// =============================================================================

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Store failed: {}", err);
        CliError::internal("Store is not running")
    }
}

impl From<DataError> for CliError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::ConnectionFailed(e) => {
                tracing::error!("Session database connection failed: {}", e);
                CliError::new(ErrorCode::StorageError, "Could not open the session database")
            }
            DataError::MigrationFailed(e) => {
                tracing::error!("Session database migration failed: {}", e);
                CliError::new(ErrorCode::StorageError, "Session database migration failed")
            }
            other => {
                tracing::error!("Session storage error: {}", other);
                CliError::new(ErrorCode::StorageError, "Session storage operation failed")
            }
        }
    }
}

impl From<TransportError> for CliError {
    fn from(err: TransportError) -> Self {
        if err.is_config_error() {
            return CliError::new(ErrorCode::ConfigError, err.to_string());
        }
        tracing::error!("HTTP client setup failed: {}", err);
        CliError::internal("Failed to start the HTTP client")
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => CliError::validation(e.to_string()),
            other => CliError::validation(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON rendering failed: {}", err);
        CliError::internal("Failed to render output")
    }
}
