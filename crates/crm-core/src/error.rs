//! # Error Types
//!
//! Domain-specific error types for crm-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  crm-core errors (this file)                                           │
//! │  ├── CoreError        - Envelope and domain errors                     │
//! │  └── ValidationError  - Form input failures (one per field)            │
//! │                                                                         │
//! │  crm-data errors                                                       │
//! │  ├── SourceError      - Unexpected faults raised by a data source      │
//! │  └── DataError        - Session storage failures                       │
//! │                                                                         │
//! │  crm-store errors                                                      │
//! │  └── StoreError       - Actor channel failures                         │
//! │                                                                         │
//! │  Validation never reaches a store. Source faults become fixed          │
//! │  fallback messages at the store boundary.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors raised while interpreting collaborator responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The collaborator answered `success: false`.
    ///
    /// The message is surfaced verbatim as the lifecycle error.
    #[error("{0}")]
    Rejected(String),

    /// The collaborator answered `success: true` but carried no payload.
    #[error("Response for {operation} carried no data")]
    MissingData { operation: String },

    /// A status name that is not one of New, Contacted, Converted, Lost.
    #[error("Unknown lead status: {0}")]
    UnknownStatus(String),

    /// A propagation policy name that is not recognised.
    #[error("Unknown propagation policy: {0}")]
    UnknownPolicy(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a MissingData error for the named operation.
    pub fn missing_data(operation: impl Into<String>) -> Self {
        CoreError::MissingData {
            operation: operation.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Form input validation errors.
///
/// The `Display` text is what the form shows next to the field, so the
/// wording follows the mobile screens exactly ("Email is required").
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (email, phone).
    #[error("Invalid {field} format")]
    InvalidFormat { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value is above the allowed maximum.
    #[error("{field} must not exceed {max}")]
    Exceeds { field: String, max: String },

    /// Two fields that must match do not.
    #[error("{field} must match")]
    Mismatch { field: String },
}

impl ValidationError {
    /// Returns the name of the field this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidFormat { field }
            | ValidationError::Negative { field }
            | ValidationError::Exceeds { field, .. }
            | ValidationError::Mismatch { field } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
