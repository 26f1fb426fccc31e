//! # Transport Error Types
//!
//! Errors raised while setting up the transport. Errors that happen during
//! a call are either failure envelopes or [`SourceError`]s, never these.
//!
//! ```text
//! ┌─────────────────┐  ┌─────────────────┐
//! │  Configuration  │  │     Client      │
//! │                 │  │                 │
//! │  InvalidConfig  │  │  ClientBuild    │
//! │  InvalidUrl     │  │                 │
//! │  ConfigLoad     │  │                 │
//! │  ConfigSave     │  │                 │
//! └─────────────────┘  └─────────────────┘
//! ```
//!
//! [`SourceError`]: crm_data::SourceError

use thiserror::Error;

/// Result type alias for transport setup.
pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, Error)]
pub enum TransportError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A configuration value is out of range.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// The API base URL does not parse or is not http(s).
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Client Errors
    // =========================================================================
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl TransportError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            TransportError::InvalidConfig(_)
                | TransportError::InvalidUrl(_)
                | TransportError::ConfigLoadFailed(_)
                | TransportError::ConfigSaveFailed(_)
        )
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        TransportError::InvalidUrl(err.to_string())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::ClientBuild(err.to_string())
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for TransportError {
    fn from(err: toml::de::Error) -> Self {
        TransportError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for TransportError {
    fn from(err: toml::ser::Error) -> Self {
        TransportError::ConfigSaveFailed(err.to_string())
    }
}
