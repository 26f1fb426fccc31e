//! # Store Error Types
//!
//! A store never fails because its data source did: those outcomes become
//! lifecycle errors inside the state. What is left is the actor plumbing.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Where failures end up                             │
//! │                                                                         │
//! │  envelope success:false ──► state.lifecycle.error = message             │
//! │  SourceError            ──► state.lifecycle.error = fixed fallback      │
//! │  actor gone             ──► StoreError (this file)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for store calls.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The actor's command channel is closed.
    #[error("Channel error in {store} store: {message}")]
    ChannelError { store: &'static str, message: String },

    /// The actor stopped before the operation settled.
    #[error("The {0} store is shutting down")]
    ShuttingDown(&'static str),
}

impl StoreError {
    pub(crate) fn channel(store: &'static str, message: impl Into<String>) -> Self {
        StoreError::ChannelError {
            store,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_store() {
        let err = StoreError::channel("leads", "Failed to send command");
        assert_eq!(
            err.to_string(),
            "Channel error in leads store: Failed to send command"
        );
        assert_eq!(
            StoreError::ShuttingDown("auth").to_string(),
            "The auth store is shutting down"
        );
    }
}
