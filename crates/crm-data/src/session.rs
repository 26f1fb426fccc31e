//! # Session
//!
//! The persisted sign-in (token + user) and the "session expired" signal.
//!
//! ## Forced Logout Flow
//! ```text
//! ┌───────────────┐  HTTP 401   ┌──────────────────────────┐
//! │ ApiClient     │ ──────────► │ Session::expire()        │
//! └───────────────┘             │  1. remove auth_token    │
//!                               │  2. remove user_data     │
//!                               │  3. broadcast            │
//!                               │     Unauthenticated      │
//!                               └────────────┬─────────────┘
//!                                            │ broadcast::Receiver
//!                                            ▼
//!                               ┌──────────────────────────┐
//!                               │ AuthStore: force logout  │
//!                               └──────────────────────────┘
//! ```
//!
//! `Session` is cheap to clone; every clone shares the same storage and
//! the same event channel.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crm_core::{AuthPayload, User, AUTH_TOKEN_KEY, USER_DATA_KEY};

use crate::error::DataResult;
use crate::storage::{MemoryStorage, SessionStorage};

/// Events published about the persisted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The server rejected the token. Storage has already been cleared.
    Unauthenticated,
}

/// Capacity of the event channel. Events are rare; a lagging receiver
/// only needs to see that one happened.
const EVENT_CAPACITY: usize = 16;

/// Persisted session plus its event channel.
#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn SessionStorage>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Session { storage, events }
    }

    /// A session that lives only as long as the process.
    pub fn in_memory() -> Self {
        Session::new(Arc::new(MemoryStorage::new()))
    }

    /// Subscribes to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// The persisted bearer token.
    pub async fn token(&self) -> DataResult<Option<String>> {
        self.storage.get(AUTH_TOKEN_KEY).await
    }

    /// The persisted user. A record that no longer decodes counts as absent.
    pub async fn user(&self) -> DataResult<Option<User>> {
        let Some(raw) = self.storage.get(USER_DATA_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable persisted user");
                Ok(None)
            }
        }
    }

    /// Token and user together, only when both are present.
    pub async fn load(&self) -> DataResult<Option<AuthPayload>> {
        let token = self.token().await?;
        let user = self.user().await?;
        Ok(token.zip(user).map(|(token, user)| AuthPayload { user, token }))
    }

    /// Persists a fresh sign-in.
    pub async fn persist(&self, payload: &AuthPayload) -> DataResult<()> {
        let user = serde_json::to_string(&payload.user)?;
        self.storage.set(AUTH_TOKEN_KEY, &payload.token).await?;
        self.storage.set(USER_DATA_KEY, &user).await?;
        debug!(user_id = %payload.user.id, "Session persisted");
        Ok(())
    }

    /// Removes the token and user.
    pub async fn clear(&self) -> DataResult<()> {
        self.storage.remove(AUTH_TOKEN_KEY).await?;
        self.storage.remove(USER_DATA_KEY).await?;
        debug!("Session cleared");
        Ok(())
    }

    /// Clears storage and tells subscribers the session is gone.
    ///
    /// The event is sent even if clearing storage failed; the server has
    /// already rejected the token either way.
    pub async fn expire(&self) -> DataResult<()> {
        info!("Session expired, clearing persisted credentials");
        let cleared = self.clear().await;
        // No subscribers is fine: nobody is signed in to log out
        let _ = self.events.send(SessionEvent::Unauthenticated);
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crm_core::Role;

    fn payload() -> AuthPayload {
        AuthPayload {
            user: User {
                id: "1".into(),
                email: "admin@example.com".into(),
                name: "Admin User".into(),
                role: Role::Admin,
                created_at: Utc::now(),
            },
            token: "mock-jwt-token-admin".into(),
        }
    }

    #[tokio::test]
    async fn test_persist_and_load() {
        let session = Session::in_memory();
        assert_eq!(session.load().await.unwrap(), None);

        session.persist(&payload()).await.unwrap();
        assert_eq!(session.load().await.unwrap(), Some(payload()));
        assert_eq!(
            session.token().await.unwrap().as_deref(),
            Some("mock-jwt-token-admin")
        );
    }

    #[tokio::test]
    async fn test_unreadable_user_counts_as_absent() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(AUTH_TOKEN_KEY, "t").await.unwrap();
        storage.set(USER_DATA_KEY, "{not json").await.unwrap();

        let session = Session::new(storage);
        assert_eq!(session.user().await.unwrap(), None);
        assert_eq!(session.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expire_clears_and_broadcasts() {
        let session = Session::in_memory();
        session.persist(&payload()).await.unwrap();
        let mut events = session.subscribe();

        session.clone().expire().await.unwrap();

        assert_eq!(events.recv().await.unwrap(), SessionEvent::Unauthenticated);
        assert_eq!(session.token().await.unwrap(), None);
        assert_eq!(session.user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expire_without_subscribers() {
        let session = Session::in_memory();
        assert!(session.expire().await.is_ok());
    }
}
