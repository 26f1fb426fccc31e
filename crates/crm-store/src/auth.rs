//! # Auth Store
//!
//! Who is signed in. The token itself lives in the persisted session, which
//! the auth data source writes; the store mirrors user and token so screens
//! can render without touching storage.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  restore() ──► saved_session() ──► user, token   (app start)           │
//! │                                                                         │
//! │  login / register ──► success ──► user, token                          │
//! │                   └─► failure ──► error, user unchanged                │
//! │                                                                         │
//! │  refresh_token() ──► success ──► token (and user) replaced             │
//! │                                                                         │
//! │  logout() ──────────────────────► user = None, token = None            │
//! │                                    whatever the data source answers    │
//! │                                                                         │
//! │  Session::expire() (HTTP 401)                                          │
//! │      └─► SessionEvent::Unauthenticated ──► forced sign-out             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `is_authenticated()` is derived from `user`, so the two cannot disagree.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crm_core::{
    AuthPayload, LoginCredentials, RegisterData, RequestLifecycle, Settlement, User,
};
use crm_data::{AuthSource, Session, SessionEvent};

use crate::actor::{StoreActor, StoreHandle, StoreState};
use crate::error::StoreResult;
use crate::outcome::Operation;

const LOGIN: Operation = Operation::new("auth.login", "Failed to log in");
const REGISTER: Operation = Operation::new("auth.register", "Failed to register");
const LOGOUT: Operation = Operation::new("auth.logout", "Failed to log out");
const REFRESH: Operation = Operation::new("auth.refresh", "Failed to refresh token");
const RESTORE: Operation = Operation::new("auth.restore", "Failed to restore session");

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub user: Option<User>,
    #[serde(skip)]
    pub token: Option<String>,
    pub lifecycle: RequestLifecycle,
}

impl StoreState for AuthState {
    fn lifecycle_mut(&mut self) -> &mut RequestLifecycle {
        &mut self.lifecycle
    }
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.lifecycle.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.lifecycle.error()
    }

    fn sign_in(&mut self, payload: AuthPayload) {
        self.user = Some(payload.user);
        self.token = Some(payload.token);
    }

    fn sign_out(&mut self) {
        self.user = None;
        self.token = None;
    }
}

// =============================================================================
// Store
// =============================================================================

#[derive(Clone)]
pub struct AuthStore {
    handle: StoreHandle<AuthState>,
    source: Arc<dyn AuthSource>,
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl AuthStore {
    /// Spawns the store and a listener that signs out on session expiry.
    pub fn spawn(source: Arc<dyn AuthSource>, session: &Session) -> Self {
        let handle = StoreActor::spawn("auth", AuthState::default());
        tokio::spawn(watch_session(handle.clone(), session.subscribe()));
        AuthStore { handle, source }
    }

    pub fn snapshot(&self) -> AuthState {
        self.handle.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.handle.subscribe()
    }

    pub async fn shutdown(&self) -> StoreResult<()> {
        self.handle.shutdown().await
    }

    // =========================================================================
    // Data-source operations
    // =========================================================================

    pub async fn login(&self, credentials: LoginCredentials) -> StoreResult<Settlement<User>> {
        debug!(email = %credentials.email, "Signing in");
        let source = Arc::clone(&self.source);
        let call = async move { LOGIN.settle(source.login(credentials).await) };
        self.sign_in_with(LOGIN, call).await
    }

    /// Registers and signs in. Password confirmation is the form's job; the
    /// data is forwarded as given.
    pub async fn register(&self, data: RegisterData) -> StoreResult<Settlement<User>> {
        let source = Arc::clone(&self.source);
        let call = async move { REGISTER.settle(source.register(data).await) };
        self.sign_in_with(REGISTER, call).await
    }

    /// Signs out locally no matter how the data source answers.
    pub async fn logout(&self) -> StoreResult<()> {
        let source = Arc::clone(&self.source);
        let call = async move { LOGOUT.settle_ack(source.logout().await) };

        self.handle
            .run(LOGOUT.fallback, call, |state, settlement| {
                if let Settlement::Rejected(message) = settlement {
                    warn!(error = %message, "Logout call failed, signing out locally");
                }
                state.sign_out();
                state.lifecycle.settle(Settlement::Fulfilled(()));
            })
            .await
    }

    /// Swaps the token for a fresh one. A failure keeps the user signed in.
    pub async fn refresh_token(&self) -> StoreResult<Settlement<User>> {
        let source = Arc::clone(&self.source);
        let call = async move { REFRESH.settle(source.refresh().await) };
        self.sign_in_with(REFRESH, call).await
    }

    /// Rehydrates the user from the persisted session, if there is one.
    pub async fn restore(&self) -> StoreResult<Option<User>> {
        let source = Arc::clone(&self.source);
        let call = async move { RESTORE.settle_value(source.saved_session().await) };

        self.handle
            .run(RESTORE.fallback, call, |state, settlement| {
                match state.lifecycle.settle(settlement) {
                    Some(Some(payload)) => {
                        info!(user_id = %payload.user.id, "Session restored");
                        state.sign_in(payload);
                    }
                    Some(None) => debug!("No saved session"),
                    None => {}
                }
                state.user.clone()
            })
            .await
    }

    // =========================================================================
    // Reducers
    // =========================================================================

    pub async fn clear_error(&self) -> StoreResult<()> {
        self.handle.apply(|state| state.lifecycle.clear_error()).await
    }

    async fn sign_in_with<C>(&self, op: Operation, call: C) -> StoreResult<Settlement<User>>
    where
        C: std::future::Future<Output = Settlement<AuthPayload>> + Send + 'static,
    {
        self.handle
            .run(op.fallback, call, |state, settlement| {
                let user = settlement.clone().map(|payload| payload.user);
                if let Some(payload) = state.lifecycle.settle(settlement) {
                    state.sign_in(payload);
                }
                user
            })
            .await
    }
}

/// Signs the store out whenever the session reports it expired.
async fn watch_session(handle: StoreHandle<AuthState>, mut events: broadcast::Receiver<SessionEvent>) {
    loop {
        let event = tokio::select! {
            event = events.recv() => event,
            _ = handle.closed() => break,
        };

        match event {
            Ok(SessionEvent::Unauthenticated) | Err(broadcast::error::RecvError::Lagged(_)) => {
                warn!("Session rejected by the server, signing out");
                if handle.apply(AuthState::sign_out).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    debug!("Session watcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_core::Role;
    use crm_data::mock::op;
    use crm_data::{Latency, MockAuthSource};

    fn store() -> (AuthStore, Arc<MockAuthSource>, Session) {
        let session = Session::in_memory();
        let source = Arc::new(MockAuthSource::new(session.clone(), Latency::none()));
        (AuthStore::spawn(source.clone(), &session), source, session)
    }

    #[tokio::test]
    async fn test_admin_login() {
        let (store, _, session) = store();
        let settled = store
            .login(LoginCredentials::new("admin@example.com", "password123"))
            .await
            .unwrap();
        assert!(settled.is_fulfilled());

        let state = store.snapshot();
        assert!(!state.is_loading());
        assert_eq!(state.error(), None);
        assert!(state.is_authenticated());
        assert_eq!(state.user.as_ref().unwrap().role, Role::Admin);
        assert_eq!(state.token.as_deref(), Some("mock-jwt-token-admin"));
        assert_eq!(
            session.token().await.unwrap().as_deref(),
            Some("mock-jwt-token-admin")
        );
    }

    #[tokio::test]
    async fn test_wrong_login_keeps_user_null() {
        let (store, _, _) = store();
        let settled = store
            .login(LoginCredentials::new("wrong@x.com", "x"))
            .await
            .unwrap();
        assert_eq!(settled, Settlement::Rejected("Invalid email or password".into()));

        let state = store.snapshot();
        assert!(!state.is_loading());
        assert_eq!(state.error(), Some("Invalid email or password"));
        assert_eq!(state.user, None);
        assert!(!state.is_authenticated());
    }

    #[tokio::test]
    async fn test_register_forwards_mismatch_to_source() {
        let (store, _, _) = store();
        let data = RegisterData {
            name: "Lin".into(),
            email: "lin@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret2".into(),
        };
        store.register(data).await.unwrap();
        assert_eq!(store.snapshot().error(), Some("Passwords do not match"));
    }

    #[tokio::test]
    async fn test_logout_clears_even_on_failure() {
        let (store, source, session) = store();
        store
            .login(LoginCredentials::new("user@example.com", "password123"))
            .await
            .unwrap();

        source.faults().fail_next(op::AUTH_LOGOUT);
        store.logout().await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.user, None);
        assert_eq!(state.token, None);
        assert_eq!(state.error(), None);
        assert_eq!(session.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_and_refresh() {
        let (first, _, session) = store();
        first
            .login(LoginCredentials::new("user@example.com", "password123"))
            .await
            .unwrap();

        // A second store over the same session picks the user back up
        let source = Arc::new(MockAuthSource::new(session.clone(), Latency::none()));
        let second = AuthStore::spawn(source, &session);
        let user = second.restore().await.unwrap();
        assert_eq!(user.unwrap().email, "user@example.com");

        second.refresh_token().await.unwrap();
        let state = second.snapshot();
        assert!(state.token.as_deref().unwrap().starts_with("refreshed-token-"));
        assert_eq!(state.user.as_ref().unwrap().id, "2");
    }

    #[tokio::test]
    async fn test_restore_without_session() {
        let (store, source, _) = store();
        assert_eq!(store.restore().await.unwrap(), None);
        assert_eq!(store.snapshot().error(), None);

        source.faults().fail_next(op::AUTH_RESTORE);
        store.restore().await.unwrap();
        assert_eq!(store.snapshot().error(), Some("Failed to restore session"));
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_user() {
        let (store, source, _) = store();
        store
            .login(LoginCredentials::new("admin@example.com", "password123"))
            .await
            .unwrap();

        source.faults().fail_next(op::AUTH_REFRESH);
        store.refresh_token().await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.error(), Some("Failed to refresh token"));
        assert!(state.is_authenticated());
    }

    #[tokio::test]
    async fn test_session_expiry_forces_logout() {
        let (store, _, session) = store();
        store
            .login(LoginCredentials::new("admin@example.com", "password123"))
            .await
            .unwrap();
        let mut snapshots = store.subscribe();

        session.expire().await.unwrap();
        snapshots
            .wait_for(|state| !state.is_authenticated())
            .await
            .unwrap();

        assert_eq!(store.snapshot().token, None);
        assert_eq!(session.token().await.unwrap(), None);
    }
}
