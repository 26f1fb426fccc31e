//! # State Module
//!
//! Everything a command needs, built once per invocation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ClientConfig ──► SessionState ──► backend ──► Stores::spawn           │
//! │                   (SQLite or       (mock or    (auth, customers,       │
//! │                    memory)          HTTP)       leads)                  │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────────┐  │
//! │  │ ClientConfig │  │ SessionState │  │ Stores                       │  │
//! │  │ read-only    │  │ token + user │  │ one actor per store; every   │  │
//! │  │              │  │ on disk      │  │ mutation goes through them   │  │
//! │  └──────────────┘  └──────────────┘  └──────────────────────────────┘  │
//! │                                                                         │
//! │  The session is shared: the auth source persists to it, the HTTP      │
//! │  client reads the token from it, and the auth store listens to it      │
//! │  for forced sign-out.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod session;

pub use session::SessionState;

use tracing::{debug, info};

use crm_core::User;
use crm_data::{Latency, MockBackend, Session};
use crm_store::{Sources, Stores};
use crm_transport::{ApiClient, BackendKind, ClientConfig, HttpBackend};

use crate::error::{CliError, CliResult};

#[derive(Debug)]
pub struct AppState {
    pub config: ClientConfig,
    pub session: SessionState,
    pub stores: Stores,
}

impl AppState {
    /// Opens the session, builds the configured backend, spawns the stores
    /// and restores a saved sign-in.
    pub async fn connect(config: ClientConfig) -> CliResult<Self> {
        let session = SessionState::open(&config).await?;
        let sources = build_sources(&config, session.session())?;
        let stores = Stores::spawn(sources, session.session(), config.store.propagation);

        match stores.auth.restore().await? {
            Some(user) => debug!(user_id = %user.id, "Restored saved sign-in"),
            None => debug!("No saved sign-in"),
        }

        Ok(AppState {
            config,
            session,
            stores,
        })
    }

    /// The signed-in user, or `NotSignedIn`.
    pub fn require_user(&self) -> CliResult<User> {
        self.stores
            .auth
            .snapshot()
            .user
            .ok_or_else(CliError::not_signed_in)
    }

    pub async fn shutdown(&self) -> CliResult<()> {
        self.stores.shutdown().await?;
        self.session.close().await;
        Ok(())
    }
}

fn build_sources(config: &ClientConfig, session: &Session) -> CliResult<Sources> {
    match config.backend {
        BackendKind::Mock => {
            info!(latency_scale = config.mock.latency_scale, "Using the mock backend");
            let backend = MockBackend::new(session.clone(), Latency::scaled(config.mock.latency_scale));
            Ok(Sources::from(&backend))
        }
        BackendKind::Http => {
            info!(base_url = %config.api.base_url, "Using the HTTP backend");
            let client = ApiClient::new(&config.api.base_url, config.api.timeout(), session.clone())?;
            let backend = HttpBackend::new(client);
            Ok(Sources {
                customers: backend.customers,
                leads: backend.leads,
                auth: backend.auth,
            })
        }
    }
}
