//! The three stores wired to one backend and one session.
//!
//! ```text
//! Session::expire() ──► SessionEvent::Unauthenticated
//!                            ├─► AuthStore: sign out
//!                            └─► clear_on_expiry: reset customers and leads
//! ```

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crm_core::PropagationPolicy;
use crm_data::{AuthSource, CustomerSource, LeadSource, MockBackend, Session, SessionEvent};

use crate::auth::AuthStore;
use crate::customers::CustomerStore;
use crate::error::StoreResult;
use crate::leads::LeadStore;

/// One implementation of each data-source port.
#[derive(Clone)]
pub struct Sources {
    pub customers: Arc<dyn CustomerSource>,
    pub leads: Arc<dyn LeadSource>,
    pub auth: Arc<dyn AuthSource>,
}

impl From<&MockBackend> for Sources {
    fn from(backend: &MockBackend) -> Self {
        Sources {
            customers: backend.customers.clone(),
            leads: backend.leads.clone(),
            auth: backend.auth.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Stores {
    pub auth: AuthStore,
    pub customers: CustomerStore,
    pub leads: LeadStore,
}

impl Stores {
    /// Spawns all three actors.
    ///
    /// `session` must be the one the auth source persists to, so that a
    /// rejected token signs the auth store out and empties the other two.
    pub fn spawn(sources: Sources, session: &Session, propagation: PropagationPolicy) -> Self {
        let stores = Stores {
            auth: AuthStore::spawn(sources.auth, session),
            customers: CustomerStore::spawn(sources.customers),
            leads: LeadStore::spawn(sources.leads, propagation),
        };
        tokio::spawn(clear_on_expiry(
            stores.customers.clone(),
            stores.leads.clone(),
            session.subscribe(),
        ));
        stores
    }

    /// Empties the customer and lead stores after a sign-out.
    pub async fn clear_domain_state(&self) -> StoreResult<()> {
        self.customers.reset().await?;
        self.leads.reset().await
    }

    pub async fn shutdown(&self) -> StoreResult<()> {
        self.auth.shutdown().await?;
        self.customers.shutdown().await?;
        self.leads.shutdown().await
    }
}

/// Drops the expired user's customers and leads.
async fn clear_on_expiry(
    customers: CustomerStore,
    leads: LeadStore,
    mut events: broadcast::Receiver<SessionEvent>,
) {
    loop {
        let event = tokio::select! {
            event = events.recv() => event,
            _ = customers.closed() => break,
            _ = leads.closed() => break,
        };

        match event {
            Ok(SessionEvent::Unauthenticated) | Err(broadcast::error::RecvError::Lagged(_)) => {
                warn!("Session expired, clearing customers and leads");
                if customers.reset().await.is_err() || leads.reset().await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    debug!("Domain expiry watcher stopped");
}
