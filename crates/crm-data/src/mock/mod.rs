//! # Mock Data Sources
//!
//! In-memory implementations of the three ports, seeded from [`crate::seed`].
//! They behave like the REST backend: same envelopes, same messages, and a
//! simulated network delay.
//!
//! ## Latency
//! ```text
//! operation            base delay      × Latency scale
//! ───────────────────  ──────────      ────────────────
//! list                  500 ms         1.0  realistic demo
//! get / by customer     300 ms         0.0  tests (no sleep)
//! create / update       800 ms
//! delete                600 ms
//! stats                 400 ms
//! login / register     1000 ms
//! logout / refresh      500 ms
//! ```
//!
//! ## Fault Injection
//! [`Faults::fail_next`] arms a one-shot fault for an operation name from
//! [`op`]. The next call to that operation returns
//! [`SourceError::Unavailable`] after its delay, letting tests drive the
//! fallback-message path without a network.

mod auth;
mod customers;
mod leads;

pub use auth::MockAuthSource;
pub use customers::MockCustomerSource;
pub use leads::MockLeadSource;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult};
use crate::session::Session;

// =============================================================================
// Operation Names
// =============================================================================

/// Names accepted by [`Faults::fail_next`].
pub mod op {
    pub const CUSTOMERS_LIST: &str = "customers.list";
    pub const CUSTOMERS_GET: &str = "customers.get";
    pub const CUSTOMERS_CREATE: &str = "customers.create";
    pub const CUSTOMERS_UPDATE: &str = "customers.update";
    pub const CUSTOMERS_DELETE: &str = "customers.delete";

    pub const LEADS_LIST: &str = "leads.list";
    pub const LEADS_BY_CUSTOMER: &str = "leads.by_customer";
    pub const LEADS_GET: &str = "leads.get";
    pub const LEADS_CREATE: &str = "leads.create";
    pub const LEADS_UPDATE: &str = "leads.update";
    pub const LEADS_DELETE: &str = "leads.delete";
    pub const LEADS_STATS: &str = "leads.stats";

    pub const AUTH_LOGIN: &str = "auth.login";
    pub const AUTH_REGISTER: &str = "auth.register";
    pub const AUTH_LOGOUT: &str = "auth.logout";
    pub const AUTH_REFRESH: &str = "auth.refresh";
    pub const AUTH_RESTORE: &str = "auth.restore";
}

// =============================================================================
// Latency
// =============================================================================

const LIST_DELAY_MS: u64 = 500;
const GET_DELAY_MS: u64 = 300;
const WRITE_DELAY_MS: u64 = 800;
const DELETE_DELAY_MS: u64 = 600;
const STATS_DELAY_MS: u64 = 400;
const SIGN_IN_DELAY_MS: u64 = 1000;
const SESSION_DELAY_MS: u64 = 500;

/// Multiplier applied to every simulated delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Latency {
    scale: f64,
}

impl Latency {
    /// No delay at all.
    pub const fn none() -> Self {
        Latency { scale: 0.0 }
    }

    /// The delays of the demo backend.
    pub const fn realistic() -> Self {
        Latency { scale: 1.0 }
    }

    /// `scale × base`; negative or NaN scales count as zero.
    pub fn scaled(scale: f64) -> Self {
        Latency {
            scale: if scale.is_finite() { scale.max(0.0) } else { 0.0 },
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The delay for an operation whose base latency is `base_ms`.
    pub fn delay(&self, base_ms: u64) -> Duration {
        Duration::from_millis(base_ms).mul_f64(self.scale)
    }

    async fn wait(&self, base_ms: u64) {
        let delay = self.delay(base_ms);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Latency::realistic()
    }
}

// =============================================================================
// Faults
// =============================================================================

/// One-shot faults armed per operation name.
#[derive(Debug, Default)]
pub struct Faults {
    armed: Mutex<HashSet<String>>,
}

impl Faults {
    /// Makes the next call to `operation` fail with an unexpected fault.
    pub fn fail_next(&self, operation: &str) {
        debug!(operation = %operation, "Arming mock fault");
        self.armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(operation.to_string());
    }

    /// Consumes the armed fault for `operation`, if any.
    fn check(&self, operation: &str) -> SourceResult<()> {
        let fired = self
            .armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(operation);
        if fired {
            warn!(operation = %operation, "Mock fault fired");
            return Err(SourceError::unavailable(operation));
        }
        Ok(())
    }
}

/// Simulated call: wait out the delay, then fire an armed fault if present.
async fn simulate(latency: &Latency, faults: &Faults, operation: &str, base_ms: u64) -> SourceResult<()> {
    latency.wait(base_ms).await;
    faults.check(operation)
}

// =============================================================================
// Backend
// =============================================================================

/// The three mock sources, wired to one session.
#[derive(Debug, Clone)]
pub struct MockBackend {
    pub customers: Arc<MockCustomerSource>,
    pub leads: Arc<MockLeadSource>,
    pub auth: Arc<MockAuthSource>,
}

impl MockBackend {
    pub fn new(session: Session, latency: Latency) -> Self {
        MockBackend {
            customers: Arc::new(MockCustomerSource::new(latency)),
            leads: Arc::new(MockLeadSource::new(latency)),
            auth: Arc::new(MockAuthSource::new(session, latency)),
        }
    }
}
