//! # crm-store: State Stores for Relay CRM
//!
//! Three stores (auth, customers, leads), each a single-writer actor that
//! owns one collection and one [`RequestLifecycle`](crm_core::RequestLifecycle).
//!
//! ## Operation Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  store.create(data)                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pending ── is_loading = true, error = None                            │
//! │       │                                                                 │
//! │       ▼   data source (crm-data port)                                  │
//! │  ┌────┴──────────────────┬────────────────────────┐                     │
//! │  │ success:true          │ success:false          │ Err(SourceError)   │
//! │  ▼                       ▼                        ▼                     │
//! │  apply effect         error = message        error = fallback          │
//! │  error = None         collection kept        collection kept, logged   │
//! │  │                       │                        │                     │
//! │  └───────────────────────┴────────────────────────┘                     │
//! │       ▼                                                                 │
//! │  idle ── is_loading = false; new snapshot published                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation returns the [`Settlement`](crm_core::Settlement) it
//! applied; consumers can also watch snapshots through `subscribe()`.
//!
//! ## Module Organization
//!
//! - [`actor`] - Generic store actor, handle and snapshot channel
//! - [`customers`] - Paginated, searchable customer list
//! - [`leads`] - Pipeline list, per-customer list, propagation, stats
//! - [`auth`] - Signed-in user and forced sign-out
//! - [`stores`] - All three wired to one backend
//! - [`error`] - `StoreError`

pub mod actor;
pub mod auth;
pub mod customers;
pub mod error;
pub mod leads;
mod outcome;
pub mod stores;

pub use actor::{StoreActor, StoreHandle, StoreState};
pub use auth::{AuthState, AuthStore};
pub use customers::{CustomerState, CustomerStore};
pub use error::{StoreError, StoreResult};
pub use leads::{LeadState, LeadStore};
pub use stores::{Sources, Stores};
