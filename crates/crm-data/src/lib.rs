//! # crm-data: Data Sources & Session Storage for Relay CRM
//!
//! The stores never see a network or a database. They see three ports,
//! defined here, and whatever implements them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Relay CRM Data Flow                              │
//! │                                                                         │
//! │  CustomerStore::fetch_list(page, size, query)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     crm-data (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Ports      │    │     Mock      │    │   Session    │  │   │
//! │  │   │  (ports.rs)   │    │  (mock/*.rs)  │    │ (session.rs) │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ CustomerSource│◄───│ MockCustomer  │    │ token + user │  │   │
//! │  │   │ LeadSource    │    │ MockLead      │───►│ expire() ──► │  │   │
//! │  │   │ AuthSource    │    │ MockAuth      │    │ Unauthent.   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────┬───────┘  │   │
//! │  │                                                    │          │   │
//! │  │                     ┌──────────────────────────────▼───────┐  │   │
//! │  │                     │ SessionStorage: Memory | SQLite      │  │   │
//! │  │                     │ (storage.rs, pool.rs, migrations.rs) │  │   │
//! │  │                     └──────────────────────────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       ▲                                                                 │
//! │       │ HTTP implementations of the same ports                         │
//! │  crm-transport                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`ports`] - `CustomerSource`, `LeadSource`, `AuthSource`
//! - [`mock`] - In-memory sources with simulated latency and fault injection
//! - [`seed`] - Canned customers, leads and demo accounts
//! - [`session`] - Persisted session and the `Unauthenticated` event
//! - [`storage`] - Key/value session storage (memory, SQLite)
//! - [`pool`] - SQLite pool configuration
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - `SourceError` and `DataError`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crm_data::{Database, DbConfig, Latency, MockBackend, Session};
//! use std::sync::Arc;
//!
//! let db = Database::new(DbConfig::new("session.db")).await?;
//! let session = Session::new(Arc::new(db.session_store()));
//! let backend = MockBackend::new(session, Latency::realistic());
//!
//! let page = backend.customers.list(1, 10, Some("tech")).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod mock;
pub mod pool;
pub mod ports;
pub mod seed;
pub mod session;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DataError, DataResult, SourceError, SourceResult};
pub use mock::{Latency, MockAuthSource, MockBackend, MockCustomerSource, MockLeadSource};
pub use pool::{Database, DbConfig};
pub use ports::{AuthSource, CustomerSource, LeadSource};
pub use session::{Session, SessionEvent};
pub use storage::{MemoryStorage, SessionStorage, SqliteStorage};
