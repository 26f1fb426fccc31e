//! # crm-transport: HTTP Backend for Relay CRM
//!
//! REST implementations of the crm-data ports, plus the client
//! configuration that decides whether they are used at all.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  LeadStore ──► HttpLeadSource::list(Converted)                         │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │               ApiClient::get("/leads", status=Converted)               │
//! │                      │   Authorization: Bearer <session token>         │
//! │                      ▼                                                  │
//! │               ┌──────────────┐                                          │
//! │               │   backend    │                                          │
//! │               └──────┬───────┘                                          │
//! │         2xx          │         401            other / network           │
//! │    ┌─────────────────┼──────────────────┬─────────────────────┐        │
//! │    ▼                 ▼                  ▼                     ▼        │
//! │  { data, message,  session.expire()   { success: false,   { success:   │
//! │    success: true }  ──► Unauthenticated  message }          false,     │
//! │                                                             "Network   │
//! │                                                              Error" }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`client`] - `ApiClient`: bearer token, timeout, 401 handling
//! - [`sources`] - `HttpCustomerSource`, `HttpLeadSource`, `HttpAuthSource`
//! - [`config`] - `ClientConfig` loaded from TOML and `CRM_*` variables
//! - [`error`] - `TransportError`

pub mod client;
pub mod config;
pub mod error;
pub mod sources;

pub use client::{ApiClient, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use config::{ApiSettings, BackendKind, ClientConfig, MockSettings, SessionSettings, StoreSettings};
pub use error::{TransportError, TransportResult};
pub use sources::{HttpAuthSource, HttpBackend, HttpCustomerSource, HttpLeadSource};
