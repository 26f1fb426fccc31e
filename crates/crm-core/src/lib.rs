//! # crm-core: Pure Domain Logic for Relay CRM
//!
//! This crate is the **heart** of the Relay CRM client. It contains the
//! domain types and every rule that can be expressed without I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Relay CRM Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Presentation (mobile app / crm-cli)              │   │
//! │  │   Login form ──► Customer list ──► Lead list ──► Dashboard     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ dispatch / snapshot                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 crm-store (auth / customer / lead actors)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ crm-core (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ lifecycle │  │   stats   │  │ validation│  │   │
//! │  │   │ Customer  │  │  Request  │  │ Dashboard │  │   forms   │  │   │
//! │  │   │   Lead    │  │ Lifecycle │  │   Stats   │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          crm-data / crm-transport (data sources, storage)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (User, Customer, Lead, ...)
//! - [`envelope`] - `{success, data, message}` responses and pages
//! - [`lifecycle`] - The request lifecycle state machine
//! - [`stats`] - Dashboard aggregation
//! - [`money`] - Integer-cent money
//! - [`validation`] - Form validation
//! - [`format`] - Currency, date and text display helpers
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use crm_core::lifecycle::{RequestLifecycle, Settlement};
//!
//! let mut lifecycle = RequestLifecycle::new();
//! lifecycle.begin();
//! assert!(lifecycle.is_loading());
//!
//! let page: Option<Vec<String>> =
//!     lifecycle.settle(Settlement::Rejected("Failed to fetch customers".into()));
//! assert!(page.is_none());
//! assert_eq!(lifecycle.error(), Some("Failed to fetch customers"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod envelope;
pub mod error;
pub mod format;
pub mod lifecycle;
pub mod money;
pub mod stats;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use envelope::{ApiResponse, Page};
pub use error::{CoreError, CoreResult, ValidationError};
pub use lifecycle::{RequestLifecycle, RequestStatus, Settlement};
pub use money::Money;
pub use stats::{ConversionRate, DashboardStats, StatusCounts};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key of the persisted bearer token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Storage key of the persisted, JSON-encoded [`User`].
pub const USER_DATA_KEY: &str = "user_data";

/// Page size used when a caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a list request may ask for.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Minimum password length accepted by the login and register forms.
pub const MIN_PASSWORD_LENGTH: usize = 6;
