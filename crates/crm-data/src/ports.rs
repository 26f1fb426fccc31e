//! # Data-Source Ports
//!
//! The asynchronous collaborators the stores call. One trait per domain
//! object; every call settles with either an [`ApiResponse`] envelope or a
//! [`SourceError`] fault.
//!
//! ```text
//! ┌──────────────┐   Arc<dyn CustomerSource>   ┌───────────────────────────┐
//! │ CustomerStore│ ──────────────────────────► │ MockCustomerSource        │
//! │ LeadStore    │ ──── Arc<dyn LeadSource> ─► │ HttpCustomerSource (REST) │
//! │ AuthStore    │ ──── Arc<dyn AuthSource> ─► │ ...                       │
//! └──────────────┘                             └───────────────────────────┘
//! ```
//!
//! ## Outcome Contract
//! - `Ok(envelope)` with `success: true`: the payload is in `data`.
//! - `Ok(envelope)` with `success: false`: an expected failure whose
//!   `message` is shown to the user verbatim.
//! - `Err(_)`: an unexpected fault. The store logs it and shows the
//!   operation's fixed fallback message.
//!
//! Implementations own latency, persistence and the session token.

use async_trait::async_trait;

use crm_core::{
    ApiResponse, AuthPayload, Customer, CustomerPatch, DashboardStats, Lead, LeadPatch,
    LoginCredentials, NewCustomer, NewLead, Page, RegisterData, StatusFilter,
};

use crate::error::SourceResult;

/// Customer records.
#[async_trait]
pub trait CustomerSource: Send + Sync {
    /// One page of customers, filtered by `search` when present.
    async fn list(
        &self,
        page: u32,
        page_size: u32,
        search: Option<&str>,
    ) -> SourceResult<ApiResponse<Page<Customer>>>;

    async fn get(&self, id: &str) -> SourceResult<ApiResponse<Customer>>;

    async fn create(&self, data: NewCustomer) -> SourceResult<ApiResponse<Customer>>;

    async fn update(&self, id: &str, patch: CustomerPatch) -> SourceResult<ApiResponse<Customer>>;

    async fn delete(&self, id: &str) -> SourceResult<ApiResponse<()>>;
}

/// Lead records and pipeline statistics.
#[async_trait]
pub trait LeadSource: Send + Sync {
    async fn list(&self, filter: StatusFilter) -> SourceResult<ApiResponse<Vec<Lead>>>;

    async fn list_by_customer(&self, customer_id: &str) -> SourceResult<ApiResponse<Vec<Lead>>>;

    async fn get(&self, id: &str) -> SourceResult<ApiResponse<Lead>>;

    async fn create(&self, data: NewLead) -> SourceResult<ApiResponse<Lead>>;

    async fn update(&self, id: &str, patch: LeadPatch) -> SourceResult<ApiResponse<Lead>>;

    async fn delete(&self, id: &str) -> SourceResult<ApiResponse<()>>;

    /// Aggregate statistics over every lead the source holds.
    async fn stats(&self) -> SourceResult<ApiResponse<DashboardStats>>;
}

/// Sign-in, sign-up and the persisted session.
///
/// Implementations persist the token and user on a successful `login`,
/// `register` or `refresh`, and clear them on `logout`.
#[async_trait]
pub trait AuthSource: Send + Sync {
    async fn login(&self, credentials: LoginCredentials) -> SourceResult<ApiResponse<AuthPayload>>;

    async fn register(&self, data: RegisterData) -> SourceResult<ApiResponse<AuthPayload>>;

    /// Ends the session. Local session storage is cleared even when the
    /// remote call fails.
    async fn logout(&self) -> SourceResult<ApiResponse<()>>;

    /// Exchanges the persisted token for a fresh one.
    async fn refresh(&self) -> SourceResult<ApiResponse<AuthPayload>>;

    /// The session persisted by an earlier run, if any.
    async fn saved_session(&self) -> SourceResult<Option<AuthPayload>>;
}
