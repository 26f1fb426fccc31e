//! # Domain Types
//!
//! Core domain types used throughout Relay CRM.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │    Customer     │   │      Lead       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  email          │   │  name           │   │  title          │       │
//! │  │  name           │   │  email / phone  │   │  status         │       │
//! │  │  role           │   │  company        │   │  value (Money)  │       │
//! │  └─────────────────┘   └────────┬────────┘   │  customer_id ───┼──┐    │
//! │                                 │            └─────────────────┘  │    │
//! │                                 └──── advisory reference ◄────────┘    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   LeadStatus    │   │  StatusFilter   │   │ DashboardStats  │       │
//! │  │  New            │   │  All            │   │  total_leads    │       │
//! │  │  Contacted      │   │  New ... Lost   │   │  total_value    │       │
//! │  │  Converted      │   └─────────────────┘   │  by status      │       │
//! │  │  Lost           │                         │  conversion %   │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Names
//! Every record is `camelCase` on the wire (`customerId`, `createdAt`) so the
//! same JSON flows between the REST backend, the stores and the front-end.
//! Identifiers are opaque strings assigned by the data source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Users & Sessions
// =============================================================================

/// Access level of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Login form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        LoginCredentials {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Registration form payload.
///
/// The form checks that both passwords match before the store is invoked;
/// the data source still rejects a mismatch on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// What login, register and refresh resolve with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuthPayload {
    pub user: User,
    /// Opaque bearer token. The core never looks inside it.
    pub token: String,
}

// =============================================================================
// Customers
// =============================================================================

/// A customer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields submitted by the "add customer" form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
}

/// Partial update for a customer. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub company: Option<String>,
}

impl CustomerPatch {
    /// Merges the present fields into `customer` and stamps `updated_at`.
    pub fn apply_to(&self, customer: &mut Customer, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            customer.name = name.clone();
        }
        if let Some(email) = &self.email {
            customer.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            customer.phone = phone.clone();
        }
        if let Some(company) = &self.company {
            customer.company = company.clone();
        }
        customer.updated_at = now;
    }
}

// =============================================================================
// Leads
// =============================================================================

/// Pipeline stage of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum LeadStatus {
    New,
    Contacted,
    Converted,
    Lost,
}

impl LeadStatus {
    /// Every status, in pipeline order.
    pub const ALL: [LeadStatus; 4] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Converted,
        LeadStatus::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Converted => "Converted",
            LeadStatus::Lost => "Lost",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

/// Status filter for the lead list: one status, or the `All` sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum StatusFilter {
    #[default]
    All,
    New,
    Contacted,
    Converted,
    Lost,
}

impl StatusFilter {
    /// The status this filter keeps, or `None` for `All`.
    pub fn status(&self) -> Option<LeadStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::New => Some(LeadStatus::New),
            StatusFilter::Contacted => Some(LeadStatus::Contacted),
            StatusFilter::Converted => Some(LeadStatus::Converted),
            StatusFilter::Lost => Some(LeadStatus::Lost),
        }
    }

    /// Returns true if `lead` passes the filter.
    pub fn matches(&self, lead: &Lead) -> bool {
        self.status().map_or(true, |status| lead.status == status)
    }
}

impl From<LeadStatus> for StatusFilter {
    fn from(status: LeadStatus) -> Self {
        match status {
            LeadStatus::New => StatusFilter::New,
            LeadStatus::Contacted => StatusFilter::Contacted,
            LeadStatus::Converted => StatusFilter::Converted,
            LeadStatus::Lost => StatusFilter::Lost,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status() {
            Some(status) => f.write_str(status.as_str()),
            None => f.write_str("All"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse::<LeadStatus>().map(StatusFilter::from)
    }
}

/// A sales lead attached to a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: LeadStatus,
    #[serde(with = "crate::money::as_dollars")]
    #[ts(type = "number")]
    pub value: Money,
    /// Advisory reference; the customer may not exist locally.
    pub customer_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields submitted by the "add lead" form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    pub title: String,
    pub description: String,
    pub status: LeadStatus,
    #[serde(with = "crate::money::as_dollars")]
    #[ts(type = "number")]
    pub value: Money,
    pub customer_id: String,
}

/// Partial update for a lead. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LeadPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub status: Option<LeadStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::money::as_dollars_opt"
    )]
    #[ts(optional, as = "Option<f64>")]
    pub value: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub customer_id: Option<String>,
}

impl LeadPatch {
    /// Merges the present fields into `lead` and stamps `updated_at`.
    pub fn apply_to(&self, lead: &mut Lead, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            lead.title = title.clone();
        }
        if let Some(description) = &self.description {
            lead.description = description.clone();
        }
        if let Some(status) = self.status {
            lead.status = status;
        }
        if let Some(value) = self.value {
            lead.value = value;
        }
        if let Some(customer_id) = &self.customer_id {
            lead.customer_id = customer_id.clone();
        }
        lead.updated_at = now;
    }
}

// =============================================================================
// Propagation Policy
// =============================================================================

/// When a created or updated lead is mirrored into the "customer leads"
/// collection.
///
/// ```text
/// FirstRecordHeuristic  customer_leads non-empty AND
///                       customer_leads[0].customer_id == lead.customer_id
/// ActiveCustomer        lead.customer_id == the id last passed to
///                       fetch_by_customer
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PropagationPolicy {
    #[default]
    FirstRecordHeuristic,
    ActiveCustomer,
}

impl fmt::Display for PropagationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropagationPolicy::FirstRecordHeuristic => write!(f, "first_record_heuristic"),
            PropagationPolicy::ActiveCustomer => write!(f, "active_customer"),
        }
    }
}

impl FromStr for PropagationPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first_record_heuristic" | "first_record" => Ok(PropagationPolicy::FirstRecordHeuristic),
            "active_customer" => Ok(PropagationPolicy::ActiveCustomer),
            other => Err(CoreError::UnknownPolicy(other.to_string())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
