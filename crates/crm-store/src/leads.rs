//! # Lead Store
//!
//! Two collections of the same records: the pipeline list (`leads`, filtered
//! by status) and the leads of the customer on screen (`customer_leads`).
//!
//! ## Propagation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(lead)                                                           │
//! │    leads.insert(0, lead)                                                │
//! │    customer_leads.insert(0, lead)   only if the policy says it belongs  │
//! │                                                                         │
//! │  update(lead)                                                           │
//! │    leads[i] = lead                   if present                         │
//! │    customer_leads[j] = lead          if present                         │
//! │      ActiveCustomer also inserts a lead that moved onto the active      │
//! │      customer and drops one that moved away                             │
//! │                                                                         │
//! │  delete(id)                                                             │
//! │    removed from both                                                    │
//! │                                                                         │
//! │  FirstRecordHeuristic:  customer_leads non-empty and                    │
//! │                         customer_leads[0].customer_id == lead's         │
//! │  ActiveCustomer:        lead.customer_id == id of the last              │
//! │                         fetch_by_customer                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The heuristic never mirrors into an empty list, so a customer's first lead
//! only shows up after the next `fetch_by_customer`. `ActiveCustomer` does
//! not have that gap.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crm_core::{
    DashboardStats, Lead, LeadPatch, NewLead, PropagationPolicy, RequestLifecycle, Settlement,
    StatusFilter,
};
use crm_data::LeadSource;

use crate::actor::{StoreActor, StoreHandle, StoreState};
use crate::error::StoreResult;
use crate::outcome::Operation;

const FETCH_LIST: Operation = Operation::new("leads.fetch_list", "Failed to fetch leads");
const FETCH_BY_CUSTOMER: Operation =
    Operation::new("leads.fetch_by_customer", "Failed to fetch customer leads");
const FETCH_BY_ID: Operation = Operation::new("leads.fetch_by_id", "Failed to fetch lead");
const CREATE: Operation = Operation::new("leads.create", "Failed to create lead");
const UPDATE: Operation = Operation::new("leads.update", "Failed to update lead");
const DELETE: Operation = Operation::new("leads.delete", "Failed to delete lead");
const FETCH_STATS: Operation = Operation::new("leads.fetch_stats", "Failed to fetch dashboard stats");

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadState {
    pub leads: Vec<Lead>,
    pub customer_leads: Vec<Lead>,
    /// Customer whose leads `customer_leads` holds.
    pub active_customer: Option<String>,
    pub current: Option<Lead>,
    pub status_filter: StatusFilter,
    /// Last stats served by the data source.
    pub stats: Option<DashboardStats>,
    pub lifecycle: RequestLifecycle,
}

impl StoreState for LeadState {
    fn lifecycle_mut(&mut self) -> &mut RequestLifecycle {
        &mut self.lifecycle
    }
}

impl LeadState {
    pub fn is_loading(&self) -> bool {
        self.lifecycle.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.lifecycle.error()
    }

    pub fn find(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }

    /// Stats computed from the local pipeline list.
    pub fn aggregate_stats(&self) -> DashboardStats {
        DashboardStats::aggregate(&self.leads)
    }

    fn belongs_to_customer_leads(&self, policy: PropagationPolicy, lead: &Lead) -> bool {
        match policy {
            PropagationPolicy::FirstRecordHeuristic => self
                .customer_leads
                .first()
                .is_some_and(|first| first.customer_id == lead.customer_id),
            PropagationPolicy::ActiveCustomer => {
                self.active_customer.as_deref() == Some(lead.customer_id.as_str())
            }
        }
    }

    fn insert(&mut self, policy: PropagationPolicy, lead: Lead) {
        if self.belongs_to_customer_leads(policy, &lead) {
            self.customer_leads.insert(0, lead.clone());
        }
        self.leads.insert(0, lead);
    }

    fn replace(&mut self, policy: PropagationPolicy, lead: &Lead) {
        if let Some(slot) = self.leads.iter_mut().find(|l| l.id == lead.id) {
            *slot = lead.clone();
        }

        let position = self.customer_leads.iter().position(|l| l.id == lead.id);
        match (policy, position) {
            (PropagationPolicy::ActiveCustomer, _)
                if !self.belongs_to_customer_leads(policy, lead) =>
            {
                self.customer_leads.retain(|l| l.id != lead.id);
            }
            (_, Some(index)) => self.customer_leads[index] = lead.clone(),
            (PropagationPolicy::ActiveCustomer, None) => {
                self.customer_leads.insert(0, lead.clone());
            }
            (PropagationPolicy::FirstRecordHeuristic, None) => {}
        }

        if self.current.as_ref().is_some_and(|l| l.id == lead.id) {
            self.current = Some(lead.clone());
        }
    }

    fn remove(&mut self, id: &str) {
        self.leads.retain(|l| l.id != id);
        self.customer_leads.retain(|l| l.id != id);
        if self.current.as_ref().is_some_and(|l| l.id == id) {
            self.current = None;
        }
    }
}

// =============================================================================
// Store
// =============================================================================

#[derive(Clone)]
pub struct LeadStore {
    handle: StoreHandle<LeadState>,
    source: Arc<dyn LeadSource>,
    policy: PropagationPolicy,
}

impl std::fmt::Debug for LeadStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeadStore")
            .field("handle", &self.handle)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl LeadStore {
    pub fn spawn(source: Arc<dyn LeadSource>, policy: PropagationPolicy) -> Self {
        LeadStore {
            handle: StoreActor::spawn("leads", LeadState::default()),
            source,
            policy,
        }
    }

    pub fn policy(&self) -> PropagationPolicy {
        self.policy
    }

    pub fn snapshot(&self) -> LeadState {
        self.handle.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<LeadState> {
        self.handle.subscribe()
    }

    pub async fn shutdown(&self) -> StoreResult<()> {
        self.handle.shutdown().await
    }

    /// Completes once the actor has stopped.
    pub async fn closed(&self) {
        self.handle.closed().await
    }

    /// Stats over the leads currently held, no data-source call.
    pub fn aggregate_stats(&self) -> DashboardStats {
        self.handle.snapshot().aggregate_stats()
    }

    // =========================================================================
    // Data-source operations
    // =========================================================================

    /// Replaces the pipeline list with the leads matching `filter`.
    pub async fn fetch_list(&self, filter: StatusFilter) -> StoreResult<Settlement<Vec<Lead>>> {
        debug!(?filter, "Fetching leads");
        let source = Arc::clone(&self.source);
        let call = async move { FETCH_LIST.settle(source.list(filter).await) };

        self.handle
            .run(FETCH_LIST.fallback, call, move |state, settlement| {
                if let Some(leads) = state.lifecycle.settle(settlement.clone()) {
                    state.leads = leads;
                    state.status_filter = filter;
                }
                settlement
            })
            .await
    }

    /// Replaces `customer_leads` and makes `customer_id` the active customer.
    pub async fn fetch_by_customer(
        &self,
        customer_id: impl Into<String>,
    ) -> StoreResult<Settlement<Vec<Lead>>> {
        let customer_id = customer_id.into();
        let source = Arc::clone(&self.source);
        let target = customer_id.clone();
        let call = async move { FETCH_BY_CUSTOMER.settle(source.list_by_customer(&target).await) };

        self.handle
            .run(FETCH_BY_CUSTOMER.fallback, call, move |state, settlement| {
                if let Some(leads) = state.lifecycle.settle(settlement.clone()) {
                    state.customer_leads = leads;
                    state.active_customer = Some(customer_id);
                }
                settlement
            })
            .await
    }

    /// Loads one lead into `current`; neither collection changes.
    pub async fn fetch_by_id(&self, id: impl Into<String>) -> StoreResult<Settlement<Lead>> {
        let id = id.into();
        let source = Arc::clone(&self.source);
        let call = async move { FETCH_BY_ID.settle(source.get(&id).await) };

        self.handle
            .run(FETCH_BY_ID.fallback, call, |state, settlement| {
                if let Some(lead) = state.lifecycle.settle(settlement.clone()) {
                    state.current = Some(lead);
                }
                settlement
            })
            .await
    }

    pub async fn create(&self, data: NewLead) -> StoreResult<Settlement<Lead>> {
        let source = Arc::clone(&self.source);
        let policy = self.policy;
        let call = async move { CREATE.settle(source.create(data).await) };

        self.handle
            .run(CREATE.fallback, call, move |state, settlement| {
                if let Some(lead) = state.lifecycle.settle(settlement.clone()) {
                    state.insert(policy, lead);
                }
                settlement
            })
            .await
    }

    pub async fn update(
        &self,
        id: impl Into<String>,
        patch: LeadPatch,
    ) -> StoreResult<Settlement<Lead>> {
        let id = id.into();
        let source = Arc::clone(&self.source);
        let policy = self.policy;
        let call = async move { UPDATE.settle(source.update(&id, patch).await) };

        self.handle
            .run(UPDATE.fallback, call, move |state, settlement| {
                if let Some(lead) = state.lifecycle.settle(settlement.clone()) {
                    state.replace(policy, &lead);
                }
                settlement
            })
            .await
    }

    pub async fn delete(&self, id: impl Into<String>) -> StoreResult<Settlement<()>> {
        let id = id.into();
        let source = Arc::clone(&self.source);
        let target = id.clone();
        let call = async move { DELETE.settle_ack(source.delete(&target).await) };

        self.handle
            .run(DELETE.fallback, call, move |state, settlement| {
                if state.lifecycle.settle(settlement.clone()).is_some() {
                    state.remove(&id);
                }
                settlement
            })
            .await
    }

    /// Asks the data source for dashboard stats and keeps them in `stats`.
    pub async fn fetch_stats(&self) -> StoreResult<Settlement<DashboardStats>> {
        let source = Arc::clone(&self.source);
        let call = async move { FETCH_STATS.settle(source.stats().await) };

        self.handle
            .run(FETCH_STATS.fallback, call, |state, settlement| {
                if let Some(stats) = state.lifecycle.settle(settlement.clone()) {
                    state.stats = Some(stats);
                }
                settlement
            })
            .await
    }

    // =========================================================================
    // Reducers
    // =========================================================================

    pub async fn set_status_filter(&self, filter: StatusFilter) -> StoreResult<()> {
        self.handle.apply(move |state| state.status_filter = filter).await
    }

    pub async fn clear_customer_leads(&self) -> StoreResult<()> {
        self.handle
            .apply(|state| {
                state.customer_leads.clear();
                state.active_customer = None;
            })
            .await
    }

    pub async fn clear_error(&self) -> StoreResult<()> {
        self.handle.apply(|state| state.lifecycle.clear_error()).await
    }

    /// Empties both collections and resets the filter to `All`.
    pub async fn reset(&self) -> StoreResult<()> {
        self.handle
            .apply(|state| {
                let lifecycle = std::mem::take(&mut state.lifecycle);
                *state = LeadState {
                    lifecycle,
                    ..LeadState::default()
                };
            })
            .await
    }
}
