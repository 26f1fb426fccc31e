//! # Customer Store
//!
//! The paginated, searchable customer list plus a "current customer" slot
//! for the details screen.
//!
//! ## Operations
//! ```text
//! ┌────────────────────┬──────────────────────────────────────────────────┐
//! │ fetch_list         │ replace `customers`, record page/total/query     │
//! │ fetch_by_id        │ fill `current`                                   │
//! │ create             │ insert at index 0                                │
//! │ update             │ replace in place (+ `current`); absent id: no-op │
//! │ delete             │ remove (+ clear `current`); absent id: no-op     │
//! ├────────────────────┼──────────────────────────────────────────────────┤
//! │ set_search_query   │ pure state updates, no data-source call          │
//! │ set_current_page   │                                                  │
//! │ clear_current      │                                                  │
//! │ clear_error        │                                                  │
//! │ reset              │                                                  │
//! └────────────────────┴──────────────────────────────────────────────────┘
//! ```
//!
//! ## Page Bounds
//! After every successful list fetch `1 ≤ current_page ≤ total_pages`, even
//! if the backend reports zero pages for an empty result.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crm_core::{
    Customer, CustomerPatch, NewCustomer, Page, RequestLifecycle, Settlement,
};
use crm_data::CustomerSource;

use crate::actor::{StoreActor, StoreHandle, StoreState};
use crate::error::StoreResult;
use crate::outcome::Operation;

const FETCH_LIST: Operation = Operation::new("customers.fetch_list", "Failed to fetch customers");
const FETCH_BY_ID: Operation = Operation::new("customers.fetch_by_id", "Failed to fetch customer");
const CREATE: Operation = Operation::new("customers.create", "Failed to create customer");
const UPDATE: Operation = Operation::new("customers.update", "Failed to update customer");
const DELETE: Operation = Operation::new("customers.delete", "Failed to delete customer");

// =============================================================================
// State
// =============================================================================

/// Everything the customer screens render from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerState {
    pub customers: Vec<Customer>,
    pub current: Option<Customer>,
    pub current_page: u32,
    pub total_pages: u32,
    pub search_query: String,
    pub lifecycle: RequestLifecycle,
}

impl Default for CustomerState {
    fn default() -> Self {
        CustomerState {
            customers: Vec::new(),
            current: None,
            current_page: 1,
            total_pages: 1,
            search_query: String::new(),
            lifecycle: RequestLifecycle::new(),
        }
    }
}

impl StoreState for CustomerState {
    fn lifecycle_mut(&mut self) -> &mut RequestLifecycle {
        &mut self.lifecycle
    }
}

impl CustomerState {
    pub fn is_loading(&self) -> bool {
        self.lifecycle.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.lifecycle.error()
    }

    pub fn find(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    fn apply_page(&mut self, page: &Page<Customer>, search_query: String) {
        self.customers = page.data.clone();
        self.total_pages = page.total_pages.max(1);
        self.current_page = page.current_page.clamp(1, self.total_pages);
        self.search_query = search_query;
    }

    fn replace(&mut self, customer: &Customer) {
        if let Some(slot) = self.customers.iter_mut().find(|c| c.id == customer.id) {
            *slot = customer.clone();
        }
        if self.current.as_ref().is_some_and(|c| c.id == customer.id) {
            self.current = Some(customer.clone());
        }
    }

    fn remove(&mut self, id: &str) {
        self.customers.retain(|c| c.id != id);
        if self.current.as_ref().is_some_and(|c| c.id == id) {
            self.current = None;
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Handle to the customer store actor.
#[derive(Clone)]
pub struct CustomerStore {
    handle: StoreHandle<CustomerState>,
    source: Arc<dyn CustomerSource>,
}

impl std::fmt::Debug for CustomerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerStore")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl CustomerStore {
    pub fn spawn(source: Arc<dyn CustomerSource>) -> Self {
        CustomerStore {
            handle: StoreActor::spawn("customers", CustomerState::default()),
            source,
        }
    }

    pub fn snapshot(&self) -> CustomerState {
        self.handle.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CustomerState> {
        self.handle.subscribe()
    }

    pub async fn shutdown(&self) -> StoreResult<()> {
        self.handle.shutdown().await
    }

    /// Completes once the actor has stopped.
    pub async fn closed(&self) {
        self.handle.closed().await
    }

    // =========================================================================
    // Data-source operations
    // =========================================================================

    /// Fetches one page, optionally filtered by `search_query`.
    pub async fn fetch_list(
        &self,
        page: u32,
        page_size: u32,
        search_query: impl Into<String>,
    ) -> StoreResult<Settlement<Page<Customer>>> {
        let search_query = search_query.into();
        debug!(page, page_size, search = %search_query, "Fetching customers");

        let source = Arc::clone(&self.source);
        let query = search_query.clone();
        let call = async move {
            let search = Some(query.as_str()).filter(|q| !q.is_empty());
            FETCH_LIST.settle(source.list(page, page_size, search).await)
        };

        self.handle
            .run(FETCH_LIST.fallback, call, move |state, settlement| {
                if let Some(page) = state.lifecycle.settle(settlement.clone()) {
                    state.apply_page(&page, search_query);
                }
                settlement
            })
            .await
    }

    /// Loads one customer into `current`.
    pub async fn fetch_by_id(&self, id: impl Into<String>) -> StoreResult<Settlement<Customer>> {
        let id = id.into();
        let source = Arc::clone(&self.source);
        let call = async move { FETCH_BY_ID.settle(source.get(&id).await) };

        self.handle
            .run(FETCH_BY_ID.fallback, call, |state, settlement| {
                if let Some(customer) = state.lifecycle.settle(settlement.clone()) {
                    state.current = Some(customer);
                }
                settlement
            })
            .await
    }

    /// Creates a customer and puts it at the top of the list.
    pub async fn create(&self, data: NewCustomer) -> StoreResult<Settlement<Customer>> {
        let source = Arc::clone(&self.source);
        let call = async move { CREATE.settle(source.create(data).await) };

        self.handle
            .run(CREATE.fallback, call, |state, settlement| {
                if let Some(customer) = state.lifecycle.settle(settlement.clone()) {
                    state.customers.insert(0, customer);
                }
                settlement
            })
            .await
    }

    /// Updates a customer. A record that is not in the local list stays
    /// absent; the call still settles without error.
    pub async fn update(
        &self,
        id: impl Into<String>,
        patch: CustomerPatch,
    ) -> StoreResult<Settlement<Customer>> {
        let id = id.into();
        let source = Arc::clone(&self.source);
        let call = async move { UPDATE.settle(source.update(&id, patch).await) };

        self.handle
            .run(UPDATE.fallback, call, |state, settlement| {
                if let Some(customer) = state.lifecycle.settle(settlement.clone()) {
                    state.replace(&customer);
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

    // =========================================================================
    // Reducers
    // =========================================================================

    pub async fn set_search_query(&self, query: impl Into<String>) -> StoreResult<()> {
        let query = query.into();
        self.handle.apply(move |state| state.search_query = query).await
    }

    pub async fn set_current_page(&self, page: u32) -> StoreResult<()> {
        self.handle
            .apply(move |state| state.current_page = page.max(1))
            .await
    }

    pub async fn clear_current(&self) -> StoreResult<()> {
        self.handle.apply(|state| state.current = None).await
    }

    pub async fn clear_error(&self) -> StoreResult<()> {
        self.handle.apply(|state| state.lifecycle.clear_error()).await
    }

    /// Empties the list and puts paging and search back to their defaults.
    pub async fn reset(&self) -> StoreResult<()> {
        self.handle
            .apply(|state| {
                let lifecycle = std::mem::take(&mut state.lifecycle);
                *state = CustomerState {
                    lifecycle,
                    ..CustomerState::default()
                };
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_data::mock::op;
    use crm_data::{Latency, MockCustomerSource};

    fn store() -> (CustomerStore, Arc<MockCustomerSource>) {
        let source = Arc::new(MockCustomerSource::new(Latency::none()));
        (CustomerStore::spawn(source.clone()), source)
    }

    fn new_customer(name: &str) -> NewCustomer {
        NewCustomer {
            name: name.into(),
            email: "ops@northwind.example".into(),
            phone: "+1-555-0199".into(),
            company: "Northwind".into(),
        }
    }

    #[tokio::test]
    async fn test_first_page_of_five() {
        let (store, _) = store();
        let settled = store.fetch_list(1, 10, "").await.unwrap();
        assert!(settled.is_fulfilled());

        let state = store.snapshot();
        assert_eq!(state.customers.len(), 5);
        assert_eq!(state.current_page, 1);
        assert_eq!(state.total_pages, 1);
        assert!(!state.is_loading());
        assert_eq!(state.error(), None);
        if let Settlement::Fulfilled(page) = settled {
            assert_eq!(page.total_items, 5);
        }
    }

    #[tokio::test]
    async fn test_fetch_replaces_and_keeps_bounds() {
        let (store, _) = store();
        store.fetch_list(1, 2, "").await.unwrap();
        let first: Vec<String> = store.snapshot().customers.iter().map(|c| c.id.clone()).collect();

        store.fetch_list(2, 2, "").await.unwrap();
        let state = store.snapshot();
        assert_eq!(state.customers.len(), 2);
        assert!(state.customers.iter().all(|c| !first.contains(&c.id)));
        assert_eq!(state.current_page, 2);
        assert_eq!(state.total_pages, 3);

        // Past the end: still within bounds
        store.fetch_list(9, 2, "").await.unwrap();
        let state = store.snapshot();
        assert!(state.customers.is_empty());
        assert!(state.current_page <= state.total_pages);
    }

    #[tokio::test]
    async fn test_search_is_recorded() {
        let (store, _) = store();
        store.fetch_list(1, 10, "TECH").await.unwrap();
        let state = store.snapshot();
        assert_eq!(state.search_query, "TECH");
        assert!(!state.customers.is_empty());
        assert!(state
            .customers
            .iter()
            .all(|c| c.company.to_lowercase().contains("tech")
                || c.name.to_lowercase().contains("tech")
                || c.email.to_lowercase().contains("tech")));
    }

    #[tokio::test]
    async fn test_create_goes_first() {
        let (store, _) = store();
        store.fetch_list(1, 10, "").await.unwrap();

        let created = store.create(new_customer("Ada Lovelace")).await.unwrap();
        let Settlement::Fulfilled(created) = created else {
            panic!("create should succeed");
        };
        let state = store.snapshot();
        assert_eq!(state.customers[0], created);
        assert_eq!(state.customers.len(), 6);
    }

    #[tokio::test]
    async fn test_update_absent_id_is_a_no_op() {
        let (store, _) = store();
        store.fetch_list(1, 2, "").await.unwrap();
        let before = store.snapshot().customers;

        // Customer 5 exists at the source but not on the local page
        let patch = CustomerPatch {
            name: Some("Renamed".into()),
            ..Default::default()
        };
        let settled = store.update("5", patch).await.unwrap();
        assert!(settled.is_fulfilled());

        let state = store.snapshot();
        assert_eq!(state.customers, before);
        assert_eq!(state.error(), None);
    }

    #[tokio::test]
    async fn test_update_refreshes_current() {
        let (store, _) = store();
        store.fetch_list(1, 10, "").await.unwrap();
        store.fetch_by_id("1").await.unwrap();

        let patch = CustomerPatch {
            company: Some("Tech Solutions LLC".into()),
            ..Default::default()
        };
        store.update("1", patch).await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.find("1").unwrap().company, "Tech Solutions LLC");
        assert_eq!(state.current.as_ref().unwrap().company, "Tech Solutions LLC");
    }

    #[tokio::test]
    async fn test_create_update_delete_leaves_no_id() {
        let (store, _) = store();
        store.fetch_list(1, 10, "").await.unwrap();

        let Settlement::Fulfilled(created) = store.create(new_customer("Grace Hopper")).await.unwrap()
        else {
            panic!("create should succeed");
        };
        let patch = CustomerPatch {
            phone: Some("+1-555-0100".into()),
            ..Default::default()
        };
        let (_, updated) = tokio::join!(
            store.fetch_by_id("2"),
            store.update(created.id.clone(), patch),
        );
        assert!(updated.unwrap().is_fulfilled());

        let (_, deleted, _) = tokio::join!(
            store.fetch_by_id("3"),
            store.delete(created.id.clone()),
            store.set_search_query("grace"),
        );
        assert!(deleted.unwrap().is_fulfilled());
        assert!(store.snapshot().find(&created.id).is_none());

        // The source agrees
        store.fetch_list(1, 10, "").await.unwrap();
        assert!(store.snapshot().find(&created.id).is_none());
    }

    #[tokio::test]
    async fn test_failure_message_surfaces() {
        let (store, _) = store();
        let settled = store.fetch_by_id("404").await.unwrap();
        assert_eq!(settled, Settlement::Rejected("Customer not found".into()));
        assert_eq!(store.snapshot().error(), Some("Customer not found"));

        store.clear_error().await.unwrap();
        assert_eq!(store.snapshot().error(), None);
    }

    #[tokio::test]
    async fn test_fault_uses_fallback_and_keeps_list() {
        let (store, source) = store();
        store.fetch_list(1, 10, "").await.unwrap();
        let before = store.snapshot().customers;

        source.faults().fail_next(op::CUSTOMERS_LIST);
        store.fetch_list(2, 10, "x").await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.error(), Some("Failed to fetch customers"));
        assert_eq!(state.customers, before);
        assert_eq!(state.search_query, "");
    }

    #[tokio::test]
    async fn test_reducers() {
        let (store, _) = store();
        store.fetch_list(1, 2, "").await.unwrap();
        store.fetch_by_id("2").await.unwrap();
        store.set_search_query("acme").await.unwrap();
        store.set_current_page(3).await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.search_query, "acme");
        assert_eq!(state.current_page, 3);

        store.clear_current().await.unwrap();
        assert_eq!(store.snapshot().current, None);

        store.reset().await.unwrap();
        let state = store.snapshot();
        assert!(state.customers.is_empty());
        assert_eq!((state.current_page, state.total_pages), (1, 1));
        assert_eq!(state.search_query, "");
    }
}
