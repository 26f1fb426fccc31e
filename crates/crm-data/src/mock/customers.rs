use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crm_core::{ApiResponse, Customer, CustomerPatch, NewCustomer, Page};

use super::{op, simulate, Faults, Latency};
use super::{DELETE_DELAY_MS, GET_DELAY_MS, LIST_DELAY_MS, WRITE_DELAY_MS};
use crate::error::SourceResult;
use crate::ports::CustomerSource;
use crate::seed;

const NOT_FOUND: &str = "Customer not found";

/// Customers held in memory, newest first after creation.
#[derive(Debug)]
pub struct MockCustomerSource {
    customers: RwLock<Vec<Customer>>,
    latency: Latency,
    faults: Faults,
}

impl MockCustomerSource {
    /// Starts from the five seed customers.
    pub fn new(latency: Latency) -> Self {
        Self::with_customers(seed::customers(), latency)
    }

    pub fn with_customers(customers: Vec<Customer>, latency: Latency) -> Self {
        MockCustomerSource {
            customers: RwLock::new(customers),
            latency,
            faults: Faults::default(),
        }
    }

    pub fn faults(&self) -> &Faults {
        &self.faults
    }
}

/// Case-insensitive substring match on name, email or company.
fn matches_search(customer: &Customer, needle: &str) -> bool {
    [&customer.name, &customer.email, &customer.company]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

#[async_trait]
impl CustomerSource for MockCustomerSource {
    async fn list(
        &self,
        page: u32,
        page_size: u32,
        search: Option<&str>,
    ) -> SourceResult<ApiResponse<Page<Customer>>> {
        simulate(&self.latency, &self.faults, op::CUSTOMERS_LIST, LIST_DELAY_MS).await?;

        let customers = self.customers.read().await;
        let page = match search.filter(|q| !q.is_empty()) {
            Some(query) => {
                let needle = query.to_lowercase();
                let filtered: Vec<Customer> = customers
                    .iter()
                    .filter(|c| matches_search(c, &needle))
                    .cloned()
                    .collect();
                Page::slice(&filtered, page, page_size)
            }
            None => Page::slice(&customers, page, page_size),
        };

        Ok(ApiResponse::ok(page, "Customers retrieved successfully"))
    }

    async fn get(&self, id: &str) -> SourceResult<ApiResponse<Customer>> {
        simulate(&self.latency, &self.faults, op::CUSTOMERS_GET, GET_DELAY_MS).await?;

        let customers = self.customers.read().await;
        Ok(match customers.iter().find(|c| c.id == id) {
            Some(customer) => ApiResponse::ok(customer.clone(), "Customer retrieved successfully"),
            None => ApiResponse::failure(NOT_FOUND),
        })
    }

    async fn create(&self, data: NewCustomer) -> SourceResult<ApiResponse<Customer>> {
        simulate(&self.latency, &self.faults, op::CUSTOMERS_CREATE, WRITE_DELAY_MS).await?;

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: data.name,
            email: data.email,
            phone: data.phone,
            company: data.company,
            created_at: now,
            updated_at: now,
        };
        self.customers.write().await.insert(0, customer.clone());

        Ok(ApiResponse::ok(customer, "Customer created successfully"))
    }

    async fn update(&self, id: &str, patch: CustomerPatch) -> SourceResult<ApiResponse<Customer>> {
        simulate(&self.latency, &self.faults, op::CUSTOMERS_UPDATE, WRITE_DELAY_MS).await?;

        let mut customers = self.customers.write().await;
        Ok(match customers.iter_mut().find(|c| c.id == id) {
            Some(customer) => {
                patch.apply_to(customer, Utc::now());
                ApiResponse::ok(customer.clone(), "Customer updated successfully")
            }
            None => ApiResponse::failure(NOT_FOUND),
        })
    }

    async fn delete(&self, id: &str) -> SourceResult<ApiResponse<()>> {
        simulate(&self.latency, &self.faults, op::CUSTOMERS_DELETE, DELETE_DELAY_MS).await?;

        let mut customers = self.customers.write().await;
        Ok(match customers.iter().position(|c| c.id == id) {
            Some(index) => {
                customers.remove(index);
                ApiResponse::ok((), "Customer deleted successfully")
            }
            None => ApiResponse::failure(NOT_FOUND),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;

    fn source() -> MockCustomerSource {
        MockCustomerSource::new(Latency::none())
    }

    #[tokio::test]
    async fn test_list_first_page() {
        let page = source().list(1, 2, None).await.unwrap().into_result("list").unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].name, "John Smith");
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 5);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let source = source();
        let page = source.list(1, 10, Some("STARTUP")).await.unwrap();
        let page = page.into_result("list").unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.data[0].name, "Michael Brown");

        let page = source.list(1, 10, Some("example.com")).await.unwrap();
        assert_eq!(page.into_result("list").unwrap().data[0].id, "1");

        let page = source.list(1, 10, Some("")).await.unwrap();
        assert_eq!(page.into_result("list").unwrap().total_items, 5);
    }

    #[tokio::test]
    async fn test_get_missing_is_a_failure_envelope() {
        let response = source().get("404").await.unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Customer not found"));
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let source = source();
        let created = source
            .create(NewCustomer {
                name: "Ada Lovelace".into(),
                email: "ada@engines.io".into(),
                phone: "+44 20 7946 0000".into(),
                company: "Analytical Engines".into(),
            })
            .await
            .unwrap()
            .into_result("create")
            .unwrap();

        let page = source.list(1, 10, None).await.unwrap().into_result("list").unwrap();
        assert_eq!(page.data[0].id, created.id);

        let patch = CustomerPatch {
            company: Some("Difference Engines".into()),
            ..Default::default()
        };
        let updated = source
            .update(&created.id, patch)
            .await
            .unwrap()
            .into_result("update")
            .unwrap();
        assert_eq!(updated.company, "Difference Engines");
        assert_eq!(updated.name, "Ada Lovelace");

        source.delete(&created.id).await.unwrap().into_ack().unwrap();
        let again = source.delete(&created.id).await.unwrap();
        assert_eq!(again.message.as_deref(), Some("Customer not found"));
    }

    #[tokio::test]
    async fn test_armed_fault() {
        let source = source();
        source.faults().fail_next(op::CUSTOMERS_LIST);
        assert!(matches!(
            source.list(1, 10, None).await,
            Err(SourceError::Unavailable(_))
        ));
        assert!(source.list(1, 10, None).await.is_ok());
    }
}
