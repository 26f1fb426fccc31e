use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crm_core::{ApiResponse, DashboardStats, Lead, LeadPatch, NewLead, StatusFilter};

use super::{op, simulate, Faults, Latency};
use super::{DELETE_DELAY_MS, GET_DELAY_MS, LIST_DELAY_MS, STATS_DELAY_MS, WRITE_DELAY_MS};
use crate::error::SourceResult;
use crate::ports::LeadSource;
use crate::seed;

const NOT_FOUND: &str = "Lead not found";

/// Leads held in memory, newest first after creation.
#[derive(Debug)]
pub struct MockLeadSource {
    leads: RwLock<Vec<Lead>>,
    latency: Latency,
    faults: Faults,
}

impl MockLeadSource {
    /// Starts from the six seed leads.
    pub fn new(latency: Latency) -> Self {
        Self::with_leads(seed::leads(), latency)
    }

    pub fn with_leads(leads: Vec<Lead>, latency: Latency) -> Self {
        MockLeadSource {
            leads: RwLock::new(leads),
            latency,
            faults: Faults::default(),
        }
    }

    pub fn faults(&self) -> &Faults {
        &self.faults
    }
}

#[async_trait]
impl LeadSource for MockLeadSource {
    async fn list(&self, filter: StatusFilter) -> SourceResult<ApiResponse<Vec<Lead>>> {
        simulate(&self.latency, &self.faults, op::LEADS_LIST, LIST_DELAY_MS).await?;

        let leads = self.leads.read().await;
        let matching = leads.iter().filter(|l| filter.matches(l)).cloned().collect();
        Ok(ApiResponse::ok(matching, "Leads retrieved successfully"))
    }

    async fn list_by_customer(&self, customer_id: &str) -> SourceResult<ApiResponse<Vec<Lead>>> {
        simulate(&self.latency, &self.faults, op::LEADS_BY_CUSTOMER, GET_DELAY_MS).await?;

        let leads = self.leads.read().await;
        let matching = leads
            .iter()
            .filter(|l| l.customer_id == customer_id)
            .cloned()
            .collect();
        Ok(ApiResponse::ok(matching, "Customer leads retrieved successfully"))
    }

    async fn get(&self, id: &str) -> SourceResult<ApiResponse<Lead>> {
        simulate(&self.latency, &self.faults, op::LEADS_GET, GET_DELAY_MS).await?;

        let leads = self.leads.read().await;
        Ok(match leads.iter().find(|l| l.id == id) {
            Some(lead) => ApiResponse::ok(lead.clone(), "Lead retrieved successfully"),
            None => ApiResponse::failure(NOT_FOUND),
        })
    }

    async fn create(&self, data: NewLead) -> SourceResult<ApiResponse<Lead>> {
        simulate(&self.latency, &self.faults, op::LEADS_CREATE, WRITE_DELAY_MS).await?;

        let now = Utc::now();
        let lead = Lead {
            id: Uuid::new_v4().to_string(),
            title: data.title,
            description: data.description,
            status: data.status,
            value: data.value,
            customer_id: data.customer_id,
            created_at: now,
            updated_at: now,
        };
        self.leads.write().await.insert(0, lead.clone());

        Ok(ApiResponse::ok(lead, "Lead created successfully"))
    }

    async fn update(&self, id: &str, patch: LeadPatch) -> SourceResult<ApiResponse<Lead>> {
        simulate(&self.latency, &self.faults, op::LEADS_UPDATE, WRITE_DELAY_MS).await?;

        let mut leads = self.leads.write().await;
        Ok(match leads.iter_mut().find(|l| l.id == id) {
            Some(lead) => {
                patch.apply_to(lead, Utc::now());
                ApiResponse::ok(lead.clone(), "Lead updated successfully")
            }
            None => ApiResponse::failure(NOT_FOUND),
        })
    }

    async fn delete(&self, id: &str) -> SourceResult<ApiResponse<()>> {
        simulate(&self.latency, &self.faults, op::LEADS_DELETE, DELETE_DELAY_MS).await?;

        let mut leads = self.leads.write().await;
        Ok(match leads.iter().position(|l| l.id == id) {
            Some(index) => {
                leads.remove(index);
                ApiResponse::ok((), "Lead deleted successfully")
            }
            None => ApiResponse::failure(NOT_FOUND),
        })
    }

    async fn stats(&self) -> SourceResult<ApiResponse<DashboardStats>> {
        simulate(&self.latency, &self.faults, op::LEADS_STATS, STATS_DELAY_MS).await?;

        let leads = self.leads.read().await;
        Ok(ApiResponse::ok(
            DashboardStats::aggregate(leads.iter()),
            "Dashboard stats retrieved successfully",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_core::{LeadStatus, Money};

    fn source() -> MockLeadSource {
        MockLeadSource::new(Latency::none())
    }

    #[tokio::test]
    async fn test_list_by_status() {
        let source = source();
        let all = source.list(StatusFilter::All).await.unwrap().into_result("list").unwrap();
        assert_eq!(all.len(), 6);

        let contacted = source
            .list(StatusFilter::Contacted)
            .await
            .unwrap()
            .into_result("list")
            .unwrap();
        let ids: Vec<&str> = contacted.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "5"]);
    }

    #[tokio::test]
    async fn test_list_by_customer() {
        let leads = source()
            .list_by_customer("1")
            .await
            .unwrap()
            .into_result("by customer")
            .unwrap();
        assert_eq!(leads.len(), 2);
        assert!(leads.iter().all(|l| l.customer_id == "1"));
    }

    #[tokio::test]
    async fn test_stats_follow_writes() {
        let source = source();
        let stats = source.stats().await.unwrap().into_result("stats").unwrap();
        assert_eq!(stats.total_leads, 6);
        assert_eq!(stats.conversion_rate.bps(), 2963);

        let created = source
            .create(NewLead {
                title: "Support Contract".into(),
                description: String::new(),
                status: LeadStatus::Converted,
                value: Money::from_dollars(15_000),
                customer_id: "2".into(),
            })
            .await
            .unwrap()
            .into_result("create")
            .unwrap();

        let stats = source.stats().await.unwrap().into_result("stats").unwrap();
        assert_eq!(stats.total_leads, 7);
        assert_eq!(stats.total_value, Money::from_dollars(150_000));
        assert_eq!(stats.leads_by_status.converted, 2);

        source.delete(&created.id).await.unwrap().into_ack().unwrap();
        let stats = source.stats().await.unwrap().into_result("stats").unwrap();
        assert_eq!(stats.total_leads, 6);
    }

    #[tokio::test]
    async fn test_update_missing() {
        let response = source().update("404", LeadPatch::default()).await.unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Lead not found"));
    }
}
