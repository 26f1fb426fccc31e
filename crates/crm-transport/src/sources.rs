//! # HTTP Data Sources
//!
//! REST implementations of the crm-data ports.
//!
//! ## Endpoints
//! ```text
//! CustomerSource  GET    /customers?page&pageSize&search
//!                 GET    /customers/{id}
//!                 POST   /customers
//!                 PUT    /customers/{id}
//!                 DELETE /customers/{id}
//!
//! LeadSource      GET    /leads?status          (no status for All)
//!                 GET    /customers/{id}/leads
//!                 GET    /leads/{id}
//!                 POST   /leads
//!                 PUT    /leads/{id}
//!                 DELETE /leads/{id}
//!                 GET    /dashboard/stats
//!
//! AuthSource      POST   /auth/login
//!                 POST   /auth/register
//!                 POST   /auth/logout
//!                 POST   /auth/refresh          { token }
//! ```

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crm_core::{
    ApiResponse, AuthPayload, Customer, CustomerPatch, DashboardStats, Lead, LeadPatch,
    LoginCredentials, NewCustomer, NewLead, Page, RegisterData, StatusFilter,
};
use crm_data::{AuthSource, CustomerSource, LeadSource, SourceResult};

use crate::client::ApiClient;

// =============================================================================
// Customers
// =============================================================================

#[derive(Debug, Clone)]
pub struct HttpCustomerSource {
    client: ApiClient,
}

impl HttpCustomerSource {
    pub fn new(client: ApiClient) -> Self {
        HttpCustomerSource { client }
    }
}

#[async_trait]
impl CustomerSource for HttpCustomerSource {
    async fn list(
        &self,
        page: u32,
        page_size: u32,
        search: Option<&str>,
    ) -> SourceResult<ApiResponse<Page<Customer>>> {
        let page = page.to_string();
        let page_size = page_size.to_string();
        let mut query = vec![("page", page.as_str()), ("pageSize", page_size.as_str())];
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            query.push(("search", search));
        }
        self.client.get("/customers", &query).await
    }

    async fn get(&self, id: &str) -> SourceResult<ApiResponse<Customer>> {
        self.client.get(&format!("/customers/{id}"), &[]).await
    }

    async fn create(&self, data: NewCustomer) -> SourceResult<ApiResponse<Customer>> {
        self.client.post("/customers", &data).await
    }

    async fn update(&self, id: &str, patch: CustomerPatch) -> SourceResult<ApiResponse<Customer>> {
        self.client.put(&format!("/customers/{id}"), &patch).await
    }

    async fn delete(&self, id: &str) -> SourceResult<ApiResponse<()>> {
        self.client.delete(&format!("/customers/{id}")).await
    }
}

// =============================================================================
// Leads
// =============================================================================

#[derive(Debug, Clone)]
pub struct HttpLeadSource {
    client: ApiClient,
}

impl HttpLeadSource {
    pub fn new(client: ApiClient) -> Self {
        HttpLeadSource { client }
    }
}

#[async_trait]
impl LeadSource for HttpLeadSource {
    async fn list(&self, filter: StatusFilter) -> SourceResult<ApiResponse<Vec<Lead>>> {
        match filter.status() {
            Some(status) => self.client.get("/leads", &[("status", status.as_str())]).await,
            None => self.client.get("/leads", &[]).await,
        }
    }

    async fn list_by_customer(&self, customer_id: &str) -> SourceResult<ApiResponse<Vec<Lead>>> {
        self.client
            .get(&format!("/customers/{customer_id}/leads"), &[])
            .await
    }

    async fn get(&self, id: &str) -> SourceResult<ApiResponse<Lead>> {
        self.client.get(&format!("/leads/{id}"), &[]).await
    }

    async fn create(&self, data: NewLead) -> SourceResult<ApiResponse<Lead>> {
        self.client.post("/leads", &data).await
    }

    async fn update(&self, id: &str, patch: LeadPatch) -> SourceResult<ApiResponse<Lead>> {
        self.client.put(&format!("/leads/{id}"), &patch).await
    }

    async fn delete(&self, id: &str) -> SourceResult<ApiResponse<()>> {
        self.client.delete(&format!("/leads/{id}")).await
    }

    async fn stats(&self) -> SourceResult<ApiResponse<DashboardStats>> {
        self.client.get("/dashboard/stats", &[]).await
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Signs in against the backend and keeps the session in step.
#[derive(Debug, Clone)]
pub struct HttpAuthSource {
    client: ApiClient,
}

impl HttpAuthSource {
    pub fn new(client: ApiClient) -> Self {
        HttpAuthSource { client }
    }

    async fn remember(
        &self,
        response: ApiResponse<AuthPayload>,
    ) -> SourceResult<ApiResponse<AuthPayload>> {
        if let (true, Some(payload)) = (response.success, response.data.as_ref()) {
            self.client.session().persist(payload).await?;
        }
        Ok(response)
    }
}

#[async_trait]
impl AuthSource for HttpAuthSource {
    async fn login(&self, credentials: LoginCredentials) -> SourceResult<ApiResponse<AuthPayload>> {
        let response = self.client.post("/auth/login", &credentials).await?;
        self.remember(response).await
    }

    async fn register(&self, data: RegisterData) -> SourceResult<ApiResponse<AuthPayload>> {
        let response = self.client.post("/auth/register", &data).await?;
        self.remember(response).await
    }

    async fn logout(&self) -> SourceResult<ApiResponse<()>> {
        // The bearer token has to ride on the logout call, so clear after
        let response = self.client.post_ack("/auth/logout", &json!({})).await;
        if let Err(error) = self.client.session().clear().await {
            warn!(error = %error, "Failed to clear persisted session on logout");
        }
        response
    }

    async fn refresh(&self) -> SourceResult<ApiResponse<AuthPayload>> {
        let Some(token) = self.client.session().token().await? else {
            return Ok(ApiResponse::failure("No active session"));
        };
        let response = self
            .client
            .post("/auth/refresh", &json!({ "token": token }))
            .await?;
        self.remember(response).await
    }

    async fn saved_session(&self) -> SourceResult<Option<AuthPayload>> {
        Ok(self.client.session().load().await?)
    }
}

// =============================================================================
// Backend
// =============================================================================

/// The three HTTP sources sharing one client.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    pub customers: Arc<HttpCustomerSource>,
    pub leads: Arc<HttpLeadSource>,
    pub auth: Arc<HttpAuthSource>,
}

impl HttpBackend {
    pub fn new(client: ApiClient) -> Self {
        HttpBackend {
            customers: Arc::new(HttpCustomerSource::new(client.clone())),
            leads: Arc::new(HttpLeadSource::new(client.clone())),
            auth: Arc::new(HttpAuthSource::new(client)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DEFAULT_TIMEOUT;
    use axum::extract::{Path, Query};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use crm_core::Role;
    use crm_data::Session;
    use serde_json::Value;
    use std::collections::HashMap;

    async fn serve(app: Router) -> ApiClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
        ApiClient::new(&format!("http://{addr}/api"), DEFAULT_TIMEOUT, Session::in_memory()).unwrap()
    }

    fn customer_json(id: &str) -> Value {
        json!({
            "id": id,
            "name": "John Smith",
            "email": "john.smith@example.com",
            "phone": "+1-555-0123",
            "company": "Tech Solutions Inc",
            "createdAt": "2024-01-15T10:00:00Z",
            "updatedAt": "2024-01-15T10:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_customer_list_sends_paging_query() {
        let app = Router::new().route(
            "/api/customers",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("page").map(String::as_str), Some("2"));
                assert_eq!(params.get("pageSize").map(String::as_str), Some("1"));
                assert_eq!(params.get("search").map(String::as_str), Some("tech"));
                Json(json!({
                    "success": true,
                    "message": "Customers retrieved successfully",
                    "data": {
                        "data": [customer_json("2")],
                        "currentPage": 2,
                        "totalPages": 5,
                        "totalItems": 5
                    }
                }))
            }),
        );
        let source = HttpCustomerSource::new(serve(app).await);

        let page = source
            .list(2, 1, Some("tech"))
            .await
            .unwrap()
            .into_result("list")
            .unwrap();
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.data[0].id, "2");
    }

    #[tokio::test]
    async fn test_customer_get_by_path() {
        let app = Router::new().route(
            "/api/customers/{id}",
            get(|Path(id): Path<String>| async move {
                Json(json!({ "success": true, "data": customer_json(&id) }))
            }),
        );
        let source = HttpCustomerSource::new(serve(app).await);
        let customer = source.get("7").await.unwrap().into_result("get").unwrap();
        assert_eq!(customer.id, "7");
    }

    #[tokio::test]
    async fn test_lead_list_omits_status_for_all() {
        let app = Router::new().route(
            "/api/leads",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let status = params.get("status").cloned().unwrap_or_else(|| "All".into());
                Json(json!({ "success": true, "data": [], "message": status }))
            }),
        );
        let source = HttpLeadSource::new(serve(app).await);

        let all = source.list(StatusFilter::All).await.unwrap();
        assert_eq!(all.message.as_deref(), Some("All"));
        let lost = source.list(StatusFilter::Lost).await.unwrap();
        assert_eq!(lost.message.as_deref(), Some("Lost"));
    }

    #[tokio::test]
    async fn test_login_persists_and_logout_clears() {
        let app = Router::new()
            .route(
                "/api/auth/login",
                post(|Json(body): Json<Value>| async move {
                    if body["password"] != "password123" {
                        return Json(json!({ "success": false, "message": "Invalid email or password" }));
                    }
                    Json(json!({
                        "success": true,
                        "message": "Login successful",
                        "data": {
                            "token": "server-token",
                            "user": {
                                "id": "1",
                                "email": body["email"],
                                "name": "Admin User",
                                "role": "admin",
                                "createdAt": "2024-01-01T00:00:00Z"
                            }
                        }
                    }))
                }),
            )
            .route(
                "/api/auth/logout",
                post(|| async { Json(json!({ "success": true, "message": "Logout successful" })) }),
            );
        let client = serve(app).await;
        let session = client.session().clone();
        let source = HttpAuthSource::new(client);

        let rejected = source
            .login(LoginCredentials::new("admin@example.com", "nope"))
            .await
            .unwrap();
        assert!(!rejected.success);
        assert_eq!(session.token().await.unwrap(), None);

        let payload = source
            .login(LoginCredentials::new("admin@example.com", "password123"))
            .await
            .unwrap()
            .into_result("login")
            .unwrap();
        assert_eq!(payload.user.role, Role::Admin);
        assert_eq!(session.token().await.unwrap().as_deref(), Some("server-token"));
        assert_eq!(source.saved_session().await.unwrap(), Some(payload));

        source.logout().await.unwrap().into_ack().unwrap();
        assert_eq!(session.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_refresh_without_session() {
        let source = HttpAuthSource::new(serve(Router::new()).await);
        let response = source.refresh().await.unwrap();
        assert_eq!(response.message.as_deref(), Some("No active session"));
    }
}
