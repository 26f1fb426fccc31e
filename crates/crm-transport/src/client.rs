//! # API Client
//!
//! The one place that speaks HTTP to the Relay backend.
//!
//! ## Request Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         ApiClient::send                                 │
//! │                                                                         │
//! │  1. token = session.token()     ──► Authorization: Bearer <token>      │
//! │  2. send (10 s timeout, no retry)                                      │
//! │       │                                                                 │
//! │       ├── no response ──────────► failure("Network Error")             │
//! │       │                           failure("timeout of 10000ms exceeded")│
//! │       ▼                                                                 │
//! │  3. status 401? ─────────────────► session.expire()                     │
//! │       │                             (clears auth_token + user_data,    │
//! │       │                              broadcasts Unauthenticated)       │
//! │       ▼                                                                 │
//! │  4. 2xx  ──► { success: true,  data: body.data, message: body.message }│
//! │     else ──► { success: false, message: body.message                   │
//! │                               || "Request failed with status code N" } │
//! │                                                                         │
//! │  A 2xx body that is not JSON is the only fault (SourceError::Decode).  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crm_core::ApiResponse;
use crm_data::{Session, SourceError, SourceResult};

use crate::error::{TransportError, TransportResult};

/// Base URL of the development backend.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct SuccessBody<T> {
    #[serde(default = "none")]
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

fn none<T>() -> Option<T> {
    None
}

/// HTTP client bound to one backend and one session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    timeout: Duration,
    session: Session,
}

impl ApiClient {
    /// Builds a client for `base_url` (http or https).
    ///
    /// # Errors
    ///
    /// `InvalidUrl` for a bad base URL, `ClientBuild` when reqwest cannot
    /// construct its client.
    pub fn new(base_url: &str, timeout: Duration, session: Session) -> TransportResult<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {base_url}"
            )));
        }
        // Url::join drops the last segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder().timeout(timeout).build()?;
        debug!(base_url = %base_url, timeout_ms = timeout.as_millis() as u64, "API client ready");

        Ok(ApiClient {
            http,
            base_url,
            timeout,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> SourceResult<Url> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| SourceError::transport(format!("invalid endpoint {path}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> SourceResult<ApiResponse<T>> {
        let url = self.endpoint(path, query)?;
        self.send(self.http.get(url)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> SourceResult<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path, &[])?;
        self.send(self.http.post(url).json(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> SourceResult<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path, &[])?;
        self.send(self.http.put(url).json(body)).await
    }

    /// POST whose response payload is ignored.
    pub async fn post_ack<B>(&self, path: &str, body: &B) -> SourceResult<ApiResponse<()>>
    where
        B: Serialize + ?Sized,
    {
        let response: ApiResponse<IgnoredAny> = self.post(path, body).await?;
        Ok(response.map(|_| ()))
    }

    /// DELETE; the response payload is ignored.
    pub async fn delete(&self, path: &str) -> SourceResult<ApiResponse<()>> {
        let url = self.endpoint(path, &[])?;
        let response: ApiResponse<IgnoredAny> = self.send(self.http.delete(url)).await?;
        Ok(response.map(|_| ()))
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> SourceResult<ApiResponse<T>> {
        let request = match self.session.token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(error) => return Ok(ApiResponse::failure(self.describe(&error))),
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(url = %response.url(), "Server rejected the session token");
            if let Err(error) = self.session.expire().await {
                warn!(error = %error, "Failed to clear persisted session");
            }
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(error) => return Ok(ApiResponse::failure(self.describe(&error))),
        };

        if status.is_success() {
            decode_success(&body)
        } else {
            debug!(status = status.as_u16(), "Request failed");
            Ok(ApiResponse::failure(error_message(status, &body)))
        }
    }

    /// The message shown when no response arrived.
    fn describe(&self, error: &reqwest::Error) -> String {
        debug!(error = %error, "Request did not complete");
        if error.is_timeout() {
            format!("timeout of {}ms exceeded", self.timeout.as_millis())
        } else if error.is_connect() {
            "Network Error".to_string()
        } else {
            error.to_string()
        }
    }
}

fn decode_success<T: DeserializeOwned>(body: &[u8]) -> SourceResult<ApiResponse<T>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApiResponse {
            success: true,
            data: None,
            message: None,
        });
    }

    let decoded: SuccessBody<T> = serde_json::from_slice(body)
        .map_err(|e| SourceError::decode(format!("invalid envelope: {e}")))?;
    Ok(ApiResponse {
        success: true,
        data: decoded.data,
        message: decoded.message,
    })
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, HeaderMap};
    use axum::routing::{delete, get};
    use axum::{Json, Router};
    use chrono::Utc;
    use crm_core::{AuthPayload, Role, User};
    use crm_data::SessionEvent;
    use serde_json::{json, Value};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
        format!("http://{addr}/api")
    }

    fn client(base_url: &str, session: Session) -> ApiClient {
        ApiClient::new(base_url, DEFAULT_TIMEOUT, session).unwrap()
    }

    async fn signed_in() -> Session {
        let session = Session::in_memory();
        session
            .persist(&AuthPayload {
                user: User {
                    id: "1".into(),
                    email: "admin@example.com".into(),
                    name: "Admin User".into(),
                    role: Role::Admin,
                    created_at: Utc::now(),
                },
                token: "mock-jwt-token-admin".into(),
            })
            .await
            .unwrap();
        session
    }

    async fn echo_auth(headers: HeaderMap) -> Json<Value> {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        Json(json!({ "success": true, "data": auth, "message": "ok" }))
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = ApiClient::new("ftp://example.com", DEFAULT_TIMEOUT, Session::in_memory())
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client(DEFAULT_API_URL, Session::in_memory());
        let url = client
            .endpoint("/customers", &[("page", "2"), ("search", "tech co")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/customers?page=2&search=tech+co"
        );
    }

    #[tokio::test]
    async fn test_bearer_token_injected() {
        let base = serve(Router::new().route("/api/whoami", get(echo_auth))).await;

        let anonymous = client(&base, Session::in_memory());
        let response: ApiResponse<String> = anonymous.get("/whoami", &[]).await.unwrap();
        assert_eq!(response.data.as_deref(), Some(""));

        let authed = client(&base, signed_in().await);
        let response: ApiResponse<String> = authed.get("/whoami", &[]).await.unwrap();
        assert!(response.success);
        assert_eq!(response.data.as_deref(), Some("Bearer mock-jwt-token-admin"));
    }

    #[tokio::test]
    async fn test_unauthorized_expires_session() {
        let app = Router::new().route(
            "/api/customers",
            get(|| async {
                (
                    axum::http::StatusCode::UNAUTHORIZED,
                    Json(json!({ "success": false, "message": "Token expired" })),
                )
            }),
        );
        let base = serve(app).await;
        let session = signed_in().await;
        let mut events = session.subscribe();

        let response: ApiResponse<Value> = client(&base, session.clone())
            .get("/customers", &[])
            .await
            .unwrap();

        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Token expired"));
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Unauthenticated);
        assert_eq!(session.token().await.unwrap(), None);
        assert_eq!(session.user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_error_status_without_message() {
        let app = Router::new().route(
            "/api/boom",
            get(|| async { axum::http::StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let base = serve(app).await;
        let response: ApiResponse<Value> = client(&base, Session::in_memory())
            .get("/boom", &[])
            .await
            .unwrap();
        assert_eq!(
            response.message.as_deref(),
            Some("Request failed with status code 500")
        );
    }

    #[tokio::test]
    async fn test_delete_ignores_payload() {
        let app = Router::new().route(
            "/api/leads/{id}",
            delete(|| async {
                Json(json!({ "success": true, "data": {"id": "1"}, "message": "Lead deleted successfully" }))
            }),
        );
        let base = serve(app).await;
        let response = client(&base, Session::in_memory())
            .delete("/leads/1")
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some("Lead deleted successfully"));
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_a_fault() {
        let app = Router::new().route("/api/garbage", get(|| async { "<html>" }));
        let base = serve(app).await;
        let result: SourceResult<ApiResponse<Value>> = client(&base, Session::in_memory())
            .get("/garbage", &[])
            .await;
        assert!(matches!(result, Err(SourceError::Decode(_))));
    }

    #[tokio::test]
    async fn test_timeout_becomes_failure_envelope() {
        let app = Router::new().route(
            "/api/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Json(json!({ "success": true }))
            }),
        );
        let base = serve(app).await;
        let client = ApiClient::new(&base, Duration::from_millis(50), Session::in_memory()).unwrap();

        let response: ApiResponse<Value> = client.get("/slow", &[]).await.unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("timeout of 50ms exceeded"));
    }

    #[tokio::test]
    async fn test_connection_refused_becomes_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let response: ApiResponse<Value> = client(&format!("http://{addr}/api"), Session::in_memory())
            .get("/customers", &[])
            .await
            .unwrap();
        assert_eq!(response.message.as_deref(), Some("Network Error"));
    }
}
