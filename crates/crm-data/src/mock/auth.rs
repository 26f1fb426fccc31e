use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crm_core::{ApiResponse, AuthPayload, LoginCredentials, RegisterData, Role, User};

use super::{op, simulate, Faults, Latency, SESSION_DELAY_MS, SIGN_IN_DELAY_MS};
use crate::error::SourceResult;
use crate::ports::AuthSource;
use crate::seed::{DemoAccount, DEMO_ACCOUNTS};
use crate::session::Session;

/// Accepts the demo accounts and persists sessions to `session`.
#[derive(Debug)]
pub struct MockAuthSource {
    session: Session,
    latency: Latency,
    faults: Faults,
}

impl MockAuthSource {
    pub fn new(session: Session, latency: Latency) -> Self {
        MockAuthSource {
            session,
            latency,
            faults: Faults::default(),
        }
    }

    pub fn faults(&self) -> &Faults {
        &self.faults
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn sign_in(&self, payload: AuthPayload, message: &str) -> SourceResult<ApiResponse<AuthPayload>> {
        self.session.persist(&payload).await?;
        Ok(ApiResponse::ok(payload, message))
    }
}

fn account_payload(account: &DemoAccount, token: String) -> AuthPayload {
    AuthPayload {
        user: User {
            id: account.id.to_string(),
            email: account.email.to_string(),
            name: account.name.to_string(),
            role: account.role,
            created_at: Utc::now(),
        },
        token,
    }
}

#[async_trait]
impl AuthSource for MockAuthSource {
    async fn login(&self, credentials: LoginCredentials) -> SourceResult<ApiResponse<AuthPayload>> {
        simulate(&self.latency, &self.faults, op::AUTH_LOGIN, SIGN_IN_DELAY_MS).await?;

        let account = DEMO_ACCOUNTS
            .iter()
            .find(|a| a.email == credentials.email && a.password == credentials.password);

        match account {
            Some(account) => {
                let payload = account_payload(account, account.token.to_string());
                self.sign_in(payload, "Login successful").await
            }
            None => Ok(ApiResponse::failure("Invalid email or password")),
        }
    }

    async fn register(&self, data: RegisterData) -> SourceResult<ApiResponse<AuthPayload>> {
        simulate(&self.latency, &self.faults, op::AUTH_REGISTER, SIGN_IN_DELAY_MS).await?;

        if data.password != data.confirm_password {
            return Ok(ApiResponse::failure("Passwords do not match"));
        }

        let id = Uuid::new_v4().to_string();
        let payload = AuthPayload {
            token: format!("mock-jwt-token-{id}"),
            user: User {
                id,
                email: data.email,
                name: data.name,
                role: Role::User,
                created_at: Utc::now(),
            },
        };
        self.sign_in(payload, "Registration successful").await
    }

    async fn logout(&self) -> SourceResult<ApiResponse<()>> {
        // Local credentials go first so a failed call still signs out
        self.session.clear().await?;
        simulate(&self.latency, &self.faults, op::AUTH_LOGOUT, SESSION_DELAY_MS).await?;
        Ok(ApiResponse::ok((), "Logout successful"))
    }

    async fn refresh(&self) -> SourceResult<ApiResponse<AuthPayload>> {
        simulate(&self.latency, &self.faults, op::AUTH_REFRESH, SESSION_DELAY_MS).await?;

        let Some(current) = self.session.load().await? else {
            return Ok(ApiResponse::failure("No active session"));
        };

        let payload = AuthPayload {
            user: current.user,
            token: format!("refreshed-token-{}", Uuid::new_v4()),
        };
        self.sign_in(payload, "Token refreshed").await
    }

    async fn saved_session(&self) -> SourceResult<Option<AuthPayload>> {
        self.faults.check(op::AUTH_RESTORE)?;
        Ok(self.session.load().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;

    fn source() -> MockAuthSource {
        MockAuthSource::new(Session::in_memory(), Latency::none())
    }

    #[tokio::test]
    async fn test_admin_login_persists_session() {
        let source = source();
        let payload = source
            .login(LoginCredentials::new("admin@example.com", "password123"))
            .await
            .unwrap()
            .into_result("login")
            .unwrap();

        assert_eq!(payload.user.role, Role::Admin);
        assert_eq!(payload.token, "mock-jwt-token-admin");
        assert_eq!(
            source.session().token().await.unwrap().as_deref(),
            Some("mock-jwt-token-admin")
        );
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let source = source();
        let response = source
            .login(LoginCredentials::new("admin@example.com", "wrong"))
            .await
            .unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Invalid email or password"));
        assert_eq!(source.session().token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_register_rejects_mismatched_passwords() {
        let response = source()
            .register(RegisterData {
                name: "Jo".into(),
                email: "jo@example.com".into(),
                password: "secret1".into(),
                confirm_password: "secret2".into(),
            })
            .await
            .unwrap();
        assert_eq!(response.message.as_deref(), Some("Passwords do not match"));
    }

    #[tokio::test]
    async fn test_register_creates_user() {
        let payload = source()
            .register(RegisterData {
                name: "Jo".into(),
                email: "jo@example.com".into(),
                password: "secret1".into(),
                confirm_password: "secret1".into(),
            })
            .await
            .unwrap()
            .into_result("register")
            .unwrap();
        assert_eq!(payload.user.role, Role::User);
        assert_eq!(payload.user.email, "jo@example.com");
        assert!(payload.token.starts_with("mock-jwt-token-"));
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_the_call_fails() {
        let source = source();
        source
            .login(LoginCredentials::new("user@example.com", "password123"))
            .await
            .unwrap();

        source.faults().fail_next(op::AUTH_LOGOUT);
        assert!(matches!(source.logout().await, Err(SourceError::Unavailable(_))));
        assert_eq!(source.saved_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_refresh_requires_a_session() {
        let source = source();
        let response = source.refresh().await.unwrap();
        assert_eq!(response.message.as_deref(), Some("No active session"));

        source
            .login(LoginCredentials::new("user@example.com", "password123"))
            .await
            .unwrap();
        let refreshed = source.refresh().await.unwrap().into_result("refresh").unwrap();
        assert_eq!(refreshed.user.id, "2");
        assert!(refreshed.token.starts_with("refreshed-token-"));
        assert_eq!(
            source.session().token().await.unwrap(),
            Some(refreshed.token)
        );
    }
}
