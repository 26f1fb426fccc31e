//! Sign-in commands.

use crm_core::format::capitalize_first_letter;
use crm_core::validation::{validate_login, validate_registration};
use crm_core::{LoginCredentials, RegisterData, Role, User};

use crate::commands::Output;
use crate::error::{check, fulfilled, CliResult};
use crate::state::AppState;

fn describe(user: &User) -> String {
    let role = match user.role {
        Role::Admin => "admin",
        Role::User => "user",
    };
    format!(
        "{} <{}> ({})",
        user.name,
        user.email,
        capitalize_first_letter(role)
    )
}

pub async fn login(state: &AppState, email: String, password: String) -> CliResult<Output> {
    let credentials = LoginCredentials::new(email, password);
    check(validate_login(&credentials))?;

    let user = fulfilled(state.stores.auth.login(credentials).await?)?;
    Output::new(&user, format!("Signed in as {}", describe(&user)))
}

pub async fn register(state: &AppState, data: RegisterData) -> CliResult<Output> {
    check(validate_registration(&data))?;

    let user = fulfilled(state.stores.auth.register(data).await?)?;
    Output::new(&user, format!("Registered and signed in as {}", describe(&user)))
}

/// Signs out and drops everything the other stores held for the old user.
pub async fn logout(state: &AppState) -> CliResult<Output> {
    let was_signed_in = state.stores.auth.snapshot().is_authenticated();
    state.stores.auth.logout().await?;
    state.stores.clear_domain_state().await?;

    Ok(Output::message(if was_signed_in {
        "Signed out"
    } else {
        "Not signed in"
    }))
}

pub fn whoami(state: &AppState) -> CliResult<Output> {
    let user = state.require_user()?;
    Output::new(&user, describe(&user))
}

pub async fn refresh(state: &AppState) -> CliResult<Output> {
    state.require_user()?;
    let user = fulfilled(state.stores.auth.refresh_token().await?)?;
    Output::new(&user, format!("Session refreshed for {}", describe(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{mock_state, signed_in_state};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_login_and_whoami() {
        let state = mock_state().await;
        assert_eq!(whoami(&state).unwrap_err().code, ErrorCode::NotSignedIn);

        let output = login(&state, "admin@example.com".into(), "password123".into())
            .await
            .unwrap();
        assert_eq!(output.text, "Signed in as Admin User <admin@example.com> (Admin)");
        assert_eq!(output.json["role"], "admin");

        assert!(whoami(&state).unwrap().text.contains("admin@example.com"));
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let state = mock_state().await;
        let err = login(&state, "admin@example.com".into(), "wrongpass".into())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Rejected);
        assert_eq!(err.message, "Invalid email or password");
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_the_store() {
        let state = mock_state().await;
        let err = login(&state, "not-an-email".into(), "123".into())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let data = RegisterData {
            name: "Lin".into(),
            email: "lin@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret2".into(),
        };
        let err = register(&state, data).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(state.stores.auth.snapshot().error(), None);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let state = signed_in_state().await;
        state.stores.customers.fetch_list(1, 10, "").await.unwrap();

        assert_eq!(logout(&state).await.unwrap().text, "Signed out");
        assert!(!state.stores.auth.snapshot().is_authenticated());
        assert!(state.stores.customers.snapshot().customers.is_empty());
        assert_eq!(logout(&state).await.unwrap().text, "Not signed in");
    }

    #[tokio::test]
    async fn test_refresh_requires_sign_in() {
        let state = mock_state().await;
        assert_eq!(refresh(&state).await.unwrap_err().code, ErrorCode::NotSignedIn);

        let state = signed_in_state().await;
        let output = refresh(&state).await.unwrap();
        assert!(output.text.starts_with("Session refreshed for Admin User"));
    }
}
