//! # CLI Commands
//!
//! One module per screen of the mobile app. Each command validates its
//! input, calls exactly one store operation, and renders the store's
//! snapshot afterwards.
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  crm customers list --search tech                                      │
//! │         │                                                               │
//! │         ▼  clap                                                         │
//! │  customers::execute(&state, CustomerCommand::List { .. })              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  state.stores.customers.fetch_list(1, 10, "tech")                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Settlement ── Rejected ──► CliError::rejected(message)                │
//! │         │                                                               │
//! │         ▼ Fulfilled                                                     │
//! │  Output { text, json } ──► stdout (text, or JSON with --json)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Commands
//!
//! ### Auth
//! - `login` / `register` / `logout` / `whoami` / `refresh`
//!
//! ### Customers
//! - `customers list|show|add|edit|delete`
//!
//! ### Leads
//! - `leads list|customer|show|add|edit|delete`
//!
//! ### Dashboard
//! - `dashboard [--local]`
//!
//! ### Config
//! - `config [--save]`

pub mod auth;
pub mod config;
pub mod customers;
pub mod dashboard;
pub mod leads;

use serde::Serialize;
use serde_json::json;

use crate::error::CliResult;

/// What a command produced.
#[derive(Debug, Clone)]
pub struct Output {
    pub text: String,
    pub json: serde_json::Value,
}

impl Output {
    /// Text for humans, `value` for `--json`.
    pub fn new<T: Serialize>(value: &T, text: impl Into<String>) -> CliResult<Self> {
        Ok(Output {
            text: text.into(),
            json: serde_json::to_value(value)?,
        })
    }

    /// A bare confirmation.
    pub fn message(text: impl Into<String>) -> Self {
        let text = text.into();
        Output {
            json: json!({ "message": text }),
            text,
        }
    }

    pub fn render(&self, as_json: bool) -> CliResult<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(&self.json)?)
        } else {
            Ok(self.text.clone())
        }
    }
}

/// Pads every column of `rows` to its widest cell.
pub(crate) fn table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|row| row.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    rows.iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(c, cell)| format!("{cell:<width$}", width = widths[c]))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
pub(crate) mod testing {
    use crm_transport::ClientConfig;

    use crate::state::AppState;

    /// Mock backend, no latency, session kept in memory.
    pub async fn mock_state() -> AppState {
        let mut config = ClientConfig::default();
        config.session.in_memory = true;
        config.mock.latency_scale = 0.0;
        AppState::connect(config).await.unwrap()
    }

    /// Same as [`mock_state`] with the admin signed in.
    pub async fn signed_in_state() -> AppState {
        let state = mock_state().await;
        crate::commands::auth::login(&state, "admin@example.com".into(), "password123".into())
            .await
            .unwrap();
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_pads_columns() {
        let rows = vec![
            vec!["ID".to_string(), "NAME".to_string()],
            vec!["10".to_string(), "Ann".to_string()],
        ];
        assert_eq!(table(&rows), "ID  NAME\n10  Ann");
    }

    #[test]
    fn test_render_json() {
        let output = Output::message("Signed out");
        assert_eq!(output.render(false).unwrap(), "Signed out");
        assert!(output.render(true).unwrap().contains("\"message\": \"Signed out\""));
    }
}
