//! Dashboard summary.
//!
//! By default the numbers come from the data source's stats endpoint. With
//! `--local` the full pipeline is fetched and aggregated in the lead store;
//! both paths produce the same figures for the same leads.

use crm_core::format::format_currency;
use crm_core::{DashboardStats, LeadStatus, StatusFilter};

use crate::commands::{table, Output};
use crate::error::{fulfilled, CliResult};
use crate::state::AppState;

pub async fn execute(state: &AppState, local: bool) -> CliResult<Output> {
    state.require_user()?;

    let stats = if local {
        fulfilled(state.stores.leads.fetch_list(StatusFilter::All).await?)?;
        state.stores.leads.aggregate_stats()
    } else {
        fulfilled(state.stores.leads.fetch_stats().await?)?
    };

    Output::new(&stats, render(&stats))
}

fn render(stats: &DashboardStats) -> String {
    let mut rows = vec![
        vec!["Total leads".to_string(), stats.total_leads.to_string()],
        vec!["Pipeline value".to_string(), format_currency(stats.total_value)],
        vec![
            "Conversion rate".to_string(),
            format!("{:.2}%", stats.conversion_rate.percentage()),
        ],
    ];
    rows.extend(LeadStatus::ALL.into_iter().map(|status| {
        vec![
            format!("  {status}"),
            stats.leads_by_status.get(status).to_string(),
        ]
    }));
    table(&rows)
}
