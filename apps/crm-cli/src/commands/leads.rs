//! # Lead Commands
//!
//! The pipeline screen, the customer detail's lead list and the lead form.
//!
//! ```text
//! crm leads list [--status new|contacted|converted|lost|all]
//! crm leads customer <CUSTOMER_ID>
//! crm leads show <ID>
//! crm leads add --title .. --value 1500 --customer 1 [--status new] [--description ..]
//! crm leads edit <ID> [--title ..] [--status ..] [--value ..] [--customer ..]
//! crm leads delete <ID>
//! ```

use chrono::Utc;
use clap::{Args, Subcommand};
use serde_json::json;

use crm_core::format::{format_currency, format_relative_date, truncate_text};
use crm_core::validation::{validate_lead_value, validate_new_lead, validate_title};
use crm_core::{Lead, LeadPatch, LeadStatus, Money, NewLead, StatusFilter, ValidationError};

use crate::commands::{table, Output};
use crate::error::{check, fulfilled, CliError, CliResult};
use crate::state::AppState;

/// Titles wider than this are cut in tables.
const TITLE_WIDTH: usize = 32;

#[derive(Debug, Clone, Subcommand)]
pub enum LeadCommand {
    /// List the pipeline, optionally one status only
    List {
        #[arg(long, short, default_value = "all")]
        status: StatusFilter,
    },
    /// List the leads of one customer
    Customer { customer_id: String },
    /// Show one lead
    Show { id: String },
    /// Add a lead
    Add(LeadForm),
    /// Change some fields of a lead
    Edit {
        id: String,
        #[command(flatten)]
        changes: LeadChanges,
    },
    /// Delete a lead
    Delete { id: String },
}

#[derive(Debug, Clone, Args)]
pub struct LeadForm {
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "new")]
    pub status: LeadStatus,
    /// Value in dollars
    #[arg(long)]
    pub value: f64,
    /// Id of the owning customer
    #[arg(long = "customer")]
    pub customer_id: String,
}

#[derive(Debug, Clone, Default, Args)]
pub struct LeadChanges {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub status: Option<LeadStatus>,
    /// Value in dollars
    #[arg(long)]
    pub value: Option<f64>,
    #[arg(long = "customer")]
    pub customer_id: Option<String>,
}

impl LeadChanges {
    fn into_patch(self) -> CliResult<LeadPatch> {
        let mut errors: Vec<ValidationError> = Vec::new();
        if let Some(title) = &self.title {
            errors.extend(validate_title(title).err());
        }
        let value = match self.value.map(dollars).transpose() {
            Ok(value) => value,
            Err(err) => {
                errors.push(err);
                None
            }
        };
        if let Some(value) = value {
            errors.extend(validate_lead_value(value).err());
        }
        if matches!(&self.customer_id, Some(id) if id.trim().is_empty()) {
            errors.push(ValidationError::Required {
                field: "Customer".to_string(),
            });
        }
        check(errors)?;

        let patch = LeadPatch {
            title: self.title,
            description: self.description,
            status: self.status,
            value,
            customer_id: self.customer_id,
        };
        if patch == LeadPatch::default() {
            return Err(CliError::validation("Nothing to update"));
        }
        Ok(patch)
    }
}

/// `--value` in dollars. `inf`, `nan` and amounts too large for cents
/// are refused here; the range check is [`validate_lead_value`].
fn dollars(value: f64) -> Result<Money, ValidationError> {
    Money::try_from_dollars_f64(value).ok_or_else(|| ValidationError::InvalidFormat {
        field: "Value".to_string(),
    })
}

pub async fn execute(state: &AppState, command: LeadCommand) -> CliResult<Output> {
    state.require_user()?;

    match command {
        LeadCommand::List { status } => list(state, status).await,
        LeadCommand::Customer { customer_id } => for_customer(state, customer_id).await,
        LeadCommand::Show { id } => show(state, id).await,
        LeadCommand::Add(form) => add(state, form).await,
        LeadCommand::Edit { id, changes } => edit(state, id, changes).await,
        LeadCommand::Delete { id } => delete(state, id).await,
    }
}

async fn list(state: &AppState, filter: StatusFilter) -> CliResult<Output> {
    let leads = fulfilled(state.stores.leads.fetch_list(filter).await?)?;

    let mut text = format!("{} leads ({filter})", leads.len());
    text.push('\n');
    text.push_str(&lead_table(&leads));
    Output::new(&leads, text)
}

async fn for_customer(state: &AppState, customer_id: String) -> CliResult<Output> {
    let leads = fulfilled(state.stores.leads.fetch_by_customer(customer_id.clone()).await?)?;

    let text = if leads.is_empty() {
        format!("Customer {customer_id} has no leads")
    } else {
        format!(
            "{} leads for customer {customer_id}\n{}",
            leads.len(),
            lead_table(&leads)
        )
    };
    Output::new(&leads, text)
}

async fn show(state: &AppState, id: String) -> CliResult<Output> {
    let lead = fulfilled(state.stores.leads.fetch_by_id(id).await?)?;
    Output::new(&lead, describe(&lead))
}

async fn add(state: &AppState, form: LeadForm) -> CliResult<Output> {
    let data = NewLead {
        title: form.title,
        description: form.description,
        status: form.status,
        value: dollars(form.value).map_err(|err| CliError::validation(err.to_string()))?,
        customer_id: form.customer_id,
    };
    check(validate_new_lead(&data))?;

    let lead = fulfilled(state.stores.leads.create(data).await?)?;
    Output::new(&lead, format!("Created lead {} ({})", lead.id, lead.title))
}

async fn edit(state: &AppState, id: String, changes: LeadChanges) -> CliResult<Output> {
    let patch = changes.into_patch()?;
    let lead = fulfilled(state.stores.leads.update(id, patch).await?)?;
    Output::new(&lead, format!("Updated lead {}\n{}", lead.id, describe(&lead)))
}

async fn delete(state: &AppState, id: String) -> CliResult<Output> {
    fulfilled(state.stores.leads.delete(id.clone()).await?)?;
    Output::new(&json!({ "deleted": id }), format!("Deleted lead {id}"))
}

fn lead_table(leads: &[Lead]) -> String {
    let now = Utc::now();
    let mut rows = vec![vec![
        "ID".to_string(),
        "TITLE".to_string(),
        "STATUS".to_string(),
        "VALUE".to_string(),
        "CUSTOMER".to_string(),
        "UPDATED".to_string(),
    ]];
    rows.extend(leads.iter().map(|lead| {
        vec![
            lead.id.clone(),
            truncate_text(&lead.title, TITLE_WIDTH),
            lead.status.to_string(),
            format_currency(lead.value),
            lead.customer_id.clone(),
            format_relative_date(lead.updated_at, now),
        ]
    }));
    table(&rows)
}

fn describe(lead: &Lead) -> String {
    format!(
        "{} [{}]\n  Value:    {}\n  Customer: {}\n  Updated:  {}\n  {}",
        lead.title,
        lead.status,
        format_currency(lead.value),
        lead.customer_id,
        format_relative_date(lead.updated_at, Utc::now()),
        lead.description
    )
}
