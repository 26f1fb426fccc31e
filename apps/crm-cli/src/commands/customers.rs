//! # Customer Commands
//!
//! The customer list screen: paging, search, detail and the add/edit form.
//!
//! ```text
//! crm customers list [--page N] [--page-size N] [--search TEXT]
//! crm customers show <ID>
//! crm customers add --name .. --email .. --phone .. --company ..
//! crm customers edit <ID> [--name ..] [--email ..] [--phone ..] [--company ..]
//! crm customers delete <ID>
//! ```

use clap::{Args, Subcommand};
use serde_json::json;

use crm_core::format::{format_date, LONG_DATE};
use crm_core::validation::{validate_email, validate_name, validate_new_customer, validate_phone};
use crm_core::{Customer, CustomerPatch, NewCustomer, ValidationError, MAX_PAGE_SIZE};

use crate::commands::{table, Output};
use crate::error::{check, fulfilled, CliError, CliResult};
use crate::state::AppState;

#[derive(Debug, Clone, Subcommand)]
pub enum CustomerCommand {
    /// List one page of customers
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Defaults to `store.page_size` from the config
        #[arg(long)]
        page_size: Option<u32>,
        /// Matches name, email or company
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Show one customer
    Show { id: String },
    /// Add a customer
    Add(CustomerForm),
    /// Change some fields of a customer
    Edit {
        id: String,
        #[command(flatten)]
        changes: CustomerChanges,
    },
    /// Delete a customer
    Delete { id: String },
}

#[derive(Debug, Clone, Args)]
pub struct CustomerForm {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub company: String,
}

#[derive(Debug, Clone, Default, Args)]
pub struct CustomerChanges {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
}

impl CustomerChanges {
    /// Validates the fields that were given and builds the patch.
    fn into_patch(self) -> CliResult<CustomerPatch> {
        let mut errors: Vec<ValidationError> = Vec::new();
        if let Some(name) = &self.name {
            errors.extend(validate_name(name).err());
        }
        if let Some(email) = &self.email {
            errors.extend(validate_email(email).err());
        }
        if let Some(phone) = &self.phone {
            errors.extend(validate_phone(phone).err());
        }
        if matches!(&self.company, Some(company) if company.trim().is_empty()) {
            errors.push(ValidationError::Required {
                field: "Company".to_string(),
            });
        }
        check(errors)?;

        let patch = CustomerPatch {
            name: self.name,
            email: self.email,
            phone: self.phone,
            company: self.company,
        };
        if patch == CustomerPatch::default() {
            return Err(CliError::validation("Nothing to update"));
        }
        Ok(patch)
    }
}

pub async fn execute(state: &AppState, command: CustomerCommand) -> CliResult<Output> {
    state.require_user()?;

    match command {
        CustomerCommand::List {
            page,
            page_size,
            search,
        } => list(state, page, page_size, search.unwrap_or_default()).await,
        CustomerCommand::Show { id } => show(state, id).await,
        CustomerCommand::Add(form) => add(state, form).await,
        CustomerCommand::Edit { id, changes } => edit(state, id, changes).await,
        CustomerCommand::Delete { id } => delete(state, id).await,
    }
}

async fn list(
    state: &AppState,
    page: u32,
    page_size: Option<u32>,
    search: String,
) -> CliResult<Output> {
    let page_size = page_size.unwrap_or(state.config.store.page_size);
    if page == 0 {
        return Err(CliError::validation("page must be at least 1"));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(CliError::validation(format!(
            "page-size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    state.stores.customers.set_search_query(search.clone()).await?;
    fulfilled(state.stores.customers.fetch_list(page, page_size, search).await?)?;

    let snapshot = state.stores.customers.snapshot();
    let mut text = format!(
        "Page {} of {} ({} shown)",
        snapshot.current_page,
        snapshot.total_pages,
        snapshot.customers.len()
    );
    if !snapshot.search_query.is_empty() {
        text.push_str(&format!(", search \"{}\"", snapshot.search_query));
    }
    if snapshot.customers.is_empty() {
        text.push_str("\nNo customers found");
    } else {
        text.push('\n');
        text.push_str(&customer_table(&snapshot.customers));
    }

    Output::new(&snapshot, text)
}

async fn show(state: &AppState, id: String) -> CliResult<Output> {
    let customer = fulfilled(state.stores.customers.fetch_by_id(id).await?)?;
    Output::new(&customer, describe(&customer))
}

async fn add(state: &AppState, form: CustomerForm) -> CliResult<Output> {
    let data = NewCustomer {
        name: form.name,
        email: form.email,
        phone: form.phone,
        company: form.company,
    };
    check(validate_new_customer(&data))?;

    let customer = fulfilled(state.stores.customers.create(data).await?)?;
    Output::new(
        &customer,
        format!("Created customer {} ({})", customer.id, customer.name),
    )
}

async fn edit(state: &AppState, id: String, changes: CustomerChanges) -> CliResult<Output> {
    let patch = changes.into_patch()?;
    let customer = fulfilled(state.stores.customers.update(id, patch).await?)?;
    Output::new(&customer, format!("Updated customer {}\n{}", customer.id, describe(&customer)))
}

async fn delete(state: &AppState, id: String) -> CliResult<Output> {
    fulfilled(state.stores.customers.delete(id.clone()).await?)?;
    Output::new(&json!({ "deleted": id }), format!("Deleted customer {id}"))
}

fn customer_table(customers: &[Customer]) -> String {
    let mut rows = vec![vec![
        "ID".to_string(),
        "NAME".to_string(),
        "COMPANY".to_string(),
        "EMAIL".to_string(),
        "PHONE".to_string(),
    ]];
    rows.extend(customers.iter().map(|c| {
        vec![
            c.id.clone(),
            c.name.clone(),
            c.company.clone(),
            c.email.clone(),
            c.phone.clone(),
        ]
    }));
    table(&rows)
}

fn describe(customer: &Customer) -> String {
    format!(
        "{}\n  Company: {}\n  Email:   {}\n  Phone:   {}\n  Since:   {}",
        customer.name,
        customer.company,
        customer.email,
        customer.phone,
        format_date(customer.created_at, LONG_DATE)
    )
}
