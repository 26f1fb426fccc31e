//! # Seed Data
//!
//! Canned records the mock sources start from.
//!
//! ## Contents
//! - 5 customers, ids `"1"`..`"5"`, created 2024-01-15 .. 2024-01-19
//! - 6 leads across all four statuses, $135,000 of pipeline,
//!   $40,000 of it converted
//! - 2 demo accounts, both with password `password123`
//!
//! | Account             | Role  | Token                  |
//! |---------------------|-------|------------------------|
//! | `admin@example.com` | admin | `mock-jwt-token-admin` |
//! | `user@example.com`  | user  | `mock-jwt-token-user`  |

use chrono::{DateTime, TimeZone, Utc};

use crm_core::{Customer, Lead, LeadStatus, Money, Role};

/// A demo sign-in the mock auth source accepts.
#[derive(Debug, Clone, Copy)]
pub struct DemoAccount {
    pub id: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub name: &'static str,
    pub role: Role,
    pub token: &'static str,
}

pub const ADMIN_ACCOUNT: DemoAccount = DemoAccount {
    id: "1",
    email: "admin@example.com",
    password: "password123",
    name: "Admin User",
    role: Role::Admin,
    token: "mock-jwt-token-admin",
};

pub const USER_ACCOUNT: DemoAccount = DemoAccount {
    id: "2",
    email: "user@example.com",
    password: "password123",
    name: "Regular User",
    role: Role::User,
    token: "mock-jwt-token-user",
};

pub const DEMO_ACCOUNTS: &[DemoAccount] = &[ADMIN_ACCOUNT, USER_ACCOUNT];

/// (id, name, email, phone, company, day of January 2024)
const CUSTOMERS: &[(&str, &str, &str, &str, &str, u32)] = &[
    ("1", "John Smith", "john.smith@example.com", "+1-555-0123", "Tech Solutions Inc", 15),
    ("2", "Sarah Johnson", "sarah.j@business.com", "+1-555-0124", "Business Corp", 16),
    ("3", "Michael Brown", "mbrown@startup.io", "+1-555-0125", "Startup Labs", 17),
    ("4", "Emily Davis", "emily@enterprise.com", "+1-555-0126", "Enterprise Solutions", 18),
    ("5", "David Wilson", "dwilson@consulting.com", "+1-555-0127", "Wilson Consulting", 19),
];

struct LeadSeed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    status: LeadStatus,
    dollars: i64,
    customer_id: &'static str,
    created: (u32, u32, u32),
    updated: (u32, u32, u32),
}

const LEADS: &[LeadSeed] = &[
    LeadSeed {
        id: "1",
        title: "Website Redesign Project",
        description: "Complete website overhaul with modern design",
        status: LeadStatus::New,
        dollars: 15_000,
        customer_id: "1",
        created: (15, 10, 30),
        updated: (15, 10, 30),
    },
    LeadSeed {
        id: "2",
        title: "CRM Implementation",
        description: "Custom CRM system development",
        status: LeadStatus::Contacted,
        dollars: 25_000,
        customer_id: "1",
        created: (16, 9, 0),
        updated: (18, 14, 20),
    },
    LeadSeed {
        id: "3",
        title: "Mobile App Development",
        description: "iOS and Android app for business",
        status: LeadStatus::Converted,
        dollars: 40_000,
        customer_id: "2",
        created: (17, 11, 15),
        updated: (19, 16, 45),
    },
    LeadSeed {
        id: "4",
        title: "Data Migration",
        description: "Legacy system data migration",
        status: LeadStatus::Lost,
        dollars: 8_000,
        customer_id: "3",
        created: (18, 13, 20),
        updated: (20, 10, 10),
    },
    LeadSeed {
        id: "5",
        title: "Cloud Infrastructure",
        description: "AWS cloud setup and management",
        status: LeadStatus::Contacted,
        dollars: 12_000,
        customer_id: "4",
        created: (19, 8, 45),
        updated: (19, 15, 30),
    },
    LeadSeed {
        id: "6",
        title: "E-commerce Platform",
        description: "Custom e-commerce solution",
        status: LeadStatus::New,
        dollars: 35_000,
        customer_id: "5",
        created: (20, 10, 0),
        updated: (20, 10, 0),
    },
];

fn january_2024(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

/// The five demo customers, oldest first.
pub fn customers() -> Vec<Customer> {
    CUSTOMERS
        .iter()
        .map(|&(id, name, email, phone, company, day)| {
            let at = january_2024(day, 10, 0);
            Customer {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                company: company.to_string(),
                created_at: at,
                updated_at: at,
            }
        })
        .collect()
}

/// The six demo leads, oldest first.
pub fn leads() -> Vec<Lead> {
    LEADS
        .iter()
        .map(|seed| {
            let (day, hour, minute) = seed.created;
            let created_at = january_2024(day, hour, minute);
            let (day, hour, minute) = seed.updated;
            let updated_at = january_2024(day, hour, minute);
            Lead {
                id: seed.id.to_string(),
                title: seed.title.to_string(),
                description: seed.description.to_string(),
                status: seed.status,
                value: Money::from_dollars(seed.dollars),
                customer_id: seed.customer_id.to_string(),
                created_at,
                updated_at,
            }
        })
        .collect()
}
