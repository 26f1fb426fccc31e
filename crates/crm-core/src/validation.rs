//! # Validation Module
//!
//! Form validation for Relay CRM.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (THIS MODULE)                                           │
//! │  ├── Required fields, lengths, email / phone shape                     │
//! │  └── Errors shown inline per field, store state untouched              │
//! │           │                                                             │
//! │           ▼  only a clean form reaches a store                          │
//! │  Layer 2: Data source                                                  │
//! │  ├── "Passwords do not match", "Customer not found"                    │
//! │  └── Surfaced as the store's lifecycle error                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Single-field validators return the first problem with that field. Form
//! validators collect one error per failing field, in form order.
//!
//! ## Usage
//! ```rust
//! use crm_core::validation::{validate_login, validate_email};
//! use crm_core::LoginCredentials;
//!
//! assert!(validate_email("admin@example.com").is_ok());
//!
//! let errors = validate_login(&LoginCredentials::new("", "123"));
//! assert_eq!(errors.len(), 2);
//! assert_eq!(errors[0].to_string(), "Email is required");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;
use crate::format::format_currency;
use crate::money::{Money, MAX_LEAD_VALUE};
use crate::types::{LoginCredentials, NewCustomer, NewLead, RegisterData};
use crate::MIN_PASSWORD_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum length of a display name at registration.
pub const MIN_NAME_LENGTH: usize = 2;

/// Maximum length of a lead title.
pub const MAX_TITLE_LENGTH: usize = 200;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[\d\s\-()]{10,}$").expect("valid phone regex"));

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Predicates
// =============================================================================

/// `local@domain.tld` with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// At least ten digits, spaces, dashes or parentheses, optional leading `+`.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

// =============================================================================
// Field Validators
// =============================================================================

pub fn validate_email(email: &str) -> ValidationResult<()> {
    required("Email", email)?;
    if !is_valid_email(email.trim()) {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
        });
    }
    Ok(())
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "Password".to_string(),
        });
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "Password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    required("Phone", phone)?;
    if !is_valid_phone(phone.trim()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
        });
    }
    Ok(())
}

/// Person or company name: required, at least [`MIN_NAME_LENGTH`] chars.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    required("Name", name)?;
    if name.trim().chars().count() < MIN_NAME_LENGTH {
        return Err(ValidationError::TooShort {
            field: "Name".to_string(),
            min: MIN_NAME_LENGTH,
        });
    }
    Ok(())
}

pub fn validate_title(title: &str) -> ValidationResult<()> {
    required("Title", title)?;
    if title.trim().chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "Title".to_string(),
            max: MAX_TITLE_LENGTH,
        });
    }
    Ok(())
}

// =============================================================================
// Form Validators
// =============================================================================

/// Login form: email then password.
pub fn validate_login(credentials: &LoginCredentials) -> Vec<ValidationError> {
    [
        validate_email(&credentials.email),
        validate_password(&credentials.password),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}

/// Registration form: name, email, password, confirmation.
pub fn validate_registration(data: &RegisterData) -> Vec<ValidationError> {
    let confirm = if data.confirm_password.is_empty() {
        Err(ValidationError::Required {
            field: "Confirm Password".to_string(),
        })
    } else if data.confirm_password != data.password {
        Err(ValidationError::Mismatch {
            field: "Passwords".to_string(),
        })
    } else {
        Ok(())
    };

    [
        validate_name(&data.name),
        validate_email(&data.email),
        validate_password(&data.password),
        confirm,
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}

/// Add/edit customer form.
pub fn validate_new_customer(customer: &NewCustomer) -> Vec<ValidationError> {
    [
        validate_name(&customer.name),
        validate_email(&customer.email),
        validate_phone(&customer.phone),
        required("Company", &customer.company),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}

/// A lead's value: zero up to [`MAX_LEAD_VALUE`].
pub fn validate_lead_value(value: Money) -> ValidationResult<()> {
    if value.is_negative() {
        Err(ValidationError::Negative {
            field: "Value".to_string(),
        })
    } else if value > MAX_LEAD_VALUE {
        Err(ValidationError::Exceeds {
            field: "Value".to_string(),
            max: format_currency(MAX_LEAD_VALUE),
        })
    } else {
        Ok(())
    }
}

/// Add/edit lead form.
pub fn validate_new_lead(lead: &NewLead) -> Vec<ValidationError> {
    [
        validate_title(&lead.title),
        validate_lead_value(lead.value),
        required("Customer", &lead.customer_id),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::LeadStatus;

    #[test]
    fn test_email() {
        assert!(is_valid_email("john.smith@example.com"));
        assert!(!is_valid_email("john smith@example.com"));
        assert!(!is_valid_email("john@example"));
        assert_eq!(
            validate_email("nope").unwrap_err().to_string(),
            "Invalid email format"
        );
    }

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("+1-555-0123 44"));
        assert!(is_valid_phone("(555) 012-3456"));
        assert!(!is_valid_phone("555-0123"));
        assert!(!is_valid_phone("555-0123-abc"));
    }

    #[test]
    fn test_login_form() {
        let errors = validate_login(&LoginCredentials::new("admin@example.com", "password123"));
        assert!(errors.is_empty());

        let errors = validate_login(&LoginCredentials::new("bad", ""));
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(messages, vec!["Invalid email format", "Password is required"]);

        let errors = validate_login(&LoginCredentials::new("a@b.co", "12345"));
        assert_eq!(errors[0].to_string(), "Password must be at least 6 characters");
    }

    #[test]
    fn test_registration_form() {
        let mut data = RegisterData {
            name: "J".into(),
            email: "j@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret2".into(),
        };
        let messages: Vec<String> = validate_registration(&data)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            messages,
            vec!["Name must be at least 2 characters", "Passwords must match"]
        );

        data.name = "Jo".into();
        data.confirm_password = String::new();
        let errors = validate_registration(&data);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field(), "Confirm Password");
    }

    #[test]
    fn test_customer_form() {
        let customer = NewCustomer {
            name: "John Smith".into(),
            email: "john.smith@example.com".into(),
            phone: "+1-555-0123-45".into(),
            company: "Tech Solutions Inc".into(),
        };
        assert!(validate_new_customer(&customer).is_empty());

        let blank = NewCustomer {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            company: String::new(),
        };
        assert_eq!(validate_new_customer(&blank).len(), 4);
    }

    #[test]
    fn test_lead_form() {
        let lead = NewLead {
            title: " ".into(),
            description: String::new(),
            status: LeadStatus::New,
            value: Money::from_cents(-1),
            customer_id: "1".into(),
        };
        let errors = validate_new_lead(&lead);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].to_string(), "Title is required");
        assert_eq!(errors[1].to_string(), "Value must not be negative");
    }

    #[test]
    fn test_lead_value_bounds() {
        assert!(validate_lead_value(Money::zero()).is_ok());
        assert!(validate_lead_value(MAX_LEAD_VALUE).is_ok());

        let err = validate_lead_value(MAX_LEAD_VALUE + Money::from_cents(1)).unwrap_err();
        assert_eq!(err.to_string(), "Value must not exceed $1,000,000,000,000");

        let lead = NewLead {
            title: "Whale".into(),
            description: String::new(),
            status: LeadStatus::New,
            value: Money::from_cents(i64::MAX),
            customer_id: "1".into(),
        };
        let errors = validate_new_lead(&lead);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field(), "Value");
    }
}
