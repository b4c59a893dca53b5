//! Input validation and category inference.
//!
//! Request bodies arrive as [`ContactInput`]. [`validate_new_contact`] and
//! [`validate_patch`] trim every provided field, enforce the required-field,
//! email-format and column-width rules, and return the normalized payload
//! the stores accept.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ContactError, Result};
use crate::models::{ContactInput, ContactPatch, NewContact};

pub const MAX_NAME_LEN: usize = 80;
pub const MAX_EMAIL_LEN: usize = 120;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_CATEGORY_LEN: usize = 50;

/// Domains whose addresses are filed as `"Personal"` by default.
pub const PERSONAL_DOMAINS: [&str; 3] = ["gmail.com", "yahoo.com", "hotmail.com"];

pub const CATEGORY_PERSONAL: &str = "Personal";
pub const CATEGORY_WORK: &str = "Work";

pub const MSG_REQUIRED: &str = "First name, last name, and email are required";
pub const MSG_INVALID_EMAIL: &str = "Invalid email format";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .unwrap_or_else(|e| panic!("email pattern must compile: {e}"))
});

/// Whether `email` has the `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Default category for a contact created without one.
///
/// The lower-cased domain (text after the last `@`) must equal one of
/// [`PERSONAL_DOMAINS`]; subdomains and look-alikes are `"Work"`.
pub fn infer_category(email: &str) -> &'static str {
    let domain = email
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_ascii_lowercase());
    match domain {
        Some(d) if PERSONAL_DOMAINS.contains(&d.as_str()) => CATEGORY_PERSONAL,
        _ => CATEGORY_WORK,
    }
}

/// Validate a create request.
pub fn validate_new_contact(input: ContactInput) -> Result<NewContact> {
    let first_name = trimmed(input.first_name).unwrap_or_default();
    let last_name = trimmed(input.last_name).unwrap_or_default();
    let email = trimmed(input.email).unwrap_or_default();

    if first_name.is_empty() || last_name.is_empty() || email.is_empty() {
        return Err(ContactError::validation(MSG_REQUIRED));
    }
    if !is_valid_email(&email) {
        return Err(ContactError::validation(MSG_INVALID_EMAIL));
    }

    let phone = trimmed(input.phone).filter(|p| !p.is_empty());
    let category = trimmed(input.category)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| infer_category(&email).to_string());

    check_len("firstName", &first_name, MAX_NAME_LEN)?;
    check_len("lastName", &last_name, MAX_NAME_LEN)?;
    check_len("email", &email, MAX_EMAIL_LEN)?;
    if let Some(phone) = &phone {
        check_len("phone", phone, MAX_PHONE_LEN)?;
    }
    check_len("category", &category, MAX_CATEGORY_LEN)?;

    Ok(NewContact {
        first_name,
        last_name,
        email,
        phone,
        category,
    })
}

/// Validate a partial update.
///
/// Provided names and email must stay non-empty and a provided email must
/// be well formed. A blank `phone` or `category` clears that column.
pub fn validate_patch(input: ContactInput) -> Result<ContactPatch> {
    let first_name = trimmed(input.first_name);
    let last_name = trimmed(input.last_name);
    let email = trimmed(input.email);

    for (field, value) in [
        ("firstName", &first_name),
        ("lastName", &last_name),
        ("email", &email),
    ] {
        if value.as_deref() == Some("") {
            return Err(ContactError::validation(format!("{field} must not be empty")));
        }
    }
    if let Some(email) = &email {
        if !is_valid_email(email) {
            return Err(ContactError::validation(MSG_INVALID_EMAIL));
        }
        check_len("email", email, MAX_EMAIL_LEN)?;
    }
    if let Some(name) = &first_name {
        check_len("firstName", name, MAX_NAME_LEN)?;
    }
    if let Some(name) = &last_name {
        check_len("lastName", name, MAX_NAME_LEN)?;
    }

    let phone = trimmed(input.phone).map(|p| Some(p).filter(|p| !p.is_empty()));
    let category = trimmed(input.category).map(|c| Some(c).filter(|c| !c.is_empty()));
    if let Some(Some(phone)) = &phone {
        check_len("phone", phone, MAX_PHONE_LEN)?;
    }
    if let Some(Some(category)) = &category {
        check_len("category", category, MAX_CATEGORY_LEN)?;
    }

    Ok(ContactPatch {
        first_name,
        last_name,
        email,
        phone,
        category,
    })
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(ContactError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}
