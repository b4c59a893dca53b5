//! Core data models for Contact Book.
//!
//! [`Contact`] is the stored row and also the JSON shape returned to
//! clients. [`ContactInput`] is the raw request body for create and update;
//! [`validation`](crate::validation) turns it into a [`NewContact`] or a
//! [`ContactPatch`] before any store is touched.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A stored contact.
///
/// Serializes with camelCase keys: `id, firstName, lastName, email, phone,
/// category, createdAt, updatedAt`. Timestamps are RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Whether this contact passes `filter`.
    ///
    /// The search term is an ASCII case-insensitive substring match over
    /// first name, last name, and email; the category must match exactly.
    pub fn matches(&self, filter: &ContactFilter) -> bool {
        if let Some(category) = filter.category.as_deref() {
            if self.category.as_deref() != Some(category) {
                return false;
            }
        }
        match filter.search.as_deref() {
            Some(term) => {
                let term = term.to_ascii_lowercase();
                [&self.first_name, &self.last_name, &self.email]
                    .iter()
                    .any(|field| field.to_ascii_lowercase().contains(&term))
            }
            None => true,
        }
    }

    /// Apply the provided fields of `patch` and stamp `updated_at`.
    pub fn apply(&mut self, patch: &ContactPatch, now: DateTime<Utc>) {
        if let Some(first_name) = &patch.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = phone.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        // Clock steps backwards must not break created_at <= updated_at.
        self.updated_at = now.max(self.updated_at);
    }
}

/// Raw create/update request body.
///
/// Every field is optional at the parsing stage so that a missing field is
/// reported as a validation message rather than a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// A validated create payload. Fields are trimmed and the category is
/// already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub category: String,
}

impl NewContact {
    /// Build the stored row for this payload with the given id and time.
    pub fn into_contact(self, id: i64, now: DateTime<Utc>) -> Contact {
        Contact {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            category: Some(self.category),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A validated partial update.
///
/// `None` means "leave unchanged". For the nullable columns, `Some(None)`
/// clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub category: Option<Option<String>>,
}

impl ContactPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.category.is_none()
    }
}

/// Optional list filters. Blank values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ContactFilter {
    pub fn new(search: Option<String>, category: Option<String>) -> Self {
        Self { search, category }.normalized()
    }

    /// Drop blank terms so `?search=&category=` behaves like no filter.
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }
        Self {
            search: keep(self.search),
            category: keep(self.category),
        }
    }
}

/// Current time at the millisecond precision the stores persist.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Sort contacts by first name, then id.
pub fn sort_contacts(contacts: &mut [Contact]) {
    contacts.sort_by(|a, b| {
        a.first_name
            .cmp(&b.first_name)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(id: i64, first: &str, category: &str) -> Contact {
        let at = now();
        Contact {
            id,
            first_name: first.to_string(),
            last_name: "Smith".to_string(),
            email: format!("{}@example.com", first.to_lowercase()),
            phone: None,
            category: Some(category.to_string()),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn serializes_camel_case_keys() {
        let json = serde_json::to_value(sample(1, "Ann", "Work")).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "category",
                "createdAt",
                "email",
                "firstName",
                "id",
                "lastName",
                "phone",
                "updatedAt"
            ]
        );
        assert!(obj["phone"].is_null());
        assert!(obj["createdAt"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn filter_combines_search_and_category() {
        let filter = ContactFilter::new(Some("an".into()), Some("Work".into()));
        assert!(sample(1, "Ann", "Work").matches(&filter));
        assert!(!sample(2, "Anna", "Personal").matches(&filter));
        assert!(!sample(3, "Bob", "Work").matches(&filter));
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let mut c = sample(1, "Zed", "Work");
        c.email = "zed@ACME.io".into();
        assert!(c.matches(&ContactFilter::new(Some("acme".into()), None)));
        assert!(c.matches(&ContactFilter::new(Some("SMI".into()), None)));
        assert!(!c.matches(&ContactFilter::new(Some("nope".into()), None)));
    }

    #[test]
    fn blank_filter_terms_are_ignored() {
        let filter = ContactFilter::new(Some(String::new()), Some(String::new()));
        assert_eq!(filter, ContactFilter::default());
    }

    #[test]
    fn apply_only_touches_provided_fields() {
        let mut c = sample(1, "Ann", "Work");
        let before = c.clone();
        let patch = ContactPatch {
            phone: Some(Some("555-0100".into())),
            ..Default::default()
        };
        c.apply(&patch, before.updated_at + Duration::seconds(5));
        assert_eq!(c.phone.as_deref(), Some("555-0100"));
        assert_eq!(c.first_name, before.first_name);
        assert_eq!(c.email, before.email);
        assert_eq!(c.category, before.category);
        assert!(c.updated_at > before.updated_at);
        assert_eq!(c.created_at, before.created_at);
    }

    #[test]
    fn apply_never_moves_updated_at_backwards() {
        let mut c = sample(1, "Ann", "Work");
        let before = c.updated_at;
        c.apply(&ContactPatch::default(), before - Duration::hours(1));
        assert_eq!(c.updated_at, before);
    }

    #[test]
    fn sort_breaks_ties_by_id() {
        let mut list = vec![
            sample(3, "Ann", "Work"),
            sample(1, "Bob", "Work"),
            sample(2, "Ann", "Work"),
        ];
        sort_contacts(&mut list);
        let ids: Vec<i64> = list.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
