//! In-memory [`ContactStore`] implementation for tests and embedding.
//!
//! Rows live in a `BTreeMap` behind a `std::sync::RwLock`. Each mutation
//! holds the write lock across its uniqueness check and its write, which
//! gives the same all-or-nothing behavior as a database transaction.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::{ContactError, Result};
use crate::models::{self, Contact, ContactFilter, ContactPatch, NewContact};

use super::ContactStore;

#[derive(Default)]
struct Inner {
    last_id: i64,
    rows: BTreeMap<i64, Contact>,
}

impl Inner {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|c| c.email == email && Some(c.id) != except)
    }
}

/// In-memory contact store. Ids are never reused, even after deletes.
#[derive(Default)]
pub struct InMemoryContactStore {
    inner: RwLock<Inner>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| ContactError::store("contact store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| ContactError::store("contact store lock poisoned"))
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn list(&self, filter: &ContactFilter) -> Result<Vec<Contact>> {
        let inner = self.read()?;
        let mut contacts: Vec<Contact> = inner
            .rows
            .values()
            .filter(|c| c.matches(filter))
            .cloned()
            .collect();
        models::sort_contacts(&mut contacts);
        Ok(contacts)
    }

    async fn get(&self, id: i64) -> Result<Contact> {
        self.read()?
            .rows
            .get(&id)
            .cloned()
            .ok_or(ContactError::NotFound(id))
    }

    async fn insert(&self, contact: &NewContact) -> Result<Contact> {
        let mut inner = self.write()?;
        if inner.email_taken(&contact.email, None) {
            return Err(ContactError::DuplicateEmail(contact.email.clone()));
        }
        inner.last_id += 1;
        let stored = contact.clone().into_contact(inner.last_id, models::now());
        inner.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i64, patch: &ContactPatch) -> Result<Contact> {
        let mut inner = self.write()?;
        let mut contact = inner
            .rows
            .get(&id)
            .cloned()
            .ok_or(ContactError::NotFound(id))?;
        if patch.is_empty() {
            return Ok(contact);
        }
        if let Some(email) = &patch.email {
            if *email != contact.email && inner.email_taken(email, Some(id)) {
                return Err(ContactError::DuplicateEmail(email.clone()));
            }
        }
        contact.apply(patch, models::now());
        inner.rows.insert(id, contact.clone());
        Ok(contact)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.write()?
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(ContactError::NotFound(id))
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.read()?.rows.len() as i64)
    }
}
