//! Storage abstraction for Contact Book.
//!
//! The [`ContactStore`] trait defines every persistence operation the HTTP
//! layer needs, so handlers depend on a trait object rather than a concrete
//! database. Implementations must be `Send + Sync` to be shared across
//! request tasks.
//!
//! Every mutating operation is all-or-nothing: on any `Err` the backend is
//! left exactly as it was before the call.

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Contact, ContactFilter, ContactPatch, NewContact};

/// Abstract contact storage backend.
///
/// | Method | Errors |
/// |--------|--------|
/// | [`list`](ContactStore::list) | `Store` |
/// | [`get`](ContactStore::get) | `NotFound`, `Store` |
/// | [`insert`](ContactStore::insert) | `DuplicateEmail`, `Store` |
/// | [`update`](ContactStore::update) | `NotFound`, `DuplicateEmail`, `Store` |
/// | [`delete`](ContactStore::delete) | `NotFound`, `Store` |
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Contacts matching `filter`, ordered by first name then id.
    async fn list(&self, filter: &ContactFilter) -> Result<Vec<Contact>>;

    /// The contact with `id`.
    async fn get(&self, id: i64) -> Result<Contact>;

    /// Persist a new contact, assigning its id and timestamps.
    async fn insert(&self, contact: &NewContact) -> Result<Contact>;

    /// Apply `patch` to the contact with `id` and refresh `updated_at`.
    ///
    /// An empty patch writes nothing and returns the current row.
    async fn update(&self, id: i64, patch: &ContactPatch) -> Result<Contact>;

    /// Remove the contact with `id`.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Number of stored contacts.
    async fn count(&self) -> Result<i64>;
}
