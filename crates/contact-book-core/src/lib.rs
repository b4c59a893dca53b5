//! # Contact Book Core
//!
//! Shared logic for Contact Book: the contact data model, input
//! validation, email-domain category inference, the error taxonomy, and
//! the [`store::ContactStore`] abstraction with an in-memory backend.
//!
//! This crate contains no tokio, sqlx, HTTP, or filesystem dependencies.
//! The SQLite store and the HTTP server live in the `contact-book` crate.

pub mod error;
pub mod models;
pub mod store;
pub mod validation;

pub use error::{ContactError, Result};
pub use models::{Contact, ContactFilter, ContactInput, ContactPatch, NewContact};
pub use store::ContactStore;
