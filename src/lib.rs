//! # Contact Book
//!
//! A small contact-management service: create, list, search, update and
//! delete contact records stored in SQLite, exposed as a JSON HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────┐   ┌──────────┐
//! │  HTTP (axum) │──▶│ dyn ContactStore  │──▶│  SQLite  │
//! │  handlers    │   │ (validated input) │   │ contacts │
//! └──────────────┘   └───────────────────┘   └──────────┘
//! ```
//!
//! The data model, validation rules and the store trait live in
//! `contact-book-core`; this crate adds the SQLite backend, the server and
//! the `contacts` CLI.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite `ContactStore` |
//! | [`server`] | HTTP API |
//! | [`logging`] | Tracing subscriber setup |

pub mod config;
pub mod db;
pub mod logging;
pub mod migrate;
pub mod server;
pub mod sqlite_store;
