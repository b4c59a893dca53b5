//! Contact HTTP API.
//!
//! Exposes the [`ContactStore`] operations as a JSON HTTP API. Handlers
//! hold no state of their own: the store handle arrives through Axum's
//! `State` extractor and every request is one unit of work against it.
//!
//! # Endpoints
//!
//! | Method   | Path | Success | Failure |
//! |----------|------|---------|---------|
//! | `GET`    | `/contacts?search=&category=` | 200 `{contacts}` | 400 |
//! | `POST`   | `/create_contact` | 201 `{message, contact}` | 400 |
//! | `PATCH`  | `/update_contact/{id}` | 200 `{message, contact}` | 400, 404 |
//! | `DELETE` | `/delete_contact/{id}` | 200 `{message}` | 400, 404 |
//! | `GET`    | `/health` | 200 `{status, version, contacts}` | 400 |
//!
//! # Error Contract
//!
//! ```json
//! { "message": "Email already exists", "code": "duplicate_email" }
//! ```
//!
//! Codes: `validation_error`, `duplicate_email`, `store_error`,
//! `bad_request` (all 400) and `not_found` (404).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser frontend
//! served from another origin can call the API.

use anyhow::Context;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use contact_book_core::validation::{validate_new_contact, validate_patch};
use contact_book_core::{Contact, ContactError, ContactFilter, ContactInput, ContactStore};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteContactStore;

pub const MSG_CREATED: &str = "Contact created successfully!";
pub const MSG_UPDATED: &str = "Contact updated successfully!";
pub const MSG_DELETED: &str = "Contact deleted successfully!";

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    store: Arc<dyn ContactStore>,
}

/// Build the API router over `store`.
///
/// Exposed separately from [`run_server`] so tests and embedders can mount
/// the API on their own listener or over a different store.
pub fn router(store: Arc<dyn ContactStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/contacts", get(handle_list_contacts))
        .route("/create_contact", post(handle_create_contact))
        .route("/update_contact/{id}", patch(handle_update_contact))
        .route("/delete_contact/{id}", delete(handle_delete_contact))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { store })
}

/// Open the configured database, apply migrations, and serve the API on
/// `[server].bind` until Ctrl-C.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let app = router(Arc::new(SqliteContactStore::new(pool)));

    let bind_addr = &config.server.bind;
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    info!(bind = %bind_addr, db = %config.db.path.display(), "contact API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("contact API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: &'static str,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Map a domain error. `action` prefixes store failures, e.g.
    /// `"Error creating contact"`.
    fn from_contact_error(err: ContactError, action: &str) -> Self {
        let status = match err {
            ContactError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        let message = match &err {
            ContactError::Store(detail) => {
                warn!(error = %detail, action, "contact store operation failed");
                format!("{}: {}", action, detail)
            }
            other => other.to_string(),
        };
        AppError {
            status,
            code: err.code(),
            message,
        }
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

// ============ Response bodies ============

#[derive(Serialize)]
struct ContactListResponse {
    contacts: Vec<Contact>,
}

#[derive(Serialize)]
struct ContactResponse {
    message: &'static str,
    contact: Contact,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    contacts: i64,
}

// ============ Handlers ============

async fn handle_health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let contacts = state
        .store
        .count()
        .await
        .map_err(|e| AppError::from_contact_error(e, "Error counting contacts"))?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        contacts,
    }))
}

/// `GET /contacts`. Blank `search`/`category` parameters are ignored.
async fn handle_list_contacts(
    State(state): State<AppState>,
    query: Result<Query<ContactFilter>, QueryRejection>,
) -> Result<Json<ContactListResponse>, AppError> {
    let Query(filter) = query.map_err(|e| bad_request(e.body_text()))?;
    let filter = filter.normalized();
    let contacts = state
        .store
        .list(&filter)
        .await
        .map_err(|e| AppError::from_contact_error(e, "Error listing contacts"))?;

    Ok(Json(ContactListResponse { contacts }))
}

async fn handle_create_contact(
    State(state): State<AppState>,
    body: Result<Json<ContactInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactResponse>), AppError> {
    let Json(input) = body.map_err(|e| bad_request(e.body_text()))?;

    let new_contact = validate_new_contact(input)
        .map_err(|e| AppError::from_contact_error(e, "Error creating contact"))?;

    let contact = state
        .store
        .insert(&new_contact)
        .await
        .map_err(|e| AppError::from_contact_error(e, "Error creating contact"))?;

    info!(id = contact.id, category = ?contact.category, "contact created");

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            message: MSG_CREATED,
            contact,
        }),
    ))
}

/// `PATCH /update_contact/{id}`.
///
/// An unknown id is reported as 404 even when the body is also invalid.
async fn handle_update_contact(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ContactInput>, JsonRejection>,
) -> Result<Json<ContactResponse>, AppError> {
    let Path(id) = id.map_err(|_| not_found())?;

    let parsed = body
        .map_err(|e| bad_request(e.body_text()))
        .and_then(|Json(input)| {
            validate_patch(input)
                .map_err(|e| AppError::from_contact_error(e, "Error updating contact"))
        });
    let patch = match parsed {
        Ok(patch) => patch,
        Err(err) => {
            state
                .store
                .get(id)
                .await
                .map_err(|e| AppError::from_contact_error(e, "Error updating contact"))?;
            return Err(err);
        }
    };

    let contact = state
        .store
        .update(id, &patch)
        .await
        .map_err(|e| AppError::from_contact_error(e, "Error updating contact"))?;

    info!(id, "contact updated");

    Ok(Json(ContactResponse {
        message: MSG_UPDATED,
        contact,
    }))
}

async fn handle_delete_contact(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = id.map_err(|_| not_found())?;

    state
        .store
        .delete(id)
        .await
        .map_err(|e| AppError::from_contact_error(e, "Error deleting contact"))?;

    info!(id, "contact deleted");

    Ok(Json(MessageResponse {
        message: MSG_DELETED,
    }))
}

/// Non-integer ids can never name a contact.
fn not_found() -> AppError {
    AppError::from_contact_error(ContactError::NotFound(0), "")
}
