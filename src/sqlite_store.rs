//! SQLite-backed [`ContactStore`] implementation.
//!
//! Each mutation runs in its own `BEGIN IMMEDIATE` transaction, so the
//! write lock is taken up front and concurrent writers queue on the busy
//! timeout instead of failing a read-to-write upgrade. The uniqueness
//! pre-check and the write share that transaction; returning early drops
//! it, which rolls everything back. The `UNIQUE` constraint on `email`
//! stays as the last line: a racing writer that slips past the pre-check
//! still surfaces as [`ContactError::DuplicateEmail`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::debug;

use contact_book_core::models::{self, Contact, ContactFilter, ContactPatch, NewContact};
use contact_book_core::{ContactError, ContactStore, Result};

/// SQLite implementation of the [`ContactStore`] trait.
#[derive(Clone)]
pub struct SqliteContactStore {
    pool: SqlitePool,
}

impl SqliteContactStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(store_err)
    }
}

/// Map a driver error, classifying unique violations on `email`.
fn map_sqlx_error(err: sqlx::Error, email: Option<&str>) -> ContactError {
    debug!(error = %err, "sqlite operation failed");
    match (&err, email) {
        (sqlx::Error::Database(db), Some(email)) if db.is_unique_violation() => {
            ContactError::DuplicateEmail(email.to_string())
        }
        _ => ContactError::store(err.to_string()),
    }
}

fn store_err(err: sqlx::Error) -> ContactError {
    map_sqlx_error(err, None)
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| ContactError::store(format!("invalid timestamp in database: {ms}")))
}

fn row_to_contact(row: &SqliteRow) -> Result<Contact> {
    Ok(Contact {
        id: row.try_get("id").map_err(store_err)?,
        first_name: row.try_get("first_name").map_err(store_err)?,
        last_name: row.try_get("last_name").map_err(store_err)?,
        email: row.try_get("email").map_err(store_err)?,
        phone: row.try_get("phone").map_err(store_err)?,
        category: row.try_get("category").map_err(store_err)?,
        created_at: from_millis(row.try_get("created_at").map_err(store_err)?)?,
        updated_at: from_millis(row.try_get("updated_at").map_err(store_err)?)?,
    })
}

/// `LIKE` pattern for a literal substring match.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl ContactStore for SqliteContactStore {
    async fn list(&self, filter: &ContactFilter) -> Result<Vec<Contact>> {
        let pattern = filter.search.as_deref().map(like_pattern);

        // LIKE is ASCII case-insensitive in SQLite.
        let rows = sqlx::query(
            r#"
            SELECT id, first_name, last_name, email, phone, category, created_at, updated_at
            FROM contacts
            WHERE (?1 IS NULL
                   OR first_name LIKE ?1 ESCAPE '\'
                   OR last_name LIKE ?1 ESCAPE '\'
                   OR email LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR category = ?2)
            ORDER BY first_name ASC, id ASC
            "#,
        )
        .bind(pattern)
        .bind(filter.category.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter().map(row_to_contact).collect()
    }

    async fn get(&self, id: i64) -> Result<Contact> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, email, phone, category, created_at, updated_at FROM contacts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        match row {
            Some(row) => row_to_contact(&row),
            None => Err(ContactError::NotFound(id)),
        }
    }

    async fn insert(&self, contact: &NewContact) -> Result<Contact> {
        let mut tx = self.begin_write().await?;

        let taken: bool =
            sqlx::query_scalar("SELECT COUNT(*) > 0 FROM contacts WHERE email = ?")
                .bind(&contact.email)
                .fetch_one(&mut *tx)
                .await
                .map_err(store_err)?;
        if taken {
            return Err(ContactError::DuplicateEmail(contact.email.clone()));
        }

        let now = models::now();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO contacts (first_name, last_name, email, phone, category,
                                  created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.category)
        .bind(now.timestamp_millis())
        .bind(now.timestamp_millis())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(e, Some(&contact.email)))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error(e, Some(&contact.email)))?;

        Ok(contact.clone().into_contact(id, now))
    }

    async fn update(&self, id: i64, patch: &ContactPatch) -> Result<Contact> {
        let mut tx = self.begin_write().await?;

        let row = sqlx::query(
            "SELECT id, first_name, last_name, email, phone, category, created_at, updated_at FROM contacts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_err)?;
        let mut contact = match row {
            Some(row) => row_to_contact(&row)?,
            None => return Err(ContactError::NotFound(id)),
        };
        if patch.is_empty() {
            return Ok(contact);
        }

        if let Some(email) = &patch.email {
            if *email != contact.email {
                let taken: bool = sqlx::query_scalar(
                    "SELECT COUNT(*) > 0 FROM contacts WHERE email = ? AND id != ?",
                )
                .bind(email)
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(store_err)?;
                if taken {
                    return Err(ContactError::DuplicateEmail(email.clone()));
                }
            }
        }

        contact.apply(patch, models::now());

        sqlx::query(
            r#"
            UPDATE contacts
            SET first_name = ?, last_name = ?, email = ?, phone = ?, category = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.category)
        .bind(contact.updated_at.timestamp_millis())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(e, Some(&contact.email)))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error(e, Some(&contact.email)))?;

        Ok(contact)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.begin_write().await?;

        let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        if result.rows_affected() == 0 {
            return Err(ContactError::NotFound(id));
        }

        tx.commit().await.map_err(store_err)?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)
    }
}
