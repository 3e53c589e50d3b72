//! libSQL backend — async `EmailStore` implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::emails::model::{EmailPriority, NewEmailPriority};
use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::EmailStore;

/// Column list shared by every SELECT; order matches `row_to_email`.
const EMAIL_COLUMNS: &str =
    "id, sender_name, sender_email, summary, attention_reason, priority, created_at";

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| DatabaseError::Serialization(format!("Bad timestamp {s:?}: {e}")))
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// Read a nullable TEXT column. NULL is `None`; read errors propagate.
fn opt_column(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    row.get::<Option<String>>(idx)
        .map_err(|e| DatabaseError::Query(format!("row parse column {idx}: {e}")))
}

/// Map a libsql Row to an EmailPriority. Column order matches EMAIL_COLUMNS.
fn row_to_email(row: &libsql::Row) -> Result<EmailPriority, DatabaseError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
    let created_str: String = row
        .get(6)
        .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;

    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DatabaseError::Serialization(format!("Bad record id {id_str:?}: {e}")))?;

    Ok(EmailPriority {
        id,
        sender_name: opt_column(row, 1)?,
        sender_email: opt_column(row, 2)?,
        summary: opt_column(row, 3)?,
        attention_reason: opt_column(row, 4)?,
        priority: opt_column(row, 5)?,
        created_at: parse_datetime(&created_str)?,
    })
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl EmailStore for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    async fn insert_email(&self, email: &NewEmailPriority) -> Result<EmailPriority, DatabaseError> {
        let id = Uuid::new_v4();
        let now = format_datetime(&Utc::now());
        let conn = self.conn();
        conn.execute(
            "INSERT INTO email_priorities (id, sender_name, sender_email, summary,
                attention_reason, priority, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id.to_string(),
                opt_text(email.sender_name.as_deref()),
                opt_text(email.sender_email.as_deref()),
                opt_text(email.summary.as_deref()),
                opt_text(email.attention_reason.as_deref()),
                opt_text(email.priority.as_deref()),
                now,
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("insert_email: {e}")))?;

        debug!(id = %id, "Email priority inserted into DB");
        self.get_email(id)
            .await?
            .ok_or_else(|| DatabaseError::Query(format!("insert_email: row {id} not readable")))
    }

    async fn get_email(&self, id: Uuid) -> Result<Option<EmailPriority>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {EMAIL_COLUMNS} FROM email_priorities WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_email: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_email(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_email: {e}"))),
        }
    }

    async fn update_priority(
        &self,
        id: Uuid,
        priority: &str,
    ) -> Result<Option<EmailPriority>, DatabaseError> {
        let conn = self.conn();
        let changed = conn
            .execute(
                "UPDATE email_priorities SET priority = ?1 WHERE id = ?2",
                params![priority, id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("update_priority: {e}")))?;

        if changed == 0 {
            return Ok(None);
        }
        debug!(id = %id, priority = priority, "Email priority updated in DB");
        self.get_email(id).await
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<EmailPriority>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {EMAIL_COLUMNS} FROM email_priorities
                     ORDER BY created_at DESC, rowid DESC LIMIT ?1"
                ),
                params![limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_recent: {e}")))?;

        let mut emails = Vec::new();
        loop {
            match rows.next().await {
                Ok(Some(row)) => emails.push(row_to_email(&row)?),
                Ok(None) => break,
                Err(e) => return Err(DatabaseError::Query(format!("list_recent: {e}"))),
            }
        }
        Ok(emails)
    }
}
