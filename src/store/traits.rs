//! `EmailStore` trait — async interface over the record table.

use async_trait::async_trait;
use uuid::Uuid;

use crate::emails::model::{EmailPriority, NewEmailPriority};
use crate::error::DatabaseError;

/// Backend-agnostic persistence for email priority records.
///
/// Records are never deleted, and `priority` is the only column an
/// implementation may change after insert.
#[async_trait]
pub trait EmailStore: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    /// Insert a record, assigning `id` and `created_at`. Returns the stored row.
    async fn insert_email(&self, email: &NewEmailPriority) -> Result<EmailPriority, DatabaseError>;

    /// Get a record by ID.
    async fn get_email(&self, id: Uuid) -> Result<Option<EmailPriority>, DatabaseError>;

    /// Set the priority of one record. `None` when no record has that ID.
    async fn update_priority(
        &self,
        id: Uuid,
        priority: &str,
    ) -> Result<Option<EmailPriority>, DatabaseError>;

    /// Most recent records first, up to `limit`.
    async fn list_recent(&self, limit: usize) -> Result<Vec<EmailPriority>, DatabaseError>;
}
