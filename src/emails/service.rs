//! Ingest, update-priority, and list operations over an [`EmailStore`].

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::model::{EmailPriority, IngestPayload};
use crate::config::LIST_LIMIT;
use crate::error::EmailError;
use crate::store::EmailStore;

/// Request-scoped operations on email priority records.
///
/// Holds no state besides the store handle; every call is an independent
/// unit of work and nothing is retried.
#[derive(Clone)]
pub struct EmailPriorityService {
    store: Arc<dyn EmailStore>,
}

impl EmailPriorityService {
    pub fn new(store: Arc<dyn EmailStore>) -> Self {
        Self { store }
    }

    /// Normalize an upstream payload (flat or `json`-wrapped) and insert it.
    pub async fn ingest(&self, body: &Value) -> Result<EmailPriority, EmailError> {
        let new_email = IngestPayload::from_value(body).inspect_err(|e| {
            warn!(error = %e, "Rejected ingest payload");
        })?;

        let stored = self.store.insert_email(&new_email).await.inspect_err(|e| {
            error!(error = %e, "Database error while saving email priority");
        })?;

        info!(
            id = %stored.id,
            priority = stored.priority.as_deref().unwrap_or(""),
            "Email priority saved"
        );
        Ok(stored)
    }

    /// Replace the priority of one record.
    ///
    /// An absent or empty priority fails before the store is touched.
    pub async fn update_priority(
        &self,
        id: &str,
        priority: Option<&str>,
    ) -> Result<EmailPriority, EmailError> {
        let priority = priority
            .filter(|p| !p.is_empty())
            .ok_or_else(|| EmailError::Validation("Priority is required".to_string()))?;

        // A malformed id cannot name a stored record.
        let Ok(uuid) = Uuid::parse_str(id) else {
            warn!(id = id, "Priority update for malformed id");
            return Err(EmailError::NotFound { id: id.to_string() });
        };

        let updated = self
            .store
            .update_priority(uuid, priority)
            .await
            .inspect_err(|e| error!(id = id, error = %e, "Database error while updating priority"))?
            .ok_or_else(|| EmailError::NotFound { id: id.to_string() })?;

        info!(id = %updated.id, priority = priority, "Priority updated");
        Ok(updated)
    }

    /// Most recent records, newest first, capped at [`LIST_LIMIT`].
    pub async fn list(&self) -> Result<Vec<EmailPriority>, EmailError> {
        let emails = self
            .store
            .list_recent(LIST_LIMIT)
            .await
            .inspect_err(|e| error!(error = %e, "Database error while listing email priorities"))?;
        Ok(emails)
    }
}
