//! Email priority records and upstream payload normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::EmailError;

/// Key under which some upstream agents nest the record fields.
pub const WRAPPER_KEY: &str = "json";

/// A persisted email priority record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailPriority {
    /// Store-assigned identifier.
    pub id: Uuid,
    pub sender_name: Option<String>,
    pub sender_email: Option<String>,
    pub summary: Option<String>,
    /// Why the upstream agent flagged this email.
    pub attention_reason: Option<String>,
    /// Free-text label, stored verbatim. See [`super::tier::PriorityTier`].
    pub priority: Option<String>,
    /// Set once at insertion.
    pub created_at: DateTime<Utc>,
}

/// Canonical field set for a record that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEmailPriority {
    pub sender_name: Option<String>,
    pub sender_email: Option<String>,
    pub summary: Option<String>,
    pub attention_reason: Option<String>,
    pub priority: Option<String>,
}

#[cfg(test)]
impl NewEmailPriority {
    /// Builder: set priority.
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Builder: set sender name and address.
    pub fn with_sender(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self.sender_email = Some(email.into());
        self
    }

    /// Builder: set summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// Upstream agent payload, in either flat or `{"json": {...}}` form.
///
/// Normalization happens once here; everything past this point only sees
/// [`NewEmailPriority`].
pub struct IngestPayload;

impl IngestPayload {
    /// Normalize a raw JSON body into the canonical record shape.
    pub fn from_value(body: &Value) -> Result<NewEmailPriority, EmailError> {
        let outer = body
            .as_object()
            .ok_or_else(|| EmailError::Validation("Payload must be a JSON object".to_string()))?;

        let fields = match outer.get(WRAPPER_KEY) {
            Some(Value::Object(inner)) => inner,
            _ => outer,
        };

        Ok(NewEmailPriority {
            sender_name: text_field(fields, "Sender_name"),
            sender_email: text_field(fields, "Sender_email"),
            summary: text_field(fields, "summary"),
            attention_reason: text_field(fields, "why_attention"),
            priority: text_field(fields, "priority_hml"),
        })
    }
}

/// Read a field as text. `null` and missing become `None`; non-string
/// scalars keep their JSON rendering.
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(value_text)
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Priority label from an update request body.
///
/// Missing, `null`, `false`, zero, and `""` yield `None`. Any other value is
/// rendered as text the same way ingest fields are.
pub fn priority_label(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        other => value_text(other),
    }
}
