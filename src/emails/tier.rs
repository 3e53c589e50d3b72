//! Priority tiers derived from the free-text `priority` label.

use serde::{Deserialize, Serialize};

use super::model::EmailPriority;

/// Display tier of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    High,
    Medium,
    Low,
    /// Missing label or anything outside high/medium/low.
    Unknown,
}

impl PriorityTier {
    /// Case-insensitive match on the stored label. No trimming.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::to_lowercase).as_deref() {
            Some("high") => Self::High,
            Some("medium") => Self::Medium,
            Some("low") => Self::Low,
            _ => Self::Unknown,
        }
    }

    pub fn of(record: &EmailPriority) -> Self {
        Self::from_label(record.priority.as_deref())
    }
}

/// Per-tier counts shown on the dashboard.
///
/// `total` counts every record, so unknown-tier records make
/// `high + medium + low` fall short of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TierCounts {
    pub fn from_records(records: &[EmailPriority]) -> Self {
        records.iter().fold(
            Self {
                total: records.len(),
                ..Self::default()
            },
            |mut counts, record| {
                match PriorityTier::of(record) {
                    PriorityTier::High => counts.high += 1,
                    PriorityTier::Medium => counts.medium += 1,
                    PriorityTier::Low => counts.low += 1,
                    PriorityTier::Unknown => {}
                }
                counts
            },
        )
    }
}
