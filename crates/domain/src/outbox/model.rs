//! Outbox record model for the Transactional Outbox Pattern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::DomainEvent;

/// Delivery status of an outbox record.
///
/// `Pending → InFlight → Published` is the success path. A failed publish
/// returns the row to `Pending` (with a backoff) until the retry ceiling is
/// reached, at which point it becomes `Failed`. `Published` and `Failed`
/// are terminal; `Failed` rows are kept for operator inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboxStatus {
    Pending,
    InFlight,
    Published,
    Failed,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "PENDING",
            OutboxStatus::InFlight => "IN_FLIGHT",
            OutboxStatus::Published => "PUBLISHED",
            OutboxStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(OutboxStatus::Pending),
            "IN_FLIGHT" => Some(OutboxStatus::InFlight),
            "PUBLISHED" => Some(OutboxStatus::Published),
            "FAILED" => Some(OutboxStatus::Failed),
            _ => None,
        }
    }
}

/// Error types for outbox operations
#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Outbox record not found: {0}")]
    NotFound(Uuid),

    #[error("Infrastructure error: {message}")]
    InfrastructureError { message: String },
}

impl From<OutboxError> for crate::shared_kernel::DomainError {
    fn from(err: OutboxError) -> Self {
        crate::shared_kernel::DomainError::InfrastructureError {
            message: err.to_string(),
        }
    }
}

/// Kind of aggregate an outbox record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateType {
    User,
    Candidate,
    Skill,
    Company,
}

impl AggregateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateType::User => "USER",
            AggregateType::Candidate => "CANDIDATE",
            AggregateType::Skill => "SKILL",
            AggregateType::Company => "COMPANY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "USER" => Some(AggregateType::User),
            "CANDIDATE" => Some(AggregateType::Candidate),
            "SKILL" => Some(AggregateType::Skill),
            "COMPANY" => Some(AggregateType::Company),
            _ => None,
        }
    }
}

impl std::fmt::Display for AggregateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An outbox row ready to be inserted alongside the aggregate mutation it
/// describes.
///
/// `event_id` doubles as the downstream idempotency key. It is minted here,
/// before any transaction begins, so a retried transaction re-inserts the
/// same identifier instead of minting a duplicate.
#[derive(Debug, Clone)]
pub struct OutboxRecordInsert {
    pub event_id: Uuid,
    pub aggregate_id: Uuid,
    pub aggregate_type: AggregateType,
    pub event_type: String,
    pub payload: serde_json::Value,
}

impl OutboxRecordInsert {
    /// Build the insert for a buffered domain event.
    pub fn from_event(event: &DomainEvent) -> Result<Self, OutboxError> {
        let payload = serde_json::to_value(event)?;
        Ok(Self {
            event_id: Uuid::new_v4(),
            aggregate_id: event.aggregate_id(),
            aggregate_type: event.aggregate_kind(),
            event_type: event.event_type().to_string(),
            payload,
        })
    }

    /// Build inserts for every event in an aggregate's buffer, in order.
    pub fn from_events(events: &[DomainEvent]) -> Result<Vec<Self>, OutboxError> {
        events.iter().map(Self::from_event).collect()
    }
}

/// A view of an outbox record as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxRecordView {
    pub event_id: Uuid,
    pub aggregate_id: Uuid,
    pub aggregate_type: AggregateType,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub status: OutboxStatus,
    pub retry_count: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub next_attempt_at: DateTime<Utc>,
}

impl OutboxRecordView {
    pub fn is_pending(&self) -> bool {
        matches!(self.status, OutboxStatus::Pending)
    }

    pub fn is_published(&self) -> bool {
        matches!(self.status, OutboxStatus::Published)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, OutboxStatus::Published | OutboxStatus::Failed)
    }

    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.created_at)
    }
}

/// Per-status counts for monitoring.
#[derive(Debug, Clone)]
pub struct OutboxStats {
    pub pending_count: u64,
    pub in_flight_count: u64,
    pub published_count: u64,
    pub failed_count: u64,
    pub oldest_pending_age_seconds: Option<i64>,
}

impl OutboxStats {
    pub fn total(&self) -> u64 {
        self.pending_count + self.in_flight_count + self.published_count + self.failed_count
    }

    pub fn has_pending(&self) -> bool {
        self.pending_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_kernel::SkillId;

    #[test]
    fn insert_from_event_carries_event_identity() {
        let skill_id = SkillId::new();
        let event = DomainEvent::SkillCreated {
            skill_id,
            name: "Kubernetes".to_string(),
            category: None,
            occurred_at: Utc::now(),
        };

        let insert = OutboxRecordInsert::from_event(&event).unwrap();
        assert_eq!(insert.aggregate_id, skill_id.0);
        assert_eq!(insert.aggregate_type, AggregateType::Skill);
        assert_eq!(insert.event_type, "SkillCreated");
        assert_eq!(insert.payload["SkillCreated"]["name"], "Kubernetes");
    }

    #[test]
    fn insert_batch_mints_distinct_event_ids() {
        let skill_id = SkillId::new();
        let events = vec![
            DomainEvent::SkillCreated {
                skill_id,
                name: "Go".to_string(),
                category: None,
                occurred_at: Utc::now(),
            },
            DomainEvent::SkillRenamed {
                skill_id,
                name: "Golang".to_string(),
                occurred_at: Utc::now(),
            },
        ];

        let inserts = OutboxRecordInsert::from_events(&events).unwrap();
        assert_eq!(inserts.len(), 2);
        assert_ne!(inserts[0].event_id, inserts[1].event_id);
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            OutboxStatus::Pending,
            OutboxStatus::InFlight,
            OutboxStatus::Published,
            OutboxStatus::Failed,
        ] {
            assert_eq!(OutboxStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OutboxStatus::parse("DELETED"), None);
    }
}
