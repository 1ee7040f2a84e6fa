//! Publisher port for externalizing outbox records.
//!
//! Injected into the relay explicitly; nothing in the domain holds a global
//! dispatch registry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::outbox::{AggregateType, OutboxRecordView};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to publish event: {0}")]
    Publish(String),

    #[error("Publish timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Envelope placed on the external channel.
///
/// `event_id` is the idempotency key: repeated delivery attempts for the
/// same outbox row carry the same identifier so downstream consumers can
/// deduplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub event_type: String,
    pub aggregate_id: Uuid,
    pub aggregate_type: AggregateType,
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    pub fn from_record(record: &OutboxRecordView) -> Self {
        Self {
            event_id: record.event_id,
            event_type: record.event_type.clone(),
            aggregate_id: record.aggregate_id,
            aggregate_type: record.aggregate_type,
            payload: record.payload.clone(),
        }
    }
}

/// At-least-once publisher for event envelopes.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, envelope: &EventEnvelope) -> Result<(), PublishError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::outbox::OutboxStatus;

    #[test]
    fn envelope_carries_the_record_identity() {
        let record = OutboxRecordView {
            event_id: Uuid::new_v4(),
            aggregate_id: Uuid::new_v4(),
            aggregate_type: AggregateType::User,
            event_type: "UserRegistered".to_string(),
            payload: serde_json::json!({"email": "ada@example.com"}),
            status: OutboxStatus::Pending,
            retry_count: 0,
            last_error: None,
            created_at: Utc::now(),
            published_at: None,
            next_attempt_at: Utc::now(),
        };

        let envelope = EventEnvelope::from_record(&record);
        assert_eq!(envelope.event_id, record.event_id);
        assert_eq!(envelope.event_type, "UserRegistered");
        assert_eq!(envelope.aggregate_type, AggregateType::User);
    }
}
