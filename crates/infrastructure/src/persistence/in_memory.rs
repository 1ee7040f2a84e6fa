//! In-memory outbox repository.
//!
//! Backs the relay tests and local development without PostgreSQL. Honors
//! the same claim/settle semantics as the Postgres implementation,
//! including `next_attempt_at` deferral and stuck-claim release.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use uuid::Uuid;

use talentgrid_domain::outbox::{
    OutboxError, OutboxRecordInsert, OutboxRecordView, OutboxRepository, OutboxStats, OutboxStatus,
};

struct StoredRecord {
    view: OutboxRecordView,
    claimed_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct InMemoryOutboxRepository {
    records: Mutex<Vec<StoredRecord>>,
}

impl InMemoryOutboxRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows as the aggregate repositories would, status PENDING and
    /// due immediately. Duplicate event ids are ignored.
    pub fn insert(&self, inserts: &[OutboxRecordInsert]) {
        let mut records = self.records.lock().unwrap();
        let now = Utc::now();
        for insert in inserts {
            if records.iter().any(|r| r.view.event_id == insert.event_id) {
                continue;
            }
            records.push(StoredRecord {
                view: OutboxRecordView {
                    event_id: insert.event_id,
                    aggregate_id: insert.aggregate_id,
                    aggregate_type: insert.aggregate_type,
                    event_type: insert.event_type.clone(),
                    payload: insert.payload.clone(),
                    status: OutboxStatus::Pending,
                    retry_count: 0,
                    last_error: None,
                    created_at: now,
                    published_at: None,
                    next_attempt_at: now,
                },
                claimed_at: None,
            });
        }
    }

    /// Pull a row's next attempt into the past so a test can re-claim it
    /// without sleeping through the backoff.
    pub fn make_due(&self, event_id: Uuid) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r.view.event_id == event_id) {
            record.view.next_attempt_at = Utc::now() - chrono::Duration::seconds(1);
        }
    }

    pub fn snapshot(&self) -> Vec<OutboxRecordView> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.view.clone())
            .collect()
    }
}

#[async_trait]
impl OutboxRepository for InMemoryOutboxRepository {
    async fn claim_pending(
        &self,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<OutboxRecordView>, OutboxError> {
        let mut records = self.records.lock().unwrap();
        let mut due: Vec<&mut StoredRecord> = records
            .iter_mut()
            .filter(|r| r.view.status == OutboxStatus::Pending && r.view.next_attempt_at <= now)
            .collect();
        due.sort_by_key(|r| r.view.created_at);

        let mut claimed = Vec::new();
        for record in due.into_iter().take(limit) {
            record.view.status = OutboxStatus::InFlight;
            record.claimed_at = Some(now);
            claimed.push(record.view.clone());
        }
        Ok(claimed)
    }

    async fn mark_published(&self, event_ids: &[Uuid]) -> Result<(), OutboxError> {
        let mut records = self.records.lock().unwrap();
        for id in event_ids {
            if let Some(record) = records.iter_mut().find(|r| r.view.event_id == *id) {
                record.view.status = OutboxStatus::Published;
                record.view.published_at = Some(Utc::now());
                record.claimed_at = None;
            }
        }
        Ok(())
    }

    async fn release_for_retry(
        &self,
        event_id: Uuid,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), OutboxError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.view.event_id == event_id)
            .ok_or(OutboxError::NotFound(event_id))?;
        record.view.status = OutboxStatus::Pending;
        record.view.retry_count += 1;
        record.view.last_error = Some(error.to_string());
        record.view.next_attempt_at = next_attempt_at;
        record.claimed_at = None;
        Ok(())
    }

    async fn mark_failed(&self, event_id: Uuid, error: &str) -> Result<(), OutboxError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.view.event_id == event_id)
            .ok_or(OutboxError::NotFound(event_id))?;
        record.view.status = OutboxStatus::Failed;
        record.view.retry_count += 1;
        record.view.last_error = Some(error.to_string());
        record.claimed_at = None;
        Ok(())
    }

    async fn release_stuck(&self, older_than: std::time::Duration) -> Result<u64, OutboxError> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(older_than).unwrap_or_else(|_| chrono::Duration::zero());
        let mut released = 0;
        let mut records = self.records.lock().unwrap();
        for record in records.iter_mut() {
            if record.view.status == OutboxStatus::InFlight
                && record.claimed_at.is_some_and(|t| t < cutoff)
            {
                record.view.status = OutboxStatus::Pending;
                record.claimed_at = None;
                released += 1;
            }
        }
        Ok(released)
    }

    async fn count_pending(&self) -> Result<u64, OutboxError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.view.is_pending())
            .count() as u64)
    }

    async fn stats(&self) -> Result<OutboxStats, OutboxError> {
        let records = self.records.lock().unwrap();
        let count = |status: OutboxStatus| {
            records.iter().filter(|r| r.view.status == status).count() as u64
        };
        let oldest_pending_age_seconds = records
            .iter()
            .filter(|r| r.view.is_pending())
            .map(|r| r.view.age().num_seconds())
            .max();

        Ok(OutboxStats {
            pending_count: count(OutboxStatus::Pending),
            in_flight_count: count(OutboxStatus::InFlight),
            published_count: count(OutboxStatus::Published),
            failed_count: count(OutboxStatus::Failed),
            oldest_pending_age_seconds,
        })
    }

    async fn find_by_id(&self, event_id: Uuid) -> Result<Option<OutboxRecordView>, OutboxError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.view.event_id == event_id)
            .map(|r| r.view.clone()))
    }
}
