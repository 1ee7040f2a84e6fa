//! Outbox repository abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::outbox::{OutboxError, OutboxRecordView, OutboxStats};

/// Persistence operations the outbox relay drives.
///
/// The insert side lives on the aggregate repositories (state and outbox
/// rows are written in the same transaction); this trait covers claiming
/// and settling rows afterwards.
#[async_trait]
pub trait OutboxRepository: Send + Sync {
    /// Atomically claim a batch of due PENDING rows, flipping them to
    /// IN_FLIGHT so a concurrent relay instance cannot claim them again.
    ///
    /// Rows are claimed oldest-first, and only those whose
    /// `next_attempt_at` is not in the future. Implementations must use
    /// skip-locked semantics (or an equivalent atomic conditional update)
    /// so two relays never process the same row per attempt.
    async fn claim_pending(
        &self,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<OutboxRecordView>, OutboxError>;

    /// Settle successfully published rows: status PUBLISHED, publish
    /// timestamp set.
    async fn mark_published(&self, event_ids: &[Uuid]) -> Result<(), OutboxError>;

    /// Return a claimed row to PENDING after a failed publish, bumping the
    /// retry counter, recording the error, and deferring the next attempt.
    async fn release_for_retry(
        &self,
        event_id: Uuid,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), OutboxError>;

    /// Terminally fail a row once its retries are exhausted. The row is
    /// kept for operator inspection, never deleted.
    async fn mark_failed(&self, event_id: Uuid, error: &str) -> Result<(), OutboxError>;

    /// Return IN_FLIGHT rows older than `older_than` to PENDING. Covers a
    /// relay instance that crashed between claiming and settling.
    async fn release_stuck(&self, older_than: std::time::Duration) -> Result<u64, OutboxError>;

    async fn count_pending(&self) -> Result<u64, OutboxError>;

    /// Per-status counts, for the periodic operator log.
    async fn stats(&self) -> Result<OutboxStats, OutboxError>;

    async fn find_by_id(&self, event_id: Uuid) -> Result<Option<OutboxRecordView>, OutboxError>;
}
