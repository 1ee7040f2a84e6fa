//! Outbox Relay
//!
//! Background service that claims pending outbox rows, publishes them to
//! the external channel and settles their status. Safe to run as multiple
//! concurrent instances: the claim step's skip-locked update guarantees
//! each row is processed by exactly one instance per attempt, and the claim
//! is released before any publish I/O happens.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use talentgrid_domain::event_publisher::{EventEnvelope, EventPublisher, PublishError};
use talentgrid_domain::outbox::{OutboxError, OutboxRecordView, OutboxRepository};

/// Tunables for the relay loop. All of these come from server
/// configuration; the defaults are starting points, not constants the code
/// depends on.
#[derive(Debug, Clone)]
pub struct OutboxRelayConfig {
    /// Maximum rows claimed per cycle.
    pub batch_size: usize,
    /// Sleep between cycles when the queue is drained.
    pub poll_interval: Duration,
    /// Publish failures tolerated before a row is terminally FAILED.
    pub max_retries: i32,
    /// First retry delay; doubles per retry.
    pub initial_backoff: Duration,
    /// Ceiling for the retry delay.
    pub max_backoff: Duration,
    /// Budget for a single publish call; a hang becomes a retryable
    /// failure.
    pub publish_timeout: Duration,
    /// IN_FLIGHT rows older than this are assumed orphaned by a crashed
    /// instance and returned to PENDING.
    pub claim_timeout: Duration,
}

impl Default for OutboxRelayConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            poll_interval: Duration::from_millis(500),
            max_retries: 8,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            publish_timeout: Duration::from_secs(10),
            claim_timeout: Duration::from_secs(60),
        }
    }
}

impl OutboxRelayConfig {
    /// Delay before the attempt following `retry_count` failures:
    /// `min(initial * 2^retry_count, max)`.
    pub fn backoff_delay(&self, retry_count: i32) -> Duration {
        let exponent = retry_count.clamp(0, 30) as u32;
        let factor = 2u32.saturating_pow(exponent);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Counters kept by the relay, exposed for the periodic operator log.
#[derive(Debug, Clone, Default)]
pub struct OutboxRelayMetrics {
    pub published_total: u64,
    pub failed_attempts_total: u64,
    pub retried_total: u64,
    pub dead_lettered_total: u64,
    pub batches_total: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum OutboxRelayError {
    #[error("Outbox error: {0}")]
    Outbox(#[from] OutboxError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
}

/// Outcome of one processed batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub published: usize,
    pub retried: usize,
    pub dead_lettered: usize,
}

impl BatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.published == 0 && self.retried == 0 && self.dead_lettered == 0
    }
}

pub struct OutboxRelay {
    repository: Arc<dyn OutboxRepository>,
    publisher: Arc<dyn EventPublisher>,
    config: OutboxRelayConfig,
    metrics: Mutex<OutboxRelayMetrics>,
    shutdown: tokio::sync::broadcast::Sender<()>,
}

impl OutboxRelay {
    pub fn new(
        repository: Arc<dyn OutboxRepository>,
        publisher: Arc<dyn EventPublisher>,
        config: OutboxRelayConfig,
    ) -> Self {
        let (shutdown, _) = tokio::sync::broadcast::channel(1);
        Self {
            repository,
            publisher,
            config,
            metrics: Mutex::new(OutboxRelayMetrics::default()),
            shutdown,
        }
    }

    pub fn metrics(&self) -> OutboxRelayMetrics {
        self.metrics.lock().unwrap().clone()
    }

    fn metrics_mut(&self) -> MutexGuard<'_, OutboxRelayMetrics> {
        self.metrics.lock().unwrap()
    }

    /// Signal the relay loop to stop after the current cycle.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(());
    }

    /// Run the relay until shutdown. Cycle errors are logged and the loop
    /// keeps going; a broken database is a reason to retry, not to die.
    pub async fn run(&self) -> Result<(), OutboxRelayError> {
        info!(
            batch_size = self.config.batch_size,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            max_retries = self.config.max_retries,
            "Outbox relay starting"
        );

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.run_cycle().await {
                        Ok(outcome) if !outcome.is_empty() => {
                            debug!(
                                published = outcome.published,
                                retried = outcome.retried,
                                dead_lettered = outcome.dead_lettered,
                                "Outbox batch processed"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(error = %e, "Outbox relay cycle failed");
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Outbox relay shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    /// One full cycle: recover orphaned claims, then drain one batch.
    pub async fn run_cycle(&self) -> Result<BatchOutcome, OutboxRelayError> {
        let released = self
            .repository
            .release_stuck(self.config.claim_timeout)
            .await?;
        if released > 0 {
            warn!(count = released, "Released stuck in-flight outbox rows");
        }

        self.process_batch().await
    }

    /// Claim and process one batch. The claim transaction has already
    /// committed when this returns rows, so no lock is held across the
    /// publish calls; each row is settled in its own short statement.
    pub async fn process_batch(&self) -> Result<BatchOutcome, OutboxRelayError> {
        let claimed = self
            .repository
            .claim_pending(self.config.batch_size, Utc::now())
            .await?;

        if claimed.is_empty() {
            return Ok(BatchOutcome::default());
        }

        debug!(count = claimed.len(), "Claimed outbox rows");
        self.metrics_mut().batches_total += 1;

        let mut outcome = BatchOutcome::default();
        let mut published_ids = Vec::new();

        for record in &claimed {
            match self.publish_record(record).await {
                Ok(()) => {
                    published_ids.push(record.event_id);
                    outcome.published += 1;
                }
                Err(e) => {
                    self.settle_failure(record, &e.to_string(), &mut outcome)
                        .await?;
                }
            }
        }

        if !published_ids.is_empty() {
            self.repository.mark_published(&published_ids).await?;
            self.metrics_mut().published_total += published_ids.len() as u64;
        }

        Ok(outcome)
    }

    /// Publish one row, converting a hang into a retryable failure.
    async fn publish_record(&self, record: &OutboxRecordView) -> Result<(), PublishError> {
        let envelope = EventEnvelope::from_record(record);
        match timeout(self.config.publish_timeout, self.publisher.publish(&envelope)).await {
            Ok(result) => result,
            Err(_) => Err(PublishError::Timeout(self.config.publish_timeout)),
        }
    }

    async fn settle_failure(
        &self,
        record: &OutboxRecordView,
        error_msg: &str,
        outcome: &mut BatchOutcome,
    ) -> Result<(), OutboxRelayError> {
        self.metrics_mut().failed_attempts_total += 1;

        if record.retry_count + 1 >= self.config.max_retries {
            error!(
                event_id = %record.event_id,
                event_type = record.event_type,
                retry_count = record.retry_count + 1,
                error = error_msg,
                "Outbox row exhausted its retries, marking FAILED"
            );
            self.repository
                .mark_failed(record.event_id, error_msg)
                .await?;
            self.metrics_mut().dead_lettered_total += 1;
            outcome.dead_lettered += 1;
        } else {
            let delay = self.config.backoff_delay(record.retry_count);
            let next_attempt_at = next_attempt(Utc::now(), delay);
            warn!(
                event_id = %record.event_id,
                event_type = record.event_type,
                retry_count = record.retry_count + 1,
                retry_in_ms = delay.as_millis() as u64,
                error = error_msg,
                "Outbox publish failed, scheduling retry"
            );
            self.repository
                .release_for_retry(record.event_id, error_msg, next_attempt_at)
                .await?;
            self.metrics_mut().retried_total += 1;
            outcome.retried += 1;
        }
        Ok(())
    }
}

fn next_attempt(now: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    now + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::seconds(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::in_memory::InMemoryOutboxRepository;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use talentgrid_domain::events::DomainEvent;
    use talentgrid_domain::outbox::{OutboxRecordInsert, OutboxStatus};
    use talentgrid_domain::shared_kernel::SkillId;

    /// Publisher double: fails the first `fail_first` calls, records every
    /// envelope it sees.
    struct MockPublisher {
        fail_first: usize,
        calls: AtomicUsize,
        envelopes: Mutex<Vec<EventEnvelope>>,
    }

    impl MockPublisher {
        fn reliable() -> Self {
            Self::failing(0)
        }

        fn failing(fail_first: usize) -> Self {
            Self {
                fail_first,
                calls: AtomicUsize::new(0),
                envelopes: Mutex::new(Vec::new()),
            }
        }

        fn envelopes(&self) -> Vec<EventEnvelope> {
            self.envelopes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventPublisher for MockPublisher {
        async fn publish(&self, envelope: &EventEnvelope) -> Result<(), PublishError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.envelopes.lock().unwrap().push(envelope.clone());
            if call < self.fail_first {
                return Err(PublishError::Publish("connection refused".to_string()));
            }
            Ok(())
        }
    }

    fn test_config() -> OutboxRelayConfig {
        OutboxRelayConfig {
            batch_size: 10,
            poll_interval: Duration::from_millis(10),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            publish_timeout: Duration::from_millis(200),
            claim_timeout: Duration::from_secs(60),
        }
    }

    fn sample_insert() -> OutboxRecordInsert {
        let event = DomainEvent::SkillCreated {
            skill_id: SkillId::new(),
            name: "Rust".to_string(),
            category: None,
            occurred_at: Utc::now(),
        };
        OutboxRecordInsert::from_event(&event).unwrap()
    }

    fn relay_with(
        repo: Arc<InMemoryOutboxRepository>,
        publisher: Arc<MockPublisher>,
    ) -> OutboxRelay {
        OutboxRelay::new(repo, publisher, test_config())
    }

    #[tokio::test]
    async fn publishes_pending_rows_and_settles_them() {
        let repo = Arc::new(InMemoryOutboxRepository::new());
        let publisher = Arc::new(MockPublisher::reliable());
        let insert = sample_insert();
        repo.insert(&[insert.clone()]);

        let relay = relay_with(repo.clone(), publisher.clone());
        let outcome = relay.process_batch().await.unwrap();

        assert_eq!(outcome.published, 1);
        let view = repo.find_by_id(insert.event_id).await.unwrap().unwrap();
        assert_eq!(view.status, OutboxStatus::Published);
        assert!(view.published_at.is_some());
        assert_eq!(relay.metrics().published_total, 1);
    }

    #[tokio::test]
    async fn failed_publish_is_retried_then_succeeds() {
        let repo = Arc::new(InMemoryOutboxRepository::new());
        let publisher = Arc::new(MockPublisher::failing(1));
        let insert = sample_insert();
        repo.insert(&[insert.clone()]);

        let relay = relay_with(repo.clone(), publisher.clone());

        let outcome = relay.process_batch().await.unwrap();
        assert_eq!(outcome.retried, 1);
        let view = repo.find_by_id(insert.event_id).await.unwrap().unwrap();
        assert_eq!(view.status, OutboxStatus::Pending);
        assert_eq!(view.retry_count, 1);
        assert!(view.next_attempt_at > Utc::now());

        // Not due yet: nothing to claim.
        assert!(relay.process_batch().await.unwrap().is_empty());

        repo.make_due(insert.event_id);
        let outcome = relay.process_batch().await.unwrap();
        assert_eq!(outcome.published, 1);
        let view = repo.find_by_id(insert.event_id).await.unwrap().unwrap();
        assert_eq!(view.status, OutboxStatus::Published);
    }

    #[tokio::test]
    async fn exhausted_retries_end_in_failed_with_the_full_count() {
        let repo = Arc::new(InMemoryOutboxRepository::new());
        let publisher = Arc::new(MockPublisher::failing(usize::MAX));
        let insert = sample_insert();
        repo.insert(&[insert.clone()]);

        let relay = relay_with(repo.clone(), publisher.clone());
        for _ in 0..test_config().max_retries {
            repo.make_due(insert.event_id);
            relay.process_batch().await.unwrap();
        }

        let view = repo.find_by_id(insert.event_id).await.unwrap().unwrap();
        assert_eq!(view.status, OutboxStatus::Failed);
        assert_eq!(view.retry_count, test_config().max_retries);
        assert_eq!(view.last_error.as_deref(), Some("connection refused"));
        assert_eq!(relay.metrics().dead_lettered_total, 1);

        // Terminal: nothing left to claim even when due again.
        repo.make_due(insert.event_id);
        assert!(relay.process_batch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn every_delivery_attempt_carries_the_same_idempotency_key() {
        let repo = Arc::new(InMemoryOutboxRepository::new());
        let publisher = Arc::new(MockPublisher::failing(1));
        let insert = sample_insert();
        repo.insert(&[insert.clone()]);

        let relay = relay_with(repo.clone(), publisher.clone());
        relay.process_batch().await.unwrap();
        repo.make_due(insert.event_id);
        relay.process_batch().await.unwrap();

        let envelopes = publisher.envelopes();
        assert_eq!(envelopes.len(), 2);
        assert_eq!(envelopes[0].event_id, insert.event_id);
        assert_eq!(envelopes[0].event_id, envelopes[1].event_id);
    }

    #[tokio::test]
    async fn hung_publish_becomes_a_retryable_failure() {
        struct HangingPublisher;

        #[async_trait]
        impl EventPublisher for HangingPublisher {
            async fn publish(&self, _envelope: &EventEnvelope) -> Result<(), PublishError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }

        let repo = Arc::new(InMemoryOutboxRepository::new());
        let insert = sample_insert();
        repo.insert(&[insert.clone()]);

        let relay = OutboxRelay::new(repo.clone(), Arc::new(HangingPublisher), test_config());
        let outcome = relay.process_batch().await.unwrap();

        assert_eq!(outcome.retried, 1);
        let view = repo.find_by_id(insert.event_id).await.unwrap().unwrap();
        assert_eq!(view.status, OutboxStatus::Pending);
        assert!(view.last_error.as_deref().unwrap_or("").contains("timed out"));
    }

    #[tokio::test]
    async fn batch_preserves_creation_order() {
        let repo = Arc::new(InMemoryOutboxRepository::new());
        let publisher = Arc::new(MockPublisher::reliable());
        let inserts: Vec<_> = (0..3).map(|_| sample_insert()).collect();
        for insert in &inserts {
            repo.insert(std::slice::from_ref(insert));
        }

        let relay = relay_with(repo.clone(), publisher.clone());
        relay.process_batch().await.unwrap();

        let seen: Vec<_> = publisher.envelopes().iter().map(|e| e.event_id).collect();
        let expected: Vec<_> = inserts.iter().map(|i| i.event_id).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let config = OutboxRelayConfig {
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            ..Default::default()
        };

        assert_eq!(config.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(config.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(4));
        assert_eq!(config.backoff_delay(5), Duration::from_secs(32));
        assert_eq!(config.backoff_delay(6), Duration::from_secs(60));
        assert_eq!(config.backoff_delay(1000), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let repo = Arc::new(InMemoryOutboxRepository::new());
        let publisher = Arc::new(MockPublisher::reliable());
        let relay = Arc::new(relay_with(repo, publisher));

        let handle = {
            let relay = relay.clone();
            tokio::spawn(async move { relay.run().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        relay.shutdown();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("relay did not stop")
            .unwrap()
            .unwrap();
    }
}
