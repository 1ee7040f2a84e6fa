//! NATS JetStream event publisher.
//!
//! Every publish carries a `Nats-Msg-Id` header equal to the outbox
//! `event_id`, so JetStream's duplicate window deduplicates redelivered
//! rows and downstream consumers see each logical event once.

use async_nats::jetstream;
use async_nats::jetstream::stream::Config as StreamConfig;
use async_nats::ConnectOptions;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use talentgrid_domain::event_publisher::{EventEnvelope, EventPublisher, PublishError};

pub const MSG_ID_HEADER: &str = "Nats-Msg-Id";

/// NATS connection and stream configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NatsConfig {
    #[serde(default = "default_urls")]
    pub urls: Vec<String>,
    #[serde(default = "default_connect_timeout")]
    pub connection_timeout_secs: u64,
    #[serde(default = "default_stream_name")]
    pub stream_name: String,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
    /// JetStream duplicate-tracking window, in seconds.
    #[serde(default = "default_duplicate_window")]
    pub duplicate_window_secs: u64,
    #[serde(default)]
    pub name: Option<String>,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            urls: default_urls(),
            connection_timeout_secs: default_connect_timeout(),
            stream_name: default_stream_name(),
            subject_prefix: default_subject_prefix(),
            duplicate_window_secs: default_duplicate_window(),
            name: None,
        }
    }
}

fn default_urls() -> Vec<String> {
    vec!["nats://localhost:4222".to_string()]
}

const fn default_connect_timeout() -> u64 {
    5
}

fn default_stream_name() -> String {
    "TALENTGRID_EVENTS".to_string()
}

fn default_subject_prefix() -> String {
    "talentgrid.events".to_string()
}

const fn default_duplicate_window() -> u64 {
    120
}

/// JetStream-backed implementation of the publisher port.
pub struct NatsEventPublisher {
    jetstream: jetstream::Context,
    subject_prefix: String,
}

impl NatsEventPublisher {
    /// Connect and ensure the event stream exists.
    pub async fn connect(config: &NatsConfig) -> Result<Self, PublishError> {
        let options = ConnectOptions::new()
            .name(config.name.clone().unwrap_or_else(|| "talentgrid".to_string()))
            .connection_timeout(Duration::from_secs(config.connection_timeout_secs));

        let client = options
            .connect(config.urls.join(","))
            .await
            .map_err(|e| PublishError::Connection(e.to_string()))?;
        let jetstream = jetstream::new(client);

        jetstream
            .get_or_create_stream(StreamConfig {
                name: config.stream_name.clone(),
                subjects: vec![format!("{}.>", config.subject_prefix)],
                duplicate_window: Duration::from_secs(config.duplicate_window_secs),
                ..Default::default()
            })
            .await
            .map_err(|e| PublishError::Connection(e.to_string()))?;

        tracing::info!(
            stream = config.stream_name,
            subjects = format!("{}.>", config.subject_prefix),
            "Connected to NATS JetStream"
        );

        Ok(Self {
            jetstream,
            subject_prefix: config.subject_prefix.clone(),
        })
    }

    fn subject_for(&self, envelope: &EventEnvelope) -> String {
        format!(
            "{}.{}.{}",
            self.subject_prefix,
            envelope.aggregate_type.as_str().to_lowercase(),
            envelope.event_type
        )
    }
}

#[async_trait]
impl EventPublisher for NatsEventPublisher {
    async fn publish(&self, envelope: &EventEnvelope) -> Result<(), PublishError> {
        let subject = self.subject_for(envelope);
        let payload =
            serde_json::to_vec(envelope).map_err(|e| PublishError::Serialization(e.to_string()))?;

        let mut headers = async_nats::HeaderMap::new();
        headers.insert(MSG_ID_HEADER, envelope.event_id.to_string().as_str());

        let ack = self
            .jetstream
            .publish_with_headers(subject.clone(), headers, payload.into())
            .await
            .map_err(|e| PublishError::Publish(e.to_string()))?;
        ack.await
            .map_err(|e| PublishError::Publish(e.to_string()))?;

        tracing::debug!(
            subject,
            event_id = %envelope.event_id,
            "Event published to JetStream"
        );
        Ok(())
    }
}
