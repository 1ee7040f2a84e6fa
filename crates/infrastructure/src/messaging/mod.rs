//! Messaging adapters: NATS JetStream publisher and the outbox relay.

pub mod nats;
pub mod outbox_relay;
