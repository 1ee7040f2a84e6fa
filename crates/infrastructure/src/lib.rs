//! TalentGrid infrastructure: PostgreSQL repositories, the NATS JetStream
//! publisher and the outbox relay.

pub mod messaging;
pub mod persistence;
