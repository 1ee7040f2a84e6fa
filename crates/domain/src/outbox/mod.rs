//! Transactional outbox: records created in the same transaction as the
//! aggregate mutation they describe, delivered asynchronously by the relay.

mod model;
mod repository;

pub use model::{
    AggregateType, OutboxError, OutboxRecordInsert, OutboxRecordView, OutboxStats, OutboxStatus,
};
pub use repository::OutboxRepository;
