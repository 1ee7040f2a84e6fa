mod relay;

pub use relay::{
    BatchOutcome, OutboxRelay, OutboxRelayConfig, OutboxRelayError, OutboxRelayMetrics,
};
