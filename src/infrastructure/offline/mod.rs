pub mod event_emitter;
pub mod kv_queue_store;
pub mod metrics;
pub mod replay_job;

pub use event_emitter::BroadcastEventEmitter;
pub use kv_queue_store::KeyValueQueueStore;
pub use metrics::{ReplayMetrics, ReplayMetricsSnapshot, ReplayOutcomeStatus};
pub use replay_job::ReplayJob;
