pub mod dispatcher;
pub mod enqueuer;
pub mod queue_access;
pub mod replay_engine;
pub mod retry_policies;
pub mod sync_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use dispatcher::MutationDispatcher;
pub use enqueuer::MutationEnqueuer;
pub use queue_access::QueueAccess;
pub use replay_engine::ReplayEngine;
pub use retry_policies::{DiscardRejected, RetryForever};
pub use sync_service::{OfflineSyncService, OfflineSyncServiceTrait, WriteOutcome};
