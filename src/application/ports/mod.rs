pub mod connectivity;
pub mod key_value_store;
pub mod queue_store;
pub mod remote_store;
pub mod replay_events;
pub mod retry_policy;

pub use connectivity::ConnectivityMonitor;
pub use key_value_store::KeyValueStore;
pub use queue_store::QueueStore;
pub use remote_store::{RemoteError, RemoteStore};
pub use replay_events::{ReplayEvent, ReplayEventEmitter};
pub use retry_policy::{RetryDecision, RetryPolicy};
