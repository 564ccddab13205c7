//! Offline mutation queue: writes that cannot reach the remote store are persisted locally and
//! replayed in order once connectivity returns.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::{
    ConnectivityMonitor, KeyValueStore, QueueStore, RemoteError, RemoteStore, ReplayEvent,
    ReplayEventEmitter, RetryDecision, RetryPolicy,
};
pub use application::services::offline::{
    DiscardRejected, MutationDispatcher, MutationEnqueuer, QueueAccess, ReplayEngine,
    RetryForever,
};
pub use application::services::{OfflineSyncService, OfflineSyncServiceTrait, WriteOutcome};
pub use domain::entities::{MutationRecord, ReplayReport};
pub use domain::value_objects::{
    MutationAction, MutationId, MutationPayload, RowId, SyncTrigger, TemporaryIdRule,
};
pub use shared::{AppConfig, AppError, Result};
pub use state::SyncState;

/// ログ設定の初期化。`RUST_LOG` が未設定なら `hytani_sync=debug,info`。
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hytani_sync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
