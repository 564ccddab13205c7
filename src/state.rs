use crate::application::ports::{ReplayEventEmitter, RetryPolicy};
use crate::application::services::offline::{
    DiscardRejected, MutationDispatcher, QueueAccess, RetryForever,
};
use crate::application::services::{OfflineSyncService, OfflineSyncServiceTrait, WriteOutcome};
use crate::domain::entities::ReplayReport;
use crate::domain::value_objects::{MutationAction, MutationPayload, SyncTrigger, TemporaryIdRule};
use crate::infrastructure::connectivity::WatchConnectivity;
use crate::infrastructure::offline::{BroadcastEventEmitter, KeyValueQueueStore, ReplayJob};
use crate::infrastructure::remote::PostgrestRemoteStore;
use crate::infrastructure::storage::SqliteKeyValueStore;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// アプリケーション全体の同期状態
pub struct SyncState {
    pub config: AppConfig,
    pub kv_store: Arc<SqliteKeyValueStore>,
    pub sync_service: Arc<OfflineSyncService>,
    pub connectivity: Arc<WatchConnectivity>,
    pub events: Arc<BroadcastEventEmitter>,
    pub replay_job: Arc<ReplayJob>,
    scheduler: Mutex<Option<JoinHandle<()>>>,
}

impl SyncState {
    pub async fn initialize(config: AppConfig, initially_online: bool) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;
        ensure_database_dir(&config.database.url)?;

        let kv_store = Arc::new(SqliteKeyValueStore::connect(&config.database).await?);
        let queue_store = Arc::new(KeyValueQueueStore::new(
            kv_store.clone(),
            config.sync.queue_key.clone(),
        ));
        let queue = Arc::new(QueueAccess::new(queue_store));

        let remote = Arc::new(PostgrestRemoteStore::new(&config.remote)?);
        let temp_ids = TemporaryIdRule::new(
            config.sync.temp_id_threshold,
            config.sync.temp_id_prefix.clone(),
        );
        let dispatcher = Arc::new(MutationDispatcher::new(remote, temp_ids));

        let retry_policy: Arc<dyn RetryPolicy> = if config.sync.discard_rejected {
            Arc::new(DiscardRejected)
        } else {
            Arc::new(RetryForever)
        };

        let connectivity = Arc::new(WatchConnectivity::new(initially_online));
        let sync_service = Arc::new(OfflineSyncService::new(
            queue,
            dispatcher,
            retry_policy,
            connectivity.clone(),
        ));

        let events = Arc::new(BroadcastEventEmitter::new(EVENT_CHANNEL_CAPACITY));
        let emitter: Arc<dyn ReplayEventEmitter> = events.clone();
        let replay_job = ReplayJob::with_emitter(sync_service.clone(), Some(emitter));

        tracing::info!(
            target: "offline::job",
            database = %config.database.url,
            table = %config.remote.table,
            auto_sync = config.sync.auto_sync,
            "sync state initialized"
        );

        Ok(Self {
            config,
            kv_store,
            sync_service,
            connectivity,
            events,
            replay_job,
            scheduler: Mutex::new(None),
        })
    }

    /// Starts the background scheduler when auto sync is enabled. Calling it twice is a no-op.
    pub fn start(&self) {
        if !self.config.sync.auto_sync {
            return;
        }
        let Ok(mut slot) = self.scheduler.lock() else {
            return;
        };
        if slot.is_some() {
            return;
        }
        *slot = Some(self.replay_job.spawn_scheduler(
            self.connectivity.subscribe(),
            Duration::from_secs(self.config.sync.sync_interval),
        ));
    }

    pub fn shutdown(&self) {
        if let Ok(mut slot) = self.scheduler.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }

    pub fn set_online(&self, online: bool) -> bool {
        self.connectivity.set_online(online)
    }

    /// 書き込みを送信し、キューに積まれた場合は未同期件数を通知する
    pub async fn write(
        &self,
        action: MutationAction,
        payload: MutationPayload,
    ) -> Result<WriteOutcome, AppError> {
        let outcome = self.sync_service.submit(action, payload).await?;
        if matches!(outcome, WriteOutcome::Queued { .. }) {
            self.replay_job.notify_pending().await;
        }
        Ok(outcome)
    }

    pub async fn sync_now(&self) -> Result<Option<ReplayReport>, AppError> {
        self.replay_job.run_once(SyncTrigger::Manual).await
    }

    pub async fn pending_count(&self) -> usize {
        self.sync_service.pending_count().await
    }
}

impl Drop for SyncState {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn ensure_database_dir(url: &str) -> Result<(), AppError> {
    let Some(rest) = url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let path = rest.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| {
                AppError::Storage(format!(
                    "Failed to create database directory {}: {err}",
                    parent.display()
                ))
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_database_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("sync.db");
        let url = format!("sqlite://{}", db_path.display());

        ensure_database_dir(&url).unwrap();

        assert!(db_path.parent().unwrap().is_dir());
        assert!(ensure_database_dir("sqlite::memory:").is_ok());
    }
}
