use crate::application::ports::QueueStore;
use crate::domain::entities::MutationRecord;
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Serializes every load-modify-save cycle against the queue store.
///
/// Enqueue and replay share one instance so a record appended while a replay is
/// removing its successes is never overwritten by a stale copy of the queue.
pub struct QueueAccess {
    store: Arc<dyn QueueStore>,
    lock: Mutex<()>,
}

impl QueueAccess {
    pub fn new(store: Arc<dyn QueueStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    pub async fn snapshot(&self) -> Vec<MutationRecord> {
        let _guard = self.lock.lock().await;
        self.store.load().await
    }

    pub async fn modify<F, R>(&self, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut Vec<MutationRecord>) -> R + Send,
        R: Send,
    {
        let _guard = self.lock.lock().await;
        // 読み込みに失敗したまま保存すると既存の記録を空で上書きしてしまう
        let mut records = self.store.try_load().await?;
        let result = f(&mut records);
        self.store.save(&records).await?;
        Ok(result)
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;
        self.store.clear().await
    }
}
