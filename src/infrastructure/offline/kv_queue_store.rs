use crate::application::ports::{KeyValueStore, QueueStore};
use crate::domain::entities::MutationRecord;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;

/// Stores the whole queue as one JSON array under a single well-known key.
pub struct KeyValueQueueStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl KeyValueQueueStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl QueueStore for KeyValueQueueStore {
    async fn try_load(&self) -> Result<Vec<MutationRecord>, AppError> {
        let raw = self
            .kv
            .get(&self.key)
            .await
            .map_err(|err| AppError::Storage(format!("failed to read offline queue: {err}")))?;
        let Some(raw) = raw else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<MutationRecord>>(&raw) {
            Ok(records) => Ok(records),
            Err(err) => {
                tracing::warn!(
                    target: "offline::queue",
                    key = %self.key,
                    error = %err,
                    "offline queue is corrupt; treating it as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, records: &[MutationRecord]) -> Result<(), AppError> {
        let raw = serde_json::to_string(records)?;
        self.kv
            .set(&self.key, &raw)
            .await
            .map_err(|err| AppError::Storage(format!("failed to persist offline queue: {err}")))
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.kv
            .remove(&self.key)
            .await
            .map_err(|err| AppError::Storage(format!("failed to clear offline queue: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{MutationAction, MutationId, MutationPayload};
    use crate::infrastructure::storage::InMemoryKeyValueStore;
    use chrono::Utc;
    use serde_json::json;

    const KEY: &str = "hytani_offline_queue";

    struct FailingReads;

    #[async_trait]
    impl KeyValueStore for FailingReads {
        async fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
            Err(AppError::Database("database is locked".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), AppError> {
            Ok(())
        }

        async fn remove(&self, _key: &str) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn sample(id: i64) -> MutationRecord {
        MutationRecord::new(
            MutationId::new(id).unwrap(),
            MutationAction::Update,
            MutationPayload::new(json!({"id": id, "status": "tanam"})).unwrap(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_load_without_saved_queue_is_empty() {
        let store = KeyValueQueueStore::new(Arc::new(InMemoryKeyValueStore::new()), KEY);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_returns_same_records() {
        let store = KeyValueQueueStore::new(Arc::new(InMemoryKeyValueStore::new()), KEY);
        let records = vec![sample(1), sample(2)];

        store.save(&records).await.unwrap();

        assert_eq!(store.load().await, records);
    }

    #[tokio::test]
    async fn test_corrupt_payload_loads_as_empty() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        kv.set(KEY, "{not json").await.unwrap();
        let store = KeyValueQueueStore::new(kv.clone(), KEY);

        assert!(store.load().await.is_empty());
        assert!(store.try_load().await.unwrap().is_empty());

        kv.set(KEY, r#"[{"id":1,"action":"MERGE","payload":{},"timestamp":"x"}]"#)
            .await
            .unwrap();
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_is_an_error_not_an_empty_queue() {
        let kv = Arc::new(FailingReads);
        let store = KeyValueQueueStore::new(kv, KEY);

        assert!(matches!(store.try_load().await, Err(AppError::Storage(_))));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_key() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store = KeyValueQueueStore::new(kv.clone(), KEY);
        store.save(&[sample(1)]).await.unwrap();

        store.clear().await.unwrap();

        assert_eq!(kv.get(KEY).await.unwrap(), None);
        assert!(store.load().await.is_empty());
    }
}
