use super::queue_access::QueueAccess;
use crate::domain::entities::MutationRecord;
use crate::domain::value_objects::{MutationAction, MutationId, MutationPayload};
use crate::shared::error::AppError;
use chrono::Utc;
use std::sync::Arc;

pub struct MutationEnqueuer {
    queue: Arc<QueueAccess>,
}

impl MutationEnqueuer {
    pub fn new(queue: Arc<QueueAccess>) -> Self {
        Self { queue }
    }

    /// 末尾に記録を追加し、追加後のキュー長を返す（未同期バッジ用）。
    pub async fn enqueue(
        &self,
        action: MutationAction,
        payload: MutationPayload,
    ) -> Result<usize, AppError> {
        let now = Utc::now();

        let (id, pending) = self
            .queue
            .modify(move |records| {
                let latest = records.iter().map(|record| record.id).max();
                let id = MutationId::next(latest, now.timestamp_millis());
                records.push(MutationRecord::new(id, action, payload, now));
                (id, records.len())
            })
            .await?;

        tracing::debug!(
            target: "offline::queue",
            mutation_id = %id,
            action = %action,
            pending,
            "mutation queued for replay"
        );

        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::offline::test_support::memory_queue;
    use serde_json::json;

    #[tokio::test]
    async fn test_enqueue_returns_length_and_keeps_order() {
        let (queue, _) = memory_queue();
        let enqueuer = MutationEnqueuer::new(queue.clone());

        let first = enqueuer
            .enqueue(
                MutationAction::Insert,
                MutationPayload::new(json!({"name": "Plot A", "size": 1.2})).unwrap(),
            )
            .await
            .unwrap();
        let second = enqueuer
            .enqueue(
                MutationAction::Delete,
                MutationPayload::new(json!({"id": 42})).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!((first, second), (1, 2));

        let records = queue.snapshot().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].action, MutationAction::Insert);
        assert_eq!(records[1].action, MutationAction::Delete);
        assert!(records[0].id < records[1].id);
    }

    #[tokio::test]
    async fn test_rapid_enqueues_get_unique_ids() {
        let (queue, _) = memory_queue();
        let enqueuer = MutationEnqueuer::new(queue.clone());

        for index in 0..20 {
            enqueuer
                .enqueue(
                    MutationAction::Update,
                    MutationPayload::new(json!({"id": index, "progress": index * 5})).unwrap(),
                )
                .await
                .unwrap();
        }

        let records = queue.snapshot().await;
        let ids: Vec<i64> = records.iter().map(|record| record.id.value()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), 20);
    }
}
