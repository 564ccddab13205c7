use super::dispatcher::MutationDispatcher;
use super::enqueuer::MutationEnqueuer;
use super::queue_access::QueueAccess;
use super::replay_engine::ReplayEngine;
use crate::application::ports::{ConnectivityMonitor, RemoteError, RetryPolicy};
use crate::domain::entities::{MutationRecord, ReplayReport};
use crate::domain::value_objects::{
    MutationAction, MutationId, MutationPayload, RowId, TemporaryIdRule,
};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// リモートに直接反映された。Insert ではリモートが返した行IDを持つ。
    Applied { row_id: Option<RowId> },
    /// キューに積まれた。`pending` は追加後の未同期件数。
    Queued { pending: usize },
}

#[async_trait]
pub trait OfflineSyncServiceTrait: Send + Sync {
    async fn submit(
        &self,
        action: MutationAction,
        payload: MutationPayload,
    ) -> Result<WriteOutcome, AppError>;
    async fn enqueue(
        &self,
        action: MutationAction,
        payload: MutationPayload,
    ) -> Result<usize, AppError>;
    async fn replay(&self) -> Result<ReplayReport, AppError>;
    async fn pending(&self) -> Vec<MutationRecord>;
    async fn pending_count(&self) -> usize;
    async fn clear(&self) -> Result<(), AppError>;
    fn is_online(&self) -> bool;
}

pub struct OfflineSyncService {
    queue: Arc<QueueAccess>,
    enqueuer: MutationEnqueuer,
    engine: ReplayEngine,
    dispatcher: Arc<MutationDispatcher>,
    connectivity: Arc<dyn ConnectivityMonitor>,
}

impl OfflineSyncService {
    pub fn new(
        queue: Arc<QueueAccess>,
        dispatcher: Arc<MutationDispatcher>,
        retry_policy: Arc<dyn RetryPolicy>,
        connectivity: Arc<dyn ConnectivityMonitor>,
    ) -> Self {
        Self {
            enqueuer: MutationEnqueuer::new(queue.clone()),
            engine: ReplayEngine::new(queue.clone(), dispatcher.clone(), retry_policy),
            queue,
            dispatcher,
            connectivity,
        }
    }

    pub fn temp_ids(&self) -> &TemporaryIdRule {
        self.dispatcher.temp_ids()
    }

    async fn queue_write(
        &self,
        action: MutationAction,
        payload: MutationPayload,
    ) -> Result<WriteOutcome, AppError> {
        let pending = self.enqueuer.enqueue(action, payload).await?;
        Ok(WriteOutcome::Queued { pending })
    }
}

#[async_trait]
impl OfflineSyncServiceTrait for OfflineSyncService {
    async fn submit(
        &self,
        action: MutationAction,
        payload: MutationPayload,
    ) -> Result<WriteOutcome, AppError> {
        if !self.connectivity.is_online() {
            return self.queue_write(action, payload).await;
        }

        // 未同期の記録がある間は直接書き込むと順序が入れ替わるため、キューの後ろに並べる
        if !self.queue.snapshot().await.is_empty() {
            return self.queue_write(action, payload).await;
        }

        let now = Utc::now();
        let record = MutationRecord::new(
            MutationId::next(None, now.timestamp_millis()),
            action,
            payload,
            now,
        );

        match self.dispatcher.apply(&record).await {
            Ok(row_id) => Ok(WriteOutcome::Applied { row_id }),
            Err(error) if error.is_transient() => {
                tracing::info!(
                    target: "offline::queue",
                    action = %action,
                    error = %error,
                    "direct write failed; queued for replay"
                );
                self.queue_write(action, record.payload).await
            }
            Err(RemoteError::Rejected { status, message }) => Err(AppError::ValidationError(
                format!("Remote store rejected {action} (status {status}): {message}"),
            )),
            Err(error) => Err(AppError::InvalidInput(error.to_string())),
        }
    }

    async fn enqueue(
        &self,
        action: MutationAction,
        payload: MutationPayload,
    ) -> Result<usize, AppError> {
        self.enqueuer.enqueue(action, payload).await
    }

    async fn replay(&self) -> Result<ReplayReport, AppError> {
        self.engine.replay().await
    }

    async fn pending(&self) -> Vec<MutationRecord> {
        self.queue.snapshot().await
    }

    async fn pending_count(&self) -> usize {
        self.queue.snapshot().await.len()
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.queue.clear().await?;
        tracing::info!(target: "offline::queue", "offline queue cleared");
        Ok(())
    }

    fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::offline::retry_policies::RetryForever;
    use crate::application::services::offline::test_support::{
        memory_queue, RemoteCall, ScriptedRemote,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Switch(AtomicBool);

    impl ConnectivityMonitor for Switch {
        fn is_online(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn service(online: bool) -> (OfflineSyncService, Arc<ScriptedRemote>, Arc<Switch>) {
        let (queue, _) = memory_queue();
        let remote = Arc::new(ScriptedRemote::default());
        let switch = Arc::new(Switch(AtomicBool::new(online)));
        let dispatcher = Arc::new(MutationDispatcher::new(
            remote.clone(),
            TemporaryIdRule::default(),
        ));
        let service =
            OfflineSyncService::new(queue, dispatcher, Arc::new(RetryForever), switch.clone());
        (service, remote, switch)
    }

    fn payload(value: serde_json::Value) -> MutationPayload {
        MutationPayload::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_submit_online_applies_directly() {
        let (service, remote, _) = service(true);
        remote.assign_created_id(RowId::Number(12));

        let outcome = service
            .submit(MutationAction::Insert, payload(json!({"name": "Plot A"})))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WriteOutcome::Applied {
                row_id: Some(RowId::Number(12))
            }
        );
        assert_eq!(service.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_submit_offline_queues_without_remote_call() {
        let (service, remote, _) = service(false);

        let outcome = service
            .submit(MutationAction::Delete, payload(json!({"id": 42})))
            .await
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Queued { pending: 1 });
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_queues_when_direct_call_fails_transiently() {
        let (service, remote, _) = service(true);
        remote.fail_when(|_| Some(RemoteError::Timeout));

        let outcome = service
            .submit(MutationAction::Update, payload(json!({"id": 3, "progress": 40})))
            .await
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Queued { pending: 1 });
        let pending = service.pending().await;
        assert_eq!(pending[0].payload.row_id(), Some(RowId::Number(3)));
    }

    #[tokio::test]
    async fn test_submit_reports_rejection_without_queueing() {
        let (service, remote, _) = service(true);
        remote.fail_when(|_| {
            Some(RemoteError::Rejected {
                status: 400,
                message: "column \"luas\" does not exist".into(),
            })
        });

        let result = service
            .submit(MutationAction::Insert, payload(json!({"luas": 1})))
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(service.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_submit_queues_behind_pending_records() {
        let (service, remote, switch) = service(false);
        service
            .submit(MutationAction::Delete, payload(json!({"id": 1})))
            .await
            .unwrap();

        switch.0.store(true, Ordering::SeqCst);
        let outcome = service
            .submit(MutationAction::Delete, payload(json!({"id": 2})))
            .await
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Queued { pending: 2 });
        assert!(remote.calls().is_empty());

        let report = service.replay().await.unwrap();
        assert_eq!(report.succeeded, 2);
        assert_eq!(
            remote.calls(),
            vec![
                RemoteCall::Delete(RowId::Number(1)),
                RemoteCall::Delete(RowId::Number(2))
            ]
        );
    }

    #[tokio::test]
    async fn test_clear_empties_queue() {
        let (service, _, _) = service(false);
        service
            .enqueue(MutationAction::Delete, payload(json!({"id": 5})))
            .await
            .unwrap();

        service.clear().await.unwrap();

        assert_eq!(service.pending_count().await, 0);
    }
}
