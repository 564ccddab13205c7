use super::dispatcher::MutationDispatcher;
use super::queue_access::QueueAccess;
use crate::application::ports::{RetryDecision, RetryPolicy};
use crate::domain::entities::{MutationRecord, ReplayReport};
use crate::domain::value_objects::{MutationId, RowId};
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Replays pending mutations oldest-first against the remote store.
///
/// Each success is removed from the store right away, so a crash mid-run never
/// replays an already accepted mutation. Failures stay in place and keep their
/// relative order; what happens to them is left to the [`RetryPolicy`].
pub struct ReplayEngine {
    queue: Arc<QueueAccess>,
    dispatcher: Arc<MutationDispatcher>,
    retry_policy: Arc<dyn RetryPolicy>,
    gate: Mutex<()>,
}

impl ReplayEngine {
    pub fn new(
        queue: Arc<QueueAccess>,
        dispatcher: Arc<MutationDispatcher>,
        retry_policy: Arc<dyn RetryPolicy>,
    ) -> Self {
        Self {
            queue,
            dispatcher,
            retry_policy,
            gate: Mutex::new(()),
        }
    }

    pub async fn replay(&self) -> Result<ReplayReport, AppError> {
        let _gate = self.gate.lock().await;
        let mut report = ReplayReport::empty(Uuid::new_v4().to_string());

        let snapshot = self.queue.snapshot().await;
        if snapshot.is_empty() {
            return Ok(report);
        }

        tracing::info!(
            target: "offline::replay",
            run_id = %report.run_id,
            pending = snapshot.len(),
            "offline replay started"
        );

        for queued in &snapshot {
            // キューは途中で書き換わり得る（追加・依存先の付け替え・クリア）ので毎回読み直す
            let current = self.queue.snapshot().await;
            let Some(position) = current.iter().position(|record| record.id == queued.id) else {
                continue;
            };
            let record = &current[position];

            if self.waits_for_pending_insert(record, &current[..position]) {
                report.deferred += 1;
                tracing::debug!(
                    target: "offline::replay",
                    mutation_id = %record.id,
                    action = %record.action,
                    "mutation deferred until its insert is confirmed"
                );
                continue;
            }

            match self.dispatcher.apply(record).await {
                Ok(created) => {
                    self.complete(record, created).await?;
                    report.succeeded += 1;
                }
                Err(error) => match self.retry_policy.decide(record, &error) {
                    RetryDecision::Retry => {
                        report.failed += 1;
                        tracing::warn!(
                            target: "offline::replay",
                            mutation_id = %record.id,
                            action = %record.action,
                            error = %error,
                            "mutation replay failed; kept for next attempt"
                        );
                    }
                    RetryDecision::Discard => {
                        self.remove(record.id).await?;
                        report.discarded += 1;
                        tracing::warn!(
                            target: "offline::replay",
                            mutation_id = %record.id,
                            action = %record.action,
                            error = %error,
                            "mutation replay failed permanently; discarded"
                        );
                    }
                },
            }
        }

        report.remaining = self.queue.snapshot().await.len() as u32;

        tracing::info!(
            target: "offline::replay",
            run_id = %report.run_id,
            succeeded = report.succeeded,
            failed = report.failed,
            deferred = report.deferred,
            discarded = report.discarded,
            remaining = report.remaining,
            "offline replay finished"
        );

        Ok(report)
    }

    fn waits_for_pending_insert(&self, record: &MutationRecord, earlier: &[MutationRecord]) -> bool {
        let temp_ids = self.dispatcher.temp_ids();
        let Some(target) = record.target_row_id() else {
            return false;
        };
        if !temp_ids.is_temporary(&target) {
            return false;
        }
        earlier
            .iter()
            .any(|pending| pending.temporary_insert_id(temp_ids).as_ref() == Some(&target))
    }

    async fn complete(
        &self,
        record: &MutationRecord,
        created: Option<RowId>,
    ) -> Result<(), AppError> {
        let temporary = record.temporary_insert_id(self.dispatcher.temp_ids());
        let completed_id = record.id;

        let retargeted = self
            .queue
            .modify(|records| {
                records.retain(|pending| pending.id != completed_id);
                let (Some(temporary), Some(created)) = (temporary.as_ref(), created.as_ref())
                else {
                    return 0usize;
                };
                let mut count = 0;
                for dependent in records.iter_mut().filter(|pending| pending.targets(temporary)) {
                    dependent.retarget(created);
                    count += 1;
                }
                count
            })
            .await?;

        if retargeted > 0 {
            tracing::debug!(
                target: "offline::replay",
                mutation_id = %completed_id,
                retargeted,
                "dependent mutations now target the created row"
            );
        } else if temporary.is_some() && created.is_none() {
            tracing::warn!(
                target: "offline::replay",
                mutation_id = %completed_id,
                "remote store did not report the created row id; dependents cannot be retargeted"
            );
        }

        Ok(())
    }

    async fn remove(&self, id: MutationId) -> Result<(), AppError> {
        self.queue
            .modify(|records| records.retain(|pending| pending.id != id))
            .await
    }
}
