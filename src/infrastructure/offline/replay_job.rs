use super::metrics::{ReplayMetrics, ReplayMetricsSnapshot};
use crate::application::ports::{ReplayEvent, ReplayEventEmitter};
use crate::application::services::OfflineSyncServiceTrait;
use crate::domain::entities::ReplayReport;
use crate::domain::value_objects::SyncTrigger;
use crate::shared::error::AppError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Turns triggers (reconnect, interval, "sync now") into serialized replay runs.
pub struct ReplayJob {
    service: Arc<dyn OfflineSyncServiceTrait>,
    event_emitter: Option<Arc<dyn ReplayEventEmitter>>,
    metrics: ReplayMetrics,
    gate: Mutex<()>,
}

impl ReplayJob {
    pub fn new(service: Arc<dyn OfflineSyncServiceTrait>) -> Arc<Self> {
        Self::with_emitter(service, None)
    }

    pub fn with_emitter(
        service: Arc<dyn OfflineSyncServiceTrait>,
        event_emitter: Option<Arc<dyn ReplayEventEmitter>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            service,
            event_emitter,
            metrics: ReplayMetrics::new(),
            gate: Mutex::new(()),
        })
    }

    pub fn metrics(&self) -> ReplayMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn trigger(self: &Arc<Self>, trigger: SyncTrigger) -> JoinHandle<()> {
        let job = Arc::clone(self);
        tokio::spawn(async move {
            job.run_guarded(trigger).await;
        })
    }

    /// Replays once unless offline or another run holds the gate; both cases return `None`.
    pub async fn run_once(&self, trigger: SyncTrigger) -> Result<Option<ReplayReport>, AppError> {
        if !self.service.is_online() {
            tracing::debug!(
                target: "offline::job",
                trigger = %trigger,
                "offline; replay skipped"
            );
            return Ok(None);
        }

        let Ok(_guard) = self.gate.try_lock() else {
            tracing::debug!(
                target: "offline::job",
                trigger = %trigger,
                "replay already running; trigger dropped"
            );
            return Ok(None);
        };

        let started = Instant::now();
        let result = self.service.replay().await;
        let duration_ms = started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64;

        match result {
            Ok(report) => {
                let report = report.with_trigger(trigger);
                self.metrics.record_report(&report, duration_ms);
                self.emit(ReplayEvent::Completed {
                    report: report.clone(),
                });
                self.emit(ReplayEvent::PendingChanged {
                    pending: report.remaining as usize,
                });
                Ok(Some(report))
            }
            Err(err) => {
                let message = err.to_string();
                self.metrics
                    .record_error(Some(trigger.as_str()), &message, duration_ms);
                self.emit(ReplayEvent::Failed { message });
                Err(err)
            }
        }
    }

    /// 未同期件数をUIへ通知する。書き込み直後にホストアプリから呼ぶ。
    pub async fn notify_pending(&self) -> usize {
        let pending = self.service.pending_count().await;
        self.emit(ReplayEvent::PendingChanged { pending });
        pending
    }

    /// Replays at startup, on every offline-to-online transition and on each interval
    /// tick. The task ends when the connectivity sender is dropped.
    pub fn spawn_scheduler(
        self: &Arc<Self>,
        mut connectivity: watch::Receiver<bool>,
        interval: Duration,
    ) -> JoinHandle<()> {
        let job = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            let mut was_online = *connectivity.borrow_and_update();
            job.run_guarded(SyncTrigger::Startup).await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        job.run_guarded(SyncTrigger::Interval).await;
                    }
                    changed = connectivity.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let online = *connectivity.borrow_and_update();
                        if online && !was_online {
                            job.run_guarded(SyncTrigger::Reconnected).await;
                        }
                        was_online = online;
                    }
                }
            }

            tracing::debug!(target: "offline::job", "replay scheduler stopped");
        })
    }

    async fn run_guarded(&self, trigger: SyncTrigger) {
        match self.run_once(trigger).await {
            Ok(Some(report)) => {
                tracing::info!(
                    target: "offline::job",
                    trigger = %trigger,
                    succeeded = report.succeeded,
                    remaining = report.remaining,
                    "offline replay job completed"
                );
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!(
                    target: "offline::job",
                    trigger = %trigger,
                    error = %err,
                    "offline replay job failed"
                );
            }
        }
    }

    fn emit(&self, event: ReplayEvent) {
        if let Some(emitter) = &self.event_emitter {
            if let Err(err) = emitter.emit(event) {
                tracing::warn!(
                    target: "offline::job",
                    error = %err,
                    "failed to emit offline replay event"
                );
            }
        }
    }
}
