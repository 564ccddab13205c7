use crate::domain::entities::ReplayReport;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplayOutcomeStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReplayMetricsSnapshot {
    pub total_runs: u64,
    pub total_succeeded: u64,
    pub total_failed: u64,
    pub total_discarded: u64,
    pub failed_runs: u64,
    pub consecutive_failed_runs: u64,
    pub last_success_ms: Option<u64>,
    pub last_failure_ms: Option<u64>,
    pub last_outcome: Option<ReplayOutcomeStatus>,
    pub last_run_id: Option<String>,
    pub last_trigger: Option<String>,
    pub last_duration_ms: Option<u64>,
    pub last_remaining: Option<u32>,
    pub last_error: Option<String>,
}

#[derive(Default, Clone)]
struct LastRun {
    outcome: Option<ReplayOutcomeStatus>,
    run_id: Option<String>,
    trigger: Option<String>,
    duration_ms: Option<u64>,
    remaining: Option<u32>,
    error: Option<String>,
}

/// リプレイジョブの累積統計。
pub struct ReplayMetrics {
    runs: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    discarded: AtomicU64,
    failed_runs: AtomicU64,
    consecutive_failed_runs: AtomicU64,
    last_success_ms: AtomicU64,
    last_failure_ms: AtomicU64,
    last_run: Mutex<LastRun>,
}

impl ReplayMetrics {
    pub fn new() -> Self {
        Self {
            runs: AtomicU64::new(0),
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
            failed_runs: AtomicU64::new(0),
            consecutive_failed_runs: AtomicU64::new(0),
            last_success_ms: AtomicU64::new(0),
            last_failure_ms: AtomicU64::new(0),
            last_run: Mutex::new(LastRun::default()),
        }
    }

    /// A run counts as failed when any record stayed behind because of an error.
    pub fn record_report(&self, report: &ReplayReport, duration_ms: u64) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.succeeded
            .fetch_add(u64::from(report.succeeded), Ordering::Relaxed);
        self.failed
            .fetch_add(u64::from(report.failed), Ordering::Relaxed);
        self.discarded
            .fetch_add(u64::from(report.discarded), Ordering::Relaxed);

        let status = if report.failed == 0 {
            ReplayOutcomeStatus::Success
        } else {
            ReplayOutcomeStatus::Failure
        };
        self.mark(status);

        if let Ok(mut guard) = self.last_run.lock() {
            *guard = LastRun {
                outcome: Some(status),
                run_id: Some(report.run_id.clone()),
                trigger: report.trigger.map(|trigger| trigger.as_str().to_string()),
                duration_ms: Some(duration_ms),
                remaining: Some(report.remaining),
                error: None,
            };
        }
    }

    pub fn record_error(&self, trigger: Option<&str>, message: &str, duration_ms: u64) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.mark(ReplayOutcomeStatus::Failure);

        if let Ok(mut guard) = self.last_run.lock() {
            *guard = LastRun {
                outcome: Some(ReplayOutcomeStatus::Failure),
                run_id: None,
                trigger: trigger.map(str::to_string),
                duration_ms: Some(duration_ms),
                remaining: None,
                error: Some(message.to_string()),
            };
        }
    }

    fn mark(&self, status: ReplayOutcomeStatus) {
        match status {
            ReplayOutcomeStatus::Success => {
                self.last_success_ms
                    .store(current_unix_ms(), Ordering::Relaxed);
                self.consecutive_failed_runs.store(0, Ordering::Relaxed);
            }
            ReplayOutcomeStatus::Failure => {
                self.failed_runs.fetch_add(1, Ordering::Relaxed);
                self.last_failure_ms
                    .store(current_unix_ms(), Ordering::Relaxed);
                self.consecutive_failed_runs.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self) -> ReplayMetricsSnapshot {
        let last = self
            .last_run
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();

        ReplayMetricsSnapshot {
            total_runs: self.runs.load(Ordering::Relaxed),
            total_succeeded: self.succeeded.load(Ordering::Relaxed),
            total_failed: self.failed.load(Ordering::Relaxed),
            total_discarded: self.discarded.load(Ordering::Relaxed),
            failed_runs: self.failed_runs.load(Ordering::Relaxed),
            consecutive_failed_runs: self.consecutive_failed_runs.load(Ordering::Relaxed),
            last_success_ms: to_option(self.last_success_ms.load(Ordering::Relaxed)),
            last_failure_ms: to_option(self.last_failure_ms.load(Ordering::Relaxed)),
            last_outcome: last.outcome,
            last_run_id: last.run_id,
            last_trigger: last.trigger,
            last_duration_ms: last.duration_ms,
            last_remaining: last.remaining,
            last_error: last.error,
        }
    }
}

impl Default for ReplayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn to_option(value: u64) -> Option<u64> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}

fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::SyncTrigger;

    fn report(succeeded: u32, failed: u32) -> ReplayReport {
        ReplayReport {
            succeeded,
            failed,
            remaining: failed,
            ..ReplayReport::empty("run-1".into())
        }
        .with_trigger(SyncTrigger::Reconnected)
    }

    #[test]
    fn record_success_and_failure() {
        let metrics = ReplayMetrics::new();

        metrics.record_report(&report(3, 0), 120);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_runs, 1);
        assert_eq!(snapshot.total_succeeded, 3);
        assert_eq!(snapshot.last_outcome, Some(ReplayOutcomeStatus::Success));
        assert_eq!(snapshot.last_trigger.as_deref(), Some("reconnected"));
        assert_eq!(snapshot.consecutive_failed_runs, 0);

        metrics.record_report(&report(1, 2), 80);
        metrics.record_error(Some("manual"), "storage unavailable", 5);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_runs, 3);
        assert_eq!(snapshot.total_failed, 2);
        assert_eq!(snapshot.failed_runs, 2);
        assert_eq!(snapshot.consecutive_failed_runs, 2);
        assert_eq!(snapshot.last_outcome, Some(ReplayOutcomeStatus::Failure));
        assert_eq!(snapshot.last_error.as_deref(), Some("storage unavailable"));
        assert!(snapshot.last_success_ms.is_some());
    }
}
