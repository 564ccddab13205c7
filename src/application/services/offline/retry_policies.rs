use crate::application::ports::{RemoteError, RetryDecision, RetryPolicy};
use crate::domain::entities::MutationRecord;

/// Keeps every failed record, whatever the error. This is the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct RetryForever;

impl RetryPolicy for RetryForever {
    fn decide(&self, _record: &MutationRecord, _error: &RemoteError) -> RetryDecision {
        RetryDecision::Retry
    }
}

/// 恒久的に拒否された記録だけを破棄し、一時的な障害は再送対象に残す。
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardRejected;

impl RetryPolicy for DiscardRejected {
    fn decide(&self, _record: &MutationRecord, error: &RemoteError) -> RetryDecision {
        if error.is_transient() {
            RetryDecision::Retry
        } else {
            RetryDecision::Discard
        }
    }
}
