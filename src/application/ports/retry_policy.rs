use super::remote_store::RemoteError;
use crate::domain::entities::MutationRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// 記録をキューに残し、次回のリプレイで再送する。
    Retry,
    /// 記録をキューから取り除く。
    Discard,
}

/// Classifies a failed replay attempt without touching the replay loop itself.
pub trait RetryPolicy: Send + Sync {
    fn decide(&self, record: &MutationRecord, error: &RemoteError) -> RetryDecision;
}
