use crate::domain::value_objects::RowId;
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Remote store unreachable: {0}")]
    Network(String),

    #[error("Remote call timed out")]
    Timeout,

    #[error("Remote store unavailable (status {status})")]
    Unavailable { status: u16 },

    #[error("Remote store rejected the request (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid remote response: {0}")]
    InvalidResponse(String),

    /// 送信前に端末側で検出した、送っても意味のないミューテーション。
    #[error("Mutation cannot be sent: {0}")]
    Unresolvable(String),
}

impl RemoteError {
    /// 一時的な障害かどうか。`Rejected` と `Unresolvable` は同じ内容で再送しても成功しない。
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            RemoteError::Rejected { .. } | RemoteError::Unresolvable(_)
        )
    }
}

/// バックエンドの CRUD 操作。認証・リクエスト整形・タイムアウトはアダプタ側の責務。
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Creates a row; returns the id the remote store assigned when it reports one.
    async fn create(&self, fields: Map<String, Value>) -> Result<Option<RowId>, RemoteError>;
    async fn update(&self, id: &RowId, patch: Map<String, Value>) -> Result<(), RemoteError>;
    async fn delete(&self, id: &RowId) -> Result<(), RemoteError>;
}
