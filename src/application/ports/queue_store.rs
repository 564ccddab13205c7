use crate::domain::entities::MutationRecord;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// 保留中のミューテーションを順序付きで丸ごと読み書きする永続キュー。
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// 保存済みキューを投入順で返す。破損データは空として扱うが、読み込み自体の失敗はエラーを返す。
    async fn try_load(&self) -> Result<Vec<MutationRecord>, AppError>;

    /// 表示用の読み込み。未保存・破損・読み込み失敗のいずれも空を返し、エラーにはしない。
    async fn load(&self) -> Vec<MutationRecord> {
        match self.try_load().await {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(
                    target: "offline::queue",
                    error = %err,
                    "failed to read offline queue; treating it as empty"
                );
                Vec::new()
            }
        }
    }

    /// キュー全体を上書きする。
    async fn save(&self, records: &[MutationRecord]) -> Result<(), AppError>;

    /// 保存済みキューを削除する。
    async fn clear(&self) -> Result<(), AppError>;
}
