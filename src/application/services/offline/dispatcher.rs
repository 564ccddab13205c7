use crate::application::ports::{RemoteError, RemoteStore};
use crate::domain::entities::MutationRecord;
use crate::domain::value_objects::{MutationAction, RowId, TemporaryIdRule};
use std::sync::Arc;

/// Maps a mutation onto the matching remote CRUD call.
pub struct MutationDispatcher {
    remote: Arc<dyn RemoteStore>,
    temp_ids: TemporaryIdRule,
}

impl MutationDispatcher {
    pub fn new(remote: Arc<dyn RemoteStore>, temp_ids: TemporaryIdRule) -> Self {
        Self { remote, temp_ids }
    }

    pub fn temp_ids(&self) -> &TemporaryIdRule {
        &self.temp_ids
    }

    /// 成功時、Insert ではリモートが採番したIDを返す。
    pub async fn apply(&self, record: &MutationRecord) -> Result<Option<RowId>, RemoteError> {
        match record.action {
            MutationAction::Insert => {
                let fields = record.payload.without_temporary_id(&self.temp_ids);
                self.remote.create(fields).await
            }
            MutationAction::Update => {
                let (id, patch) = record.payload.split_row_id();
                let id = self.confirmed_target(id)?;
                self.remote.update(&id, patch).await.map(|_| None)
            }
            MutationAction::Delete => {
                let (id, _) = record.payload.split_row_id();
                let id = self.confirmed_target(id)?;
                self.remote.delete(&id).await.map(|_| None)
            }
        }
    }

    fn confirmed_target(&self, id: Option<RowId>) -> Result<RowId, RemoteError> {
        match id {
            None => Err(RemoteError::Unresolvable(
                "payload has no target row id".to_string(),
            )),
            Some(id) if self.temp_ids.is_temporary(&id) => Err(RemoteError::Unresolvable(
                format!("row id {id} was never confirmed by the remote store"),
            )),
            Some(id) => Ok(id),
        }
    }
}
