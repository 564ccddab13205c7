use crate::domain::value_objects::{
    MutationAction, MutationId, MutationPayload, RowId, TemporaryIdRule,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MutationRecord {
    pub id: MutationId,
    pub action: MutationAction,
    pub payload: MutationPayload,
    #[serde(rename = "timestamp")]
    pub enqueued_at: DateTime<Utc>,
}

impl MutationRecord {
    pub fn new(
        id: MutationId,
        action: MutationAction,
        payload: MutationPayload,
        enqueued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            action,
            payload,
            enqueued_at,
        }
    }

    /// Update/Delete の対象行。Insert では常に `None`。
    pub fn target_row_id(&self) -> Option<RowId> {
        if self.action.requires_row_id() {
            self.payload.row_id()
        } else {
            None
        }
    }

    /// The temporary id an Insert was created under, if any.
    pub fn temporary_insert_id(&self, rule: &TemporaryIdRule) -> Option<RowId> {
        match self.action {
            MutationAction::Insert => self.payload.row_id().filter(|id| rule.is_temporary(id)),
            _ => None,
        }
    }

    pub fn targets(&self, id: &RowId) -> bool {
        self.target_row_id().as_ref() == Some(id)
    }

    pub fn retarget(&mut self, id: &RowId) {
        self.payload = self.payload.with_row_id(id);
    }
}
