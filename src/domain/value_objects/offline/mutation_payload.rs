use super::row_id::{RowId, TemporaryIdRule};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ROW_ID_FIELD: &str = "id";

/// 対象行のデータ。フィールド名から値へのマップで、形の検証は行わない。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct MutationPayload(Map<String, Value>);

impl MutationPayload {
    pub fn new(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err("Mutation payload cannot be null".to_string()),
            _ => Err("Mutation payload must be a JSON object".to_string()),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| format!("Invalid JSON payload: {e}"))?;
        Self::new(value)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        Value::Object(self.0)
    }

    pub fn row_id(&self) -> Option<RowId> {
        self.0.get(ROW_ID_FIELD).and_then(RowId::from_value)
    }

    /// Splits the row id off, leaving the remaining fields as an update patch.
    pub fn split_row_id(&self) -> (Option<RowId>, Map<String, Value>) {
        let mut fields = self.0.clone();
        let id = fields
            .remove(ROW_ID_FIELD)
            .as_ref()
            .and_then(RowId::from_value);
        (id, fields)
    }

    /// Insert 用。端末で採番した一時IDだけを取り除き、実IDはそのまま残す。
    pub fn without_temporary_id(&self, rule: &TemporaryIdRule) -> Map<String, Value> {
        let mut fields = self.0.clone();
        if let Some(id) = self.row_id() {
            if rule.is_temporary(&id) {
                fields.remove(ROW_ID_FIELD);
            }
        }
        fields
    }

    pub fn with_row_id(&self, id: &RowId) -> Self {
        let mut fields = self.0.clone();
        fields.insert(ROW_ID_FIELD.to_string(), id.to_value());
        Self(fields)
    }
}

impl From<MutationPayload> for Value {
    fn from(payload: MutationPayload) -> Self {
        payload.into_inner()
    }
}

impl TryFrom<Value> for MutationPayload {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
