use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// リモート行のID。数値主キーと文字列主キー（UUID など）の両方を扱う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Number(i64),
    Text(String),
}

impl RowId {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_i64().map(RowId::Number).or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.fract() == 0.0 && float.abs() < i64::MAX as f64)
                    .map(|float| RowId::Number(float as i64))
            }),
            Value::String(text) if !text.trim().is_empty() => Some(RowId::Text(text.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RowId::Number(number) => Value::from(*number),
            RowId::Text(text) => Value::String(text.clone()),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Number(number) => write!(f, "{number}"),
            RowId::Text(text) => f.write_str(text),
        }
    }
}

/// Decides whether a row id was generated on the device and never accepted by the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryIdRule {
    threshold: i64,
    prefix: String,
}

impl TemporaryIdRule {
    pub fn new(threshold: i64, prefix: impl Into<String>) -> Self {
        Self {
            threshold,
            prefix: prefix.into(),
        }
    }

    pub fn is_temporary(&self, id: &RowId) -> bool {
        match id {
            RowId::Number(number) => *number > self.threshold,
            RowId::Text(text) => !self.prefix.is_empty() && text.starts_with(&self.prefix),
        }
    }
}

impl Default for TemporaryIdRule {
    fn default() -> Self {
        Self::new(
            crate::shared::config::DEFAULT_TEMP_ID_THRESHOLD,
            crate::shared::config::DEFAULT_TEMP_ID_PREFIX,
        )
    }
}
