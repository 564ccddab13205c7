use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MutationAction {
    Insert,
    Update,
    Delete,
}

impl MutationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationAction::Insert => "INSERT",
            MutationAction::Update => "UPDATE",
            MutationAction::Delete => "DELETE",
        }
    }

    /// Update/Delete は対象行のIDがペイロードに必要。
    pub fn requires_row_id(&self) -> bool {
        !matches!(self, MutationAction::Insert)
    }
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INSERT" => Ok(MutationAction::Insert),
            "UPDATE" => Ok(MutationAction::Update),
            "DELETE" => Ok(MutationAction::Delete),
            other => Err(format!("Unknown mutation action: {other}")),
        }
    }
}
