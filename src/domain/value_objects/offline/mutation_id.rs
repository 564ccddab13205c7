use serde::{Deserialize, Serialize};
use std::fmt;

/// キュー内でのみ使う記録ID。作成時刻（unix ミリ秒）を基準に単調増加させる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MutationId(i64);

impl MutationId {
    pub fn new(value: i64) -> Result<Self, String> {
        if value <= 0 {
            return Err("Mutation ID must be positive".to_string());
        }
        Ok(Self(value))
    }

    /// Issues the id following `previous`, preferring the wall clock when it has advanced.
    pub fn next(previous: Option<MutationId>, now_ms: i64) -> Self {
        match previous {
            Some(prev) if prev.0 >= now_ms => Self(prev.0.saturating_add(1)),
            _ => Self(now_ms.max(1)),
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<MutationId> for i64 {
    fn from(id: MutationId) -> Self {
        id.0
    }
}
