use crate::domain::entities::ReplayReport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayEvent {
    Completed { report: ReplayReport },
    Failed { message: String },
    PendingChanged { pending: usize },
}

pub trait ReplayEventEmitter: Send + Sync {
    fn emit(&self, event: ReplayEvent) -> Result<(), String>;
}
